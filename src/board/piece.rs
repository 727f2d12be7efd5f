/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, ops::Not, str::FromStr};

use anyhow::{bail, Result};

use super::{EAST, NORTH, SOUTH, WEST};

/// Represents the real-world color of a player.
///
/// The board itself never stores colors; it only knows "ours" and "theirs".
/// The color is tracked so that positions can be translated back into standard notation.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub enum Color {
    #[default]
    White,
    Black,
}

impl Color {
    /// Returns the opposing color.
    #[inline(always)]
    pub const fn opponent(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// The name of this color.
    #[inline(always)]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::White => "White",
            Self::Black => "Black",
        }
    }

    /// The character used by FEN to denote this color's turn.
    #[inline(always)]
    pub const fn char(&self) -> char {
        match self {
            Self::White => 'w',
            Self::Black => 'b',
        }
    }
}

impl Not for Color {
    type Output = Self;
    #[inline(always)]
    fn not(self) -> Self::Output {
        self.opponent()
    }
}

impl FromStr for Color {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "w" | "W" => Ok(Self::White),
            "b" | "B" => Ok(Self::Black),
            _ => bail!("Color must be either 'w' or 'b'. Got {s:?}"),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

/// Pawn: push, double push, and the two forward captures.
const PAWN_DIRECTIONS: &[isize] = &[NORTH, NORTH + NORTH, NORTH + WEST, NORTH + EAST];

const KNIGHT_DIRECTIONS: &[isize] = &[
    NORTH + NORTH + EAST,
    EAST + NORTH + EAST,
    EAST + SOUTH + EAST,
    SOUTH + SOUTH + EAST,
    SOUTH + SOUTH + WEST,
    WEST + SOUTH + WEST,
    WEST + NORTH + WEST,
    NORTH + NORTH + WEST,
];

const BISHOP_DIRECTIONS: &[isize] = &[NORTH + EAST, SOUTH + EAST, SOUTH + WEST, NORTH + WEST];

const ROOK_DIRECTIONS: &[isize] = &[NORTH, EAST, SOUTH, WEST];

const ROYAL_DIRECTIONS: &[isize] = &[
    NORTH,
    EAST,
    SOUTH,
    WEST,
    NORTH + EAST,
    SOUTH + EAST,
    SOUTH + WEST,
    NORTH + WEST,
];

/// Represents the kind (or "role") of a chess piece, independent of who owns it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[repr(u8)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Number of piece kinds.
    pub const COUNT: usize = 6;

    /// All piece kinds, ordered by value.
    #[inline(always)]
    pub const fn all() -> [Self; Self::COUNT] {
        [
            Self::Pawn,
            Self::Knight,
            Self::Bishop,
            Self::Rook,
            Self::Queen,
            Self::King,
        ]
    }

    /// Index of this kind in `[0, 6)`.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// The offsets this kind moves along.
    #[inline(always)]
    pub const fn directions(&self) -> &'static [isize] {
        match self {
            Self::Pawn => PAWN_DIRECTIONS,
            Self::Knight => KNIGHT_DIRECTIONS,
            Self::Bishop => BISHOP_DIRECTIONS,
            Self::Rook => ROOK_DIRECTIONS,
            Self::Queen | Self::King => ROYAL_DIRECTIONS,
        }
    }

    /// Returns `true` if this kind keeps walking along a direction until blocked.
    #[inline(always)]
    pub const fn is_slider(&self) -> bool {
        matches!(self, Self::Bishop | Self::Rook | Self::Queen)
    }

    /// The uppercase character of this kind.
    #[inline(always)]
    pub const fn char(&self) -> char {
        match self {
            Self::Pawn => 'P',
            Self::Knight => 'N',
            Self::Bishop => 'B',
            Self::Rook => 'R',
            Self::Queen => 'Q',
            Self::King => 'K',
        }
    }

    /// Parses a kind from either an uppercase or lowercase character.
    #[inline(always)]
    pub const fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'P' => Some(Self::Pawn),
            'N' => Some(Self::Knight),
            'B' => Some(Self::Bishop),
            'R' => Some(Self::Rook),
            'Q' => Some(Self::Queen),
            'K' => Some(Self::King),
            _ => None,
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

/// The contents of a single cell of the board.
///
/// Ownership is relative: [`Cell::Ours`] belongs to the side to move.
/// Rotating the board swaps `Ours` and `Theirs`, so move generation never needs to know whose turn it is.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Debug)]
pub enum Cell {
    /// Padding around the playable region.
    #[default]
    Offboard,
    Empty,
    Ours(PieceKind),
    Theirs(PieceKind),
}

impl Cell {
    /// Number of distinct occupied cell values (6 kinds for each side).
    pub const PIECES: usize = PieceKind::COUNT * 2;

    /// Swaps ownership of the piece in this cell, if there is one.
    ///
    /// # Example
    /// ```
    /// # use rotor::{Cell, PieceKind};
    /// assert_eq!(Cell::Ours(PieceKind::Rook).swapped(), Cell::Theirs(PieceKind::Rook));
    /// assert_eq!(Cell::Empty.swapped(), Cell::Empty);
    /// ```
    #[inline(always)]
    pub const fn swapped(self) -> Self {
        match self {
            Self::Ours(kind) => Self::Theirs(kind),
            Self::Theirs(kind) => Self::Ours(kind),
            other => other,
        }
    }

    /// Returns the kind of piece in this cell, regardless of owner.
    #[inline(always)]
    pub const fn kind(&self) -> Option<PieceKind> {
        match self {
            Self::Ours(kind) | Self::Theirs(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Returns `true` if this cell holds a piece of either side.
    #[inline(always)]
    pub const fn is_occupied(&self) -> bool {
        matches!(self, Self::Ours(_) | Self::Theirs(_))
    }

    /// Index of this cell's piece in `[0, 12)`, used for Zobrist hashing.
    #[inline(always)]
    pub const fn piece_index(&self) -> Option<usize> {
        match self {
            Self::Ours(kind) => Some(kind.index()),
            Self::Theirs(kind) => Some(kind.index() + PieceKind::COUNT),
            _ => None,
        }
    }

    /// The character for this cell: uppercase for ours, lowercase for theirs.
    #[inline(always)]
    pub const fn char(&self) -> char {
        match self {
            Self::Offboard => ' ',
            Self::Empty => '.',
            Self::Ours(kind) => kind.char(),
            Self::Theirs(kind) => kind.char().to_ascii_lowercase(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}
