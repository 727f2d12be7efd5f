/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use anyhow::{anyhow, bail, Result};

/// One step towards the opponent's side of the board.
pub const NORTH: isize = -10;

/// One step towards the side-to-move's own back rank.
pub const SOUTH: isize = 10;

/// One step towards the h-file (from the side-to-move's point of view).
pub const EAST: isize = 1;

/// One step towards the a-file (from the side-to-move's point of view).
pub const WEST: isize = -1;

/// Represents a single cell of the padded 10x12 mailbox board.
///
/// The playable 8x8 region occupies rows `2..=9` and columns `1..=8`.
/// Everything else is a sentinel cell that stops move generation.
///
/// Squares are always interpreted from the side-to-move's point of view:
/// [`Square::A1`] is the bottom-left corner of whoever is about to move.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Square(pub(crate) u8);

impl Square {
    /// Number of cells in the padded board.
    pub const COUNT: usize = 120;

    /// Number of playable cells.
    pub const PLAYABLE: usize = 64;

    /// Bottom-left corner of the side to move.
    pub const A1: Self = Self(91);

    /// Bottom-right corner of the side to move.
    pub const H1: Self = Self(98);

    /// Top-left corner of the side to move.
    pub const A8: Self = Self(21);

    /// Top-right corner of the side to move.
    pub const H8: Self = Self(28);

    /// Creates a new [`Square`] from a file and rank, both in the range `[0, 7]`.
    ///
    /// # Example
    /// ```
    /// # use rotor::Square;
    /// assert_eq!(Square::new(0, 0), Square::A1);
    /// assert_eq!(Square::new(7, 7), Square::H8);
    /// ```
    #[inline(always)]
    pub const fn new(file: u8, rank: u8) -> Self {
        debug_assert!(file < 8 && rank < 8);
        Self((9 - rank) * 10 + file + 1)
    }

    /// Creates a [`Square`] from a raw cell index, without checking that it is playable.
    #[inline(always)]
    pub const fn from_index_unchecked(index: usize) -> Self {
        debug_assert!(index < Self::COUNT);
        Self(index as u8)
    }

    /// Returns the raw cell index of this square in `[0, 120)`.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// Returns this square's index within the 8x8 region, `a1 = 0` and `h8 = 63`.
    ///
    /// Only meaningful for playable squares.
    #[inline(always)]
    pub const fn playable_index(&self) -> usize {
        self.rank() as usize * 8 + self.file() as usize
    }

    /// Returns `true` if this cell is inside the 8x8 region.
    #[inline(always)]
    pub const fn is_playable(&self) -> bool {
        let row = self.0 / 10;
        let col = self.0 % 10;
        row >= 2 && row <= 9 && col >= 1 && col <= 8
    }

    /// File of this square, `0` for the a-file.
    #[inline(always)]
    pub const fn file(&self) -> u8 {
        self.0 % 10 - 1
    }

    /// Rank of this square, `0` for the first rank.
    #[inline(always)]
    pub const fn rank(&self) -> u8 {
        9 - self.0 / 10
    }

    /// Mirrors this square through the centre of the board.
    ///
    /// This is the coordinate half of a board rotation, so `a1` becomes `h8`.
    ///
    /// # Example
    /// ```
    /// # use rotor::Square;
    /// assert_eq!(Square::A1.flipped(), Square::H8);
    /// assert_eq!(Square::A8.flipped().flipped(), Square::A8);
    /// ```
    #[inline(always)]
    pub const fn flipped(self) -> Self {
        Self((Self::COUNT - 1) as u8 - self.0)
    }

    /// Returns the cell `delta` steps away. The padding guarantees this never leaves the array
    /// for any direction used by move generation, starting from a playable square.
    #[inline(always)]
    pub const fn offset(self, delta: isize) -> Self {
        Self((self.0 as isize + delta) as u8)
    }

    /// Returns `true` if this square is on the side-to-move's second rank.
    #[inline(always)]
    pub const fn is_on_second_rank(&self) -> bool {
        self.0 / 10 == 8
    }

    /// Returns `true` if this square is on the side-to-move's last rank.
    #[inline(always)]
    pub const fn is_on_last_rank(&self) -> bool {
        self.0 / 10 == 2
    }

    /// An iterator over every playable square, in board-scan order (`a8` through `h1`).
    #[inline(always)]
    pub fn iter() -> impl DoubleEndedIterator<Item = Self> {
        (0..Self::COUNT as u8)
            .map(Self)
            .filter(|square| square.is_playable())
    }

    /// Parses a square name such as `"e4"`, as seen by the side to move.
    ///
    /// # Example
    /// ```
    /// # use rotor::Square;
    /// assert_eq!(Square::from_uci("a1").unwrap(), Square::A1);
    /// assert!(Square::from_uci("i9").is_err());
    /// ```
    pub fn from_uci(square: &str) -> Result<Self> {
        let mut chars = square.chars();
        let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
            bail!("Square must be exactly two characters. Got {square:?}");
        };

        if !('a'..='h').contains(&file) {
            bail!("Invalid file in square {square:?}");
        }

        let rank = rank
            .to_digit(10)
            .filter(|r| (1..=8).contains(r))
            .ok_or(anyhow!("Invalid rank in square {square:?}"))?;

        Ok(Self::new(file as u8 - b'a', rank as u8 - 1))
    }
}

impl FromStr for Square {
    type Err = anyhow::Error;
    #[inline(always)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_uci(s)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_playable() {
            write!(f, "{}{}", (b'a' + self.file()) as char, self.rank() + 1)
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self} ({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corners() {
        assert_eq!(Square::from_uci("a1").unwrap(), Square::A1);
        assert_eq!(Square::from_uci("h1").unwrap(), Square::H1);
        assert_eq!(Square::from_uci("a8").unwrap(), Square::A8);
        assert_eq!(Square::from_uci("h8").unwrap(), Square::H8);
    }

    #[test]
    fn test_playable_region() {
        assert_eq!(Square::iter().count(), Square::PLAYABLE);
        assert!(!Square(0).is_playable());
        assert!(!Square(90).is_playable());
        assert!(!Square(99).is_playable());
        assert!(Square::iter().all(|sq| sq.flipped().is_playable()));
    }

    #[test]
    fn test_name_round_trip() {
        for square in Square::iter() {
            assert_eq!(square.to_string().parse::<Square>().unwrap(), square);
        }
        assert_eq!(Square::from_uci("e2").unwrap().offset(NORTH * 2).to_string(), "e4");
    }

    #[test]
    fn test_rank_helpers() {
        assert!(Square::from_uci("c2").unwrap().is_on_second_rank());
        assert!(Square::from_uci("g8").unwrap().is_on_last_rank());
        assert!(!Square::from_uci("g7").unwrap().is_on_last_rank());
    }
}
