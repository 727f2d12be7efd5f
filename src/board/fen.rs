/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use thiserror::Error;

use super::{Castling, CastlingRights, Cell, Color, PieceKind, Position, Square};

/// Everything that can be wrong with a FEN string.
///
/// Decoding never produces a partially-filled [`Position`]: any of these aborts the whole parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("invalid FEN: missing {0}")]
    MissingField(&'static str),

    #[error("invalid FEN: unexpected trailing field {0:?}")]
    TrailingField(String),

    #[error("invalid FEN: expected 8 ranks of piece placements, found {0}")]
    RankCount(usize),

    #[error("invalid FEN: rank {rank} does not describe exactly 8 files")]
    RankWidth { rank: u8 },

    #[error("invalid FEN: unknown piece character {0:?}")]
    Piece(char),

    #[error("invalid FEN: side to move must be 'w' or 'b', found {0:?}")]
    SideToMove(String),

    #[error("invalid FEN: bad castling field {0:?}")]
    Castling(String),

    #[error("invalid FEN: bad en passant square {0:?}")]
    EnPassant(String),

    #[error("invalid FEN: bad {field} counter {value:?}")]
    Counter { field: &'static str, value: String },

    #[error("invalid FEN: {color} must have exactly one king, found {count}")]
    KingCount { color: &'static str, count: usize },
}

impl Position {
    /// Decodes a FEN string into a [`Position`] oriented for its side to move.
    ///
    /// The half-move and full-move counters may be omitted, in which case they default to `0` and `1`.
    ///
    /// # Example
    /// ```
    /// # use rotor::*;
    /// let pos = Position::from_fen(FEN_KIWIPETE).unwrap();
    /// assert_eq!(pos.to_fen(), FEN_KIWIPETE);
    ///
    /// assert!(matches!(Position::from_fen("8/8/8 w - - 0 1"), Err(FenError::RankCount(3))));
    /// ```
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let mut fields = fen.split_ascii_whitespace();

        let placements = fields
            .next()
            .ok_or(FenError::MissingField("piece placements"))?;
        let side = fields.next().ok_or(FenError::MissingField("side to move"))?;
        let castling = fields
            .next()
            .ok_or(FenError::MissingField("castling rights"))?;
        let ep = fields
            .next()
            .ok_or(FenError::MissingField("en passant square"))?;
        let halfmove = parse_counter("halfmove", fields.next().unwrap_or("0"))?;
        let fullmove = parse_counter("fullmove", fields.next().unwrap_or("1"))?;

        if let Some(extra) = fields.next() {
            return Err(FenError::TrailingField(extra.to_string()));
        }

        // Everything is decoded from White's point of view, then rotated if Black is to move
        let mut pos = Position::new();
        parse_placements(&mut pos, placements)?;

        let side_to_move = side
            .parse::<Color>()
            .map_err(|_| FenError::SideToMove(side.to_string()))?;

        let castling = parse_castling(&pos, castling)?;
        let ep_square = parse_ep_square(&pos, side_to_move, ep)?;

        pos.set_state(castling, ep_square, halfmove, fullmove);

        Ok(match side_to_move {
            Color::White => pos,
            Color::Black => pos.rotated(),
        })
    }

    /// Encodes this position as a FEN string.
    ///
    /// # Example
    /// ```
    /// # use rotor::*;
    /// let pos = Position::startpos();
    /// assert_eq!(pos.to_fen(), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
    /// ```
    pub fn to_fen(&self) -> String {
        format!("{self}")
    }
}

fn parse_counter(field: &'static str, value: &str) -> Result<usize, FenError> {
    value.parse().map_err(|_| FenError::Counter {
        field,
        value: value.to_string(),
    })
}

fn parse_placements(pos: &mut Position, placements: &str) -> Result<(), FenError> {
    let ranks = placements.split('/').collect::<Vec<_>>();
    if ranks.len() != 8 {
        return Err(FenError::RankCount(ranks.len()));
    }

    for (i, rank_str) in ranks.into_iter().enumerate() {
        let rank = 7 - i as u8;
        let mut file = 0;

        for c in rank_str.chars() {
            if let Some(empties) = c.to_digit(10) {
                file += empties as u8;
                if empties == 0 || file > 8 {
                    return Err(FenError::RankWidth { rank: rank + 1 });
                }
                continue;
            }

            let kind = PieceKind::from_char(c).ok_or(FenError::Piece(c))?;
            if file >= 8 {
                return Err(FenError::RankWidth { rank: rank + 1 });
            }

            let cell = if c.is_ascii_uppercase() {
                Cell::Ours(kind)
            } else {
                Cell::Theirs(kind)
            };
            pos.place(Square::new(file, rank), cell);
            file += 1;
        }

        if file != 8 {
            return Err(FenError::RankWidth { rank: rank + 1 });
        }
    }

    for (cell, color) in [
        (Cell::Ours(PieceKind::King), "White"),
        (Cell::Theirs(PieceKind::King), "Black"),
    ] {
        let count = pos.board().iter().filter(|&&c| c == cell).count();
        if count != 1 {
            return Err(FenError::KingCount { color, count });
        }
    }

    Ok(())
}

/// Castling flags are only accepted when the king and the rook are still on their home squares.
fn parse_castling(pos: &Position, field: &str) -> Result<Castling, FenError> {
    let mut castling = Castling::default();
    if field == "-" {
        return Ok(castling);
    }

    let home = |square: &str, cell: Cell| {
        Square::from_uci(square).is_ok_and(|square| pos.cell(square) == cell)
    };
    let white_king = home("e1", Cell::Ours(PieceKind::King));
    let black_king = home("e8", Cell::Theirs(PieceKind::King));

    for c in field.chars() {
        let (rights, east, rook, king): (&mut CastlingRights, _, _, _) = match c {
            'K' => (&mut castling.ours, true, "h1", white_king),
            'Q' => (&mut castling.ours, false, "a1", white_king),
            'k' => (&mut castling.theirs, false, "h8", black_king),
            'q' => (&mut castling.theirs, true, "a8", black_king),
            _ => return Err(FenError::Castling(field.to_string())),
        };

        let rook_cell = if c.is_ascii_uppercase() {
            Cell::Ours(PieceKind::Rook)
        } else {
            Cell::Theirs(PieceKind::Rook)
        };
        if !king || !home(rook, rook_cell) {
            return Err(FenError::Castling(field.to_string()));
        }

        // Black's rights are stored in Black's own frame, where h8 is on the west
        if east {
            rights.east = true;
        } else {
            rights.west = true;
        }
    }

    Ok(castling)
}

fn parse_ep_square(pos: &Position, side: Color, field: &str) -> Result<Option<Square>, FenError> {
    if field == "-" {
        return Ok(None);
    }

    let err = || FenError::EnPassant(field.to_string());
    let square = Square::from_uci(field).map_err(|_| err())?;

    // The skipped square sits behind a pawn that was just pushed by the side *not* to move
    let (rank, pawn) = match side {
        Color::White => (5, square.offset(super::SOUTH)),
        Color::Black => (2, square.offset(super::NORTH)),
    };
    let pushed = match side {
        Color::White => Cell::Theirs(PieceKind::Pawn),
        Color::Black => Cell::Ours(PieceKind::Pawn),
    };

    if square.rank() != rank || pos.cell(square) != Cell::Empty || pos.cell(pawn) != pushed {
        return Err(err());
    }

    Ok(Some(square))
}

impl FromStr for Position {
    type Err = FenError;
    #[inline(always)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.white_view();

        for rank in (0..8).rev() {
            let mut empties = 0;
            for file in 0..8 {
                let cell = view.cell(Square::new(file, rank));
                if cell.is_occupied() {
                    if empties > 0 {
                        write!(f, "{empties}")?;
                        empties = 0;
                    }
                    write!(f, "{cell}")?;
                } else {
                    empties += 1;
                }
            }
            if empties > 0 {
                write!(f, "{empties}")?;
            }
            if rank > 0 {
                write!(f, "/")?;
            }
        }

        write!(f, " {} ", self.side_to_move())?;

        let rights = view.castling_rights();
        let mut castling = String::with_capacity(4);
        for (allowed, c) in [
            (rights.ours.east, 'K'),
            (rights.ours.west, 'Q'),
            (rights.theirs.west, 'k'),
            (rights.theirs.east, 'q'),
        ] {
            if allowed {
                castling.push(c);
            }
        }
        if castling.is_empty() {
            castling.push('-');
        }
        write!(f, "{castling} ")?;

        match view.ep_square() {
            Some(square) => write!(f, "{square} ")?,
            None => write!(f, "- ")?,
        }

        write!(f, "{} {}", self.halfmove(), self.fullmove())
    }
}
