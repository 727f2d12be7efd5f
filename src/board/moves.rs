/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use anyhow::{bail, Result};

use super::{Cell, Color, PieceKind, Position, Square, EAST, NORTH, WEST};

/// Represents a move as a pair of cells, seen from the side-to-move's point of view.
///
/// Promotion is implied: a pawn reaching the last rank always becomes a queen.
/// Castling is encoded as the king moving two cells.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Move {
    from: Square,
    to: Square,
}

impl Move {
    /// Creates a new [`Move`] from `from` to `to`.
    #[inline(always)]
    pub const fn new(from: Square, to: Square) -> Self {
        Self { from, to }
    }

    /// The cell the moving piece starts on.
    #[inline(always)]
    pub const fn from(&self) -> Square {
        self.from
    }

    /// The cell the moving piece ends on.
    #[inline(always)]
    pub const fn to(&self) -> Square {
        self.to
    }

    /// Returns this move as seen by the opponent, after a board rotation.
    #[inline(always)]
    pub const fn flipped(self) -> Self {
        Self::new(self.from.flipped(), self.to.flipped())
    }

    /// Converts this move into standard UCI notation (e.g. `e7e8q`).
    ///
    /// `position` must be the position this move is played from;
    /// it supplies the real side to move and whether the move promotes.
    ///
    /// # Example
    /// ```
    /// # use rotor::*;
    /// // After 1. e4, Black's board has been rotated; e7e5 still reads as e7e5.
    /// let pos: Position = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1".parse().unwrap();
    /// let mv = Move::from_uci(&pos, "e7e5").unwrap();
    /// assert_eq!(mv.to_uci(&pos), "e7e5");
    /// ```
    pub fn to_uci(&self, position: &Position) -> String {
        let promotes = position.cell(self.from) == Cell::Ours(PieceKind::Pawn)
            && self.to.is_on_last_rank();

        let absolute = match position.side_to_move() {
            Color::White => *self,
            Color::Black => self.flipped(),
        };

        if promotes {
            format!("{absolute}q")
        } else {
            format!("{absolute}")
        }
    }

    /// Parses a move in UCI notation, played from `position`.
    ///
    /// Returns an error if the text is malformed, asks for an underpromotion,
    /// or does not name a legal move.
    pub fn from_uci(position: &Position, uci: &str) -> Result<Self> {
        let (Some(from), Some(to)) = (uci.get(0..2), uci.get(2..4)) else {
            bail!("Move must be at least four characters. Got {uci:?}");
        };

        match uci.get(4..) {
            None | Some("") | Some("q") => {}
            Some(promotion) => {
                bail!("Only promotion to a queen is supported. Got {promotion:?} in {uci:?}")
            }
        }

        let mv = Self::new(from.parse()?, to.parse()?);
        let mv = match position.side_to_move() {
            Color::White => mv,
            Color::Black => mv.flipped(),
        };

        if !position.legal_moves().any(|(legal, _)| legal == mv) {
            bail!("{uci:?} is not a legal move in {position}");
        }

        Ok(mv)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self} ({} -> {})", self.from.index(), self.to.index())
    }
}

/// A lazy iterator over every pseudo-legal move of the side to move.
///
/// Moves are produced in board-scan order. The iterator is cheap to [`Clone`],
/// and a fresh one can always be obtained from [`Position::pseudo_legal_moves`].
#[derive(Clone, Debug)]
pub struct PseudoLegalMoves<'a> {
    position: &'a Position,

    /// Cell currently being expanded.
    from: Square,

    /// Index into the piece's direction list.
    direction: usize,

    /// Last cell reached along the current direction.
    cursor: Square,

    /// A castling move discovered while walking a rook, yielded next.
    castle: Option<Move>,
}

impl<'a> PseudoLegalMoves<'a> {
    /// Starts generating moves for `position`.
    #[inline(always)]
    pub fn new(position: &'a Position) -> Self {
        Self {
            position,
            from: Square(0),
            direction: 0,
            cursor: Square(0),
            castle: None,
        }
    }

    #[inline(always)]
    fn next_direction(&mut self) {
        self.direction += 1;
        self.cursor = self.from;
    }

    #[inline(always)]
    fn next_square(&mut self) {
        self.from = Square(self.from.0 + 1);
        self.direction = 0;
        self.cursor = self.from;
    }

    /// Checks the pawn-specific rules for stepping by `delta` onto `target`.
    #[inline(always)]
    fn pawn_step_allowed(&self, delta: isize, to: Square, target: Cell) -> bool {
        if delta == NORTH {
            target == Cell::Empty
        } else if delta == NORTH + NORTH {
            target == Cell::Empty
                && self.from.is_on_second_rank()
                && self.position.cell(self.from.offset(NORTH)) == Cell::Empty
        } else {
            // Diagonals must capture, unless they land on a passant target
            target != Cell::Empty || self.position.is_passant_target(to)
        }
    }

    /// If a rook from one of our corners has just landed beside our king, the king may castle towards it.
    #[inline(always)]
    fn castle_beside(&self, to: Square) -> Option<Move> {
        let rights = self.position.castling_rights().ours;
        let king = Cell::Ours(PieceKind::King);

        if self.from == Square::A1 && rights.west && self.position.cell(to.offset(EAST)) == king {
            Some(Move::new(to.offset(EAST), to.offset(WEST)))
        } else if self.from == Square::H1
            && rights.east
            && self.position.cell(to.offset(WEST)) == king
        {
            Some(Move::new(to.offset(WEST), to.offset(EAST)))
        } else {
            None
        }
    }
}

impl Iterator for PseudoLegalMoves<'_> {
    type Item = Move;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(castle) = self.castle.take() {
                return Some(castle);
            }

            if self.from.index() >= Square::COUNT {
                return None;
            }

            let Cell::Ours(kind) = self.position.cell(self.from) else {
                self.next_square();
                continue;
            };

            let Some(&delta) = kind.directions().get(self.direction) else {
                self.next_square();
                continue;
            };

            let to = self.cursor.offset(delta);
            let target = self.position.cell(to);

            // Blocked by the edge of the board or by one of our own pieces
            if matches!(target, Cell::Offboard | Cell::Ours(_)) {
                self.next_direction();
                continue;
            }

            if kind == PieceKind::Pawn && !self.pawn_step_allowed(delta, to, target) {
                self.next_direction();
                continue;
            }

            // Sliders keep walking over empty cells; everything else gets a single step
            if kind.is_slider() && target == Cell::Empty {
                self.cursor = to;
            } else {
                self.next_direction();
            }

            // A rook that captured has stopped short of the king, so the path is not clear
            if kind == PieceKind::Rook && target == Cell::Empty {
                self.castle = self.castle_beside(to);
            }

            return Some(Move::new(self.from, to));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FEN_STARTPOS;

    fn moves_of(fen: &str) -> Vec<String> {
        let pos: Position = fen.parse().unwrap();
        let mut moves = pos
            .pseudo_legal_moves()
            .map(|mv| mv.to_uci(&pos))
            .collect::<Vec<_>>();
        moves.sort();
        moves
    }

    #[test]
    fn test_startpos_has_twenty_moves() {
        assert_eq!(moves_of(FEN_STARTPOS).len(), 20);
    }

    #[test]
    fn test_generator_is_restartable() {
        let pos = Position::default();
        let first = pos.pseudo_legal_moves().collect::<Vec<_>>();
        let mut gen = pos.pseudo_legal_moves();
        gen.next();
        let resumed = gen.clone().count();
        assert_eq!(resumed, first.len() - 1);
        assert_eq!(pos.pseudo_legal_moves().collect::<Vec<_>>(), first);
    }

    #[test]
    fn test_slider_stops_on_capture() {
        let moves = moves_of("4k3/8/8/8/3p4/8/8/3RK3 w - - 0 1");
        assert!(moves.contains(&String::from("d1d4")));
        assert!(!moves.contains(&String::from("d1d5")));
    }

    #[test]
    fn test_pawn_blocked() {
        let moves = moves_of("4k3/8/8/8/8/4p3/4P3/4K3 w - - 0 1");
        assert!(!moves.iter().any(|m| m.starts_with("e2")));

        let moves = moves_of("4k3/8/8/8/4p3/8/4P3/4K3 w - - 0 1");
        assert!(moves.contains(&String::from("e2e3")));
        assert!(!moves.contains(&String::from("e2e4")));
    }

    #[test]
    fn test_pawn_diagonals_need_targets() {
        let moves = moves_of("4k3/8/8/8/8/3p4/4P3/4K3 w - - 0 1");
        assert!(moves.contains(&String::from("e2d3")));
        assert!(!moves.contains(&String::from("e2f3")));
    }

    #[test]
    fn test_castling_generated_from_rook_walk() {
        let moves = moves_of("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        assert!(moves.contains(&String::from("e1g1")));
        assert!(moves.contains(&String::from("e1c1")));

        // No rights, no castling
        let moves = moves_of("r3k2r/8/8/8/8/8/8/R3K2R w - - 0 1");
        assert!(!moves.contains(&String::from("e1g1")));
        assert!(!moves.contains(&String::from("e1c1")));

        // Blocked path
        let moves = moves_of("r3k2r/8/8/8/8/8/8/RN2K1NR w KQkq - 0 1");
        assert!(!moves.contains(&String::from("e1g1")));
        assert!(!moves.contains(&String::from("e1c1")));
    }

    #[test]
    fn test_enemy_piece_on_path_prevents_castling() {
        let cases = [
            ("4k3/8/8/8/8/8/8/R2nK3 w Q - 0 1", "e1c1"),
            ("4k3/8/8/8/8/8/8/R2bK3 w Q - 0 1", "e1c1"),
            ("4k3/8/8/8/8/8/8/Rn2K3 w Q - 0 1", "e1c1"),
            ("4k3/8/8/8/8/8/8/4Kn1R w K - 0 1", "e1g1"),
            ("4k3/8/8/8/8/8/8/4Kb1R w K - 0 1", "e1g1"),
            ("r2Nk3/8/8/8/8/8/8/4K3 b q - 0 1", "e8c8"),
        ];

        for (fen, castle) in cases {
            let moves = moves_of(fen);
            assert!(!moves.contains(&String::from(castle)), "{castle} generated in {fen}");

            let pos: Position = fen.parse().unwrap();
            assert!(Move::from_uci(&pos, castle).is_err(), "{castle} accepted in {fen}");
        }
    }

    #[test]
    fn test_castling_never_removes_pieces() {
        let pos: Position = "r3k2r/8/8/8/8/8/8/R2nK1bR w KQkq - 0 1".parse().unwrap();
        let before = Square::iter().filter(|&sq| pos.cell(sq).is_occupied()).count();

        for (mv, child) in pos.legal_moves() {
            let after = Square::iter().filter(|&sq| child.cell(sq).is_occupied()).count();
            let expected = before - usize::from(pos.cell(mv.to()).is_occupied());
            assert_eq!(after, expected, "{}", mv.to_uci(&pos));
        }
    }

    #[test]
    fn test_black_castling_reads_correctly() {
        let moves = moves_of("r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1");
        assert!(moves.contains(&String::from("e8g8")));
        assert!(moves.contains(&String::from("e8c8")));
    }
}
