/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use super::{Cell, Color, Move, PieceKind, PseudoLegalMoves, Square, NORTH, SOUTH};

/// Castling rights of a single player, relative to that player's own view of the board.
///
/// `west` refers to the rook that player sees on its `a1`, `east` to the one on its `h1`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Debug)]
pub struct CastlingRights {
    pub west: bool,
    pub east: bool,
}

impl CastlingRights {
    /// Both rights granted.
    pub const ALL: Self = Self {
        west: true,
        east: true,
    };

    /// No rights at all.
    pub const NONE: Self = Self {
        west: false,
        east: false,
    };
}

/// Castling rights of both players, from the side-to-move's perspective.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Debug)]
pub struct Castling {
    /// Rights of the side to move.
    pub ours: CastlingRights,

    /// Rights of the opponent, in the opponent's own frame.
    pub theirs: CastlingRights,
}

/// Back rank of the standard starting position, from the a-file to the h-file.
const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// An immutable chess position, always stored from its own side-to-move's point of view.
///
/// The pieces of the side to move are [`Cell::Ours`], and that side's pawns always advance [`NORTH`].
/// Playing a move with [`Position::with_move_made`] returns a new position that has already been
/// rotated for the next player, so no other code ever needs to branch on whose turn it is.
/// Rotating twice is the identity; rotating once anywhere else breaks every subsequent move generation.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// Padded mailbox board. Off-board cells are always [`Cell::Offboard`].
    board: [Cell; Square::COUNT],

    /// The real-world color of the side to move. Only used when talking to the outside world.
    side_to_move: Color,

    /// Castling rights for both players.
    castling: Castling,

    /// Cell skipped by a pawn double push on the previous ply.
    ep_square: Option<Square>,

    /// Cell the king crossed while castling on the previous ply.
    kp_square: Option<Square>,

    /// Number of plies played since this line of play was set up.
    ply: usize,

    /// Kind of piece removed by the move that produced this position.
    captured: Option<PieceKind>,

    /// Plies since the last capture or pawn move, as carried by FEN.
    halfmove: usize,

    /// Number of completed move pairs plus one, as carried by FEN.
    fullmove: usize,
}

impl Position {
    /// Creates a new, empty [`Position`]: no pieces, White to move, no castling rights.
    pub fn new() -> Self {
        let mut board = [Cell::Offboard; Square::COUNT];
        for square in Square::iter() {
            board[square.index()] = Cell::Empty;
        }

        Self {
            board,
            side_to_move: Color::White,
            castling: Castling::default(),
            ep_square: None,
            kp_square: None,
            ply: 0,
            captured: None,
            halfmove: 0,
            fullmove: 1,
        }
    }

    /// Creates the standard starting position.
    ///
    /// # Example
    /// ```
    /// # use rotor::*;
    /// assert_eq!(Position::startpos().to_fen(), FEN_STARTPOS);
    /// ```
    pub fn startpos() -> Self {
        let mut pos = Self::new();
        for (file, kind) in BACK_RANK.into_iter().enumerate() {
            let file = file as u8;
            pos.place(Square::new(file, 0), Cell::Ours(kind));
            pos.place(Square::new(file, 1), Cell::Ours(PieceKind::Pawn));
            pos.place(Square::new(file, 6), Cell::Theirs(PieceKind::Pawn));
            pos.place(Square::new(file, 7), Cell::Theirs(kind));
        }
        pos.castling = Castling {
            ours: CastlingRights::ALL,
            theirs: CastlingRights::ALL,
        };
        pos
    }

    /// Returns the contents of `square`.
    #[inline(always)]
    pub const fn cell(&self, square: Square) -> Cell {
        self.board[square.index()]
    }

    /// Returns the whole padded board.
    #[inline(always)]
    pub const fn board(&self) -> &[Cell; Square::COUNT] {
        &self.board
    }

    /// Returns the real-world color of the side to move.
    #[inline(always)]
    pub const fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// Returns the castling rights of both players.
    #[inline(always)]
    pub const fn castling_rights(&self) -> Castling {
        self.castling
    }

    /// If the previous move was a pawn double push, returns the cell it skipped.
    #[inline(always)]
    pub const fn ep_square(&self) -> Option<Square> {
        self.ep_square
    }

    /// If the previous move was a castle, returns the cell the king crossed.
    #[inline(always)]
    pub const fn kp_square(&self) -> Option<Square> {
        self.kp_square
    }

    /// Number of plies played since this position's line of play began.
    #[inline(always)]
    pub const fn ply(&self) -> usize {
        self.ply
    }

    /// Kind of piece captured by the move that produced this position, if any.
    #[inline(always)]
    pub const fn captured(&self) -> Option<PieceKind> {
        self.captured
    }

    /// Returns the FEN half-move clock.
    #[inline(always)]
    pub const fn halfmove(&self) -> usize {
        self.halfmove
    }

    /// Returns the FEN full-move counter.
    #[inline(always)]
    pub const fn fullmove(&self) -> usize {
        self.fullmove
    }

    /// Returns the square of the side-to-move's king, if it has one.
    pub fn king_square(&self) -> Option<Square> {
        Square::iter().find(|&sq| self.cell(sq) == Cell::Ours(PieceKind::King))
    }

    /// Counts the pieces of both sides.
    pub fn piece_count(&self) -> usize {
        self.board.iter().filter(|cell| cell.is_occupied()).count()
    }

    /// Returns `true` if a pawn may step diagonally onto the empty `square`.
    ///
    /// That is the en passant square, or any cell within one step of the castle-passant square.
    /// The latter lets pawns "capture" a king that castled out of or through their attack.
    #[inline(always)]
    pub fn is_passant_target(&self, square: Square) -> bool {
        self.ep_square == Some(square)
            || self
                .kp_square
                .is_some_and(|kp| kp.index().abs_diff(square.index()) < 2)
    }

    /// Returns a lazy iterator over all pseudo-legal moves of the side to move.
    ///
    /// # Example
    /// ```
    /// # use rotor::*;
    /// assert_eq!(Position::startpos().pseudo_legal_moves().count(), 20);
    /// ```
    #[inline(always)]
    pub fn pseudo_legal_moves(&self) -> PseudoLegalMoves<'_> {
        PseudoLegalMoves::new(self)
    }

    /// Returns every legal move together with the position it produces.
    ///
    /// Moves are yielded in the same order as [`Position::pseudo_legal_moves`].
    pub fn legal_moves(&self) -> impl Iterator<Item = (Move, Position)> + '_ {
        self.pseudo_legal_moves()
            .map(|mv| (mv, self.with_move_made(mv)))
            .filter(|(_, child)| !child.is_king_exposed())
    }

    /// Copies `self` and returns the [`Position`] after `mv`, rotated for the next player.
    ///
    /// `mv` is assumed to be pseudo-legal for this position.
    pub fn with_move_made(&self, mv: Move) -> Self {
        let (from, to) = (mv.from(), mv.to());
        let mut next = *self;

        let Cell::Ours(kind) = self.cell(from) else {
            debug_assert!(false, "no piece of ours on {from:?} to play {mv:?}");
            return self.null_move();
        };

        next.captured = self.cell(to).kind();
        next.ep_square = None;
        next.kp_square = None;
        next.board[to.index()] = Cell::Ours(kind);
        next.board[from.index()] = Cell::Empty;

        // Any move touching a corner retires the rook that started there
        if from == Square::A1 || to == Square::A1 {
            next.castling.ours.west = false;
        }
        if from == Square::H1 || to == Square::H1 {
            next.castling.ours.east = false;
        }
        if from == Square::A8 || to == Square::A8 {
            next.castling.theirs.east = false;
        }
        if from == Square::H8 || to == Square::H8 {
            next.castling.theirs.west = false;
        }

        match kind {
            PieceKind::King => {
                next.castling.ours = CastlingRights::NONE;

                if from.index().abs_diff(to.index()) == 2 {
                    let transit = Square::from_index_unchecked((from.index() + to.index()) / 2);
                    let rook = if to < from { Square::A1 } else { Square::H1 };
                    next.board[rook.index()] = Cell::Empty;
                    next.board[transit.index()] = Cell::Ours(PieceKind::Rook);
                    next.kp_square = Some(transit);
                }
            }

            PieceKind::Pawn => {
                if to.is_on_last_rank() {
                    next.board[to.index()] = Cell::Ours(PieceKind::Queen);
                }

                if to == from.offset(NORTH + NORTH) {
                    next.ep_square = Some(from.offset(NORTH));
                }

                if Some(to) == self.ep_square {
                    next.board[to.offset(SOUTH).index()] = Cell::Empty;
                    next.captured = Some(PieceKind::Pawn);
                }
            }

            _ => {}
        }

        if kind == PieceKind::Pawn || next.captured.is_some() {
            next.halfmove = 0;
        } else {
            next.halfmove += 1;
        }
        if self.side_to_move == Color::Black {
            next.fullmove += 1;
        }
        next.ply += 1;

        next.rotated()
    }

    /// Returns this position as seen by the other player: board mirrored, ownership swapped.
    ///
    /// This does not count as a move; the ply counter is untouched.
    pub fn rotated(&self) -> Self {
        let mut board = self.board;
        board.reverse();
        for cell in board.iter_mut() {
            *cell = cell.swapped();
        }

        Self {
            board,
            side_to_move: self.side_to_move.opponent(),
            castling: Castling {
                ours: self.castling.theirs,
                theirs: self.castling.ours,
            },
            ep_square: self.ep_square.map(Square::flipped),
            kp_square: self.kp_square.map(Square::flipped),
            ..*self
        }
    }

    /// Passes the turn: the opponent moves next, and no passant targets survive.
    pub fn null_move(&self) -> Self {
        let mut next = self.rotated();
        next.ep_square = None;
        next.kp_square = None;
        next.captured = None;
        next.ply += 1;
        next
    }

    /// Returns `true` if the side that just moved has left its king capturable.
    ///
    /// This is the legality test: the side to move tries every pseudo-legal move and looks for one
    /// that lands on the opponent's king. After a castle, landing on the king's starting cell or the
    /// cell it crossed also counts, so castling out of, through, or into check is rejected.
    pub fn is_king_exposed(&self) -> bool {
        let king = Cell::Theirs(PieceKind::King);
        self.pseudo_legal_moves().any(|mv| {
            self.cell(mv.to()) == king
                || self
                    .kp_square
                    .is_some_and(|kp| kp.index().abs_diff(mv.to().index()) < 2)
        })
    }

    /// Returns `true` if the side to move is currently in check.
    ///
    /// # Example
    /// ```
    /// # use rotor::*;
    /// let pos: Position = "4k3/8/8/8/8/8/8/4K2r w - - 0 1".parse().unwrap();
    /// assert!(pos.is_in_check());
    /// assert!(!Position::startpos().is_in_check());
    /// ```
    #[inline(always)]
    pub fn is_in_check(&self) -> bool {
        self.null_move().is_king_exposed()
    }

    /// Places `cell` on `square`. Only used while building positions.
    #[inline(always)]
    pub(crate) fn place(&mut self, square: Square, cell: Cell) {
        debug_assert!(square.is_playable());
        self.board[square.index()] = cell;
    }

    /// Overwrites the non-board state of this position. Only used while decoding.
    pub(crate) fn set_state(
        &mut self,
        castling: Castling,
        ep_square: Option<Square>,
        halfmove: usize,
        fullmove: usize,
    ) {
        self.castling = castling;
        self.ep_square = ep_square;
        self.halfmove = halfmove;
        self.fullmove = fullmove;
    }

    /// Returns the board as White sees it, with White's pieces as [`Cell::Ours`].
    pub(crate) fn white_view(&self) -> Self {
        match self.side_to_move {
            Color::White => *self,
            Color::Black => self.rotated(),
        }
    }
}

impl Default for Position {
    #[inline(always)]
    fn default() -> Self {
        Self::startpos()
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.white_view();

        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8 {
                write!(f, " {}", view.cell(Square::new(file, rank)))?;
            }
            writeln!(f)?;
        }
        writeln!(f, "   a b c d e f g h")?;
        writeln!(f)?;
        writeln!(f, "FEN: {self}")?;
        write!(f, "Side to move: {}", self.side_to_move.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(fen: &str) -> Position {
        fen.parse().unwrap()
    }

    fn play(position: &Position, uci: &str) -> Position {
        let mv = Move::from_uci(position, uci).unwrap();
        position.with_move_made(mv)
    }

    #[test]
    fn test_rotation_is_an_involution() {
        let kiwipete = pos(crate::FEN_KIWIPETE);
        assert_eq!(kiwipete.rotated().rotated(), kiwipete);
        assert_ne!(kiwipete.rotated(), kiwipete);
    }

    #[test]
    fn test_move_returns_next_players_view() {
        let start = Position::startpos();
        let after = play(&start, "e2e4");

        assert_eq!(after.side_to_move(), Color::Black);
        assert_eq!(after.ply(), 1);
        // Black's pawns are now "ours" and sit on the second rank of the rotated board
        assert_eq!(
            after.cell(Square::from_uci("d2").unwrap()),
            Cell::Ours(PieceKind::Pawn)
        );
        // White's e-pawn appears on d5 from Black's side
        assert_eq!(
            after.cell(Square::from_uci("d5").unwrap()),
            Cell::Theirs(PieceKind::Pawn)
        );
        assert_eq!(
            after.to_fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );
    }

    #[test]
    fn test_input_is_not_mutated() {
        let start = Position::startpos();
        let copy = start;
        let _ = play(&start, "g1f3");
        assert_eq!(start, copy);
    }

    #[test]
    fn test_promotion_to_queen() {
        let after = play(&pos("8/4P3/8/8/8/k7/8/K7 w - - 0 1"), "e7e8q");
        assert_eq!(after.to_fen(), "4Q3/8/8/8/8/k7/8/K7 b - - 0 1");
    }

    #[test]
    fn test_en_passant_removes_passed_pawn() {
        let before = pos("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2");
        assert_eq!(before.piece_count(), 4);

        let after = play(&before, "e5d6");
        assert_eq!(after.piece_count(), 3);
        assert_eq!(after.captured(), Some(PieceKind::Pawn));
        assert_eq!(after.to_fen(), "4k3/8/3P4/8/8/8/8/4K3 b - - 0 2");
    }

    #[test]
    fn test_en_passant_only_on_target() {
        let before = pos("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2");
        assert!(Move::from_uci(&before, "e5f6").is_err());

        // Without the target, the same capture is gone
        let stale = pos("4k3/8/8/3pP3/8/8/8/4K3 w - - 0 2");
        assert!(Move::from_uci(&stale, "e5d6").is_err());
    }

    #[test]
    fn test_castling_moves_rook_and_sets_kp() {
        let before = pos("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let after = play(&before, "e1g1");
        assert_eq!(after.to_fen(), "r3k2r/8/8/8/8/8/8/R4RK1 b kq - 1 1");
        // f1 from Black's side of the board
        assert_eq!(after.kp_square(), Some(Square::from_uci("f1").unwrap().flipped()));

        let after = play(&before, "e1c1");
        assert_eq!(after.to_fen(), "r3k2r/8/8/8/8/8/8/2KR3R b kq - 1 1");
    }

    #[test]
    fn test_rook_moves_revoke_rights() {
        let before = pos("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        assert!(play(&before, "a1a2").to_fen().contains(" Kkq "));
        assert!(play(&before, "h1h8").to_fen().contains(" Qq "));
        assert!(play(&before, "e1e2").to_fen().contains(" kq "));
    }

    #[test]
    fn test_castling_through_check_is_illegal() {
        // Black rook on f8 attacks f1, the square the king crosses
        let before = pos("4kr2/8/8/8/8/8/8/4K2R w K - 0 1");
        assert!(Move::from_uci(&before, "e1g1").is_err());

        // Castling out of check
        let before = pos("4kr2/8/8/8/8/8/8/R3K3 w Q - 0 1");
        assert!(Move::from_uci(&before, "e1c1").is_ok());
        let before = pos("4r1k1/8/8/8/8/8/8/R3K3 w Q - 0 1");
        assert!(Move::from_uci(&before, "e1c1").is_err());

        // Into check
        let before = pos("2r1k3/8/8/8/8/8/8/R3K3 w Q - 0 1");
        assert!(Move::from_uci(&before, "e1c1").is_err());

        // A pawn covering the king's starting square
        let before = pos("4k3/8/8/8/8/8/3p4/4K2R w K - 0 1");
        assert!(Move::from_uci(&before, "e1g1").is_err());
    }

    #[test]
    fn test_pinned_piece_cannot_move() {
        let before = pos("4k3/4r3/8/8/8/8/4B3/4K3 w - - 0 1");
        assert!(before
            .legal_moves()
            .all(|(mv, _)| mv.from() != Square::from_uci("e2").unwrap()));
    }

    #[test]
    fn test_every_move_changes_at_most_one_piece() {
        for fen in [crate::FEN_STARTPOS, crate::FEN_KIWIPETE] {
            let before = pos(fen);
            for (mv, after) in before.legal_moves() {
                let diff = before.piece_count() - after.piece_count();
                assert!(diff <= 1, "{mv} changed {diff} pieces in {fen}");
                assert_eq!(diff == 1, after.captured().is_some(), "{mv} in {fen}");
            }
        }
    }

    #[test]
    fn test_move_then_rotate_back_keeps_other_cells() {
        let before = pos(crate::FEN_KIWIPETE);
        for (mv, after) in before.legal_moves() {
            let restored = after.rotated();
            let changed = Square::iter()
                .filter(|&sq| restored.cell(sq) != before.cell(sq))
                .collect::<Vec<_>>();

            if restored.kp_square().is_some() {
                // King and rook both relocate
                assert_eq!(changed.len(), 4, "{mv} changed {changed:?}");
            } else if Some(mv.to()) == before.ep_square() {
                assert_eq!(changed.len(), 3, "{mv} changed {changed:?}");
            } else {
                let mut expected = vec![mv.from(), mv.to()];
                expected.sort();
                assert_eq!(changed, expected, "{mv} changed {changed:?}");
            }
        }
    }

    #[test]
    fn test_in_check_and_null_move() {
        let checked = pos("4k3/8/8/8/8/8/8/4K2r w - - 0 1");
        assert!(checked.is_in_check());
        assert!(!checked.null_move().is_in_check());
        assert_eq!(checked.null_move().ply(), 1);
    }
}
