/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::{Cell, PieceKind, Position, Score, Square};

/// Value of a king. Larger than all other material either side could ever have,
/// so losing the king outweighs anything else on the board.
pub const KING_VALUE: i32 = 1_000;

/// Encapsulates the logic of scoring a chess position.
///
/// Positions are always evaluated from the side-to-move's perspective, so a "good" position for whoever
/// is about to move is a positive number. Negating between plies gives the negamax framing.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    /// The position to evaluate.
    position: &'a Position,
}

impl<'a> Evaluator<'a> {
    /// Construct a new [`Evaluator`] for `position`.
    #[inline(always)]
    pub fn new(position: &'a Position) -> Self {
        Self { position }
    }

    /// Evaluate this position from the side-to-move's perspective.
    ///
    /// This is a pure material count: our pieces add their value, the opponent's subtract it.
    ///
    /// # Example
    /// ```
    /// # use rotor::*;
    /// assert_eq!(Evaluator::new(&Position::startpos()).eval(), Score::DRAW);
    ///
    /// let pos: Position = "4k3/8/8/8/8/8/8/3QK3 b - - 0 1".parse().unwrap();
    /// assert_eq!(Evaluator::new(&pos).eval(), Score(-9));
    /// ```
    #[inline(always)]
    pub fn eval(&self) -> Score {
        self.position
            .board()
            .iter()
            .fold(Score::DRAW, |score, cell| match cell {
                Cell::Ours(kind) => score + value_of(*kind),
                Cell::Theirs(kind) => score - value_of(*kind),
                _ => score,
            })
    }

    /// Fetches the signed value of the piece on `square`, as seen by the side to move.
    ///
    /// Only used when printing the evaluator
    #[inline(always)]
    fn value_at(&self, square: Square) -> Option<Score> {
        match self.position.cell(square) {
            Cell::Ours(kind) => Some(Score(value_of(kind))),
            Cell::Theirs(kind) => Some(-Score(value_of(kind))),
            _ => None,
        }
    }
}

impl fmt::Display for Evaluator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let color = self.position.side_to_move();
        // Printed from White's side, with White's material positive
        let view = self.position.white_view();
        let view = Evaluator::new(&view);

        write!(f, "  +")?;
        for _ in 0..8 {
            write!(f, "-----+")?;
        }
        writeln!(f)?;
        for rank in (0..8).rev() {
            write!(f, "{} |", rank + 1)?;

            for file in 0..8 {
                let cell = view.position.cell(Square::new(file, rank));
                let piece_char = if cell.is_occupied() { cell.char() } else { ' ' };
                write!(f, "  {piece_char}  |")?;
            }
            writeln!(f)?;
            write!(f, "  |")?;

            for file in 0..8 {
                let score = match view.value_at(Square::new(file, rank)) {
                    Some(val) if val > Score::DRAW => format!("{:^5}", format!("+{}", val.0)),
                    Some(val) => format!("{:^5}", val.0),
                    None => String::from("     "),
                };
                write!(f, "{score}|")?;
            }
            writeln!(f)?;

            write!(f, "  +")?;
            for _ in 0..8 {
                write!(f, "-----+")?;
            }
            writeln!(f)?;
        }
        for file in 'a'..='h' {
            write!(f, "     {file}")?;
        }

        let score = self.eval();

        let winning_side = if score > Score::DRAW {
            Some(color)
        } else if score < Score::DRAW {
            Some(color.opponent())
        } else {
            None
        };

        writeln!(f, "\n")?;
        writeln!(
            f,
            "Winning side: {}",
            winning_side.map(|c| c.name()).unwrap_or("N/A")
        )?;
        writeln!(f, "Score: {score}")?;

        Ok(())
    }
}

/// Returns the material value of the provided `PieceKind`, in pawns.
#[inline(always)]
pub const fn value_of(kind: PieceKind) -> i32 {
    match kind {
        PieceKind::Pawn => 1,
        PieceKind::Knight => 3,
        PieceKind::Bishop => 3,
        PieceKind::Rook => 5,
        PieceKind::Queen => 9,
        PieceKind::King => KING_VALUE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(fen: &str) -> Score {
        Evaluator::new(&fen.parse().unwrap()).eval()
    }

    #[test]
    fn test_symmetric_positions_are_equal() {
        assert_eq!(eval(crate::FEN_STARTPOS), Score::DRAW);
        assert_eq!(eval(crate::FEN_KIWIPETE), Score::DRAW);
    }

    #[test]
    fn test_eval_is_relative_to_side_to_move() {
        assert_eq!(eval("4k3/8/8/8/8/8/8/R3K3 w - - 0 1"), Score(5));
        assert_eq!(eval("4k3/8/8/8/8/8/8/R3K3 b - - 0 1"), Score(-5));
    }

    #[test]
    fn test_rotation_negates() {
        let pos: Position = crate::FEN_KIWIPETE.parse().unwrap();
        for (_, child) in pos.legal_moves() {
            let ours = Evaluator::new(&child).eval();
            let theirs = Evaluator::new(&child.rotated()).eval();
            assert_eq!(ours, -theirs);
        }
    }

    #[test]
    fn test_king_outweighs_all_material() {
        let max_material = value_of(PieceKind::Queen) * 9
            + value_of(PieceKind::Rook) * 2
            + value_of(PieceKind::Bishop) * 2
            + value_of(PieceKind::Knight) * 2;
        assert!(KING_VALUE > max_material * 2);
    }

    #[test]
    fn test_display_shows_score() {
        let pos: Position = "4k3/8/8/8/8/8/8/R3K3 b - - 0 1".parse().unwrap();
        let shown = Evaluator::new(&pos).to_string();
        assert!(shown.contains("Winning side: White"));
        assert!(shown.contains("Score: -5"));
    }
}
