/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::{MAX_DEPTH, MAX_QUIESCENCE_DEPTH};

/// A numerical representation of the evaluation of a position / move, in units of pawns.
///
/// Always relative to the side to move. This value is internally capped at [`Self::INF`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Score(pub i32);

impl Score {
    /// Largest possible score ever achievable.
    pub const INF: Self = Self(i16::MAX as i32);

    /// Score of mate in the current position.
    pub const MATE: Self = Self(Self::INF.0 - 1);

    /// Score of a draw.
    pub const DRAW: Self = Self(0);

    /// Lowest possible score for mate.
    ///
    /// Mates are scored by ply, and the deepest ply is a full-width search of [`MAX_DEPTH`]
    /// followed by quiescence search of [`MAX_QUIESCENCE_DEPTH`].
    pub const LOWEST_MATE: Self = Self(Self::MATE.0 - (MAX_DEPTH + MAX_QUIESCENCE_DEPTH) as i32);

    /// Returns `true` if the score is a mate score.
    ///
    /// # Example
    /// ```
    /// # use rotor::Score;
    /// assert!((Score::MATE - 3).is_mate());
    /// assert!(!Score(9).is_mate());
    /// ```
    #[inline(always)]
    pub fn is_mate(&self) -> bool {
        self.abs() >= Self::LOWEST_MATE
    }

    /// Returns the number of plies (half moves) this score is from mate.
    #[inline(always)]
    pub const fn plies_to_mate(&self) -> i32 {
        Self::MATE.0 - self.0.abs()
    }

    /// Returns the number of moves (full moves) this score is from mate.
    ///
    /// Negative if the side to move is the one getting mated.
    #[inline(always)]
    pub const fn moves_to_mate(&self) -> i32 {
        let plies = self.plies_to_mate();

        // A winning score still needs our own move to be played before it counts
        let relative_to_side = if self.0 > 0 { plies + 1 } else { -plies };

        relative_to_side / 2
    }

    /// Returns the absolute value of this [`Score`].
    #[inline(always)]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }
}

macro_rules! impl_binary_op {
    ($trait:tt, $fn:ident) => {
        impl std::ops::$trait for Score {
            type Output = Self;

            #[inline(always)]
            fn $fn(self, rhs: Self) -> Self::Output {
                Self(self.0.$fn(rhs.0))
            }
        }

        impl std::ops::$trait<i32> for Score {
            type Output = Self;

            #[inline(always)]
            fn $fn(self, rhs: i32) -> Self::Output {
                Self(self.0.$fn(rhs))
            }
        }
    };
}

impl_binary_op!(Add, add);
impl_binary_op!(Sub, sub);

impl std::ops::Neg for Score {
    type Output = Self;

    #[inline(always)]
    fn neg(self) -> Self::Output {
        Self(self.0.neg())
    }
}

impl fmt::Display for Score {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_mate() {
            write!(f, "mate {}", self.moves_to_mate())
        } else {
            self.0.fmt(f)
        }
    }
}

impl fmt::Debug for Score {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_mate() {
            write!(
                f,
                "{} (mate in {} plies {} moves)",
                self.0,
                self.plies_to_mate(),
                self.moves_to_mate()
            )
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mate_distances() {
        let our_mate = Score::MATE - 1;
        assert_eq!(our_mate.plies_to_mate(), 1);
        assert_eq!(our_mate.moves_to_mate(), 1);

        let their_mate = -Score::MATE + 2;
        assert_eq!(their_mate.plies_to_mate(), 2);
        assert_eq!(their_mate.moves_to_mate(), -1);

        assert_eq!(format!("{our_mate}"), "mate 1");
        assert_eq!(format!("{}", Score(-4)), "-4");
    }

    #[test]
    fn test_mates_found_in_quiescence_are_mates() {
        let deepest = (MAX_DEPTH + MAX_QUIESCENCE_DEPTH) as i32;
        for ply in [1, MAX_DEPTH as i32, MAX_DEPTH as i32 + 1, deepest] {
            let mated = -Score::MATE + ply;
            assert!(mated.is_mate(), "ply {ply}");
            assert!((-mated).is_mate(), "ply {ply}");
            assert!(format!("{}", -mated).starts_with("mate "), "ply {ply}");
        }
    }

    #[test]
    fn test_material_is_never_mate() {
        assert!(!Score(crate::KING_VALUE * 2).is_mate());
        assert!(Score::INF > Score::MATE);
    }
}
