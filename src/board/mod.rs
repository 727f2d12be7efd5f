/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Decoding and encoding positions in Forsyth-Edwards Notation.
mod fen;

/// Moves and the pseudo-legal move generator.
mod moves;

/// Move path enumeration, for validating move generation.
mod perft;

/// Colors, piece kinds, and the contents of board cells.
mod piece;

/// The rotating mailbox position and the move mutator.
mod position;

/// Compile-time pseudo-random number generation.
mod prng;

/// Cells of the padded board and the directions between them.
mod square;

/// Misc constants.
mod utils;

/// Position fingerprints.
mod zobrist;

pub use fen::*;
pub use moves::*;
pub use perft::*;
pub use piece::*;
pub use position::*;
pub use prng::*;
pub use square::*;
pub use utils::*;
pub use zobrist::*;
