/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Board representation, move generation, and position notation.
mod board;

/// Command-line interface.
mod cli;

/// Code related to the engine's functionality, such as executing user commands.
mod engine;

/// Evaluation of chess positions.
mod eval;

/// Move ordering data gathered during search.
mod history;

/// Numeric evaluation scores.
mod score;

/// Main engine logic; all search related code.
mod search;

pub use board::*;
pub use cli::*;
pub use engine::*;
pub use eval::*;
pub use history::*;
pub use score::*;
pub use search::*;
