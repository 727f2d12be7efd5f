/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use clap::{Parser, Subcommand};

/// A small chess engine that picks a move within a time budget.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Position to start from, in FEN. Defaults to the standard starting position.
    #[arg(long, global = true)]
    pub fen: Option<String>,

    /// Moves to play from the starting position before running the command, in UCI notation.
    ///
    /// May be repeated, or given as a single space-separated list.
    #[arg(long, global = true, value_delimiter = ' ')]
    pub moves: Vec<String>,

    #[command(subcommand)]
    pub command: EngineCommand,
}

/// A command to be executed by the engine.
#[derive(Debug, Clone, Subcommand)]
#[command(rename_all = "lower")]
pub enum EngineCommand {
    /// Search the position and print the chosen move.
    Go {
        /// Time budget for the search, in milliseconds.
        #[arg(short, long, default_value = "1000")]
        movetime: u64,

        /// Override the maximum iterative deepening depth.
        #[arg(short, long)]
        depth: Option<usize>,

        /// If set, quiescence search only follows captures.
        #[arg(short, long, default_value = "false")]
        captures_only: bool,
    },

    /// Performs a perft on the current position at the supplied depth, printing total node count.
    Perft {
        depth: usize,

        /// If set, the node count below every root move is printed as well.
        #[arg(short, long, default_value = "false")]
        split: bool,
    },

    /// Print an evaluation of the current position.
    Eval,

    /// Print a visual representation of the current board state.
    #[command(alias = "d")]
    Display,

    /// Shows all legal moves in the current position.
    Moves {
        /// If set, moves will be sorted in alphabetical order.
        ///
        /// By default, moves are printed in generation order.
        #[arg(short, long, default_value = "false")]
        sort: bool,
    },

    /// Generate and print a FEN string for the current position.
    Fen,
}
