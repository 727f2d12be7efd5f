/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::{
    perft, splitperft, Cli, EngineCommand, Evaluator, GameOver, Move, Position, QuiescenceMoves,
    Search, SearchConfig, ZobristTable,
};

/// The engine, holding the position that commands are executed on.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    /// The current state of the chess board, as known to the engine.
    position: Position,
}

impl Engine {
    /// Constructs a new [`Engine`] on the standard starting position.
    pub fn new() -> Self {
        Self::default()
    }

    /// The position commands will run on.
    #[inline(always)]
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Set the position to the supplied FEN string (defaults to the standard startpos if not supplied),
    /// and then apply `moves` one-by-one to the position.
    pub fn set_position<T: AsRef<str>>(
        &mut self,
        fen: Option<T>,
        moves: impl IntoIterator<Item = T>,
    ) -> Result<()> {
        let mut position = match fen {
            Some(fen) => Position::from_fen(fen.as_ref())?,
            None => Position::default(),
        };

        for mv_str in moves {
            let mv_str = mv_str.as_ref();
            let mv = Move::from_uci(&position, mv_str)
                .with_context(|| format!("Failed to apply move {mv_str:?}"))?;
            position = position.with_move_made(mv);
        }

        self.position = position;
        Ok(())
    }

    /// Sets up the position described by `cli` and executes its command.
    pub fn run(cli: Cli) -> Result<()> {
        let mut engine = Self::new();
        engine.set_position(cli.fen.as_deref(), cli.moves.iter().map(String::as_str))?;
        engine.execute(cli.command)
    }

    /// Execute a single [`EngineCommand`], printing its output to stdout.
    pub fn execute(&self, cmd: EngineCommand) -> Result<()> {
        match cmd {
            EngineCommand::Go {
                movetime,
                depth,
                captures_only,
            } => {
                let mut config = SearchConfig::with_budget(Duration::from_millis(movetime));
                if let Some(depth) = depth {
                    config.max_depth = depth;
                }
                if captures_only {
                    config.quiescence = QuiescenceMoves::CapturesOnly;
                }

                println!("{}", self.go(config));
            }

            EngineCommand::Perft { depth, split } => self.perft(depth, split),

            EngineCommand::Eval => println!("{}", Evaluator::new(&self.position)),

            EngineCommand::Display => println!("{:?}", self.position),

            EngineCommand::Moves { sort } => println!("{}", self.moves(sort)),

            EngineCommand::Fen => println!("{}", self.position),
        }

        Ok(())
    }

    /// Searches the current position, returning the `bestmove` line to print.
    pub fn go(&self, config: SearchConfig) -> String {
        let res = Search::new(&self.position, ZobristTable::global(), config).start();

        match res.bestmove {
            Some(mv) => format!("bestmove {}", mv.to_uci(&self.position)),
            None => format!("bestmove (none) [{}]", GameOver::of(&self.position)),
        }
    }

    /// All legal moves of the current position, joined by comma-space, or `(none)`.
    pub fn moves(&self, sort: bool) -> String {
        let mut moves = self
            .position
            .legal_moves()
            .map(|(mv, _)| mv.to_uci(&self.position))
            .collect::<Vec<_>>();

        if moves.is_empty() {
            return String::from("(none)");
        }

        if sort {
            moves.sort();
        }
        moves.join(", ")
    }

    /// Executes the `perft` command, printing the node count and speed.
    fn perft(&self, depth: usize, split: bool) {
        let now = Instant::now();
        let nodes = if split {
            splitperft(&self.position, depth)
        } else {
            perft(&self.position, depth)
        };
        let elapsed = now.elapsed();

        let nps = (nodes as f32 / elapsed.as_secs_f32()) as u64;
        if split {
            println!();
        }
        println!("{nodes} nodes in {elapsed:?} ({nps} nps)");
    }
}
