/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use thiserror::Error;
use tracing::{debug, info, trace};

use crate::{Evaluator, HistoryTable, Move, Position, Score, ZobristKey, ZobristTable};

/// Maximum depth that can be searched
pub const MAX_DEPTH: usize = 64;

/// Maximum number of plies quiescence search may add past [`MAX_DEPTH`].
pub const MAX_QUIESCENCE_DEPTH: usize = 64;

/// Returned instead of a move when the side to move has no legal moves at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum GameOver {
    #[error("no legal moves: checkmate")]
    Checkmate,

    #[error("no legal moves: stalemate")]
    Stalemate,
}

impl GameOver {
    /// Classifies a position without legal moves by whether its side to move is in check.
    #[inline(always)]
    pub fn of(position: &Position) -> Self {
        if position.is_in_check() {
            Self::Checkmate
        } else {
            Self::Stalemate
        }
    }
}

/// Which moves quiescence search is allowed to follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QuiescenceMoves {
    /// Every legal move, captures or not.
    #[default]
    All,

    /// Only moves that remove an enemy piece.
    CapturesOnly,
}

/// The result of a search, containing the best move found, score, and total nodes searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchResult {
    /// Number of nodes searched.
    pub nodes: u64,

    /// Best move found during the search.
    pub bestmove: Option<Move>,

    /// Evaluation of the position after `bestmove` is made.
    pub score: Score,

    /// Deepest iteration that was fully completed.
    pub depth: Option<usize>,
}

impl Default for SearchResult {
    /// A default search result should initialize to a *very bad* value,
    /// since there isn't a move to play.
    #[inline(always)]
    fn default() -> Self {
        Self {
            nodes: 0,
            bestmove: None,
            score: -Score::INF,
            depth: None,
        }
    }
}

/// Configuration variables for executing a [`Search`].
#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    /// Maximum depth of iterative deepening.
    ///
    /// Depth `0` tries every root move followed by quiescence search; each extra level adds a full-width ply.
    pub max_depth: usize,

    /// How many plies quiescence search may extend past the full-width search.
    ///
    /// Capped at [`MAX_QUIESCENCE_DEPTH`].
    pub max_quiescence_depth: usize,

    /// Which moves quiescence search follows.
    pub quiescence: QuiescenceMoves,

    /// Start time of the search.
    pub starttime: Instant,

    /// Hard limit on search time.
    ///
    /// Checked before every node; once exceeded, the search unwinds and keeps the last completed iteration.
    pub hard_timeout: Duration,
}

impl SearchConfig {
    /// A default configuration that must finish within `budget` of now.
    ///
    /// # Example
    /// ```
    /// # use rotor::*;
    /// # use std::time::Duration;
    /// let config = SearchConfig::with_budget(Duration::from_millis(100));
    /// assert_eq!(config.max_depth, 4);
    /// assert_eq!(config.hard_timeout, Duration::from_millis(100));
    /// ```
    #[inline(always)]
    pub fn with_budget(budget: Duration) -> Self {
        Self {
            starttime: Instant::now(),
            hard_timeout: budget,
            ..Default::default()
        }
    }
}

impl Default for SearchConfig {
    /// Searches to depth 4 with no time limit.
    #[inline(always)]
    fn default() -> Self {
        Self {
            max_depth: 4,
            max_quiescence_depth: 4,
            quiescence: QuiescenceMoves::default(),
            starttime: Instant::now(),
            hard_timeout: Duration::MAX,
        }
    }
}

/// Executes a search on the provided position.
///
/// One instance owns its [`HistoryTable`] and is consumed by [`Search::start`], so ordering data never
/// leaks between searches.
pub struct Search<'a> {
    /// The position to search on. Children are produced by copy-make.
    position: &'a Position,

    /// Keys used to fingerprint boards for move ordering.
    zobrist: &'a ZobristTable,

    /// Fingerprint of `position`, the outer key of every history entry.
    root: ZobristKey,

    /// Cutoffs found by quiescence search, used to order later iterations.
    history: HistoryTable,

    /// The result of the search, updated as-needed during search.
    result: SearchResult,

    /// Configuration variables for this instance of the search.
    config: SearchConfig,
}

impl<'a> Search<'a> {
    /// Construct a new [`Search`] instance to execute on the provided [`Position`].
    #[inline(always)]
    pub fn new(position: &'a Position, zobrist: &'a ZobristTable, config: SearchConfig) -> Self {
        let result = SearchResult {
            // Initialize `bestmove` to the first move available
            bestmove: position.legal_moves().next().map(|(mv, _)| mv),
            ..Default::default()
        };

        Self {
            position,
            zobrist,
            root: zobrist.hash(position),
            history: HistoryTable::default(),
            result,
            config,
        }
    }

    /// Start the search, returning its results.
    ///
    /// `bestmove` is only `None` if the root has no legal moves, in which case the score is
    /// `-MATE` for checkmate or `DRAW` for stalemate.
    pub fn start(mut self) -> SearchResult {
        if self.result.bestmove.is_none() {
            self.result.score = match GameOver::of(self.position) {
                GameOver::Checkmate => -Score::MATE,
                GameOver::Stalemate => Score::DRAW,
            };
            return self.result;
        }

        info!("Starting search on {:?}", self.position.to_fen());

        self.iterative_deepening()
    }

    /// Performs [iterative deepening](https://www.chessprogramming.org/Iterative_Deepening) (ID) on the Search's position.
    ///
    /// Each completed iteration replaces the result; an iteration cut short by the deadline is discarded,
    /// except when no iteration has completed yet and it already fully scored at least one root move.
    fn iterative_deepening(&mut self) -> SearchResult {
        // Holds the result of the last completed iteration; starts with the first legal move as a fallback
        let mut res = self.result;

        for depth in 0..=self.config.max_depth.min(MAX_DEPTH) {
            // Reset after each search, as scores from different depths are not comparable.
            self.result.score = -Score::INF;
            self.result.bestmove = None;

            if let Err(e) = self.search_root(depth) {
                debug!(
                    "Search cancelled during depth {depth} while evaluating {} with score {}: {e}",
                    self.uci(self.result.bestmove),
                    self.result.score
                );

                if res.depth.is_none() && self.result.bestmove.is_some() {
                    res.bestmove = self.result.bestmove;
                    res.score = self.result.score;
                }

                debug!(
                    "Falling back to result from depth {:?}: {} with score {}",
                    res.depth,
                    self.uci(res.bestmove),
                    res.score,
                );

                break;
            }

            // If the search at this depth succeeded, update the result.
            res = SearchResult {
                depth: Some(depth),
                ..self.result
            };

            let elapsed = self.config.starttime.elapsed();
            info!(
                "depth {depth} nodes {} score {} bestmove {} time {}ms",
                self.result.nodes,
                res.score,
                self.uci(res.bestmove),
                elapsed.as_millis(),
            );

            // No point searching deeper once a forced mate has been found
            if res.score.is_mate() {
                break;
            }
        }

        res.nodes = self.result.nodes;
        res
    }

    /// Tries every legal root move, keeping the one with the best score.
    fn search_root(&mut self, depth: usize) -> Result<()> {
        let mut moves = self.position.legal_moves().collect::<Vec<_>>();
        moves.sort_by_cached_key(|(_, child)| self.order_of(child));

        let beta = Score::INF;
        let mut alpha = -Score::INF;

        for (mv, child) in moves {
            self.check_deadline()?;

            let score = -self.negamax(&child, depth, 1, -beta, -alpha)?;
            trace!("depth {depth} {} scored {score}", mv.to_uci(self.position));

            if score > alpha {
                alpha = score;
                self.result.bestmove = Some(mv);
                self.result.score = score;
            }
        }

        Ok(())
    }

    /// Full-width [negamax](https://www.chessprogramming.org/Negamax) with fail-hard alpha-beta bounds.
    ///
    /// Children are visited in ascending history order. Leaves hand over to [`Self::quiescence`].
    fn negamax(
        &mut self,
        position: &Position,
        depth: usize,
        ply: i32,
        mut alpha: Score,
        beta: Score,
    ) -> Result<Score> {
        if depth == 0 {
            return self.quiescence(position, ply, 0, alpha, beta);
        }

        self.check_deadline()?;
        self.result.nodes += 1;

        let mut children = position
            .legal_moves()
            .map(|(_, child)| child)
            .collect::<Vec<_>>();

        // If there are no legal moves, it's either mate or a draw.
        if children.is_empty() {
            return Ok(terminal_score(position, ply));
        }

        children.sort_by_cached_key(|child| self.order_of(child));

        for child in children {
            let score = -self.negamax(&child, depth - 1, ply + 1, -beta, -alpha)?;

            if score >= beta {
                return Ok(beta);
            }
            alpha = alpha.max(score);
        }

        Ok(alpha)
    }

    /// [Quiescence search](https://www.chessprogramming.org/Quiescence_Search) with a stand-pat bound.
    ///
    /// Recursion stops after `max_quiescence_depth` plies regardless of the deadline.
    fn quiescence(
        &mut self,
        position: &Position,
        ply: i32,
        qdepth: usize,
        mut alpha: Score,
        beta: Score,
    ) -> Result<Score> {
        self.check_deadline()?;
        self.result.nodes += 1;

        let stand_pat = Evaluator::new(position).eval();
        if stand_pat >= beta {
            self.record_cutoff(position, ply);
            return Ok(beta);
        }
        alpha = alpha.max(stand_pat);

        if qdepth >= self.config.max_quiescence_depth.min(MAX_QUIESCENCE_DEPTH) {
            return Ok(alpha);
        }

        let captures_only = self.config.quiescence == QuiescenceMoves::CapturesOnly;
        let mut has_moves = false;

        for (_, child) in position.legal_moves() {
            has_moves = true;
            if captures_only && child.captured().is_none() {
                continue;
            }

            let score = -self.quiescence(&child, ply + 1, qdepth + 1, -beta, -alpha)?;

            if score >= beta {
                self.record_cutoff(position, ply);
                return Ok(beta);
            }
            alpha = alpha.max(score);
        }

        if !has_moves {
            return Ok(terminal_score(position, ply));
        }

        Ok(alpha)
    }

    #[inline(always)]
    fn record_cutoff(&mut self, position: &Position, ply: i32) {
        let board = self.zobrist.hash(position);
        self.history.record(self.root, board, ply);
    }

    /// Sort key for a child position: lower values are searched first.
    #[inline(always)]
    fn order_of(&self, child: &Position) -> i32 {
        self.history.get(self.root, self.zobrist.hash(child))
    }

    #[inline(always)]
    fn check_deadline(&self) -> Result<()> {
        if self.config.starttime.elapsed() >= self.config.hard_timeout {
            let ms = self.config.hard_timeout.as_millis();
            bail!("exceeded hard timeout of {ms}ms");
        }
        Ok(())
    }

    fn uci(&self, mv: Option<Move>) -> String {
        mv.map_or_else(|| String::from("(none)"), |mv| mv.to_uci(self.position))
    }
}

/// Score of a position with no legal moves: mated (preferring later mates) or stalemated.
#[inline(always)]
fn terminal_score(position: &Position, ply: i32) -> Score {
    if position.is_in_check() {
        -Score::MATE + ply
    } else {
        Score::DRAW
    }
}

/// Chooses a move for the side to move of `position`, searching for at most roughly `budget`.
///
/// Always returns a legal move when one exists, even with a zero budget. If there is none, the game is over
/// and the reason is returned instead.
///
/// # Example
/// ```
/// # use rotor::*;
/// # use std::time::Duration;
/// let mv = choose_move(&Position::startpos(), Duration::ZERO).unwrap();
/// assert!(Position::startpos().legal_moves().any(|(legal, _)| legal == mv));
///
/// let mated: Position = "R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1".parse().unwrap();
/// assert_eq!(choose_move(&mated, Duration::ZERO), Err(GameOver::Checkmate));
/// ```
pub fn choose_move(position: &Position, budget: Duration) -> Result<Move, GameOver> {
    let config = SearchConfig::with_budget(budget);
    let res = Search::new(position, ZobristTable::global(), config).start();
    res.bestmove.ok_or_else(|| GameOver::of(position))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search(fen: &str, config: SearchConfig) -> SearchResult {
        let position: Position = fen.parse().unwrap();
        let table = ZobristTable::from_seeds([1, 2, 3, 4]);
        Search::new(&position, &table, config).start()
    }

    fn ensure_is_mate_in(fen: &str, config: SearchConfig, moves: i32) {
        let res = search(fen, config);
        assert!(
            res.score.is_mate(),
            "Search on {fen:?} with config {config:#?} produced result that is not mate.\nResult: {res:#?}"
        );
        assert_eq!(
            res.score.moves_to_mate(),
            moves,
            "Search on {fen:?} with config {config:#?} produced result not mate in {moves}.\nResult: {res:#?}"
        );
    }

    #[test]
    fn test_white_mate_in_1() {
        let fen = "k7/8/KQ6/8/8/8/8/8 w - - 0 1";
        let config = SearchConfig {
            max_depth: 1,
            quiescence: QuiescenceMoves::CapturesOnly,
            ..Default::default()
        };

        ensure_is_mate_in(fen, config, 1);
    }

    #[test]
    fn test_stalemate() {
        let res = search("k7/8/KQ6/8/8/8/8/8 b - - 0 1", SearchConfig::default());
        assert!(res.bestmove.is_none());
        assert_eq!(res.score, Score::DRAW);
        assert_eq!(res.depth, None);
    }

    #[test]
    fn test_checkmated_root() {
        let res = search("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1", SearchConfig::default());
        assert!(res.bestmove.is_none());
        assert_eq!(res.score, -Score::MATE);
    }

    #[test]
    fn test_quick_search_finds_move() {
        let config = SearchConfig {
            hard_timeout: Duration::ZERO,
            ..Default::default()
        };
        let res = search(crate::FEN_STARTPOS, config);
        assert!(res.bestmove.is_some());
        assert_eq!(res.depth, None);
    }

    #[test]
    fn test_takes_free_queen() {
        let config = SearchConfig {
            max_depth: 0,
            max_quiescence_depth: 2,
            ..Default::default()
        };
        let res = search("4k3/8/8/8/3q4/8/8/3RK3 w - - 0 1", config);
        assert_eq!(res.bestmove.map(|mv| mv.to().to_string()), Some(String::from("d4")));
        assert_eq!(res.depth, Some(0));
    }

    #[test]
    fn test_cutoffs_are_recorded() {
        let position: Position = crate::FEN_KIWIPETE.parse().unwrap();
        let table = ZobristTable::global();
        let config = SearchConfig {
            max_depth: 0,
            max_quiescence_depth: 1,
            ..Default::default()
        };

        let mut search = Search::new(&position, table, config);
        search.iterative_deepening();
        assert!(search.history.len(search.root) > 0);
    }

    #[test]
    fn test_game_over_classification() {
        let mated: Position = "R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1".parse().unwrap();
        assert_eq!(GameOver::of(&mated), GameOver::Checkmate);

        let stalemated: Position = "k7/8/KQ6/8/8/8/8/8 b - - 0 1".parse().unwrap();
        assert_eq!(GameOver::of(&stalemated), GameOver::Stalemate);
        assert_eq!(
            choose_move(&stalemated, Duration::from_millis(10)),
            Err(GameOver::Stalemate)
        );
    }
}
