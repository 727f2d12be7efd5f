/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::collections::HashMap;

use crate::ZobristKey;

/// Remembers which boards caused beta cutoffs during quiescence search.
///
/// Entries are grouped under the hash of the root position they were found from, and each one stores
/// `depth²` of its most recent cutoff. Lower values are explored first: a child position that gave the
/// opponent a cutoff is usually a bad one for us.
///
/// This only biases move ordering. Stale or colliding keys can never change which moves are legal.
#[derive(Debug, Default, Clone)]
pub struct HistoryTable(HashMap<ZobristKey, HashMap<ZobristKey, i32>>);

impl HistoryTable {
    /// Records a cutoff on `board`, found `depth` plies below `root`.
    ///
    /// # Example
    /// ```
    /// # use rotor::*;
    /// let root = ZobristKey::new(&Position::startpos());
    /// let board = ZobristKey::new(&Position::startpos().rotated());
    ///
    /// let mut history = HistoryTable::default();
    /// history.record(root, board, 3);
    /// assert_eq!(history.get(root, board), 9);
    /// ```
    #[inline(always)]
    pub fn record(&mut self, root: ZobristKey, board: ZobristKey, depth: i32) {
        self.0.entry(root).or_default().insert(board, depth * depth);
    }

    /// Returns the ordering value of `board` below `root`, or `0` if it never caused a cutoff.
    #[inline(always)]
    pub fn get(&self, root: ZobristKey, board: ZobristKey) -> i32 {
        self.0
            .get(&root)
            .and_then(|boards| boards.get(&board))
            .copied()
            .unwrap_or_default()
    }

    /// Number of boards recorded below `root`.
    #[inline(always)]
    pub fn len(&self, root: ZobristKey) -> usize {
        self.0.get(&root).map_or(0, HashMap::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Position, FEN_KIWIPETE};

    #[test]
    fn test_entries_are_scoped_to_root() {
        let root = ZobristKey::new(&Position::startpos());
        let other_root = ZobristKey::new(&FEN_KIWIPETE.parse().unwrap());
        let board = ZobristKey::new(&Position::startpos().rotated());

        let mut history = HistoryTable::default();
        assert_eq!(history.len(root), 0);

        history.record(root, board, 2);
        assert_eq!(history.get(root, board), 4);
        assert_eq!(history.get(other_root, board), 0);
        assert_eq!(history.len(root), 1);

        // Later cutoffs overwrite earlier ones
        history.record(root, board, 1);
        assert_eq!(history.get(root, board), 1);
        assert_eq!(history.len(root), 1);
    }
}
