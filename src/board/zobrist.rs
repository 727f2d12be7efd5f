/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use super::{Cell, Position, Square, XoShiRo, DEFAULT_SEEDS};

/// Process-wide Zobrist keys.
///
/// Computed at compile time from [`DEFAULT_SEEDS`], so they never change between runs and need no locking.
pub static ZOBRIST_TABLE: ZobristTable = ZobristTable::new();

/// Represents a key generated from a Zobrist Hash
#[derive(Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy)]
pub struct ZobristKey(u64);

impl ZobristKey {
    /// Generates a new [`ZobristKey`] for `position` from the process-wide [`ZOBRIST_TABLE`].
    ///
    /// # Example
    /// ```
    /// # use rotor::*;
    /// let pos = Position::default();
    /// let key = ZobristKey::new(&pos);
    /// assert_ne!(key.inner(), 0);
    /// ```
    #[inline(always)]
    pub fn new(position: &Position) -> Self {
        ZOBRIST_TABLE.hash(position)
    }

    /// Return the inner `u64` of this key.
    #[inline(always)]
    pub const fn inner(&self) -> u64 {
        self.0
    }

    /// Adds/removes `hash_key` to this [`ZobristKey`].
    ///
    /// This is done internally with the XOR operator, so hashing the same value twice is a no-op.
    ///
    /// # Example
    /// ```
    /// # use rotor::*;
    /// let mut zero = ZobristKey::default();
    /// zero.hash(42);
    /// assert_ne!(zero.inner(), 0);
    ///
    /// // Calling again un-hashes it
    /// zero.hash(42);
    /// assert_eq!(zero.inner(), 0);
    /// ```
    #[inline(always)]
    pub fn hash(&mut self, hash_key: u64) {
        self.0 ^= hash_key;
    }

    /// Adds/removes the hash for `cell` sitting on `square`, using the keys in `table`.
    #[inline(always)]
    pub fn hash_piece(&mut self, table: &ZobristTable, square: Square, cell: Cell) {
        self.hash(table.piece_key(square, cell));
    }
}

impl fmt::Display for ZobristKey {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// One pseudo-random key for every occupied cell value on every playable square.
///
/// Pieces are keyed by ownership relative to the side to move, exactly as they are stored in a [`Position`].
#[derive(PartialEq, Eq, Hash, Debug, Clone)]
pub struct ZobristTable {
    piece_keys: [[u64; Cell::PIECES]; Square::PLAYABLE],
}

impl ZobristTable {
    /// Builds the table from [`DEFAULT_SEEDS`].
    #[inline(always)]
    pub const fn new() -> Self {
        Self::from_seeds(DEFAULT_SEEDS)
    }

    /// Builds a table from explicit seeds. Identical seeds always give identical tables.
    ///
    /// # Example
    /// ```
    /// # use rotor::*;
    /// let table = ZobristTable::from_seeds([1, 2, 3, 4]);
    /// let pos = Position::startpos();
    /// assert_eq!(table.hash(&pos), ZobristTable::from_seeds([1, 2, 3, 4]).hash(&pos));
    /// assert_ne!(table.hash(&pos), ZobristTable::new().hash(&pos));
    /// ```
    pub const fn from_seeds(seeds: [u64; 4]) -> Self {
        let mut piece_keys = [[0; Cell::PIECES]; Square::PLAYABLE];
        let mut prng = XoShiRo::from_seeds(seeds);

        let mut i = 0;
        while i < Square::PLAYABLE {
            let mut j = 0;
            while j < Cell::PIECES {
                let key;
                (key, prng) = prng.get_next_const();
                piece_keys[i][j] = key;
                j += 1;
            }
            i += 1;
        }

        Self { piece_keys }
    }

    /// Returns the process-wide table.
    #[inline(always)]
    pub fn global() -> &'static Self {
        &ZOBRIST_TABLE
    }

    /// The key for `cell` on `square`. Empty and off-board cells hash to `0`.
    #[inline(always)]
    pub fn piece_key(&self, square: Square, cell: Cell) -> u64 {
        cell.piece_index()
            .map_or(0, |piece| self.piece_keys[square.playable_index()][piece])
    }

    /// XORs together the keys of every occupied cell of `position`.
    pub fn hash(&self, position: &Position) -> ZobristKey {
        let mut key = ZobristKey::default();
        for square in Square::iter() {
            key.hash_piece(self, square, position.cell(square));
        }
        key
    }
}

impl Default for ZobristTable {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}
