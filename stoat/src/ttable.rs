/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::{Move, Score, SearchBounds, ZobristKey};

/// Number of bytes in a megabyte
const BYTES_IN_MB: usize = 1024 * 1024;

/// Result of probing the [`TTable`].
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum ProbeResult<'a> {
    /// An entry was found and can be used to perform a cutoff.
    Cutoff(Score),

    /// An entry was found, but it could not be used to perform a cutoff.
    Hit(&'a TTableEntry),

    /// No entry was found for the provided key.
    Miss,
}

/// Type of node encountered during search.
///
/// See [CPW](https://www.chessprogramming.org/Node_Types) for more.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub enum NodeType {
    /// The score is exact.
    Pv,

    /// The score is an upper bound (it was at most alpha).
    All,

    /// The score is a lower bound (it was at least beta).
    Cut,
}

impl NodeType {
    /// Creates a new [`NodeType`] based on the parameters as follows:
    ///
    /// ```text
    /// if score <= alpha:
    ///     UPPERBOUND
    /// else if score >= beta:
    ///     LOWERBOUND
    /// else:
    ///     EXACT
    /// ```
    #[inline(always)]
    pub fn new(score: Score, bounds: SearchBounds) -> Self {
        if score <= bounds.alpha {
            Self::All
        } else if score >= bounds.beta {
            Self::Cut
        } else {
            Self::Pv
        }
    }
}

/// An entry in the transposition table.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct TTableEntry {
    /// Key of the node this entry represents.
    pub key: ZobristKey,

    /// Depth at which the data for this entry was found.
    pub depth: u8,

    /// Best move found for this position, used to seed move ordering.
    pub bestmove: Option<Move>,

    /// Best score found for this position. Mate scores are stored
    /// root-independent (adjusted by the ply at which they were found).
    pub score: Score,

    /// Node type of this entry.
    pub node_type: NodeType,

    /// Search age at which this entry was stored.
    pub age: u8,
}

impl TTableEntry {
    /// Creates a new [`TTableEntry`] from the provided parameters.
    ///
    /// This will generate a node type through [`NodeType::new`] and will
    /// adjust `score` by `ply` if it was a mate score.
    #[inline(always)]
    pub fn new(
        key: ZobristKey,
        bestmove: Option<Move>,
        score: Score,
        bounds: SearchBounds,
        depth: u8,
        ply: i32,
        age: u8,
    ) -> Self {
        // Determine what kind of node this is first, *before* score adjustment
        let node_type = NodeType::new(score, bounds);

        Self {
            key,
            depth,
            bestmove,
            // Make the score independent of the ply it was found at
            score: score.absolute(ply),
            node_type,
            age,
        }
    }

    /// Returns this entry's score adjusted to `ply`, if it permits a cutoff
    /// within `bounds`:
    ///
    /// 1. The entry is exact, or
    /// 2. The entry is an upper bound and its score is `<= alpha`, or
    /// 3. The entry is a lower bound and its score is `>= beta`.
    #[inline(always)]
    pub fn try_score(&self, bounds: SearchBounds, ply: i32) -> Option<Score> {
        // Mate scores must become relative to the probing node
        let score = self.score.relative(ply);

        let can_cutoff = match self.node_type {
            NodeType::Pv => true,
            NodeType::All => score <= bounds.alpha,
            NodeType::Cut => score >= bounds.beta,
        };

        can_cutoff.then_some(score)
    }
}

/// Transposition Table.
///
/// A power-of-two array of slots, indexed by `key & (capacity - 1)`, with a
/// single entry per slot. Used during a search to memoize results and to
/// seed move ordering with previously found best moves.
#[derive(Debug)]
pub struct TTable {
    /// Internal cache of the TTable.
    cache: Vec<Option<TTableEntry>>,

    /// Age stamp of the current search.
    age: u8,
}

impl TTable {
    /// Default size of the Transposition Table, in megabytes.
    pub const DEFAULT_SIZE: usize = 16;

    /// Create a new [`TTable`] that is at most `size` megabytes.
    #[inline(always)]
    pub fn new(size: usize) -> Self {
        Self::from_capacity((size * BYTES_IN_MB) / size_of::<Option<TTableEntry>>())
    }

    /// Create a new [`TTable`] that can hold `capacity` entries, rounded
    /// down to a power of two so that indexing is a single mask.
    #[inline(always)]
    pub fn from_capacity(capacity: usize) -> Self {
        let capacity = if capacity.is_power_of_two() {
            capacity
        } else {
            (capacity / 2 + 1).next_power_of_two()
        };

        Self {
            cache: vec![None; capacity.max(1)],
            age: 0,
        }
    }

    /// Clears the entries of this [`TTable`] and resets its age.
    #[inline(always)]
    pub fn clear(&mut self) {
        self.cache.iter_mut().for_each(|entry| *entry = None);
        self.age = 0;
    }

    /// Stamp the start of a new search.
    ///
    /// Ages are one byte; when the age wraps around, stale entries become
    /// indistinguishable from fresh ones, so the table is cleared.
    #[inline(always)]
    pub fn new_search(&mut self) {
        self.age = self.age.wrapping_add(1);
        if self.age == 0 {
            self.clear();
        }
    }

    /// The age stamp of the current search.
    #[inline(always)]
    pub const fn age(&self) -> u8 {
        self.age
    }

    /// Returns the number of entries that can fit within this [`TTable`].
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.cache.len()
    }

    /// Returns the number of occupied entries in this [`TTable`].
    #[inline(always)]
    pub fn num_entries(&self) -> usize {
        self.cache.iter().filter(|entry| entry.is_some()).count()
    }

    /// Map `key` to an index into this [`TTable`].
    #[inline(always)]
    fn index(&self, key: &ZobristKey) -> usize {
        key.inner() as usize & (self.capacity() - 1)
    }

    /// Get the entry if and only if it matches the provided key.
    #[inline(always)]
    pub fn get(&self, key: &ZobristKey) -> Option<&TTableEntry> {
        self.cache[self.index(key)]
            .as_ref()
            .filter(|entry| &entry.key == key)
    }

    /// Store `entry` in the table at `entry.key`.
    ///
    /// The slot is replaced if it is empty, holds the same position, or
    /// holds an entry from a shallower search than the incoming one.
    #[inline(always)]
    pub fn store(&mut self, entry: TTableEntry) {
        let index = self.index(&entry.key);

        let replace = match &self.cache[index] {
            None => true,
            Some(existing) => existing.key == entry.key || entry.depth >= existing.depth,
        };

        if replace {
            self.cache[index] = Some(entry);
        }
    }

    /// Probes the [`TTable`] for an entry at the provided `key`.
    ///
    /// If an entry from a depth at least `depth` exists and its bound
    /// permits (see [`TTableEntry::try_score`]), yields a cutoff score.
    /// Otherwise yields the entry itself as an ordering hint, or a miss.
    #[inline(always)]
    pub fn probe(&self, key: ZobristKey, depth: u8, ply: i32, bounds: SearchBounds) -> ProbeResult {
        if let Some(entry) = self.get(&key) {
            // Can only cut off if the existing entry came from a greater depth.
            if entry.depth >= depth {
                if let Some(score) = entry.try_score(bounds, ply) {
                    return ProbeResult::Cutoff(score);
                }
            }

            // No cutoff was possible, but there was still an entry found.
            return ProbeResult::Hit(entry);
        }

        ProbeResult::Miss
    }
}

impl Default for TTable {
    #[inline(always)]
    fn default() -> Self {
        Self::new(Self::DEFAULT_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MoveKind, Square};

    fn entry_with(key: u64, depth: u8, score: Score) -> TTableEntry {
        let mut zkey = ZobristKey::default();
        zkey.hash(key);
        TTableEntry {
            key: zkey,
            depth,
            bestmove: Some(crate::Move::new(Square::E2, Square::E4, MoveKind::Quiet)),
            score,
            node_type: NodeType::Pv,
            age: 0,
        }
    }

    #[test]
    fn test_capacity_is_power_of_two() {
        for requested in [1, 2, 3, 100, 1000, 4096] {
            let tt = TTable::from_capacity(requested);
            assert!(tt.capacity().is_power_of_two());
            assert!(tt.capacity() <= requested.next_power_of_two());
        }
    }

    #[test]
    fn test_store_and_get_by_key() {
        let mut tt = TTable::from_capacity(16);
        let entry = entry_with(42, 5, Score::new(17));

        tt.store(entry);
        assert_eq!(tt.get(&entry.key), Some(&entry));
        assert_eq!(tt.num_entries(), 1);

        // A different key mapping to a different slot misses
        let other = entry_with(43, 1, Score::new(0));
        assert!(tt.get(&other.key).is_none());
    }

    #[test]
    fn test_depth_preferred_replacement() {
        // Capacity 1 forces every key into the same slot
        let mut tt = TTable::from_capacity(1);

        let deep = entry_with(1, 8, Score::new(50));
        let shallow = entry_with(2, 3, Score::new(-10));

        tt.store(deep);
        // A shallower entry for a different position must not evict
        tt.store(shallow);
        assert_eq!(tt.get(&deep.key), Some(&deep));
        assert!(tt.get(&shallow.key).is_none());

        // But an equal-or-deeper one does
        let deeper = entry_with(2, 9, Score::new(99));
        tt.store(deeper);
        assert_eq!(tt.get(&deeper.key), Some(&deeper));
        assert!(tt.get(&deep.key).is_none());

        // And the same position always refreshes its own slot
        let refreshed = entry_with(2, 1, Score::new(1));
        tt.store(refreshed);
        assert_eq!(tt.get(&refreshed.key), Some(&refreshed));
    }

    #[test]
    fn test_age_wrap_clears() {
        let mut tt = TTable::from_capacity(4);
        tt.store(entry_with(7, 2, Score::new(0)));
        assert_eq!(tt.num_entries(), 1);

        // Wrap the age all the way around
        for _ in 0..256 {
            tt.new_search();
        }

        assert_eq!(tt.num_entries(), 0, "wrapping the age must clear the table");
    }

    #[test]
    fn test_probe_bounds() {
        let mut tt = TTable::from_capacity(16);
        let key = {
            let mut k = ZobristKey::default();
            k.hash(99);
            k
        };

        // A Cut (lower bound) entry at depth 6 with score 100
        let entry = TTableEntry {
            key,
            depth: 6,
            bestmove: None,
            score: Score::new(100),
            node_type: NodeType::Cut,
            age: 0,
        };
        tt.store(entry);

        // Probing from a shallower requirement with beta below the bound cuts off
        let bounds = SearchBounds::new(Score::new(-50), Score::new(50));
        assert_eq!(
            tt.probe(key, 4, 0, bounds),
            ProbeResult::Cutoff(Score::new(100))
        );

        // With beta above the bound, the entry is only a hint
        let bounds = SearchBounds::new(Score::new(-50), Score::new(500));
        assert!(matches!(tt.probe(key, 4, 0, bounds), ProbeResult::Hit(_)));

        // A deeper requirement than the entry's depth cannot cut off
        let bounds = SearchBounds::new(Score::new(-50), Score::new(50));
        assert!(matches!(tt.probe(key, 8, 0, bounds), ProbeResult::Hit(_)));

        assert_eq!(
            tt.probe(ZobristKey::default(), 1, 0, bounds),
            ProbeResult::Miss
        );
    }
}
