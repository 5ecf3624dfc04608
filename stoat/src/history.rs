/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::{Move, Square};

/// Stores bonuses for quiet moves that caused beta cutoffs during search.
///
/// Indexed by the (from, to) squares of a move; each cutoff at depth `d`
/// bumps the counter by `d * d`, so cutoffs near the root weigh far more
/// than cutoffs at the leaves. Counters persist across iterative-deepening
/// depths within one search and are reset between games.
#[derive(Debug)]
pub struct HistoryTable(Box<[[i32; Square::COUNT]; Square::COUNT]>);

impl HistoryTable {
    /// Clear the history table, removing all scores.
    #[inline(always)]
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Fetch the history counter for `mv`.
    #[inline(always)]
    pub fn get(&self, mv: Move) -> i32 {
        self.0[mv.from().index()][mv.to().index()]
    }

    /// Rewards `mv` for causing a beta cutoff at `depth` remaining plies.
    #[inline(always)]
    pub fn update(&mut self, mv: Move, depth: u8) {
        let bonus = depth as i32 * depth as i32;
        let counter = &mut self.0[mv.from().index()][mv.to().index()];
        *counter = counter.saturating_add(bonus);
    }
}

impl Default for HistoryTable {
    #[inline(always)]
    fn default() -> Self {
        Self(Box::new([[0; Square::COUNT]; Square::COUNT]))
    }
}

/// Killer moves: quiet moves that caused a beta cutoff at a given ply,
/// remembered so sibling nodes can try them early.
///
/// Two slots per ply; a new killer shifts the previous slot 0 into slot 1
/// unless it already occupies slot 0.
#[derive(Debug)]
pub struct KillerTable([[Option<Move>; 2]; Self::MAX_PLY]);

impl KillerTable {
    /// Deepest ply for which killers are tracked.
    pub const MAX_PLY: usize = 128;

    /// Record a quiet cutoff move at `ply`.
    #[inline(always)]
    pub fn insert(&mut self, ply: i32, mv: Move) {
        let Some(slots) = self.0.get_mut(ply as usize) else {
            return;
        };

        if slots[0] != Some(mv) {
            slots[1] = slots[0];
            slots[0] = Some(mv);
        }
    }

    /// Returns `true` if `mv` occupies either killer slot at `ply`.
    #[inline(always)]
    pub fn contains(&self, ply: i32, mv: Move) -> bool {
        self.0
            .get(ply as usize)
            .is_some_and(|slots| slots[0] == Some(mv) || slots[1] == Some(mv))
    }

    /// Clear all killer slots.
    #[inline(always)]
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl Default for KillerTable {
    #[inline(always)]
    fn default() -> Self {
        Self([[None; 2]; Self::MAX_PLY])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MoveKind;

    #[test]
    fn test_history_grows_quadratically() {
        let mut history = HistoryTable::default();
        let mv = Move::new(Square::E2, Square::E4, MoveKind::Quiet);

        history.update(mv, 3);
        assert_eq!(history.get(mv), 9);

        history.update(mv, 5);
        assert_eq!(history.get(mv), 34);

        history.clear();
        assert_eq!(history.get(mv), 0);
    }

    #[test]
    fn test_killer_slots_shift() {
        let mut killers = KillerTable::default();
        let first = Move::new(Square::E2, Square::E4, MoveKind::Quiet);
        let second = Move::new(Square::G1, Square::F3, MoveKind::Quiet);

        killers.insert(4, first);
        assert!(killers.contains(4, first));
        assert!(!killers.contains(3, first));

        killers.insert(4, second);
        assert!(killers.contains(4, first));
        assert!(killers.contains(4, second));

        // Re-inserting the newest killer must not evict the older one
        killers.insert(4, second);
        assert!(killers.contains(4, first));
    }
}
