/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::Position;

/// Perform a perft at the specified depth, collecting only data about the
/// number of possible positions (nodes).
///
/// This performs bulk counting, meaning that, at depth 1, it returns the
/// number of available moves, rather than making them, recursing again, and
/// returning 1 for each terminal case. If you do *not* want to use bulk
/// counting, use [`perft_generic`].
#[inline(always)]
pub fn perft(position: &mut Position, depth: usize) -> u64 {
    perft_generic::<true, false>(position, depth)
}

/// Perform a splitperft at the specified depth, printing the number of nodes
/// reachable after each move available at the root.
#[inline(always)]
pub fn splitperft(position: &mut Position, depth: usize) -> u64 {
    perft_generic::<true, true>(position, depth)
}

/// Generic version of `perft` that allows you to specify whether to perform
/// bulk counting and/or a splitperft.
///
/// Enumerates by make/unmake; the position is unchanged on return.
pub fn perft_generic<const BULK: bool, const SPLIT: bool>(
    position: &mut Position,
    depth: usize,
) -> u64 {
    // Bulk counting; no need to recurse just to apply one move and return 1.
    if BULK && !SPLIT && depth == 1 {
        return position.get_legal_moves().len() as u64;
    }
    // Recursion limit; return 1, since we're fathoming this node.
    else if depth == 0 {
        return 1;
    }

    let mut nodes = 0;
    for mv in position.get_legal_moves() {
        let undo = position.make_move(mv);
        let new_nodes = perft_generic::<BULK, false>(position, depth - 1);
        position.unmake_move(mv, &undo);

        if SPLIT {
            println!("{mv}\t{new_nodes}");
        }

        nodes += new_nodes;
    }

    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FEN_KIWIPETE, FEN_STARTPOS};

    #[test]
    fn test_startpos_shallow() {
        let mut position = Position::default();
        assert_eq!(perft(&mut position, 1), 20);
        assert_eq!(perft(&mut position, 2), 400);
        assert_eq!(perft(&mut position, 3), 8_902);
        assert_eq!(perft(&mut position, 4), 197_281);

        // The position must be untouched afterwards
        assert_eq!(position.to_fen(), FEN_STARTPOS);
    }

    #[test]
    fn test_bulk_matches_full_enumeration() {
        let mut position = Position::from_fen(FEN_KIWIPETE).unwrap();
        let bulk = perft_generic::<true, false>(&mut position, 3);
        let full = perft_generic::<false, false>(&mut position, 3);
        assert_eq!(bulk, full);
        assert_eq!(bulk, 97_862);
    }
}
