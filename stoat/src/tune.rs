/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Minimum depth at which null move pruning can be applied.
macro_rules! min_nmp_depth {
    () => {
        3
    };
}
pub(crate) use min_nmp_depth;

/// Value to subtract from `depth` (beyond the usual 1) when searching a null move.
macro_rules! nmp_reduction {
    () => {
        2
    };
}
pub(crate) use nmp_reduction;

/// Minimum non-pawn, non-king material (in centipawns) the side to move must
/// have before a null move is tried. One minor piece; below that, zugzwang
/// positions make passing look deceptively safe.
macro_rules! nmp_material_threshold {
    () => {
        320
    };
}
pub(crate) use nmp_material_threshold;

/// Ordering bonus for the transposition table's best move.
macro_rules! hash_move_bonus {
    () => {
        1_000_000
    };
}
pub(crate) use hash_move_bonus;

/// Ordering bonus, at the root only, for the first move of the previous
/// iteration's principal variation.
macro_rules! root_pv_bonus {
    () => {
        900_000
    };
}
pub(crate) use root_pv_bonus;

/// Base ordering bonus for captures, on top of MVV-LVA.
macro_rules! capture_bonus {
    () => {
        600_000
    };
}
pub(crate) use capture_bonus;

/// Ordering penalty for captures that lose material per static exchange
/// evaluation, demoting them below quiet moves with good history.
macro_rules! losing_capture_penalty {
    () => {
        400_000
    };
}
pub(crate) use losing_capture_penalty;

/// Ordering bonus for promotions.
macro_rules! promotion_bonus {
    () => {
        300_000
    };
}
pub(crate) use promotion_bonus;

/// Ordering bonus for a killer-move match at the current ply.
macro_rules! killer_bonus {
    () => {
        200_000
    };
}
pub(crate) use killer_bonus;

/// Cap on the history contribution to a move's ordering score, keeping even
/// heavily rewarded quiets below the killer tier.
macro_rules! max_history_bonus {
    () => {
        100_000
    };
}
pub(crate) use max_history_bonus;
