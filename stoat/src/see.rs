/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use arrayvec::ArrayVec;

use crate::{
    king_attacks, knight_attacks, pawn_attack_deltas, Bitboard, Color, Move, Piece, PieceKind,
    Position, Square, BISHOP_DELTAS, QUEEN_DELTAS, ROOK_DELTAS,
};

/// Upper bound on the length of a capture sequence on one square.
///
/// Both sides can bring at most 16 pieces to bear, and in practice far fewer.
const MAX_EXCHANGE_LEN: usize = 32;

/// [Static exchange evaluation](https://www.chessprogramming.org/Static_Exchange_Evaluation):
/// the net material outcome of capturing with `mv`, assuming both sides then
/// recapture with their least valuable attacker for as long as they profit.
///
/// Attackers are enumerated from the live board under a shrinking occupancy
/// overlay, so sliders revealed by earlier removals ("x-rays") join the
/// exchange. A move onto an empty square evaluates to 0.
///
/// The result is from the perspective of the side playing `mv`: positive for
/// a winning capture, negative for a losing one.
pub fn see(position: &Position, mv: Move) -> i32 {
    let target = mv.to();
    let mut side = position.side_to_move();

    // Value of the piece initially captured. An en passant victim is a pawn
    // that is not on the target square.
    let first_victim = if mv.is_en_passant() {
        PieceKind::Pawn.exchange_value()
    } else {
        match position.piece_at(target) {
            Some(victim) => victim.kind().exchange_value(),
            None => return 0,
        }
    };

    let mut occupancy = position.occupied();
    occupancy.clear(mv.from());
    if mv.is_en_passant() {
        if let Some(victim_square) = target.backward(side) {
            occupancy.clear(victim_square);
        }
    }

    // The value of the piece standing on the target square as the exchange
    // progresses; the initial attacker swaps onto it first.
    let mut on_target = match position.piece_at(mv.from()) {
        Some(piece) => piece.kind().exchange_value(),
        None => return 0,
    };

    let mut gains: ArrayVec<i32, MAX_EXCHANGE_LEN> = ArrayVec::new();
    gains.push(first_victim);

    side = side.opponent();

    // Alternate captures with each side's least valuable attacker until one
    // side runs out of attackers.
    while let Some((square, kind)) = least_valuable_attacker(position, target, side, occupancy) {
        if gains.is_full() {
            break;
        }
        gains.push(on_target);

        on_target = kind.exchange_value();
        occupancy.clear(square);
        side = side.opponent();
    }

    // Fold the gain list from the tail. Each reply capture is optional, so
    // its side never accepts a negative continuation; the initiating capture
    // already happened and keeps its sign.
    let mut score = 0;
    for i in (1..gains.len()).rev() {
        score = (gains[i] - score).max(0);
    }

    gains[0] - score
}

/// Find `side`'s least valuable piece attacking `target` under `occupancy`.
///
/// Pieces whose squares have been cleared from `occupancy` are transparent:
/// they neither attack nor block. Enumeration order is pawn, knight, bishop,
/// rook, queen, king, which is exactly the least-valuable-first order.
fn least_valuable_attacker(
    position: &Position,
    target: Square,
    side: Color,
    occupancy: Bitboard,
) -> Option<(Square, PieceKind)> {
    let holds = |square: Square, kind: PieceKind| -> bool {
        occupancy.contains(square) && position.piece_at(square) == Some(Piece::new(side, kind))
    };

    // Pawns attack the target from one pawn-attack delta behind it
    for delta in pawn_attack_deltas(side) {
        if let Some(from) = target.offset(-delta) {
            if holds(from, PieceKind::Pawn) {
                return Some((from, PieceKind::Pawn));
            }
        }
    }

    // Knight (and king, below) attacks are symmetric, so the attackers of
    // the target square are exactly its own leaper moves
    for from in knight_attacks(target).iter() {
        if holds(from, PieceKind::Knight) {
            return Some((from, PieceKind::Knight));
        }
    }

    // Sliders: walk each ray to its first piece still present in the
    // occupancy overlay.
    for (deltas, kind) in [
        (&BISHOP_DELTAS[..], PieceKind::Bishop),
        (&ROOK_DELTAS[..], PieceKind::Rook),
        (&QUEEN_DELTAS[..], PieceKind::Queen),
    ] {
        for &delta in deltas {
            let mut current = target;
            while let Some(from) = current.offset(delta) {
                if occupancy.contains(from) {
                    if holds(from, kind) {
                        return Some((from, kind));
                    }
                    break;
                }
                current = from;
            }
        }
    }

    for from in king_attacks(target).iter() {
        if holds(from, PieceKind::King) {
            return Some((from, PieceKind::King));
        }
    }

    None
}
