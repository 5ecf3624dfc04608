/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::{
    bishop_attacks, direction_between, king_attacks, knight_attacks, pawn_attack_deltas,
    queen_attacks, rook_attacks, File, Move, MoveKind, MoveList, Piece, PieceKind, Position, Rank,
    Square, BISHOP_DELTAS, QUEEN_DELTAS, ROOK_DELTAS,
};

/// Movegen metadata computed once per position: the opponent's attack map,
/// pins on the side to move, and the pieces currently giving check.
///
/// All per-square data lives in 128-entry arrays indexed by raw 0x88 square,
/// so lookups share the board's own indexing.
pub struct AttackInfo {
    /// Squares attacked by the opponent. Sliders stop at their first
    /// blocker, but that blocker's square is marked (a defended piece still
    /// denies the square to our King).
    attacked: [bool; Square::EXTENT],

    /// For each pinned friendly piece, the queen-direction delta of its pin
    /// line (pointing from the King outward). 0 when unpinned.
    pin_dir: [i8; Square::EXTENT],

    /// Squares that resolve a lone check: the checker's square, plus the
    /// squares strictly between checker and King for a sliding checker.
    /// Only meaningful when `checkers == 1`.
    block: [bool; Square::EXTENT],

    /// Number of pieces giving check (0, 1, or 2).
    checkers: u8,
}

impl AttackInfo {
    /// Walk the board once and compute the attack map, pins, and checkers
    /// for the side to move of `position`.
    pub fn new(position: &Position) -> Self {
        let us = position.side_to_move();
        let them = us.opponent();
        let king = position.king_square(us);

        let mut info = Self {
            attacked: [false; Square::EXTENT],
            pin_dir: [0; Square::EXTENT],
            block: [false; Square::EXTENT],
            checkers: 0,
        };

        // Phase 1: opponent attack map
        for from in position.occupied_by(them).iter() {
            let Some(piece) = position.piece_at(from) else {
                continue;
            };

            match piece.kind() {
                PieceKind::Pawn => {
                    for delta in pawn_attack_deltas(them) {
                        if let Some(to) = from.offset(delta) {
                            info.attacked[to.inner() as usize] = true;
                        }
                    }
                }

                PieceKind::Knight => {
                    for to in knight_attacks(from).iter() {
                        info.attacked[to.inner() as usize] = true;
                    }
                }

                PieceKind::King => {
                    for to in king_attacks(from).iter() {
                        info.attacked[to.inner() as usize] = true;
                    }
                }

                kind => {
                    let deltas: &[i8] = match kind {
                        PieceKind::Bishop => &BISHOP_DELTAS,
                        PieceKind::Rook => &ROOK_DELTAS,
                        _ => &QUEEN_DELTAS,
                    };

                    for &delta in deltas {
                        let mut current = from;
                        while let Some(to) = current.offset(delta) {
                            info.attacked[to.inner() as usize] = true;
                            // Mark the first blocker, then stop
                            if position.piece_at(to).is_some() {
                                break;
                            }
                            current = to;
                        }
                    }
                }
            }
        }

        // Phase 2: pins and sliding checkers, by scanning outward from our King
        for delta in QUEEN_DELTAS {
            // Which slider kind attacks along this direction
            let slider = if matches!(delta, 0x01 | -0x01 | 0x10 | -0x10) {
                PieceKind::Rook
            } else {
                PieceKind::Bishop
            };

            let mut shield: Option<Square> = None;
            let mut current = king;

            while let Some(next) = current.offset(delta) {
                if let Some(piece) = position.piece_at(next) {
                    if piece.color() == us {
                        if shield.is_some() {
                            // Two friendly pieces on the ray; nothing is pinned
                            break;
                        }
                        shield = Some(next);
                    } else {
                        let matches_ray =
                            piece.kind() == slider || piece.kind() == PieceKind::Queen;
                        if matches_ray {
                            match shield {
                                // A friendly piece stands between: it is pinned
                                Some(pinned) => {
                                    info.pin_dir[pinned.inner() as usize] = delta;
                                }
                                // Nothing between: the slider is a checker
                                None => {
                                    info.checkers += 1;
                                    info.block[next.inner() as usize] = true;
                                    let mut between = king;
                                    while let Some(step) = between.offset(delta) {
                                        if step == next {
                                            break;
                                        }
                                        info.block[step.inner() as usize] = true;
                                        between = step;
                                    }
                                }
                            }
                        }
                        break;
                    }
                }
                current = next;
            }
        }

        // Non-sliding checkers: knights and pawns adjacent to our King.
        // Knight attacks are symmetric, so the attackers of the King's
        // square are exactly its knight moves.
        for from in knight_attacks(king).iter() {
            if position.piece_at(from) == Some(Piece::new(them, PieceKind::Knight)) {
                info.checkers += 1;
                info.block[from.inner() as usize] = true;
            }
        }

        for delta in pawn_attack_deltas(us) {
            if let Some(from) = king.offset(delta) {
                if position.piece_at(from) == Some(Piece::new(them, PieceKind::Pawn)) {
                    info.checkers += 1;
                    info.block[from.inner() as usize] = true;
                }
            }
        }

        info
    }

    /// Returns `true` if a non-King move from `from` to `to` respects both
    /// the pin line through `from` and, when in check, the block set.
    #[inline(always)]
    fn allows(&self, from: Square, to: Square) -> bool {
        let pin = self.pin_dir[from.inner() as usize];
        if pin != 0 {
            match direction_between(from, to) {
                Some(dir) if dir == pin || dir == -pin => {}
                _ => return false,
            }
        }

        self.checkers == 0 || self.block[to.inner() as usize]
    }

    /// Returns `true` if the opponent attacks `square`.
    #[inline(always)]
    pub fn is_attacked(&self, square: Square) -> bool {
        self.attacked[square.inner() as usize]
    }

    /// Number of pieces giving check.
    #[inline(always)]
    pub const fn checkers(&self) -> u8 {
        self.checkers
    }
}

impl Position {
    /// Generate all legal moves for the side to move.
    ///
    /// Takes `&mut self` because en passant and King moves are validated by
    /// making and unmaking them; the position is unchanged on return.
    #[inline(always)]
    pub fn get_legal_moves(&mut self) -> MoveList {
        self.generate_moves::<false>()
    }

    /// Generate only the legal captures and promotions for the side to move.
    ///
    /// This is the surface quiescence search explores.
    #[inline(always)]
    pub fn get_legal_captures(&mut self) -> MoveList {
        self.generate_moves::<true>()
    }

    fn generate_moves<const CAPTURES_ONLY: bool>(&mut self) -> MoveList {
        let info = AttackInfo::new(self);
        let mut moves = MoveList::new();

        // In double check, only the King may move
        if info.checkers < 2 {
            self.generate_pawn_moves::<CAPTURES_ONLY>(&info, &mut moves);
            self.generate_piece_moves::<CAPTURES_ONLY>(&info, &mut moves);

            if !CAPTURES_ONLY && info.checkers == 0 {
                self.generate_castling_moves(&info, &mut moves);
            }
        }

        self.generate_king_moves::<CAPTURES_ONLY>(&info, &mut moves);

        moves
    }

    /// Generates and serializes all legal Pawn moves.
    fn generate_pawn_moves<const CAPTURES_ONLY: bool>(
        &mut self,
        info: &AttackInfo,
        moves: &mut MoveList,
    ) {
        let us = self.side_to_move();

        for from in self.occupied_by(us).iter() {
            if self.piece_at(from) != Some(Piece::new(us, PieceKind::Pawn)) {
                continue;
            }

            let promoting = from.rank() == Rank::seventh(us);

            // Pushes. A promotion push counts as "tactical" for the
            // captures-only surface.
            if let Some(to) = from.forward(us) {
                if self.piece_at(to).is_none() {
                    if (!CAPTURES_ONLY || promoting) && info.allows(from, to) {
                        push_pawn_move(moves, from, to, promoting, false);
                    }

                    // Double push, from the home rank only, through an empty square
                    if !CAPTURES_ONLY && from.rank() == Rank::second(us) {
                        if let Some(double) = to.forward(us) {
                            if self.piece_at(double).is_none() && info.allows(from, double) {
                                moves.push(Move::new(from, double, MoveKind::PawnDoublePush));
                            }
                        }
                    }
                }
            }

            // Diagonal captures, including en passant
            for delta in pawn_attack_deltas(us) {
                let Some(to) = from.offset(delta) else {
                    continue;
                };

                if let Some(victim) = self.piece_at(to) {
                    if victim.color() != us && info.allows(from, to) {
                        push_pawn_move(moves, from, to, promoting, true);
                    }
                } else if Some(to) == self.ep_square() {
                    // En passant removes two pawns from one rank, which can
                    // discover a slider; no static filter is complete, so
                    // verify by make/unmake.
                    let mv = Move::new(from, to, MoveKind::EnPassantCapture);
                    if self.is_legal_by_make(mv) {
                        moves.push(mv);
                    }
                }
            }
        }
    }

    /// Generates and serializes all legal Knight, Bishop, Rook, and Queen moves.
    fn generate_piece_moves<const CAPTURES_ONLY: bool>(
        &self,
        info: &AttackInfo,
        moves: &mut MoveList,
    ) {
        let us = self.side_to_move();
        let occupied = self.occupied();
        let friendly = self.occupied_by(us);

        for from in friendly.iter() {
            let Some(piece) = self.piece_at(from) else {
                continue;
            };

            match piece.kind() {
                PieceKind::Knight => {
                    // A Knight can never stay on its pin line
                    if info.pin_dir[from.inner() as usize] != 0 {
                        continue;
                    }

                    for to in (knight_attacks(from) & !friendly).iter() {
                        self.serialize_normal_move::<CAPTURES_ONLY>(info, from, to, moves);
                    }
                }

                PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen => {
                    let attacks = match piece.kind() {
                        PieceKind::Bishop => bishop_attacks(from, occupied),
                        PieceKind::Rook => rook_attacks(from, occupied),
                        _ => queen_attacks(from, occupied),
                    };

                    for to in (attacks & !friendly).iter() {
                        self.serialize_normal_move::<CAPTURES_ONLY>(info, from, to, moves);
                    }
                }

                _ => {}
            }
        }
    }

    /// Creates and appends a quiet or capture [`Move`], applying the pin and
    /// block filters.
    #[inline(always)]
    fn serialize_normal_move<const CAPTURES_ONLY: bool>(
        &self,
        info: &AttackInfo,
        from: Square,
        to: Square,
        moves: &mut MoveList,
    ) {
        let kind = match self.piece_at(to) {
            Some(victim) => {
                if victim.color() == self.side_to_move() {
                    return;
                }
                MoveKind::Capture
            }
            None => {
                if CAPTURES_ONLY {
                    return;
                }
                MoveKind::Quiet
            }
        };

        if info.allows(from, to) {
            moves.push(Move::new(from, to, kind));
        }
    }

    /// Generates and serializes all legal King moves.
    ///
    /// The attack map rejects most unsafe destinations cheaply, but it was
    /// computed with the King still on its square, so a slider's line
    /// "through" the King is not represented behind him. Every surviving
    /// candidate is therefore verified by make/unmake.
    fn generate_king_moves<const CAPTURES_ONLY: bool>(
        &mut self,
        info: &AttackInfo,
        moves: &mut MoveList,
    ) {
        let us = self.side_to_move();
        let from = self.king_square(us);

        for to in king_attacks(from).iter() {
            let kind = match self.piece_at(to) {
                Some(victim) => {
                    if victim.color() == us {
                        continue;
                    }
                    MoveKind::Capture
                }
                None => {
                    if CAPTURES_ONLY {
                        continue;
                    }
                    MoveKind::Quiet
                }
            };

            if info.is_attacked(to) {
                continue;
            }

            let mv = Move::new(from, to, kind);
            if self.is_legal_by_make(mv) {
                moves.push(mv);
            }
        }
    }

    /// Generates and serializes castling moves.
    ///
    /// Only called when not in check. Each castle requires the right bit,
    /// the rook on its home square, empty squares between, and a safe path
    /// for the King (start, pass-through, and destination).
    fn generate_castling_moves(&self, info: &AttackInfo, moves: &mut MoveList) {
        let us = self.side_to_move();
        let from = self.king_square(us);

        // Rights can only be trusted if the King is actually home
        if from != Square::king_home(us) {
            return;
        }

        let rank = Rank::first(us);
        let rook = Some(Piece::new(us, PieceKind::Rook));

        if self.castling_rights().has_short(us)
            && self.piece_at(Square::rook_short_home(us)) == rook
        {
            let f = Square::new(File::F, rank);
            let g = Square::new(File::G, rank);

            if self.piece_at(f).is_none()
                && self.piece_at(g).is_none()
                && !info.is_attacked(f)
                && !info.is_attacked(g)
            {
                moves.push(Move::new(from, g, MoveKind::ShortCastle));
            }
        }

        if self.castling_rights().has_long(us) && self.piece_at(Square::rook_long_home(us)) == rook
        {
            let b = Square::new(File::B, rank);
            let c = Square::new(File::C, rank);
            let d = Square::new(File::D, rank);

            if self.piece_at(b).is_none()
                && self.piece_at(c).is_none()
                && self.piece_at(d).is_none()
                && !info.is_attacked(c)
                && !info.is_attacked(d)
            {
                moves.push(Move::new(from, c, MoveKind::LongCastle));
            }
        }
    }

    /// Verifies a candidate move by making it, testing whether our King is
    /// attacked, and unmaking it.
    fn is_legal_by_make(&mut self, mv: Move) -> bool {
        let us = self.side_to_move();
        let undo = self.make_move(mv);
        let legal = !self.is_square_attacked_by(self.king_square(us), self.side_to_move());
        self.unmake_move(mv, &undo);
        legal
    }

    /// Returns `true` if the side to move has at least one legal move.
    #[inline(always)]
    pub fn has_legal_moves(&mut self) -> bool {
        !self.get_legal_moves().is_empty()
    }

    /// Returns `true` if the side to move is checkmated.
    #[inline(always)]
    pub fn is_checkmate(&mut self) -> bool {
        self.is_in_check() && !self.has_legal_moves()
    }

    /// Returns `true` if the side to move is stalemated.
    #[inline(always)]
    pub fn is_stalemate(&mut self) -> bool {
        !self.is_in_check() && !self.has_legal_moves()
    }

    /// Generate all legal moves the slow way: every pseudo-legal move,
    /// filtered by make, king-safety test, and unmake.
    ///
    /// This is the reference the staged generator is validated against.
    pub fn brute_force_legal_moves(&mut self) -> MoveList {
        let mut pseudo = MoveList::new();
        let us = self.side_to_move();

        for from in self.occupied_by(us).iter() {
            let Some(piece) = self.piece_at(from) else {
                continue;
            };

            match piece.kind() {
                PieceKind::Pawn => {
                    let promoting = from.rank() == Rank::seventh(us);

                    if let Some(to) = from.forward(us) {
                        if self.piece_at(to).is_none() {
                            push_pawn_move(&mut pseudo, from, to, promoting, false);

                            if from.rank() == Rank::second(us) {
                                if let Some(double) = to.forward(us) {
                                    if self.piece_at(double).is_none() {
                                        pseudo.push(Move::new(
                                            from,
                                            double,
                                            MoveKind::PawnDoublePush,
                                        ));
                                    }
                                }
                            }
                        }
                    }

                    for delta in pawn_attack_deltas(us) {
                        let Some(to) = from.offset(delta) else {
                            continue;
                        };
                        if let Some(victim) = self.piece_at(to) {
                            if victim.color() != us {
                                push_pawn_move(&mut pseudo, from, to, promoting, true);
                            }
                        } else if Some(to) == self.ep_square() {
                            pseudo.push(Move::new(from, to, MoveKind::EnPassantCapture));
                        }
                    }
                }

                PieceKind::Knight | PieceKind::King => {
                    let attacks = if piece.is_king() {
                        king_attacks(from)
                    } else {
                        knight_attacks(from)
                    };

                    for to in attacks.iter() {
                        match self.piece_at(to) {
                            Some(victim) if victim.color() == us => {}
                            Some(_) => pseudo.push(Move::new(from, to, MoveKind::Capture)),
                            None => pseudo.push(Move::new(from, to, MoveKind::Quiet)),
                        }
                    }
                }

                kind => {
                    let deltas: &[i8] = match kind {
                        PieceKind::Bishop => &BISHOP_DELTAS,
                        PieceKind::Rook => &ROOK_DELTAS,
                        _ => &QUEEN_DELTAS,
                    };

                    for &delta in deltas {
                        let mut current = from;
                        while let Some(to) = current.offset(delta) {
                            match self.piece_at(to) {
                                Some(victim) => {
                                    if victim.color() != us {
                                        pseudo.push(Move::new(from, to, MoveKind::Capture));
                                    }
                                    break;
                                }
                                None => pseudo.push(Move::new(from, to, MoveKind::Quiet)),
                            }
                            current = to;
                        }
                    }
                }
            }
        }

        // Castling needs its attack gate up front; make/unmake alone cannot
        // see the pass-through square.
        let them = us.opponent();
        let home = Square::king_home(us);
        if self.king_square(us) == home && !self.is_in_check() {
            let rank = Rank::first(us);
            let rook = Some(Piece::new(us, PieceKind::Rook));

            let f = Square::new(File::F, rank);
            let g = Square::new(File::G, rank);
            if self.castling_rights().has_short(us)
                && self.piece_at(Square::rook_short_home(us)) == rook
                && self.piece_at(f).is_none()
                && self.piece_at(g).is_none()
                && !self.is_square_attacked_by(f, them)
                && !self.is_square_attacked_by(g, them)
            {
                pseudo.push(Move::new(home, g, MoveKind::ShortCastle));
            }

            let b = Square::new(File::B, rank);
            let c = Square::new(File::C, rank);
            let d = Square::new(File::D, rank);
            if self.castling_rights().has_long(us)
                && self.piece_at(Square::rook_long_home(us)) == rook
                && self.piece_at(b).is_none()
                && self.piece_at(c).is_none()
                && self.piece_at(d).is_none()
                && !self.is_square_attacked_by(c, them)
                && !self.is_square_attacked_by(d, them)
            {
                pseudo.push(Move::new(home, c, MoveKind::LongCastle));
            }
        }

        pseudo
            .into_iter()
            .filter(|&mv| mv.is_castle() || self.is_legal_by_make(mv))
            .collect()
    }

    /// Asserts that the staged generator and the brute-force generator
    /// produce identical move sets, panicking with the offending FEN.
    pub fn assert_movegen_consistency(&mut self) {
        let mut fast: Vec<String> = self.get_legal_moves().iter().map(Move::to_string).collect();
        let mut slow: Vec<String> = self
            .brute_force_legal_moves()
            .iter()
            .map(Move::to_string)
            .collect();

        fast.sort();
        slow.sort();

        assert!(
            fast == slow,
            "Movegen mismatch on {:?}\n fast: {fast:?}\n slow: {slow:?}",
            self.to_fen()
        );
    }
}

/// Appends a pawn move, fanning out into the four promotions when the pawn
/// started on its seventh rank.
#[inline(always)]
fn push_pawn_move(moves: &mut MoveList, from: Square, to: Square, promoting: bool, capture: bool) {
    if promoting {
        for kind in [
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Rook,
            PieceKind::Queen,
        ] {
            let kind = if capture {
                MoveKind::promotion_capture(kind)
            } else {
                MoveKind::promotion(kind)
            };
            moves.push(Move::new(from, to, kind));
        }
    } else if capture {
        moves.push(Move::new(from, to, MoveKind::Capture));
    } else {
        moves.push(Move::new(from, to, MoveKind::Quiet));
    }
}
