/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, bail, Result};

use super::{
    king_attacks, knight_attacks, pawn_attack_deltas, Bitboard, Color, File, Move, Piece,
    PieceKind, Rank, Square, ZobristKey, BISHOP_DELTAS, ROOK_DELTAS,
};

/// FEN string for the starting position of chess.
pub const FEN_STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// A popular FEN string for debugging move generation.
pub const FEN_KIWIPETE: &str =
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

/// Castling rights of both players, as a 4-bit set.
///
/// Rights only ever shrink over the course of a game.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct CastlingRights(u8);

impl CastlingRights {
    const WHITE_SHORT: u8 = 0b0001;
    const WHITE_LONG: u8 = 0b0010;
    const BLACK_SHORT: u8 = 0b0100;
    const BLACK_LONG: u8 = 0b1000;

    /// Number of possible rights combinations.
    pub const COUNT: usize = 16;

    /// No castling rights for either player.
    #[inline(always)]
    pub const fn none() -> Self {
        Self(0)
    }

    /// Full castling rights for both players.
    #[inline(always)]
    pub const fn all() -> Self {
        Self(0b1111)
    }

    #[inline(always)]
    const fn short_bit(color: Color) -> u8 {
        match color {
            Color::White => Self::WHITE_SHORT,
            Color::Black => Self::BLACK_SHORT,
        }
    }

    #[inline(always)]
    const fn long_bit(color: Color) -> u8 {
        match color {
            Color::White => Self::WHITE_LONG,
            Color::Black => Self::BLACK_LONG,
        }
    }

    /// Returns `true` if `color` may still castle short (kingside).
    #[inline(always)]
    pub const fn has_short(&self, color: Color) -> bool {
        self.0 & Self::short_bit(color) != 0
    }

    /// Returns `true` if `color` may still castle long (queenside).
    #[inline(always)]
    pub const fn has_long(&self, color: Color) -> bool {
        self.0 & Self::long_bit(color) != 0
    }

    /// Grant `color` the right to castle short.
    #[inline(always)]
    pub fn grant_short(&mut self, color: Color) {
        self.0 |= Self::short_bit(color);
    }

    /// Grant `color` the right to castle long.
    #[inline(always)]
    pub fn grant_long(&mut self, color: Color) {
        self.0 |= Self::long_bit(color);
    }

    /// Remove both of `color`'s castling rights.
    #[inline(always)]
    pub fn clear_for(&mut self, color: Color) {
        self.0 &= !(Self::short_bit(color) | Self::long_bit(color));
    }

    /// Remove the castling right associated with `color`'s rook on `square`,
    /// if `square` is one of that color's rook home squares.
    #[inline(always)]
    pub fn clear_for_rook_home(&mut self, color: Color, square: Square) {
        if square == Square::rook_short_home(color) {
            self.0 &= !Self::short_bit(color);
        } else if square == Square::rook_long_home(color) {
            self.0 &= !Self::long_bit(color);
        }
    }

    /// Fetch the index of this rights combination, in `0..16`.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return write!(f, "-");
        }

        if self.has_short(Color::White) {
            write!(f, "K")?;
        }
        if self.has_long(Color::White) {
            write!(f, "Q")?;
        }
        if self.has_short(Color::Black) {
            write!(f, "k")?;
        }
        if self.has_long(Color::Black) {
            write!(f, "q")?;
        }
        Ok(())
    }
}

impl Square {
    /// Home square of `color`'s kingside rook.
    #[inline(always)]
    pub const fn rook_short_home(color: Color) -> Self {
        Self::new(File::H, Rank::first(color))
    }

    /// Home square of `color`'s queenside rook.
    #[inline(always)]
    pub const fn rook_long_home(color: Color) -> Self {
        Self::new(File::A, Rank::first(color))
    }

    /// Destination of `color`'s kingside rook after castling.
    #[inline(always)]
    pub const fn rook_short_castle(color: Color) -> Self {
        Self::new(File::F, Rank::first(color))
    }

    /// Destination of `color`'s queenside rook after castling.
    #[inline(always)]
    pub const fn rook_long_castle(color: Color) -> Self {
        Self::new(File::D, Rank::first(color))
    }

    /// `color`'s king home square.
    #[inline(always)]
    pub const fn king_home(color: Color) -> Self {
        Self::new(File::E, Rank::first(color))
    }
}

/// Everything needed to reverse one [`Position::make_move`].
///
/// Records the prior values of every field a move can touch, so that unmake
/// is a plain restore rather than inverse arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Undo {
    /// The piece that occupied the capture target, accounting for en passant.
    captured: Option<Piece>,

    /// Prior en passant target.
    ep_square: Option<Square>,

    /// Prior castling rights.
    castling: CastlingRights,

    /// Prior halfmove clock.
    halfmove: u8,

    /// Prior fullmove number.
    fullmove: u16,

    /// Prior side to move.
    side_to_move: Color,

    /// Prior cached king squares.
    king_squares: [Square; 2],

    /// Prior Zobrist key.
    key: ZobristKey,

    /// Prior per-color occupancy.
    occupied: [Bitboard; 2],

    /// Set when the move was a plain relocation, so unmake can skip the
    /// capture/castle/promotion restoration entirely.
    quiet: bool,
}

/// A chess position: piece placement plus all the state needed to continue
/// the game and to hash it.
///
/// The board is a 128-entry 0x88 array; only the 64 indices with
/// `(s & 0x88) == 0` are real squares. Positions are created once (usually
/// via [`Position::from_fen`]) and then mutated in place by
/// [`Position::make_move`]; every make must be reversed by exactly one
/// [`Position::unmake_move`] with the returned [`Undo`] record.
#[derive(Clone, PartialEq, Eq)]
pub struct Position {
    /// The 0x88 board. Off-board entries are always `None`.
    board: [Option<Piece>; Square::EXTENT],

    /// Whose turn it is.
    side_to_move: Color,

    /// Castling rights of both players.
    castling: CastlingRights,

    /// En passant target square: the destination of a capturing pawn. Only
    /// ever set for the single ply following a double pawn push.
    ep_square: Option<Square>,

    /// Halfmove clock for the fifty-move rule.
    halfmove: u8,

    /// Fullmove number, starting at 1 and incremented after Black's move.
    fullmove: u16,

    /// Cached king locations, indexed by color.
    king_squares: [Square; 2],

    /// Occupancy masks, indexed by color. Derived from `board`, maintained
    /// incrementally.
    occupied: [Bitboard; 2],

    /// Zobrist key, maintained incrementally.
    key: ZobristKey,
}

impl Position {
    /// Creates a new, empty [`Position`] with White to move and no castling
    /// rights.
    #[inline(always)]
    pub fn new() -> Self {
        Self {
            board: [None; Square::EXTENT],
            side_to_move: Color::White,
            castling: CastlingRights::none(),
            ep_square: None,
            halfmove: 0,
            fullmove: 1,
            king_squares: [Square::A1; 2],
            occupied: [Bitboard::EMPTY_BOARD; 2],
            key: ZobristKey::default(),
        }
    }

    /// Creates a new [`Position`] from the provided FEN string.
    ///
    /// Fails fast on malformed input, missing fields, or placements without
    /// exactly one king per side; errors never surface from the search.
    pub fn from_fen(fen: &str) -> Result<Self> {
        let mut position = Self::new();

        let mut split = fen.trim().split(' ');
        let Some(placements) = split.next() else {
            bail!("FEN string must have piece placements");
        };

        if placements.matches('/').count() != 7 {
            bail!("FEN must have piece placements for all 8 ranks");
        }

        // Ranks are written 8 down to 1, so reverse to place White at the bottom
        for (rank, placements) in placements.split('/').rev().enumerate() {
            let mut file = 0u8;

            for piece_char in placements.chars() {
                if let Ok(piece) = Piece::from_fen_char(piece_char) {
                    if file >= 8 {
                        bail!("FEN rank {placements:?} has more than 8 squares");
                    }
                    let square =
                        Square::new(File::new_unchecked(file), Rank::new_unchecked(rank as u8));
                    position.place(piece, square);
                    file += 1;
                } else {
                    let Some(empty) = piece_char.to_digit(10) else {
                        bail!(
                            "FEN placements must contain piece chars or digits. Got {piece_char:?}"
                        );
                    };
                    file += empty as u8;
                }
            }
        }

        // Exactly one king of each color must exist
        for color in Color::all() {
            let kings = Square::iter()
                .filter(|&square| {
                    position.piece_at(square) == Some(Piece::new(color, PieceKind::King))
                })
                .count();
            if kings != 1 {
                bail!("FEN placements must contain exactly one {color} King. Got {kings}");
            }
        }

        let active_color = split.next().unwrap_or("w");
        position.side_to_move = Color::from_str(active_color)?;

        let castling = split.next().unwrap_or("-");
        for c in castling.replace('-', "").chars() {
            let color = Color::from_case(c);
            match c.to_ascii_lowercase() {
                'k' => position.castling.grant_short(color),
                'q' => position.castling.grant_long(color),
                _ => bail!("Castling chars must be in [K, Q, k, q]. Got {c:?}"),
            }
        }

        let en_passant_target = split.next().unwrap_or("-");
        position.ep_square = match en_passant_target {
            "-" => None,
            square => Some(Square::from_coord(square)?),
        };

        let halfmove = split.next().unwrap_or("0");
        position.halfmove = halfmove.parse().or(Err(anyhow!(
            "FEN string must have valid halfmove counter. Got {halfmove:?}"
        )))?;

        let fullmove = split.next().unwrap_or("1");
        position.fullmove = fullmove.parse().or(Err(anyhow!(
            "FEN string must have valid fullmove counter. Got {fullmove:?}"
        )))?;

        position.key = ZobristKey::new(&position);
        Ok(position)
    }

    /// Generates the FEN string of this [`Position`].
    pub fn to_fen(&self) -> String {
        let mut placements = String::with_capacity(64);

        for rank in Rank::iter().rev() {
            let mut empty = 0;
            for file in File::iter() {
                match self.piece_at(Square::new(file, rank)) {
                    Some(piece) => {
                        if empty > 0 {
                            placements.push_str(&empty.to_string());
                            empty = 0;
                        }
                        placements.push(piece.char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                placements.push_str(&empty.to_string());
            }
            if rank != Rank::ONE {
                placements.push('/');
            }
        }

        let en_passant = self
            .ep_square
            .map(|ep| ep.to_string())
            .unwrap_or(String::from("-"));

        format!(
            "{placements} {} {} {en_passant} {} {}",
            self.side_to_move, self.castling, self.halfmove, self.fullmove
        )
    }

    /// Fetch the piece at the provided [`Square`], if there is one.
    #[inline(always)]
    pub const fn piece_at(&self, square: Square) -> Option<Piece> {
        self.board[square.inner() as usize]
    }

    /// Whose turn it is.
    #[inline(always)]
    pub const fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// Current castling rights.
    #[inline(always)]
    pub const fn castling_rights(&self) -> CastlingRights {
        self.castling
    }

    /// Current en passant target, if any.
    #[inline(always)]
    pub const fn ep_square(&self) -> Option<Square> {
        self.ep_square
    }

    /// Halfmove clock for the fifty-move rule.
    #[inline(always)]
    pub const fn halfmove(&self) -> u8 {
        self.halfmove
    }

    /// Fullmove number.
    #[inline(always)]
    pub const fn fullmove(&self) -> u16 {
        self.fullmove
    }

    /// Location of `color`'s king.
    #[inline(always)]
    pub const fn king_square(&self, color: Color) -> Square {
        self.king_squares[color.index()]
    }

    /// Occupancy of `color`'s pieces.
    #[inline(always)]
    pub const fn occupied_by(&self, color: Color) -> Bitboard {
        self.occupied[color.index()]
    }

    /// Occupancy of all pieces.
    #[inline(always)]
    pub const fn occupied(&self) -> Bitboard {
        self.occupied[0].or(self.occupied[1])
    }

    /// The Zobrist key of this position.
    #[inline(always)]
    pub const fn key(&self) -> ZobristKey {
        self.key
    }

    /// Place `piece` on `square`, updating occupancy, the king cache, and
    /// the Zobrist key.
    #[inline(always)]
    pub fn place(&mut self, piece: Piece, square: Square) {
        self.board[square.inner() as usize] = Some(piece);
        self.occupied[piece.color().index()].set(square);
        self.key.hash_piece(square, piece);

        if piece.is_king() {
            self.king_squares[piece.color().index()] = square;
        }
    }

    /// Remove and return the piece on `square`, updating occupancy and the
    /// Zobrist key.
    #[inline(always)]
    pub fn take(&mut self, square: Square) -> Option<Piece> {
        let piece = self.board[square.inner() as usize].take()?;
        self.occupied[piece.color().index()].clear(square);
        self.key.hash_piece(square, piece);
        Some(piece)
    }

    /// Applies the provided [`Move`], which must be legal, and returns the
    /// [`Undo`] record that reverses it.
    ///
    /// Handles the four move shapes (quiet, capture including en passant,
    /// castling, promotion) in one pass, updating the piece array, cached
    /// king squares, castling rights, en passant target, clocks, side to
    /// move, and the Zobrist key incrementally.
    pub fn make_move(&mut self, mv: Move) -> Undo {
        let from = mv.from();
        let to = mv.to();
        let color = self.side_to_move;

        let mut undo = Undo {
            captured: None,
            ep_square: self.ep_square,
            castling: self.castling,
            halfmove: self.halfmove,
            fullmove: self.fullmove,
            side_to_move: color,
            king_squares: self.king_squares,
            key: self.key,
            occupied: self.occupied,
            quiet: !mv.is_capture() && !mv.is_promotion() && !mv.is_castle(),
        };

        // Clear the en passant target from the last move, un-hashing it
        if let Some(ep_square) = self.ep_square.take() {
            self.key.hash_ep_file(ep_square.file());
        }

        let old_rights = self.castling;

        // Move counters; the halfmove clock is reset below on captures and pawn moves
        self.halfmove += 1;
        self.fullmove += color.bits();

        if mv.is_capture() {
            // An en passant victim is not on `to`; it is one square behind
            let victim_square = if mv.is_en_passant() {
                let Some(victim_square) = to.backward(color) else {
                    panic!("En passant to {to} has no victim square on {:?}", self.to_fen());
                };
                victim_square
            } else {
                to
            };

            let Some(victim) = self.take(victim_square) else {
                panic!(
                    "No piece to capture at {victim_square} in move {mv} on {:?}",
                    self.to_fen()
                );
            };

            // Capturing a rook on its home square forfeits that right
            if victim.is_rook() {
                self.castling.clear_for_rook_home(victim.color(), victim_square);
            }

            self.halfmove = 0;
            undo.captured = Some(victim);
        }

        let Some(mut piece) = self.take(from) else {
            panic!("No piece at {from} to make move {mv} on {:?}", self.to_fen());
        };

        if mv.is_castle() {
            // The rook jumps to the other side of the king, atomically
            let (rook_home, rook_castle) = if mv.is_short_castle() {
                (Square::rook_short_home(color), Square::rook_short_castle(color))
            } else {
                (Square::rook_long_home(color), Square::rook_long_castle(color))
            };

            let Some(rook) = self.take(rook_home) else {
                panic!("No rook at {rook_home} to castle {mv} on {:?}", self.to_fen());
            };
            self.place(rook, rook_castle);
        }

        match piece.kind() {
            PieceKind::Pawn => {
                self.halfmove = 0;

                if mv.is_pawn_double_push() {
                    // The target is the square stepped over
                    self.ep_square = from.forward(color);
                    if let Some(ep_square) = self.ep_square {
                        self.key.hash_ep_file(ep_square.file());
                    }
                }
            }

            // A rook leaving its home square forfeits that right
            PieceKind::Rook => self.castling.clear_for_rook_home(color, from),

            PieceKind::King => self.castling.clear_for(color),

            _ => {}
        }

        if let Some(promotion) = mv.promotion() {
            piece = piece.promoted(promotion);
        }

        self.place(piece, to);

        // Re-hash castling rights only if they changed
        if self.castling != old_rights {
            self.key.hash_castling_rights(old_rights);
            self.key.hash_castling_rights(self.castling);
        }

        // Next player's turn
        self.key.hash_side_to_move(self.side_to_move);
        self.side_to_move = color.opponent();
        self.key.hash_side_to_move(self.side_to_move);

        undo
    }

    /// Strictly reverses the last [`Position::make_move`], restoring every
    /// field from the [`Undo`] record.
    pub fn unmake_move(&mut self, mv: Move, undo: &Undo) {
        // Restore all scalar state wholesale; only the piece array needs
        // shape-specific handling below.
        self.side_to_move = undo.side_to_move;
        self.castling = undo.castling;
        self.ep_square = undo.ep_square;
        self.halfmove = undo.halfmove;
        self.fullmove = undo.fullmove;
        self.king_squares = undo.king_squares;
        self.key = undo.key;
        self.occupied = undo.occupied;

        let from = mv.from();
        let to = mv.to();
        let color = undo.side_to_move;

        let Some(piece) = self.board[to.inner() as usize].take() else {
            panic!("No piece at {to} to unmake move {mv} on {:?}", self.to_fen());
        };

        if undo.quiet {
            self.board[from.inner() as usize] = Some(piece);
            return;
        }

        // A promoted piece reverts to the pawn it was
        let piece = if mv.is_promotion() {
            Piece::new(color, PieceKind::Pawn)
        } else {
            piece
        };
        self.board[from.inner() as usize] = Some(piece);

        if mv.is_castle() {
            let (rook_home, rook_castle) = if mv.is_short_castle() {
                (Square::rook_short_home(color), Square::rook_short_castle(color))
            } else {
                (Square::rook_long_home(color), Square::rook_long_castle(color))
            };

            let rook = self.board[rook_castle.inner() as usize].take();
            self.board[rook_home.inner() as usize] = rook;
        }

        if let Some(victim) = undo.captured {
            let victim_square = if mv.is_en_passant() {
                let Some(victim_square) = to.backward(color) else {
                    panic!("En passant to {to} has no victim square on {:?}", self.to_fen());
                };
                victim_square
            } else {
                to
            };

            self.board[victim_square.inner() as usize] = Some(victim);
        }
    }

    /// Applies a null move: the side to move passes.
    ///
    /// Clears the en passant target and flips the side to move; used by null
    /// move pruning. Reversed by [`Position::unmake_nullmove`].
    pub fn make_nullmove(&mut self) -> Undo {
        let undo = Undo {
            captured: None,
            ep_square: self.ep_square,
            castling: self.castling,
            halfmove: self.halfmove,
            fullmove: self.fullmove,
            side_to_move: self.side_to_move,
            king_squares: self.king_squares,
            key: self.key,
            occupied: self.occupied,
            quiet: true,
        };

        if let Some(ep_square) = self.ep_square.take() {
            self.key.hash_ep_file(ep_square.file());
        }

        self.halfmove += 1;

        self.key.hash_side_to_move(self.side_to_move);
        self.side_to_move = self.side_to_move.opponent();
        self.key.hash_side_to_move(self.side_to_move);

        undo
    }

    /// Reverses a [`Position::make_nullmove`].
    pub fn unmake_nullmove(&mut self, undo: &Undo) {
        self.side_to_move = undo.side_to_move;
        self.ep_square = undo.ep_square;
        self.halfmove = undo.halfmove;
        self.key = undo.key;
    }

    /// Returns `true` if `square` is attacked by any piece of `attacker`.
    ///
    /// Scans outward from `square`: pawn-attack deltas and the leaper
    /// tables for knights and kings, then each slider ray until its first
    /// occupied square.
    pub fn is_square_attacked_by(&self, square: Square, attacker: Color) -> bool {
        // A pawn attacks `square` if it sits one pawn-attack delta behind it
        for delta in pawn_attack_deltas(attacker) {
            if let Some(from) = square.offset(-delta) {
                if self.piece_at(from) == Some(Piece::new(attacker, PieceKind::Pawn)) {
                    return true;
                }
            }
        }

        for from in knight_attacks(square).iter() {
            if self.piece_at(from) == Some(Piece::new(attacker, PieceKind::Knight)) {
                return true;
            }
        }

        for from in king_attacks(square).iter() {
            if self.piece_at(from) == Some(Piece::new(attacker, PieceKind::King)) {
                return true;
            }
        }

        // Sliders: walk each ray to its first occupied square
        for (deltas, slider) in [
            (&ROOK_DELTAS, PieceKind::Rook),
            (&BISHOP_DELTAS, PieceKind::Bishop),
        ] {
            for &delta in deltas {
                let mut current = square;
                while let Some(next) = current.offset(delta) {
                    if let Some(piece) = self.piece_at(next) {
                        if piece.color() == attacker
                            && (piece.kind() == slider || piece.kind() == PieceKind::Queen)
                        {
                            return true;
                        }
                        break;
                    }
                    current = next;
                }
            }
        }

        false
    }

    /// Returns `true` if the side to move is currently in check.
    #[inline(always)]
    pub fn is_in_check(&self) -> bool {
        self.is_square_attacked_by(self.king_square(self.side_to_move), self.side_to_move.opponent())
    }

    /// Total value of `color`'s non-pawn, non-king material, in centipawns.
    ///
    /// Used by the null move pruning material gate.
    pub fn non_pawn_material(&self, color: Color) -> i32 {
        self.occupied_by(color)
            .iter()
            .filter_map(|square| self.piece_at(square))
            .filter(|piece| !piece.is_pawn() && !piece.is_king())
            .map(|piece| piece.kind().value())
            .sum()
    }

    /// Returns `true` if the halfmove clock allows a fifty-move-rule draw.
    #[inline(always)]
    pub const fn can_draw_by_fifty(&self) -> bool {
        self.halfmove >= 100
    }

    /// Returns `true` if neither side has enough material to deliver mate:
    /// K vs K, K vs K plus one minor, or K+B vs K+B with both bishops on the
    /// same square color.
    pub fn has_insufficient_material(&self) -> bool {
        let mut minors = [None; 2];

        for square in self.occupied().iter() {
            let Some(piece) = self.piece_at(square) else {
                continue;
            };

            match piece.kind() {
                PieceKind::King => {}
                PieceKind::Knight | PieceKind::Bishop => {
                    let slot = &mut minors[piece.color().index()];
                    // Two minors on one side is enough material
                    if slot.is_some() {
                        return false;
                    }
                    *slot = Some((piece.kind(), square));
                }
                _ => return false,
            }
        }

        match (minors[0], minors[1]) {
            // K vs K, or K vs K + minor
            (None, None) | (Some(_), None) | (None, Some(_)) => true,

            // K+B vs K+B drawn only when the bishops share a square color
            (Some((PieceKind::Bishop, a)), Some((PieceKind::Bishop, b))) => {
                let shade = |square: Square| (square.file().inner() + square.rank().inner()) % 2;
                shade(a) == shade(b)
            }

            _ => false,
        }
    }

    /// Returns `true` if this position's key appears in `history`.
    #[inline(always)]
    pub fn is_repetition(&self, history: &[u64]) -> bool {
        history.iter().any(|&key| key == self.key.inner())
    }

    /// Asserts that the incrementally maintained state matches the state
    /// recomputed from scratch: the Zobrist key, the king cache, and the
    /// occupancy masks.
    ///
    /// Drift here means an unbalanced make/unmake or a hashing bug, which is
    /// a programmer error; this panics with the offending FEN.
    pub fn assert_consistent(&self) {
        let fresh = ZobristKey::new(self);
        assert!(
            self.key == fresh,
            "Zobrist drift on {:?}: incremental {} != from-scratch {fresh}",
            self.to_fen(),
            self.key,
        );

        let mut occupied = [Bitboard::EMPTY_BOARD; 2];
        for square in Square::iter() {
            if let Some(piece) = self.piece_at(square) {
                occupied[piece.color().index()].set(square);
                if piece.is_king() {
                    assert!(
                        self.king_square(piece.color()) == square,
                        "Stale king cache on {:?}: cached {} but king is on {square}",
                        self.to_fen(),
                        self.king_square(piece.color()),
                    );
                }
            }
        }
        assert!(
            occupied == self.occupied,
            "Stale occupancy on {:?}",
            self.to_fen()
        );
    }
}

impl Default for Position {
    /// The standard chess starting position.
    #[inline(always)]
    fn default() -> Self {
        // Safe unwrap: the starting position FEN is well-formed
        Self::from_fen(FEN_STARTPOS).unwrap()
    }
}

impl FromStr for Position {
    type Err = anyhow::Error;
    #[inline(always)]
    fn from_str(s: &str) -> Result<Self> {
        Self::from_fen(s)
    }
}

impl fmt::Display for Position {
    /// Prints the board as an 8x8 grid with rank and file labels, followed
    /// by the FEN string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::iter().rev() {
            write!(f, "{rank}| ")?;
            for file in File::iter() {
                let c = self
                    .piece_at(Square::new(file, rank))
                    .map(|piece| piece.char())
                    .unwrap_or('.');
                write!(f, "{c} ")?;
            }
            writeln!(f)?;
        }
        writeln!(f, " +----------------")?;
        writeln!(f, "   a b c d e f g h")?;
        write!(f, "\nFEN: {}", self.to_fen())
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen())
    }
}
