/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};

/// The color of a player or piece.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Color {
    #[default]
    White = 0,
    Black = 1,
}

impl Color {
    /// Number of colors.
    pub const COUNT: usize = 2;

    /// Fetch the index of this [`Color`], for indexing two-element tables.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// Fetch this color's opponent.
    #[inline(always)]
    pub const fn opponent(&self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// Returns `true` if this color is White.
    #[inline(always)]
    pub const fn is_white(&self) -> bool {
        matches!(self, Self::White)
    }

    /// The 0x88 delta of a single pawn push for this color.
    #[inline(always)]
    pub const fn forward_delta(&self) -> i8 {
        match self {
            Self::White => 0x10,
            Self::Black => -0x10,
        }
    }

    /// `1` for Black, `0` for White.
    ///
    /// Used to increment the fullmove counter after Black's move.
    #[inline(always)]
    pub const fn bits(&self) -> u16 {
        *self as u16
    }

    /// `1` for White, `-1` for Black.
    #[inline(always)]
    pub const fn negation_multiplier(&self) -> i32 {
        match self {
            Self::White => 1,
            Self::Black => -1,
        }
    }

    /// Fetch the [`Color`] whose pieces are written in the case of `c`.
    #[inline(always)]
    pub const fn from_case(c: char) -> Self {
        if c.is_ascii_uppercase() {
            Self::White
        } else {
            Self::Black
        }
    }

    /// Both colors, White first.
    #[inline(always)]
    pub const fn all() -> [Self; 2] {
        [Self::White, Self::Black]
    }
}

impl FromStr for Color {
    type Err = anyhow::Error;
    #[inline(always)]
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "w" | "W" => Ok(Self::White),
            "b" | "B" => Ok(Self::Black),
            _ => bail!("Color must be either \"w\" or \"b\". Got {s:?}"),
        }
    }
}

impl fmt::Display for Color {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::White => write!(f, "w"),
            Self::Black => write!(f, "b"),
        }
    }
}

/// The kind of a piece, independent of its color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum PieceKind {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

impl PieceKind {
    /// Number of piece kinds.
    pub const COUNT: usize = 6;

    /// Fetch the index of this [`PieceKind`], for indexing six-element tables.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// Returns a value of this [`PieceKind`], in centipawns.
    ///
    /// Values are obtained from here: <https://www.chessprogramming.org/Simplified_Evaluation_Function>
    #[inline(always)]
    pub const fn value(&self) -> i32 {
        match self {
            Self::Pawn => 100,
            Self::Knight => 320,
            Self::Bishop => 330,
            Self::Rook => 500,
            Self::Queen => 900,
            Self::King => 0, // King is invaluable, but 0 is easier to work with in computations
        }
    }

    /// Returns the value of this [`PieceKind`] in exchange sequences.
    ///
    /// Same as [`PieceKind::value`], except the King is given a huge value
    /// so that a capture sequence ending in a King capture dominates.
    #[inline(always)]
    pub const fn exchange_value(&self) -> i32 {
        match self {
            Self::King => 20_000,
            _ => self.value(),
        }
    }

    /// Contribution of this [`PieceKind`] to the game-phase counter.
    #[inline(always)]
    pub const fn phase(&self) -> i32 {
        match self {
            Self::Knight | Self::Bishop => 1,
            Self::Rook => 2,
            Self::Queen => 4,
            _ => 0,
        }
    }

    /// Constructs a new [`PieceKind`] from a promotion char in `nbrq`.
    #[inline(always)]
    pub fn from_promotion_char(c: char) -> Result<Self> {
        match c {
            'n' => Ok(Self::Knight),
            'b' => Ok(Self::Bishop),
            'r' => Ok(Self::Rook),
            'q' => Ok(Self::Queen),
            _ => bail!("Promotion chars must be one of [n, b, r, q]. Got {c:?}"),
        }
    }

    /// Fetch the lowercase char of this [`PieceKind`].
    #[inline(always)]
    pub const fn char(&self) -> char {
        match self {
            Self::Pawn => 'p',
            Self::Knight => 'n',
            Self::Bishop => 'b',
            Self::Rook => 'r',
            Self::Queen => 'q',
            Self::King => 'k',
        }
    }

    /// Fetch a human-readable name of this [`PieceKind`].
    #[inline(always)]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Pawn => "Pawn",
            Self::Knight => "Knight",
            Self::Bishop => "Bishop",
            Self::Rook => "Rook",
            Self::Queen => "Queen",
            Self::King => "King",
        }
    }

    /// All piece kinds, in increasing order of value.
    #[inline(always)]
    pub const fn all() -> [Self; 6] {
        [
            Self::Pawn,
            Self::Knight,
            Self::Bishop,
            Self::Rook,
            Self::Queen,
            Self::King,
        ]
    }

    /// All piece kinds except the King.
    #[inline(always)]
    pub const fn all_except_king() -> [Self; 5] {
        [
            Self::Pawn,
            Self::Knight,
            Self::Bishop,
            Self::Rook,
            Self::Queen,
        ]
    }
}

impl fmt::Display for PieceKind {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

/// A chess piece: a [`Color`] and a [`PieceKind`] packed into one byte.
///
/// The low 3 bits are the kind; bit 3 is the color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Piece(u8);

impl Piece {
    /// Number of distinct pieces.
    pub const COUNT: usize = 12;

    pub const WHITE_PAWN: Self = Self::new(Color::White, PieceKind::Pawn);
    pub const WHITE_KING: Self = Self::new(Color::White, PieceKind::King);
    pub const BLACK_PAWN: Self = Self::new(Color::Black, PieceKind::Pawn);
    pub const BLACK_KING: Self = Self::new(Color::Black, PieceKind::King);

    /// Constructs a new [`Piece`] from a [`Color`] and a [`PieceKind`].
    #[inline(always)]
    pub const fn new(color: Color, kind: PieceKind) -> Self {
        Self((color as u8) << 3 | kind as u8)
    }

    /// Fetch the [`Color`] of this [`Piece`].
    #[inline(always)]
    pub const fn color(&self) -> Color {
        if self.0 & 0b1000 == 0 {
            Color::White
        } else {
            Color::Black
        }
    }

    /// Fetch the [`PieceKind`] of this [`Piece`].
    #[inline(always)]
    pub const fn kind(&self) -> PieceKind {
        match self.0 & 0b0111 {
            0 => PieceKind::Pawn,
            1 => PieceKind::Knight,
            2 => PieceKind::Bishop,
            3 => PieceKind::Rook,
            4 => PieceKind::Queen,
            _ => PieceKind::King,
        }
    }

    /// Fetch the index of this [`Piece`] in the range `0..12`, for indexing
    /// twelve-element tables.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.color().index() * PieceKind::COUNT + self.kind().index()
    }

    /// Returns `true` if this [`Piece`] is a Pawn.
    #[inline(always)]
    pub const fn is_pawn(&self) -> bool {
        matches!(self.kind(), PieceKind::Pawn)
    }

    /// Returns `true` if this [`Piece`] is a Rook.
    #[inline(always)]
    pub const fn is_rook(&self) -> bool {
        matches!(self.kind(), PieceKind::Rook)
    }

    /// Returns `true` if this [`Piece`] is a King.
    #[inline(always)]
    pub const fn is_king(&self) -> bool {
        matches!(self.kind(), PieceKind::King)
    }

    /// Returns a copy of this [`Piece`], promoted to `kind`.
    #[inline(always)]
    pub const fn promoted(self, kind: PieceKind) -> Self {
        Self::new(self.color(), kind)
    }

    /// Constructs a new [`Piece`] from a FEN char like `K` or `p`.
    #[inline(always)]
    pub fn from_fen_char(c: char) -> Result<Self> {
        let kind = match c.to_ascii_lowercase() {
            'p' => PieceKind::Pawn,
            'n' => PieceKind::Knight,
            'b' => PieceKind::Bishop,
            'r' => PieceKind::Rook,
            'q' => PieceKind::Queen,
            'k' => PieceKind::King,
            _ => bail!("Piece chars must be one of [p, n, b, r, q, k] in either case. Got {c:?}"),
        };

        Ok(Self::new(Color::from_case(c), kind))
    }

    /// Fetch the FEN char of this [`Piece`]: uppercase for White.
    #[inline(always)]
    pub fn char(&self) -> char {
        if self.color().is_white() {
            self.kind().char().to_ascii_uppercase()
        } else {
            self.kind().char()
        }
    }
}

impl fmt::Display for Piece {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_round_trip() {
        for color in Color::all() {
            for kind in PieceKind::all() {
                let piece = Piece::new(color, kind);
                assert_eq!(piece.color(), color);
                assert_eq!(piece.kind(), kind);
                assert_eq!(Piece::from_fen_char(piece.char()).unwrap(), piece);
            }
        }
    }

    #[test]
    fn test_piece_indices_unique() {
        let mut seen = [false; Piece::COUNT];
        for color in Color::all() {
            for kind in PieceKind::all() {
                let index = Piece::new(color, kind).index();
                assert!(!seen[index]);
                seen[index] = true;
            }
        }
    }

    #[test]
    fn test_exchange_values() {
        assert_eq!(PieceKind::Pawn.exchange_value(), 100);
        assert_eq!(PieceKind::Queen.exchange_value(), 900);
        assert_eq!(PieceKind::King.exchange_value(), 20_000);
        assert_eq!(PieceKind::King.value(), 0);
    }
}
