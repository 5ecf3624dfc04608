/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use anyhow::{anyhow, Result};

use super::{PieceKind, Position, Square};

/// Capacity of a move list.
///
/// The practical upper bound on legal moves in a position is 218
/// ([source](https://www.chessprogramming.org/Chess_Position#cite_note-4)),
/// rounded up to a power of two.
pub const MAX_NUM_MOVES: usize = 256;

/// An alias for an [`arrayvec::ArrayVec`] containing at most [`MAX_NUM_MOVES`] moves.
pub type MoveList = arrayvec::ArrayVec<Move, MAX_NUM_MOVES>;

/// Represents the different kinds of moves that can be made during a chess game.
///
/// Internally, these are represented by bit flags, which allows a compact
/// representation of the [`Move`] struct. You do not need to know the bit
/// flag values. They are only relevant internally. If you care, though, they
/// are fetched from the [chess programming wiki](https://www.chessprogramming.org/Encoding_Moves#From-To_Based).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum MoveKind {
    /// Involves only a single piece moving from one location to another, and
    /// does not change the quantity or kind of any pieces on the board.
    Quiet = 0 << Move::FLG_BITS,

    /// A special case on a Pawn's first move, wherein it can advance two squares forward.
    PawnDoublePush = 1 << Move::FLG_BITS,

    /// Involves the King and the Rook on his side of the board sliding past each other.
    ShortCastle = 2 << Move::FLG_BITS,

    /// Involves the King and the Rook on the Queen's side of the board sliding past each other.
    LongCastle = 3 << Move::FLG_BITS,

    /// Involves a piece moving onto a square occupied by an opponent's piece,
    /// removing it from the board.
    Capture = 4 << Move::FLG_BITS,

    /// A special variant of capturing that occurs when a Pawn executes En Passant.
    EnPassantCapture = 5 << Move::FLG_BITS,

    /// Involves a Pawn reaching the opponent's side of the board and becoming a Knight.
    PromoteKnight = 8 << Move::FLG_BITS,

    /// Involves a Pawn reaching the opponent's side of the board and becoming a Bishop.
    PromoteBishop = 9 << Move::FLG_BITS,

    /// Involves a Pawn reaching the opponent's side of the board and becoming a Rook.
    PromoteRook = 10 << Move::FLG_BITS,

    /// Involves a Pawn reaching the opponent's side of the board and becoming a Queen.
    PromoteQueen = 11 << Move::FLG_BITS,

    /// A capture that also promotes the capturing Pawn to a Knight.
    CaptureAndPromoteKnight = 12 << Move::FLG_BITS,

    /// A capture that also promotes the capturing Pawn to a Bishop.
    CaptureAndPromoteBishop = 13 << Move::FLG_BITS,

    /// A capture that also promotes the capturing Pawn to a Rook.
    CaptureAndPromoteRook = 14 << Move::FLG_BITS,

    /// A capture that also promotes the capturing Pawn to a Queen.
    CaptureAndPromoteQueen = 15 << Move::FLG_BITS,
}

impl MoveKind {
    /// Creates a new [`MoveKind`] that is a promotion to the provided [`PieceKind`].
    ///
    /// # Panics
    /// This function will panic if `promotion` is not a Knight, Bishop, Rook, or Queen.
    #[inline(always)]
    pub fn promotion(promotion: PieceKind) -> Self {
        match promotion {
            PieceKind::Knight => Self::PromoteKnight,
            PieceKind::Bishop => Self::PromoteBishop,
            PieceKind::Rook => Self::PromoteRook,
            PieceKind::Queen => Self::PromoteQueen,
            _ => unreachable!(),
        }
    }

    /// Creates a new [`MoveKind`] that is a capture and promotion to the provided [`PieceKind`].
    ///
    /// # Panics
    /// This function will panic if `promotion` is not a Knight, Bishop, Rook, or Queen.
    #[inline(always)]
    pub fn promotion_capture(promotion: PieceKind) -> Self {
        match promotion {
            PieceKind::Knight => Self::CaptureAndPromoteKnight,
            PieceKind::Bishop => Self::CaptureAndPromoteBishop,
            PieceKind::Rook => Self::CaptureAndPromoteRook,
            PieceKind::Queen => Self::CaptureAndPromoteQueen,
            _ => unreachable!(),
        }
    }
}

/// Represents a move made on a chess board, including whether a piece is to be promoted.
///
/// Internally encoded using the following bit pattern:
/// ```text
///     0000 0000000 0000000
///      |      |       |
///      |      |       +- Source square of the move (raw 0x88 index).
///      |      +- Target square of the move (raw 0x88 index).
///      +- Special flags for promotion, castling, etc.
/// ```
///
/// Flags are fetched directly from the [Chess Programming Wiki](https://www.chessprogramming.org/Encoding_Moves#From-To_Based).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Move(u32);

impl Move {
    /// Mask for the source ("from") bits.
    const SRC_MASK: u32 = 0b0000_0000_0111_1111;
    /// Mask for the destination ("to") bits.
    const DST_MASK: u32 = 0b0011_1111_1000_0000;
    /// Mask for the flag (promotions, captures, etc.) bits.
    const FLG_MASK: u32 = 0b11_1100_0000_0000_0000;
    /// Start index of destination bits.
    const DST_BITS: u32 = 7;
    /// Start index of flag bits.
    const FLG_BITS: u32 = 14;

    /// Flag nibble bit marking a capture of some kind.
    const CAPTURE_BIT: u32 = 4 << Self::FLG_BITS;
    /// Flag nibble bit marking a promotion of some kind.
    const PROMOTION_BIT: u32 = 8 << Self::FLG_BITS;

    /// Creates a new [`Move`] from the given [`Square`]s and a [`MoveKind`].
    #[inline(always)]
    pub const fn new(from: Square, to: Square, kind: MoveKind) -> Self {
        Self(kind as u32 | (to.inner() as u32) << Self::DST_BITS | from.inner() as u32)
    }

    /// Fetches the source (or "from") part of this [`Move`], as a [`Square`].
    #[inline(always)]
    pub const fn from(&self) -> Square {
        Square((self.0 & Self::SRC_MASK) as u8)
    }

    /// Fetches the destination (or "to") part of this [`Move`], as a [`Square`].
    #[inline(always)]
    pub const fn to(&self) -> Square {
        Square(((self.0 & Self::DST_MASK) >> Self::DST_BITS) as u8)
    }

    /// Fetches the [`MoveKind`] part of this [`Move`].
    #[inline(always)]
    pub const fn kind(&self) -> MoveKind {
        match (self.0 & Self::FLG_MASK) >> Self::FLG_BITS {
            0 => MoveKind::Quiet,
            1 => MoveKind::PawnDoublePush,
            2 => MoveKind::ShortCastle,
            3 => MoveKind::LongCastle,
            4 => MoveKind::Capture,
            5 => MoveKind::EnPassantCapture,
            8 => MoveKind::PromoteKnight,
            9 => MoveKind::PromoteBishop,
            10 => MoveKind::PromoteRook,
            11 => MoveKind::PromoteQueen,
            12 => MoveKind::CaptureAndPromoteKnight,
            13 => MoveKind::CaptureAndPromoteBishop,
            14 => MoveKind::CaptureAndPromoteRook,
            _ => MoveKind::CaptureAndPromoteQueen,
        }
    }

    /// Returns `true` if this [`Move`] captures a piece, including en passant.
    #[inline(always)]
    pub const fn is_capture(&self) -> bool {
        self.0 & Self::CAPTURE_BIT != 0
    }

    /// Returns `true` if this [`Move`] is en passant.
    #[inline(always)]
    pub const fn is_en_passant(&self) -> bool {
        matches!(self.kind(), MoveKind::EnPassantCapture)
    }

    /// Returns `true` if this [`Move`] is a short (kingside) castle.
    #[inline(always)]
    pub const fn is_short_castle(&self) -> bool {
        matches!(self.kind(), MoveKind::ShortCastle)
    }

    /// Returns `true` if this [`Move`] is a long (queenside) castle.
    #[inline(always)]
    pub const fn is_long_castle(&self) -> bool {
        matches!(self.kind(), MoveKind::LongCastle)
    }

    /// Returns `true` if this [`Move`] is a castle of either kind.
    #[inline(always)]
    pub const fn is_castle(&self) -> bool {
        matches!(self.kind(), MoveKind::ShortCastle | MoveKind::LongCastle)
    }

    /// Returns `true` if this [`Move`] is a pawn double push.
    #[inline(always)]
    pub const fn is_pawn_double_push(&self) -> bool {
        matches!(self.kind(), MoveKind::PawnDoublePush)
    }

    /// Returns `true` if this [`Move`] promotes the moving Pawn.
    #[inline(always)]
    pub const fn is_promotion(&self) -> bool {
        self.0 & Self::PROMOTION_BIT != 0
    }

    /// Returns `true` if this [`Move`] neither captures nor promotes.
    ///
    /// Quiet moves are the ones tracked by the killer and history tables.
    #[inline(always)]
    pub const fn is_quiet(&self) -> bool {
        !self.is_capture() && !self.is_promotion()
    }

    /// Fetches the [`PieceKind`] this [`Move`] promotes to, if any.
    #[inline(always)]
    pub const fn promotion(&self) -> Option<PieceKind> {
        if !self.is_promotion() {
            return None;
        }

        Some(match (self.0 & Self::FLG_MASK) >> Self::FLG_BITS & 0b0011 {
            0 => PieceKind::Knight,
            1 => PieceKind::Bishop,
            2 => PieceKind::Rook,
            _ => PieceKind::Queen,
        })
    }

    /// Constructs a new [`Move`] from a coordinate string like `e2e4` or
    /// `e7e8q`, using `position` to infer the [`MoveKind`].
    ///
    /// This only builds the encoding; it does not check that the move is
    /// legal in `position`. Callers at the interface boundary must reject
    /// moves that are not in the legal set.
    pub fn from_coord(position: &Position, coord: &str) -> Result<Self> {
        let from = Square::from_coord(
            coord
                .get(0..2)
                .ok_or(anyhow!("Move string {coord:?} is too short"))?,
        )?;
        let to = Square::from_coord(
            coord
                .get(2..4)
                .ok_or(anyhow!("Move string {coord:?} is too short"))?,
        )?;

        let promotion = match coord.get(4..5) {
            Some(c) => Some(PieceKind::from_promotion_char(
                c.chars().next().unwrap_or_default(),
            )?),
            None => None,
        };

        let piece = position
            .piece_at(from)
            .ok_or(anyhow!("No piece at {from} to move in {coord:?}"))?;
        let is_capture = position.piece_at(to).is_some();

        let kind = match piece.kind() {
            PieceKind::Pawn => {
                if let Some(promotion) = promotion {
                    if is_capture {
                        MoveKind::promotion_capture(promotion)
                    } else {
                        MoveKind::promotion(promotion)
                    }
                } else if Some(to) == position.ep_square() && from.file() != to.file() {
                    MoveKind::EnPassantCapture
                } else if from.rank().inner().abs_diff(to.rank().inner()) == 2 {
                    MoveKind::PawnDoublePush
                } else if is_capture {
                    MoveKind::Capture
                } else {
                    MoveKind::Quiet
                }
            }

            PieceKind::King if from.file().inner().abs_diff(to.file().inner()) == 2 => {
                if to.file() > from.file() {
                    MoveKind::ShortCastle
                } else {
                    MoveKind::LongCastle
                }
            }

            _ if is_capture => MoveKind::Capture,
            _ => MoveKind::Quiet,
        };

        Ok(Self::new(from, to, kind))
    }
}

impl fmt::Display for Move {
    /// Renders this [`Move`] in coordinate notation: `e2e4`, `e7e8q`.
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(promotion) = self.promotion() {
            write!(f, "{}{}{}", self.from(), self.to(), promotion.char())
        } else {
            write!(f, "{}{}", self.from(), self.to())
        }
    }
}

impl fmt::Debug for Move {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self} ({:?})", self.kind())
    }
}

impl PartialEq<&str> for Move {
    #[inline(always)]
    fn eq(&self, other: &&str) -> bool {
        self.to_string() == **other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_round_trip() {
        let mv = Move::new(Square::E2, Square::E4, MoveKind::PawnDoublePush);
        assert_eq!(mv.from(), Square::E2);
        assert_eq!(mv.to(), Square::E4);
        assert_eq!(mv.kind(), MoveKind::PawnDoublePush);
        assert!(!mv.is_capture());
        assert!(mv.is_quiet());
        assert_eq!(mv.to_string(), "e2e4");
    }

    #[test]
    fn test_promotion_encoding() {
        let mv = Move::new(Square::E7, Square::E8, MoveKind::PromoteKnight);
        assert_eq!(mv.promotion(), Some(PieceKind::Knight));
        assert!(!mv.is_capture());
        assert_eq!(mv.to_string(), "e7e8n");

        let mv = Move::new(Square::E7, Square::D8, MoveKind::CaptureAndPromoteQueen);
        assert_eq!(mv.promotion(), Some(PieceKind::Queen));
        assert!(mv.is_capture());
        assert!(!mv.is_quiet());
        assert_eq!(mv.to_string(), "e7d8q");
    }

    #[test]
    fn test_capture_flags() {
        let ep = Move::new(Square::E5, Square::D6, MoveKind::EnPassantCapture);
        assert!(ep.is_capture());
        assert!(ep.is_en_passant());
        assert!(ep.promotion().is_none());

        let castle = Move::new(Square::E1, Square::G1, MoveKind::ShortCastle);
        assert!(castle.is_castle());
        assert!(castle.is_short_castle());
        assert!(!castle.is_capture());
    }
}
