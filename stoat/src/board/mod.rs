/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Precomputed attack tables for sliders and leapers.
mod attacks;

/// A 64-bit set of squares.
mod bitboard;

/// Legal move generation.
mod movegen;

/// Move encoding and move lists.
mod moves;

/// Leaf-counting enumeration for validating move generation.
mod perft;

/// Pieces, piece kinds, and colors.
mod piece;

/// Position state, make/unmake, and FEN handling.
mod position;

/// A pseudo-random number generator for Zobrist keys.
mod prng;

/// Squares, files, and ranks on a 0x88 board.
mod square;

/// Zobrist hashing of positions.
mod zobrist;

pub use attacks::*;
pub use bitboard::*;
pub use movegen::*;
pub use moves::*;
pub use perft::*;
pub use piece::*;
pub use position::*;
pub use prng::*;
pub use square::*;
pub use zobrist::*;
