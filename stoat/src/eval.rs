/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::{Color, Position, Psqt, Score};

/// Maximum value of the game-phase counter: the starting position's four
/// minors (1 each), four rooks (2 each), and two queens (4 each).
const MAX_PHASE: i32 = 24;

/// Encapsulates the logic of scoring a chess position.
///
/// Generally, a high score is good for White, and a low score is good for
/// Black. During a negamax search, positions must be evaluated from the
/// side-to-move's perspective, so use [`Evaluator::eval_for`] there.
#[derive(Debug, Clone)]
pub struct Evaluator<'a> {
    /// The position to evaluate.
    position: &'a Position,

    /// Percentage of game completion, in the range `[0, 100]`.
    ///
    /// A higher number means fewer pieces are on the board.
    pub(crate) endgame_weight: i32,
}

impl<'a> Evaluator<'a> {
    /// Construct a new [`Evaluator`], computing the game phase.
    #[inline(always)]
    pub fn new(position: &'a Position) -> Self {
        Self {
            position,
            endgame_weight: endgame_weight(position),
        }
    }

    /// Evaluate this position from White's perspective, in centipawns.
    ///
    /// Material plus tapered piece-square values; a positive number favors White.
    pub fn eval(&self) -> Score {
        let mut score = 0;

        for square in self.position.occupied().iter() {
            if let Some(piece) = self.position.piece_at(square) {
                let value = Psqt::eval(piece, square, self.endgame_weight);
                score += value * piece.color().negation_multiplier();
            }
        }

        Score::new(score)
    }

    /// Evaluate this position from `color`'s perspective.
    ///
    /// A positive/high number is good for `color`, while a negative number
    /// is better for the opponent. A score of 0 is considered equal.
    #[inline(always)]
    pub fn eval_for(&self, color: Color) -> Score {
        let white = self.eval();
        Score::new(white.inner() * color.negation_multiplier())
    }
}

/// Computes the endgame weight of `position` as a percentage in `[0, 100]`.
///
/// The phase counter sums 1 per minor piece, 2 per rook, and 4 per queen
/// still on the board, capped at [`MAX_PHASE`]; a full board weighs 0 and a
/// bare-kings board weighs 100.
#[inline(always)]
fn endgame_weight(position: &Position) -> i32 {
    let mut phase = 0;

    for square in position.occupied().iter() {
        if let Some(piece) = position.piece_at(square) {
            phase += piece.kind().phase();
        }
    }

    (MAX_PHASE - phase.min(MAX_PHASE)) * 100 / MAX_PHASE
}
