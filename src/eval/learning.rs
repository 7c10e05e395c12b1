//! Post-game weight adaptation
//!
//! After a game the engine is told whether it won, lost or drew. Two
//! independent updates follow, each with its own rate: every pattern weight
//! is scaled by `1 ± rate`, and the learned model takes one gradient step
//! on the final board towards +1 / -1 / 0.

use crate::board::{Board, Side};
use crate::error::EngineError;

use super::model::ValueModel;
use super::patterns::PatternWeightTable;

/// Default rate for pattern table updates
pub const PATTERN_LEARNING_RATE: f64 = 0.1;

/// Default rate for the model gradient step
pub const MODEL_LEARNING_RATE: f64 = 0.01;

/// Result of a finished game from the engine's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

impl Outcome {
    /// Regression target for the model
    #[inline]
    pub fn target(self) -> f64 {
        match self {
            Outcome::Win => 1.0,
            Outcome::Loss => -1.0,
            Outcome::Draw => 0.0,
        }
    }

    /// Multiplier applied to every pattern weight
    #[inline]
    pub fn weight_factor(self, rate: f64) -> f64 {
        match self {
            Outcome::Win => 1.0 + rate,
            Outcome::Loss => 1.0 - rate,
            Outcome::Draw => 1.0,
        }
    }

    /// Outcome for `perspective` given the winner of the game.
    pub fn for_side(winner: Option<Side>, perspective: Side) -> Outcome {
        match winner {
            Some(w) if w == perspective => Outcome::Win,
            Some(_) => Outcome::Loss,
            None => Outcome::Draw,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Win => write!(f, "win"),
            Outcome::Loss => write!(f, "loss"),
            Outcome::Draw => write!(f, "draw"),
        }
    }
}

impl std::str::FromStr for Outcome {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "win" => Ok(Outcome::Win),
            "loss" | "lose" => Ok(Outcome::Loss),
            "draw" => Ok(Outcome::Draw),
            other => Err(EngineError::InvalidArgument(format!("unknown outcome '{other}'"))),
        }
    }
}

/// Scale the pattern table after a game. Draws leave it untouched.
pub fn update_pattern_weights(table: &mut PatternWeightTable, outcome: Outcome, rate: f64) {
    if outcome != Outcome::Draw {
        table.scale(outcome.weight_factor(rate));
    }
}

/// One gradient step on the final board seen from `perspective`.
/// Returns the model's error before the step.
pub fn train_on_outcome(
    model: &mut ValueModel,
    final_board: &Board,
    perspective: Side,
    outcome: Outcome,
    rate: f64,
) -> f64 {
    model.train(&final_board.flatten(perspective), outcome.target(), rate)
}
