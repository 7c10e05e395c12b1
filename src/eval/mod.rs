//! Evaluation module for board positions
//!
//! This module provides pattern recognition and scoring for board positions.
//! The evaluation considers:
//! - Line patterns matched against an adaptive weight table
//! - Positional bonuses (center control)
//! - A learned scalar model over the whole board
//!
//! [`learning`] holds the post-game updates of both parameter sets.

pub mod heuristic;
pub mod learning;
pub mod model;
pub mod patterns;

pub use heuristic::{centrality, line_window, Evaluator, DEFAULT_MODEL_SCALE};
pub use learning::{
    train_on_outcome, update_pattern_weights, Outcome, MODEL_LEARNING_RATE, PATTERN_LEARNING_RATE,
};
pub use model::ValueModel;
pub use patterns::{Pattern, PatternWeightTable, Symbol, BASE_WEIGHTS};
