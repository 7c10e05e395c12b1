//! Heuristic evaluation function for board positions
//!
//! Every stone contributes a per-cell score: the pattern weights matched in
//! the 9-cell windows through it along the four axes, plus a centre bonus.
//! Own stones add, opponent stones (scored from their own point of view)
//! subtract. On top of that sits the learned model's output times a fixed
//! scale, which is large on purpose and dominates once the model is trained.

use crate::board::{Board, Pos, Side, BOARD_SIZE, TOTAL_CELLS};
use crate::rules::DIRECTIONS;

use super::model::ValueModel;
use super::patterns::{PatternWeightTable, Symbol};

/// Cells on each side of the anchor in a line window
const WINDOW_REACH: i32 = 4;

/// Longest possible window (4 + anchor + 4)
const WINDOW_LEN: usize = 2 * WINDOW_REACH as usize + 1;

/// Centre row/column
const CENTER: i32 = (BOARD_SIZE / 2) as i32;

/// Default weight of the learned term
pub const DEFAULT_MODEL_SCALE: f64 = 1000.0;

/// Pattern table plus learned model, scoring boards for either side.
#[derive(Debug, Clone)]
pub struct Evaluator {
    weights: PatternWeightTable,
    model: ValueModel,
    model_scale: f64,
}

impl Evaluator {
    pub fn new(weights: PatternWeightTable, model: ValueModel, model_scale: f64) -> Self {
        debug_assert_eq!(model.input_size(), TOTAL_CELLS);
        Self {
            weights,
            model,
            model_scale,
        }
    }

    /// Default pattern table and a freshly initialised model.
    pub fn with_seed(hidden_size: usize, seed: Option<u64>) -> Self {
        Self::new(
            PatternWeightTable::default(),
            ValueModel::with_seed(TOTAL_CELLS, hidden_size, seed),
            DEFAULT_MODEL_SCALE,
        )
    }

    pub fn weights(&self) -> &PatternWeightTable {
        &self.weights
    }

    pub fn weights_mut(&mut self) -> &mut PatternWeightTable {
        &mut self.weights
    }

    pub fn model(&self) -> &ValueModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut ValueModel {
        &mut self.model
    }

    pub fn model_scale(&self) -> f64 {
        self.model_scale
    }

    /// Evaluate the board from the perspective of `side`.
    ///
    /// Higher is better for `side`. Not antisymmetric:
    /// `score(b, s) != -score(b, s.opponent())` in general, but relabelling
    /// every stone and scoring for the other side gives the same number.
    #[must_use]
    pub fn score(&self, board: &Board, side: Side) -> f64 {
        let heuristic = self.pattern_score(board, side);
        let learned = self.model.forward(&board.flatten(side));
        heuristic + learned * self.model_scale
    }

    /// Heuristic part of [`score`](Self::score), without the learned term.
    #[must_use]
    pub fn pattern_score(&self, board: &Board, side: Side) -> f64 {
        let opponent = side.opponent();
        let mut score = 0.0;

        for idx in 0..TOTAL_CELLS {
            let pos = Pos::from_index(idx);
            match board.get(pos) {
                Some(s) if s == side => score += self.position_score(board, pos, side),
                Some(_) => score -= self.position_score(board, pos, opponent),
                None => {}
            }
        }

        score
    }

    /// Per-stone score: pattern matches on all four axes plus centre bonus.
    fn position_score(&self, board: &Board, pos: Pos, side: Side) -> f64 {
        let mut score = 0.0;
        for &(dr, dc) in &DIRECTIONS {
            let mut buf = [Symbol::Empty; WINDOW_LEN];
            let len = line_window(board, pos, dr, dc, side, &mut buf);
            score += self.weights.line_score(&buf[..len]);
        }
        score + centrality(pos)
    }
}

/// `10 - manhattan_distance_to_centre / 2`
#[inline]
pub fn centrality(pos: Pos) -> f64 {
    let dist = (i32::from(pos.row) - CENTER).abs() + (i32::from(pos.col) - CENTER).abs();
    10.0 - f64::from(dist) / 2.0
}

/// Fill `buf` with the window of up to 9 cells centred on `pos` along
/// `(dr, dc)`, seen from `side`. Cells off the board are dropped rather than
/// padded, so windows near an edge are shorter. Returns the window length.
pub fn line_window(
    board: &Board,
    pos: Pos,
    dr: i32,
    dc: i32,
    side: Side,
    buf: &mut [Symbol; WINDOW_LEN],
) -> usize {
    let mut len = 0;
    for k in -WINDOW_REACH..=WINDOW_REACH {
        if let Some(p) = pos.offset(dr, dc, k) {
            buf[len] = match board.get(p) {
                Some(s) if s == side => Symbol::Own,
                None => Symbol::Empty,
                Some(_) => Symbol::Other,
            };
            len += 1;
        }
    }
    len
}
