//! Immediate threat detection
//!
//! A threat is an empty cell where one more stone completes five, either
//! for the side to move (a win) or for the opponent (a must-block). The
//! search only uses threats to put those cells first in the root ordering.

use crate::board::{Board, Pos, Side, TOTAL_CELLS};

/// Cells that win for `side` or block an opponent win, in row-major order.
///
/// A cell that is both is listed twice. The board is restored before
/// returning.
#[must_use]
pub fn threats(board: &mut Board, side: Side) -> Vec<Pos> {
    let opponent = side.opponent();
    let mut found = Vec::new();

    for idx in 0..TOTAL_CELLS {
        let pos = Pos::from_index(idx);
        if !board.is_empty(pos) {
            continue;
        }

        board.place_unchecked(pos, side);
        if board.has_five_in_row(side) {
            found.push(pos);
        }
        board.undo(pos);

        board.place_unchecked(pos, opponent);
        if board.has_five_in_row(opponent) {
            found.push(pos);
        }
        board.undo(pos);
    }

    found
}
