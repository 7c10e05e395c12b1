//! Win condition checking
//!
//! A side wins with five or more of its stones in an unbroken line along
//! one of the four axes. Overlines count.

use crate::board::{Board, Pos, Side};

/// Direction vectors for line checking (4 directions)
pub const DIRECTIONS: [(i32, i32); 4] = [
    (0, 1),  // Horizontal
    (1, 0),  // Vertical
    (1, 1),  // Diagonal SE
    (1, -1), // Diagonal SW
];

/// Check if there's 5+ in a row for the given side
pub fn has_five_in_row(board: &Board, side: Side) -> bool {
    board
        .stones(side)
        .iter_ones()
        .any(|pos| has_five_at_pos(board, pos, side))
}

/// Count same-side stones stepping away from `pos` along `(dr, dc)`,
/// not counting `pos` itself.
#[inline]
fn count_direction(board: &Board, pos: Pos, dr: i32, dc: i32, side: Side) -> i32 {
    let mut count = 0;
    let mut k = 1;
    while let Some(p) = pos.offset(dr, dc, k) {
        if board.get(p) != Some(side) {
            break;
        }
        count += 1;
        k += 1;
    }
    count
}

/// Five-in-a-row check anchored at a specific position.
///
/// Only checks the 4 axes through `pos`, counting outward both ways.
#[inline]
pub fn has_five_at_pos(board: &Board, pos: Pos, side: Side) -> bool {
    DIRECTIONS.iter().any(|&(dr, dc)| {
        1 + count_direction(board, pos, dr, dc, side) + count_direction(board, pos, -dr, -dc, side)
            >= 5
    })
}

/// Find the positions of a 5-in-a-row if exists
///
/// Returns the full run (at least 5 positions, ordered along the axis).
pub fn find_five_positions(board: &Board, side: Side) -> Option<Vec<Pos>> {
    for pos in board.stones(side).iter_ones() {
        for &(dr, dc) in &DIRECTIONS {
            // Only start from the first stone of a run
            if pos.offset(-dr, -dc, 1).is_some_and(|p| board.get(p) == Some(side)) {
                continue;
            }
            let len = 1 + count_direction(board, pos, dr, dc, side);
            if len >= 5 {
                return Some((0..len).filter_map(|k| pos.offset(dr, dc, k)).collect());
            }
        }
    }
    None
}

/// Side holding a five, if any. Black is reported first when both do.
pub fn winner(board: &Board) -> Option<Side> {
    [Side::Black, Side::White]
        .into_iter()
        .find(|&side| has_five_in_row(board, side))
}
