//! Candidate move generation
//!
//! Only empty cells near existing stones are worth searching. Cells are
//! collected by walking occupied cells in row-major order and scanning the
//! square of radius 2 around each, so the output order is deterministic.

use crate::board::{Bitboard, Board, Pos};

/// Chebyshev radius around occupied cells
pub const CANDIDATE_RADIUS: i32 = 2;

/// Empty cells within radius 2 of any stone, each listed once.
///
/// Empty on a blank board; callers handle the opening move themselves.
#[must_use]
pub fn candidates(board: &Board) -> Vec<Pos> {
    let mut moves = Vec::with_capacity(64);
    let occupied = board.occupied();
    let mut seen = Bitboard::new();

    for pos in occupied.iter_ones() {
        for dr in -CANDIDATE_RADIUS..=CANDIDATE_RADIUS {
            for dc in -CANDIDATE_RADIUS..=CANDIDATE_RADIUS {
                let Some(p) = pos.offset(dr, dc, 1) else {
                    continue;
                };
                if !occupied.get(p) && seen.insert(p) {
                    moves.push(p);
                }
            }
        }
    }

    moves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Side, BOARD_SIZE, TOTAL_CELLS};
    use std::collections::HashSet;

    #[test]
    fn test_empty_board_has_no_candidates() {
        assert!(candidates(&Board::new()).is_empty());
    }

    #[test]
    fn test_single_stone_radius() {
        let mut board = Board::new();
        board.place(Pos::new(7, 7), Side::Black).unwrap();
        let moves = candidates(&board);
        assert_eq!(moves.len(), 24);
        assert!(moves.iter().all(|m| m.row.abs_diff(7) <= 2 && m.col.abs_diff(7) <= 2));
        assert!(!moves.contains(&Pos::new(7, 7)));
    }

    #[test]
    fn test_corner_stone_is_clipped() {
        let mut board = Board::new();
        board.place(Pos::new(0, 0), Side::White).unwrap();
        // 3x3 corner square minus the stone
        assert_eq!(candidates(&board).len(), 8);
    }

    #[test]
    fn test_no_duplicates_and_no_occupied() {
        let mut board = Board::new();
        board.place(Pos::new(7, 7), Side::Black).unwrap();
        board.place(Pos::new(7, 8), Side::White).unwrap();
        board.place(Pos::new(8, 8), Side::Black).unwrap();

        let moves = candidates(&board);
        let unique: HashSet<_> = moves.iter().copied().collect();
        assert_eq!(unique.len(), moves.len());
        assert!(moves.iter().all(|&m| board.is_empty(m)));
    }

    #[test]
    fn test_order_follows_first_occupied_cell() {
        let mut board = Board::new();
        board.place(Pos::new(5, 5), Side::Black).unwrap();
        let moves = candidates(&board);
        assert_eq!(moves[0], Pos::new(3, 3));
        assert_eq!(moves[1], Pos::new(3, 4));
    }

    #[test]
    fn test_full_board_has_no_candidates() {
        let mut board = Board::new();
        for idx in 0..TOTAL_CELLS {
            let side = if (idx / BOARD_SIZE + idx) % 2 == 0 { Side::Black } else { Side::White };
            board.place(Pos::from_index(idx), side).unwrap();
        }
        assert!(candidates(&board).is_empty());
    }
}
