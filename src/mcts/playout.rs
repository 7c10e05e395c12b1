//! Random playouts.
//!
//! A playout plays uniformly random candidate moves, alternating sides,
//! until someone makes five or no candidate is left. The candidate set is
//! kept incrementally: each placed stone removes its own cell and adds the
//! empty cells within radius 2 that were not candidates yet.

use crate::board::{Bitboard, Board, Pos, Side};
use crate::rules::has_five_at_pos;
use crate::search::{candidates, CANDIDATE_RADIUS};

/// Candidate set maintained across the moves of one playout.
struct PlayoutMoves {
    moves: Vec<Pos>,
    seen: Bitboard,
}

impl PlayoutMoves {
    fn new(board: &Board) -> Self {
        let moves = candidates(board);
        let mut seen = Bitboard::new();
        for &mv in &moves {
            seen.insert(mv);
        }
        Self { moves, seen }
    }

    /// Remove and return a uniformly chosen candidate.
    fn pick(&mut self, rng: &mut fastrand::Rng) -> Option<Pos> {
        if self.moves.is_empty() {
            return None;
        }
        let idx = rng.usize(..self.moves.len());
        Some(self.moves.swap_remove(idx))
    }

    fn add_neighbours(&mut self, board: &Board, pos: Pos) {
        for dr in -CANDIDATE_RADIUS..=CANDIDATE_RADIUS {
            for dc in -CANDIDATE_RADIUS..=CANDIDATE_RADIUS {
                if let Some(p) = pos.offset(dr, dc, 1) {
                    if board.is_empty(p) && self.seen.insert(p) {
                        self.moves.push(p);
                    }
                }
            }
        }
    }
}

/// Play random moves on a copy of `board`, starting with `to_move`, and
/// return the final position.
pub fn random_playout(board: &Board, to_move: Side, rng: &mut fastrand::Rng) -> Board {
    let mut board = board.clone();
    let mut moves = PlayoutMoves::new(&board);
    let mut mover = to_move;

    while let Some(mv) = moves.pick(rng) {
        board.place_unchecked(mv, mover);
        if has_five_at_pos(&board, mv, mover) {
            break;
        }
        moves.add_neighbours(&board, mv);
        mover = mover.opponent();
    }

    board
}
