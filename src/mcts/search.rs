//! MCTS search loop.
//!
//! Each iteration selects a leaf by UCB1, expands one untried move, runs a
//! random playout from the new node and scores the final board for the root
//! side. The same raw score is added at every ancestor; there is no per-ply
//! sign flip.

use std::time::Instant;

use crate::board::{Board, Pos, Side};
use crate::eval::Evaluator;

use super::node::NodeId;
use super::playout::random_playout;
use super::tree::{MctsTree, TreeStats};

/// Result of an MCTS run that produced a move.
#[derive(Debug, Clone)]
pub struct MctsResult {
    pub best_move: Pos,
    /// Mean reward of the chosen root child
    pub mean_reward: f64,
    pub iterations: u32,
    pub tree: TreeStats,
}

/// MCTS move selector. Owns the playout RNG so seeded runs repeat.
#[derive(Debug)]
pub struct MctsSearcher {
    rng: fastrand::Rng,
}

impl Default for MctsSearcher {
    fn default() -> Self {
        Self::new(None)
    }
}

impl MctsSearcher {
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => fastrand::Rng::with_seed(s),
            None => fastrand::Rng::new(),
        };
        Self { rng }
    }

    /// Run `iterations` rounds from `board` with `side` to move.
    ///
    /// Returns `None` when no root child was created, i.e. zero iterations,
    /// a board without candidates, or a board that already has a five.
    pub fn search(
        &mut self,
        board: &Board,
        side: Side,
        iterations: u32,
        evaluator: &Evaluator,
    ) -> Option<MctsResult> {
        let start = Instant::now();
        let mut tree = MctsTree::new(board.clone(), side);

        for _ in 0..iterations {
            let leaf = tree.select_leaf();
            let reward = self.simulate(&tree, leaf, side, evaluator);
            tree.backpropagate(leaf, reward);
        }

        let stats = tree.stats();
        let Some((best_move, mean_reward)) = tree.best_move() else {
            log::debug!("mcts: no move after {iterations} iterations");
            return None;
        };

        log::debug!(
            "mcts: {best_move} mean={mean_reward:.1} iterations={iterations} nodes={} depth={} in {:?}",
            stats.total_nodes,
            stats.max_depth,
            start.elapsed()
        );

        Some(MctsResult {
            best_move,
            mean_reward,
            iterations,
            tree: stats,
        })
    }

    fn simulate(&mut self, tree: &MctsTree, leaf: NodeId, root_side: Side, evaluator: &Evaluator) -> f64 {
        let node = tree.get(leaf);
        if node.is_terminal {
            return evaluator.score(&node.board, root_side);
        }
        let end = random_playout(&node.board, node.to_move, &mut self.rng);
        evaluator.score(&end, root_side)
    }
}
