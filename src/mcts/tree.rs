//! MCTS tree structure with arena allocation.
//!
//! Nodes live in a contiguous Vec and refer to each other by [`NodeId`].
//! Parent links are plain indices used only when backpropagating.

use crate::board::{Board, Pos, Side};
use crate::rules::{has_five_at_pos, has_five_in_row};
use crate::search::candidates;

use super::node::{MctsNode, NodeId};

/// MCTS tree with arena-based node storage.
#[derive(Debug)]
pub struct MctsTree {
    nodes: Vec<MctsNode>,
    root: NodeId,
}

impl MctsTree {
    /// Create a tree rooted at `board` with `to_move` to play.
    pub fn new(board: Board, to_move: Side) -> Self {
        let is_terminal = has_five_in_row(&board, Side::Black) || has_five_in_row(&board, Side::White);
        let untried = if is_terminal { Vec::new() } else { candidates(&board) };
        Self {
            nodes: vec![MctsNode::new_root(board, to_move, untried, is_terminal)],
            root: NodeId(0),
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &MctsNode {
        &self.nodes[id.0 as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut MctsNode {
        &mut self.nodes[id.0 as usize]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn allocate(&mut self, node: MctsNode) -> NodeId {
        #[allow(clippy::cast_possible_truncation)]
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Child of `node_id` with the highest UCB1. Ties keep the first child.
    pub fn select_child(&self, node_id: NodeId) -> Option<NodeId> {
        let node = self.get(node_id);
        let mut best: Option<(NodeId, f64)> = None;
        for &child in &node.children {
            let score = self.get(child).ucb1(node.visits);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((child, score));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Add a child for the next untried move of `parent_id`.
    ///
    /// Returns `None` when the parent is already fully expanded.
    pub fn expand(&mut self, parent_id: NodeId) -> Option<NodeId> {
        let mv = self.get_mut(parent_id).take_untried()?;
        let parent = self.get(parent_id);
        let mover = parent.to_move;

        let mut board = parent.board.clone();
        board.place_unchecked(mv, mover);
        let is_terminal = has_five_at_pos(&board, mv, mover);
        let untried = if is_terminal { Vec::new() } else { candidates(&board) };

        let child = MctsNode::new_child(parent_id, mv, board, mover.opponent(), untried, is_terminal);
        let child_id = self.allocate(child);
        self.get_mut(parent_id).children.push(child_id);
        Some(child_id)
    }

    /// Descend by UCB1 while nodes are fully expanded and non-terminal, then
    /// expand one child if possible. Returns the node to simulate from.
    pub fn select_leaf(&mut self) -> NodeId {
        let mut current = self.root;
        loop {
            let node = self.get(current);
            if !node.is_fully_expanded() {
                return self.expand(current).unwrap_or(current);
            }
            if node.is_terminal {
                return current;
            }
            match self.select_child(current) {
                Some(child) => current = child,
                None => return current,
            }
        }
    }

    /// Add `reward` to every node from `leaf_id` up to the root.
    pub fn backpropagate(&mut self, leaf_id: NodeId, reward: f64) {
        let mut current = leaf_id;
        while current.is_some() {
            let node = self.get_mut(current);
            node.update(reward);
            current = node.parent;
        }
    }

    /// Root child with the highest mean reward. Ties keep the first child.
    pub fn best_move(&self) -> Option<(Pos, f64)> {
        let root = self.get(self.root);
        let mut best: Option<(Pos, f64)> = None;
        for &child_id in &root.children {
            let child = self.get(child_id);
            let (Some(mv), true) = (child.mv, child.visits > 0) else {
                continue;
            };
            let rate = child.mean_reward();
            if best.map_or(true, |(_, r)| rate > r) {
                best = Some((mv, rate));
            }
        }
        best
    }

    pub fn stats(&self) -> TreeStats {
        let root = self.get(self.root);
        TreeStats {
            total_nodes: self.nodes.len(),
            root_children: root.children.len(),
            root_visits: root.visits,
            max_depth: self.compute_max_depth(self.root, 0),
        }
    }

    fn compute_max_depth(&self, node_id: NodeId, current_depth: u32) -> u32 {
        self.get(node_id)
            .children
            .iter()
            .map(|&id| self.compute_max_depth(id, current_depth + 1))
            .max()
            .unwrap_or(current_depth)
    }
}

/// Statistics about an MCTS tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub root_children: usize,
    pub root_visits: u32,
    pub max_depth: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_stone() -> Board {
        let mut board = Board::new();
        board.place(Pos::new(7, 7), Side::Black).unwrap();
        board
    }

    #[test]
    fn test_new_tree() {
        let tree = MctsTree::new(one_stone(), Side::White);
        assert_eq!(tree.len(), 1);
        let root = tree.get(tree.root());
        assert!(root.parent.is_none());
        assert!(root.mv.is_none());
        assert_eq!(root.untried_count(), 24);
        assert!(!root.is_terminal);
    }

    #[test]
    fn test_expand_follows_candidate_order() {
        let mut tree = MctsTree::new(one_stone(), Side::White);
        let order = candidates(&one_stone());

        let first = tree.expand(tree.root()).unwrap();
        let second = tree.expand(tree.root()).unwrap();
        assert_eq!(tree.get(first).mv, Some(order[0]));
        assert_eq!(tree.get(second).mv, Some(order[1]));

        let child = tree.get(first);
        assert_eq!(child.to_move, Side::Black);
        assert_eq!(child.board.get(order[0]), Some(Side::White));
        assert_eq!(child.parent, tree.root());
        assert_eq!(tree.get(tree.root()).children, vec![first, second]);
    }

    #[test]
    fn test_winning_expansion_is_terminal() {
        let mut board = Board::new();
        for c in 0..4 {
            board.place(Pos::new(0, c), Side::Black).unwrap();
        }
        let mut tree = MctsTree::new(board, Side::Black);
        let mut found = false;
        while let Some(id) = tree.expand(tree.root()) {
            let node = tree.get(id);
            if node.mv == Some(Pos::new(0, 4)) {
                assert!(node.is_terminal);
                assert!(node.is_fully_expanded());
                found = true;
            } else {
                assert!(!node.is_terminal);
            }
        }
        assert!(found);
    }

    #[test]
    fn test_backpropagate_reaches_root() {
        let mut tree = MctsTree::new(one_stone(), Side::White);
        let child = tree.expand(tree.root()).unwrap();
        let grandchild = tree.expand(child).unwrap();

        tree.backpropagate(grandchild, 5.0);
        tree.backpropagate(child, -1.0);

        assert_eq!(tree.get(grandchild).visits, 1);
        assert_eq!(tree.get(child).visits, 2);
        assert_eq!(tree.get(tree.root()).visits, 2);
        assert!((tree.get(tree.root()).wins - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_select_leaf_expands_root_first() {
        let mut tree = MctsTree::new(one_stone(), Side::White);
        for i in 0..24 {
            let leaf = tree.select_leaf();
            assert_eq!(tree.get(leaf).parent, tree.root());
            tree.backpropagate(leaf, f64::from(i));
        }
        assert!(tree.get(tree.root()).is_fully_expanded());

        // next selection descends into the best child and expands below it
        let leaf = tree.select_leaf();
        assert_ne!(tree.get(leaf).parent, tree.root());
    }

    #[test]
    fn test_best_move_uses_mean_reward() {
        let mut tree = MctsTree::new(one_stone(), Side::White);
        let a = tree.expand(tree.root()).unwrap();
        let b = tree.expand(tree.root()).unwrap();
        tree.backpropagate(a, 10.0);
        tree.backpropagate(a, 0.0);
        tree.backpropagate(b, 6.0);

        let (mv, rate) = tree.best_move().unwrap();
        assert_eq!(Some(mv), tree.get(b).mv);
        assert!((rate - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_board_has_no_moves() {
        let mut tree = MctsTree::new(Board::new(), Side::Black);
        let leaf = tree.select_leaf();
        assert_eq!(leaf, tree.root());
        assert!(tree.best_move().is_none());
    }

    #[test]
    fn test_stats() {
        let mut tree = MctsTree::new(one_stone(), Side::White);
        let child = tree.expand(tree.root()).unwrap();
        tree.expand(child).unwrap();
        let stats = tree.stats();
        assert_eq!(stats.total_nodes, 3);
        assert_eq!(stats.root_children, 1);
        assert_eq!(stats.max_depth, 2);
    }
}
