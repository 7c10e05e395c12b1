//! MCTS tree node.
//!
//! Each node owns a snapshot of the board reached by playing `mv` from its
//! parent, together with the visit statistics used by UCB1 selection.

use crate::board::{Board, Pos, Side};

/// Index into the node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }
}

/// A node in the MCTS tree.
#[derive(Debug, Clone)]
pub struct MctsNode {
    /// Parent node index (NONE for root)
    pub parent: NodeId,

    /// Move that led here from the parent (None for root)
    pub mv: Option<Pos>,

    /// Board after `mv`
    pub board: Board,

    /// Side to move at this node
    pub to_move: Side,

    /// Candidate moves not yet expanded, consumed front to back
    untried: Vec<Pos>,
    next_untried: usize,

    /// Expanded children, in expansion order
    pub children: Vec<NodeId>,

    pub visits: u32,

    /// Sum of rewards backpropagated through this node
    pub wins: f64,

    /// A five is already on the board
    pub is_terminal: bool,
}

impl MctsNode {
    pub fn new_root(board: Board, to_move: Side, untried: Vec<Pos>, is_terminal: bool) -> Self {
        Self {
            parent: NodeId::NONE,
            mv: None,
            board,
            to_move,
            untried,
            next_untried: 0,
            children: Vec::new(),
            visits: 0,
            wins: 0.0,
            is_terminal,
        }
    }

    pub fn new_child(
        parent: NodeId,
        mv: Pos,
        board: Board,
        to_move: Side,
        untried: Vec<Pos>,
        is_terminal: bool,
    ) -> Self {
        Self {
            parent,
            mv: Some(mv),
            ..Self::new_root(board, to_move, untried, is_terminal)
        }
    }

    /// All candidate moves have a child.
    #[inline]
    pub fn is_fully_expanded(&self) -> bool {
        self.next_untried >= self.untried.len()
    }

    /// Next move to expand, in candidate order.
    pub(crate) fn take_untried(&mut self) -> Option<Pos> {
        let mv = self.untried.get(self.next_untried).copied()?;
        self.next_untried += 1;
        Some(mv)
    }

    #[inline]
    pub fn untried_count(&self) -> usize {
        self.untried.len() - self.next_untried
    }

    /// Mean reward; 0.0 if never visited.
    #[inline]
    pub fn mean_reward(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.wins / f64::from(self.visits)
        }
    }

    /// UCB1: `wins/visits + sqrt(2 ln N / visits)`.
    ///
    /// Unvisited nodes score +inf so they are tried first.
    #[inline]
    pub fn ucb1(&self, parent_visits: u32) -> f64 {
        if self.visits == 0 {
            return f64::INFINITY;
        }
        let n = f64::from(self.visits);
        self.mean_reward() + (2.0 * f64::from(parent_visits).ln() / n).sqrt()
    }

    pub fn update(&mut self, reward: f64) {
        self.visits += 1;
        self.wins += reward;
    }
}
