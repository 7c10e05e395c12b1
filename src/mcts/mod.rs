//! Monte Carlo tree search over the same board and evaluator as minimax.
//!
//! Four phases per iteration:
//!
//! 1. **Selection**: descend by UCB1 while the node is fully expanded and
//!    not terminal
//! 2. **Expansion**: add one child for the next untried candidate move
//! 3. **Simulation**: random playout to a five or to exhaustion, scored from
//!    the root side
//! 4. **Backpropagation**: add the score and one visit at every ancestor
//!
//! The move returned is the root child with the highest mean reward. The
//! tree is rebuilt on every call.

pub mod node;
pub mod playout;
pub mod search;
pub mod tree;

pub use node::{MctsNode, NodeId};
pub use playout::random_playout;
pub use search::{MctsResult, MctsSearcher};
pub use tree::{MctsTree, TreeStats};
