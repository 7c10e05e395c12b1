//! Search module for move selection
//!
//! Contains:
//! - Candidate generation around existing stones
//! - Immediate threat detection (wins and must-blocks)
//! - Score cache keyed by exact board contents
//! - Minimax with alpha-beta pruning and iterative deepening

pub mod alphabeta;
pub mod movegen;
pub mod threat;
pub mod tt;

pub use alphabeta::{
    dynamic_max_depth, SearchLimits, SearchResult, SearchStats, Searcher, DEFAULT_TIME_BUDGET,
};
pub use movegen::{candidates, CANDIDATE_RADIUS};
pub use threat::threats;
pub use tt::{CacheEntry, CachePolicy, CacheStats, TranspositionCache};
