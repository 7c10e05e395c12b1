//! Alpha-beta search with iterative deepening and a score cache
//!
//! The search is a plain minimax over root-side evaluations: every leaf is
//! scored from the perspective of the side that is choosing the move, the
//! root side maximises and the opponent minimises. Alpha-beta pruning is
//! applied on top of that and never changes the returned value.
//!
//! Root ordering puts immediate threats first (wins and must-blocks), then
//! the proximity candidates, and sorts the lot by a one-ply evaluation. Each
//! root move is searched with a fresh full window.
//!
//! Iterative deepening starts at depth 1 and stops at a depth limit derived
//! from the number of empty cells. The time budget is only checked between
//! depths, so a depth that has started always finishes.
//!
//! # Example
//!
//! ```
//! use omok::board::{Board, Pos, Side};
//! use omok::eval::Evaluator;
//! use omok::search::{CachePolicy, SearchLimits, Searcher};
//!
//! let mut board = Board::new();
//! board.place(Pos::new(7, 7), Side::Black).unwrap();
//!
//! let evaluator = Evaluator::with_seed(16, Some(1));
//! let mut searcher = Searcher::new(CachePolicy::Unconditional);
//! let limits = SearchLimits { max_depth: Some(1), ..SearchLimits::default() };
//!
//! let result = searcher.select_move(&mut board, Side::White, &evaluator, &limits).unwrap();
//! assert!(board.is_empty(result.best_move));
//! ```

use std::time::{Duration, Instant};

use crate::board::{Board, Pos, Side};
use crate::error::EngineError;
use crate::eval::Evaluator;

use super::movegen::candidates;
use super::threat::threats;
use super::tt::{CachePolicy, CacheStats, TranspositionCache};

/// Default wall-clock budget per move
pub const DEFAULT_TIME_BUDGET: Duration = Duration::from_millis(5000);

/// Depth limit for a position with `empty` empty cells.
///
/// Emptier boards have more candidates per node, so they get fewer plies.
#[must_use]
pub fn dynamic_max_depth(empty: usize) -> u8 {
    match empty {
        e if e > 200 => 3,
        e if e > 150 => 4,
        e if e > 100 => 5,
        _ => 6,
    }
}

/// Per-call search limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    /// Budget checked between iterative-deepening depths
    pub time_budget: Duration,
    /// Optional cap below the dynamic depth limit
    pub max_depth: Option<u8>,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            time_budget: DEFAULT_TIME_BUDGET,
            max_depth: None,
        }
    }
}

impl SearchLimits {
    /// Depth limit for `board`: the dynamic limit, lowered by `max_depth`
    /// if set, and never below 1.
    pub fn depth_limit(&self, board: &Board) -> u8 {
        let dynamic = dynamic_max_depth(board.empty_count());
        self.max_depth.map_or(dynamic, |cap| cap.min(dynamic)).max(1)
    }
}

/// Search statistics for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Minimax nodes visited, cache hits included
    pub nodes: u64,
    /// Sibling lists cut short by pruning
    pub cutoffs: u64,
    /// Nodes answered from the cache
    pub cache_hits: u64,
}

/// Outcome of [`Searcher::select_move`].
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub best_move: Pos,
    /// Root-side score of `best_move` at the deepest completed depth
    pub score: f64,
    /// Deepest completed depth
    pub depth: u8,
    /// Total nodes searched across all depths
    pub nodes: u64,
    pub stats: SearchStats,
    /// Progress lines, one per root improvement and one per depth
    pub log: Vec<String>,
}

/// Minimax searcher with a persistent score cache.
///
/// The cache survives between calls, so repeated searches in the same game
/// reuse earlier work. Call [`Searcher::clear_cache`] when starting a new
/// game or after the evaluator has been retrained.
#[derive(Debug, Default)]
pub struct Searcher {
    cache: TranspositionCache,
    stats: SearchStats,
}

impl Searcher {
    #[must_use]
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            cache: TranspositionCache::new(policy),
            stats: SearchStats::default(),
        }
    }

    /// Choose a move for `side` by iterative deepening.
    ///
    /// The board is mutated during the search and restored before
    /// returning. Fails with [`EngineError::NoMoveAvailable`] when there is
    /// no threat and no candidate, which includes the blank board.
    pub fn select_move(
        &mut self,
        board: &mut Board,
        side: Side,
        evaluator: &Evaluator,
        limits: &SearchLimits,
    ) -> Result<SearchResult, EngineError> {
        let start = Instant::now();
        self.stats = SearchStats::default();

        let root_moves = self.order_root_moves(board, side, evaluator);
        if root_moves.is_empty() {
            return Err(EngineError::NoMoveAvailable);
        }

        let max_depth = limits.depth_limit(board);
        let mut log_lines = Vec::new();
        let mut best: Option<(Pos, f64, u8)> = None;

        log::debug!(
            "search start: side={side} empty={} root_moves={} max_depth={max_depth}",
            board.empty_count(),
            root_moves.len()
        );

        for depth in 1..=max_depth {
            // Depth 1 always runs so there is a move to return
            if depth > 1 && start.elapsed() >= limits.time_budget {
                log::debug!("time budget exhausted before depth {depth}");
                break;
            }

            if let Some((mv, score)) =
                self.search_root(board, side, &root_moves, depth, evaluator, &mut log_lines)
            {
                let line = format!("Depth {depth}: Best move found at {mv}");
                log::debug!("{line}");
                log_lines.push(line);
                best = Some((mv, score, depth));
            }
        }

        let (best_move, score, depth) = best.ok_or(EngineError::NoMoveAvailable)?;
        let cache = self.cache.stats();
        log::debug!(
            "search done: {best_move} score={score} depth={depth} nodes={} cutoffs={} cache={} entries/{}% hits in {:?}",
            self.stats.nodes,
            self.stats.cutoffs,
            cache.entries,
            cache.hit_percent(),
            start.elapsed()
        );

        Ok(SearchResult {
            best_move,
            score,
            depth,
            nodes: self.stats.nodes,
            stats: self.stats,
            log: log_lines,
        })
    }

    /// Threats then candidates, stably sorted by one-ply evaluation, best
    /// first. A cell that is both a threat and a candidate appears more
    /// than once.
    pub fn order_root_moves(&self, board: &mut Board, side: Side, evaluator: &Evaluator) -> Vec<Pos> {
        let mut moves = threats(board, side);
        moves.extend(candidates(board));

        let mut scored: Vec<(Pos, f64)> = moves
            .into_iter()
            .map(|mv| {
                board.place_unchecked(mv, side);
                let score = evaluator.score(board, side);
                board.undo(mv);
                (mv, score)
            })
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.into_iter().map(|(mv, _)| mv).collect()
    }

    /// Search every root move to `depth` and return the best, keeping the
    /// first of equal scores.
    fn search_root(
        &mut self,
        board: &mut Board,
        side: Side,
        root_moves: &[Pos],
        depth: u8,
        evaluator: &Evaluator,
        log_lines: &mut Vec<String>,
    ) -> Option<(Pos, f64)> {
        let mut best: Option<(Pos, f64)> = None;

        for &mv in root_moves {
            board.place_unchecked(mv, side);
            let score = self.minimax(board, depth, false, side, f64::NEG_INFINITY, f64::INFINITY, evaluator);
            board.undo(mv);

            if best.map_or(true, |(_, s)| score > s) {
                best = Some((mv, score));
                let line = format!("Best move at depth {depth}: {mv} with score {score}");
                log::debug!("{line}");
                log_lines.push(line);
            }
        }

        best
    }

    /// Minimax value of `board` for `root_side` with alpha-beta pruning.
    ///
    /// `maximizing` says whose turn it is: `true` for the root side. A node
    /// is a leaf when `depth` is 0, when either side already has five, or
    /// when there is no candidate left; leaves are scored with
    /// `evaluator.score(board, root_side)`.
    #[allow(clippy::too_many_arguments)]
    pub fn minimax(
        &mut self,
        board: &mut Board,
        depth: u8,
        maximizing: bool,
        root_side: Side,
        mut alpha: f64,
        mut beta: f64,
        evaluator: &Evaluator,
    ) -> f64 {
        self.stats.nodes += 1;

        let key = board.key(root_side);
        if let Some(score) = self.cache.probe(&key, depth) {
            self.stats.cache_hits += 1;
            return score;
        }

        let opponent = root_side.opponent();
        if depth == 0 || board.has_five_in_row(root_side) || board.has_five_in_row(opponent) {
            let score = evaluator.score(board, root_side);
            self.cache.store(key, depth, score);
            return score;
        }

        let moves = candidates(board);
        if moves.is_empty() {
            let score = evaluator.score(board, root_side);
            self.cache.store(key, depth, score);
            return score;
        }

        let score = if maximizing {
            let mut best = f64::NEG_INFINITY;
            for mv in moves {
                board.place_unchecked(mv, root_side);
                let s = self.minimax(board, depth - 1, false, root_side, alpha, beta, evaluator);
                board.undo(mv);

                best = best.max(s);
                alpha = alpha.max(s);
                if best >= beta {
                    self.stats.cutoffs += 1;
                    break;
                }
            }
            best
        } else {
            let mut best = f64::INFINITY;
            for mv in moves {
                board.place_unchecked(mv, opponent);
                let s = self.minimax(board, depth - 1, true, root_side, alpha, beta, evaluator);
                board.undo(mv);

                best = best.min(s);
                beta = beta.min(s);
                if best <= alpha {
                    self.stats.cutoffs += 1;
                    break;
                }
            }
            best
        };

        self.cache.store(key, depth, score);
        score
    }

    /// Statistics of the last `select_move` call
    #[inline]
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    #[inline]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    #[inline]
    pub fn cache_policy(&self) -> CachePolicy {
        self.cache.policy()
    }

    pub fn set_cache_policy(&mut self, policy: CachePolicy) {
        self.cache.set_policy(policy);
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn evaluator() -> Evaluator {
        Evaluator::with_seed(16, Some(7))
    }

    fn limits(depth: u8) -> SearchLimits {
        SearchLimits {
            max_depth: Some(depth),
            ..SearchLimits::default()
        }
    }

    /// Unpruned, uncached reference minimax
    fn plain_minimax(board: &mut Board, depth: u8, maximizing: bool, root: Side, ev: &Evaluator) -> f64 {
        if depth == 0 || board.has_five_in_row(root) || board.has_five_in_row(root.opponent()) {
            return ev.score(board, root);
        }
        let moves = candidates(board);
        if moves.is_empty() {
            return ev.score(board, root);
        }
        let mover = if maximizing { root } else { root.opponent() };
        let scores = moves.into_iter().map(|mv| {
            board.place(mv, mover).unwrap();
            let s = plain_minimax(board, depth - 1, !maximizing, root, ev);
            board.undo(mv);
            s
        });
        if maximizing {
            scores.fold(f64::NEG_INFINITY, f64::max)
        } else {
            scores.fold(f64::INFINITY, f64::min)
        }
    }

    fn full_tree_nodes(board: &mut Board, depth: u8, mover: Side) -> u64 {
        if depth == 0 || board.has_five_in_row(Side::Black) || board.has_five_in_row(Side::White) {
            return 1;
        }
        let mut total = 1;
        for mv in candidates(board) {
            board.place(mv, mover).unwrap();
            total += full_tree_nodes(board, depth - 1, mover.opponent());
            board.undo(mv);
        }
        total
    }

    fn corner_board() -> Board {
        let mut board = Board::new();
        board.place(Pos::new(0, 0), Side::Black).unwrap();
        board.place(Pos::new(0, 1), Side::White).unwrap();
        board.place(Pos::new(1, 0), Side::Black).unwrap();
        board
    }

    #[test]
    fn test_dynamic_max_depth_thresholds() {
        assert_eq!(dynamic_max_depth(225), 3);
        assert_eq!(dynamic_max_depth(201), 3);
        assert_eq!(dynamic_max_depth(200), 4);
        assert_eq!(dynamic_max_depth(151), 4);
        assert_eq!(dynamic_max_depth(150), 5);
        assert_eq!(dynamic_max_depth(101), 5);
        assert_eq!(dynamic_max_depth(100), 6);
        assert_eq!(dynamic_max_depth(0), 6);
    }

    #[test]
    fn test_depth_limit_respects_cap() {
        let board = corner_board();
        assert_eq!(SearchLimits::default().depth_limit(&board), 3);
        assert_eq!(limits(2).depth_limit(&board), 2);
        assert_eq!(limits(9).depth_limit(&board), 3);
        assert_eq!(limits(0).depth_limit(&board), 1);
    }

    #[test]
    fn test_search_empty_board() {
        let mut searcher = Searcher::new(CachePolicy::Unconditional);
        let mut board = Board::new();
        let result = searcher.select_move(&mut board, Side::Black, &evaluator(), &limits(3));
        assert_matches!(result, Err(EngineError::NoMoveAvailable));
    }

    #[test]
    fn test_search_finds_winning_move() {
        let mut searcher = Searcher::new(CachePolicy::Unconditional);
        let mut board = Board::new();
        for c in 3..7 {
            board.place(Pos::new(7, c), Side::Black).unwrap();
        }
        board.place(Pos::new(8, 3), Side::White).unwrap();
        board.place(Pos::new(8, 4), Side::White).unwrap();

        let result = searcher
            .select_move(&mut board, Side::Black, &evaluator(), &limits(1))
            .unwrap();
        assert!(
            result.best_move == Pos::new(7, 2) || result.best_move == Pos::new(7, 7),
            "expected a winning cell, got {}",
            result.best_move
        );
    }

    #[test]
    fn test_search_blocks_opponent_win() {
        let mut searcher = Searcher::new(CachePolicy::Unconditional);
        let mut board = Board::new();
        for r in 0..4 {
            board.place(Pos::new(r, 10), Side::White).unwrap();
        }
        board.place(Pos::new(7, 7), Side::Black).unwrap();

        let result = searcher
            .select_move(&mut board, Side::Black, &evaluator(), &limits(1))
            .unwrap();
        assert_eq!(result.best_move, Pos::new(4, 10));
    }

    #[test]
    fn test_search_restores_board() {
        let mut searcher = Searcher::new(CachePolicy::Unconditional);
        let mut board = corner_board();
        let before = board.clone();
        let _ = searcher.select_move(&mut board, Side::White, &evaluator(), &limits(2));
        assert_eq!(board, before);
    }

    #[test]
    fn test_alpha_beta_matches_plain_minimax() {
        let ev = evaluator();
        let mut board = corner_board();
        for depth in 1..=3 {
            let expected = plain_minimax(&mut board, depth, true, Side::White, &ev);
            let mut searcher = Searcher::new(CachePolicy::Disabled);
            let got = searcher.minimax(
                &mut board,
                depth,
                true,
                Side::White,
                f64::NEG_INFINITY,
                f64::INFINITY,
                &ev,
            );
            assert_eq!(got, expected, "depth {depth}");
        }
    }

    #[test]
    fn test_pruning_visits_fewer_nodes() {
        let ev = evaluator();
        let mut board = corner_board();
        let mut searcher = Searcher::new(CachePolicy::Disabled);
        let _ = searcher.minimax(&mut board, 2, true, Side::White, f64::NEG_INFINITY, f64::INFINITY, &ev);

        assert!(searcher.stats.nodes < full_tree_nodes(&mut board, 2, Side::White));
        assert!(searcher.stats.cutoffs > 0);
    }

    #[test]
    fn test_terminal_board_is_a_leaf() {
        let ev = evaluator();
        let mut board = Board::new();
        for c in 0..5 {
            board.place(Pos::new(3, c), Side::White).unwrap();
        }
        board.place(Pos::new(4, 0), Side::Black).unwrap();

        let mut searcher = Searcher::new(CachePolicy::Unconditional);
        let score = searcher.minimax(&mut board, 3, false, Side::Black, f64::NEG_INFINITY, f64::INFINITY, &ev);
        assert_eq!(score, ev.score(&board, Side::Black));
        assert_eq!(searcher.stats.nodes, 1);
    }

    #[test]
    fn test_iterative_deepening_logs_each_depth() {
        let mut searcher = Searcher::new(CachePolicy::Unconditional);
        let mut board = corner_board();
        let result = searcher
            .select_move(&mut board, Side::White, &evaluator(), &limits(2))
            .unwrap();

        assert_eq!(result.depth, 2);
        assert!(result.nodes > 0);
        assert!(result.log.iter().any(|l| l.starts_with("Depth 1: Best move found at")));
        assert!(result.log.iter().any(|l| l.starts_with("Depth 2: Best move found at")));
        assert!(result.log.iter().any(|l| l.starts_with("Best move at depth 1:")));
    }

    #[test]
    fn test_zero_budget_still_completes_depth_one() {
        let mut searcher = Searcher::new(CachePolicy::Unconditional);
        let mut board = corner_board();
        let limits = SearchLimits {
            time_budget: Duration::ZERO,
            max_depth: None,
        };
        let result = searcher.select_move(&mut board, Side::White, &evaluator(), &limits).unwrap();
        assert_eq!(result.depth, 1);
    }

    #[test]
    fn test_root_ordering_puts_threats_first() {
        let ev = evaluator();
        let searcher = Searcher::new(CachePolicy::Unconditional);
        let mut board = Board::new();
        for r in 0..4 {
            board.place(Pos::new(r, 10), Side::White).unwrap();
        }
        board.place(Pos::new(7, 7), Side::Black).unwrap();

        let moves = searcher.order_root_moves(&mut board, Side::White, &ev);
        assert_eq!(moves[0], Pos::new(4, 10));
        // threat cell also appears among the candidates
        assert_eq!(moves.iter().filter(|&&m| m == Pos::new(4, 10)).count(), 2);
    }

    #[test]
    fn test_cache_is_reused_across_calls() {
        let mut searcher = Searcher::new(CachePolicy::Unconditional);
        let mut board = corner_board();
        let _ = searcher.select_move(&mut board, Side::White, &evaluator(), &limits(2));
        assert!(searcher.cache_stats().entries > 0);

        let _ = searcher.select_move(&mut board, Side::White, &evaluator(), &limits(2));
        assert!(searcher.stats().cache_hits > 0);

        searcher.clear_cache();
        assert_eq!(searcher.cache_stats().entries, 0);
    }

    #[test]
    fn test_cache_is_kept_per_side() {
        let ev = evaluator();
        let mut board = Board::new();
        board.place(Pos::new(7, 7), Side::Black).unwrap();

        let mut shared = Searcher::new(CachePolicy::Unconditional);
        let white = shared
            .select_move(&mut board, Side::White, &ev, &limits(2))
            .unwrap();
        board.place(white.best_move, Side::White).unwrap();

        let black = shared
            .select_move(&mut board, Side::Black, &ev, &limits(2))
            .unwrap();
        let fresh = Searcher::new(CachePolicy::Unconditional)
            .select_move(&mut board, Side::Black, &ev, &limits(2))
            .unwrap();

        assert_eq!(black.best_move, fresh.best_move);
        assert_eq!(black.score, fresh.score);
        assert_eq!(black.log, fresh.log);
    }

    #[test]
    fn test_cache_policy_switch_drops_entries() {
        let mut searcher = Searcher::new(CachePolicy::Unconditional);
        let mut board = corner_board();
        let _ = searcher.select_move(&mut board, Side::White, &evaluator(), &limits(2));
        assert!(searcher.cache_stats().entries > 0);

        searcher.set_cache_policy(CachePolicy::DepthTagged);
        assert_eq!(searcher.cache_policy(), CachePolicy::DepthTagged);
        assert_eq!(searcher.cache_stats().entries, 0);
    }
}
