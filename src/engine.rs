//! Engine facade tying the searchers to one evaluator
//!
//! [`Engine`] owns everything that persists between moves of a game: the
//! adaptive evaluator, the minimax searcher with its score cache, and the
//! MCTS searcher with its RNG. It answers two requests:
//!
//! 1. **Select a move** for a position and side, using the configured
//!    strategy. A blank board gets the centre without searching.
//! 2. **Learn from a finished game**, scaling the pattern weights and
//!    training the learned model on the final position.
//!
//! # Example
//!
//! ```
//! use omok::{Board, Engine, EngineConfig, Pos, Side};
//!
//! let config = EngineConfig { max_depth: Some(1), seed: Some(3), hidden_size: 8, ..EngineConfig::default() };
//! let mut engine = Engine::with_config(config).unwrap();
//!
//! let mut board = Board::new();
//! let first = engine.select_move(&board, Side::Black).unwrap();
//! assert_eq!(first.best_move, Pos::CENTER);
//!
//! board.place(first.best_move, Side::Black).unwrap();
//! let reply = engine.select_move(&board, Side::White).unwrap();
//! println!("White plays {} ({:?})", reply.best_move, reply.search_type);
//! ```

use std::time::Instant;

use crate::board::{Board, Pos, Side, TOTAL_CELLS};
use crate::config::{EngineConfig, Strategy};
use crate::error::EngineError;
use crate::eval::{train_on_outcome, update_pattern_weights, Evaluator, Outcome, PatternWeightTable, ValueModel};
use crate::mcts::{MctsResult, MctsSearcher};
use crate::search::{CachePolicy, SearchResult, Searcher};

/// Which path produced the move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchType {
    /// Centre point on a blank board
    Opening,
    /// Iterative-deepening alpha-beta
    AlphaBeta,
    /// Monte Carlo tree search
    Mcts,
}

/// Chosen move with search statistics and the textual trace.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveResult {
    pub best_move: Pos,
    /// Root-side score (minimax value or MCTS mean reward)
    pub score: f64,
    /// Completed iterative-deepening depth; 0 for opening and MCTS
    pub depth: u8,
    /// Minimax nodes or MCTS iterations
    pub nodes: u64,
    pub time_ms: u64,
    pub search_type: SearchType,
    /// Ordered progress lines
    pub log: Vec<String>,
}

impl MoveResult {
    #[inline]
    fn opening(time_ms: u64) -> Self {
        Self {
            best_move: Pos::CENTER,
            score: 0.0,
            depth: 0,
            nodes: 0,
            time_ms,
            search_type: SearchType::Opening,
            log: vec![format!("Opening move at {}", Pos::CENTER)],
        }
    }

    #[inline]
    fn from_alphabeta(result: SearchResult, time_ms: u64) -> Self {
        Self {
            best_move: result.best_move,
            score: result.score,
            depth: result.depth,
            nodes: result.nodes,
            time_ms,
            search_type: SearchType::AlphaBeta,
            log: result.log,
        }
    }

    #[inline]
    fn from_mcts(result: MctsResult, time_ms: u64) -> Self {
        Self {
            best_move: result.best_move,
            score: result.mean_reward,
            depth: 0,
            nodes: u64::from(result.iterations),
            time_ms,
            search_type: SearchType::Mcts,
            log: vec![format!(
                "MCTS: Best move found at {} after {} iterations",
                result.best_move, result.iterations
            )],
        }
    }
}

/// Move-selection engine for one game at a time.
///
/// The evaluator and the score cache are mutable state carried across
/// calls. Use one engine per game stream; concurrent games need separate
/// engines.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    evaluator: Evaluator,
    searcher: Searcher,
    mcts: MctsSearcher,
}

impl Default for Engine {
    fn default() -> Self {
        Self::build(EngineConfig::default())
    }
}

impl Engine {
    /// Engine with default settings and a randomly initialised model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine from a validated configuration.
    pub fn with_config(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EngineConfig) -> Self {
        let model = ValueModel::with_seed(TOTAL_CELLS, config.hidden_size, config.seed);
        let evaluator = Evaluator::new(PatternWeightTable::default(), model, config.model_scale);
        Self {
            searcher: Searcher::new(config.cache_policy),
            mcts: MctsSearcher::new(config.seed),
            evaluator,
            config,
        }
    }

    /// Choose a move for `side`.
    ///
    /// # Errors
    ///
    /// [`EngineError::NoMoveAvailable`] when the board offers nothing to
    /// search: a full board, or a blank board with `open_at_center` off.
    pub fn select_move(&mut self, board: &Board, side: Side) -> Result<MoveResult, EngineError> {
        let start = Instant::now();

        if board.is_board_empty() && self.config.open_at_center {
            log::info!("{side} opens at {}", Pos::CENTER);
            return Ok(MoveResult::opening(elapsed_ms(start)));
        }

        let result = match self.config.strategy {
            Strategy::Minimax => self.run_minimax(board, side, start)?,
            Strategy::Mcts => self.run_mcts(board, side, start).ok_or(EngineError::NoMoveAvailable)?,
            Strategy::Hybrid => match self.run_mcts(board, side, start) {
                Some(result) => result,
                None => {
                    log::debug!("mcts produced no move, falling back to minimax");
                    self.run_minimax(board, side, start)?
                }
            },
        };

        log::info!(
            "{side} plays {} ({:?}, score {:.1}, depth {}, {} nodes, {}ms)",
            result.best_move,
            result.search_type,
            result.score,
            result.depth,
            result.nodes,
            result.time_ms
        );
        Ok(result)
    }

    fn run_minimax(&mut self, board: &Board, side: Side, start: Instant) -> Result<MoveResult, EngineError> {
        let mut work = board.clone();
        let limits = self.config.search_limits();
        let result = self.searcher.select_move(&mut work, side, &self.evaluator, &limits)?;
        Ok(MoveResult::from_alphabeta(result, elapsed_ms(start)))
    }

    fn run_mcts(&mut self, board: &Board, side: Side, start: Instant) -> Option<MoveResult> {
        let result = self
            .mcts
            .search(board, side, self.config.mcts_iterations, &self.evaluator)?;
        Some(MoveResult::from_mcts(result, elapsed_ms(start)))
    }

    /// Adapt the evaluator after a finished game.
    ///
    /// `outcome` is from the engine's side (`engine_side` in the config).
    /// Pattern weights are scaled by `1 ± pattern_learning_rate` (draws leave
    /// them alone) and the model takes one gradient step on `final_board`.
    /// The score cache is cleared since its entries no longer match the
    /// evaluator.
    pub fn on_game_end(&mut self, final_board: &Board, outcome: Outcome) {
        update_pattern_weights(
            self.evaluator.weights_mut(),
            outcome,
            self.config.pattern_learning_rate,
        );
        let error = train_on_outcome(
            self.evaluator.model_mut(),
            final_board,
            self.config.engine_side,
            outcome,
            self.config.model_learning_rate,
        );
        self.searcher.clear_cache();

        log::info!(
            "weights updated after {outcome} as {}: model error before step {error:.4}",
            self.config.engine_side
        );
    }

    /// Same as [`Engine::on_game_end`], deriving the outcome from the winner.
    pub fn on_game_end_with_winner(&mut self, final_board: &Board, winner: Option<Side>) -> Outcome {
        let outcome = Outcome::for_side(winner, self.config.engine_side);
        self.on_game_end(final_board, outcome);
        outcome
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn set_strategy(&mut self, strategy: Strategy) {
        self.config.strategy = strategy;
    }

    pub fn set_cache_policy(&mut self, policy: CachePolicy) {
        self.config.cache_policy = policy;
        self.searcher.set_cache_policy(policy);
    }

    /// Drop all cached scores.
    pub fn clear_cache(&mut self) {
        self.searcher.clear_cache();
    }

    #[must_use]
    pub fn cache_stats(&self) -> crate::search::CacheStats {
        self.searcher.cache_stats()
    }
}

#[inline]
fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BOARD_SIZE;
    use crate::search::candidates;
    use assert_matches::assert_matches;

    fn test_config() -> EngineConfig {
        EngineConfig {
            max_depth: Some(1),
            hidden_size: 8,
            seed: Some(17),
            mcts_iterations: 20,
            ..EngineConfig::default()
        }
    }

    fn engine() -> Engine {
        Engine::with_config(test_config()).unwrap()
    }

    #[test]
    fn test_engine_creation() {
        let engine = Engine::new();
        assert_eq!(engine.config(), &EngineConfig::default());
        assert_eq!(engine.evaluator().model().hidden_size(), 64);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EngineConfig {
            hidden_size: 0,
            ..EngineConfig::default()
        };
        assert_matches!(Engine::with_config(config), Err(EngineError::Config(_)));
    }

    #[test]
    fn test_engine_empty_board_opens_at_center() {
        let mut engine = engine();
        let result = engine.select_move(&Board::new(), Side::Black).unwrap();
        assert_eq!(result.best_move, Pos::CENTER);
        assert_eq!(result.search_type, SearchType::Opening);
    }

    #[test]
    fn test_engine_empty_board_without_opening_rule() {
        let mut engine = Engine::with_config(EngineConfig {
            open_at_center: false,
            ..test_config()
        })
        .unwrap();
        assert_matches!(
            engine.select_move(&Board::new(), Side::Black),
            Err(EngineError::NoMoveAvailable)
        );
    }

    #[test]
    fn test_engine_full_board() {
        let mut board = Board::new();
        for idx in 0..TOTAL_CELLS {
            let side = if (idx / BOARD_SIZE) % 4 < 2 { Side::Black } else { Side::White };
            board.place(Pos::from_index(idx), side).unwrap();
        }
        let mut engine = engine();
        assert_matches!(engine.select_move(&board, Side::Black), Err(EngineError::NoMoveAvailable));
    }

    #[test]
    fn test_engine_finds_immediate_win() {
        let mut board = Board::new();
        for c in 0..4 {
            board.place(Pos::new(9, c), Side::Black).unwrap();
        }
        board.place(Pos::new(10, 5), Side::White).unwrap();

        let mut engine = engine();
        let result = engine.select_move(&board, Side::Black).unwrap();
        assert_eq!(result.best_move, Pos::new(9, 4));
        assert_eq!(result.search_type, SearchType::AlphaBeta);
        assert_eq!(result.depth, 1);
        assert!(!result.log.is_empty());
    }

    #[test]
    fn test_engine_blocks_opponent_win() {
        let mut board = Board::new();
        for c in 0..4 {
            board.place(Pos::new(9, c), Side::White).unwrap();
        }
        board.place(Pos::new(10, 5), Side::Black).unwrap();

        let mut engine = engine();
        let result = engine.select_move(&board, Side::Black).unwrap();
        assert_eq!(result.best_move, Pos::new(9, 4));
    }

    #[test]
    fn test_engine_does_not_touch_input_board() {
        let mut board = Board::new();
        board.place(Pos::new(7, 7), Side::Black).unwrap();
        let before = board.clone();
        let mut engine = engine();
        let _ = engine.select_move(&board, Side::White).unwrap();
        assert_eq!(board, before);
    }

    #[test]
    fn test_engine_mcts_strategy() {
        let mut board = Board::new();
        board.place(Pos::new(7, 7), Side::Black).unwrap();

        let mut engine = engine();
        engine.set_strategy(Strategy::Mcts);
        let result = engine.select_move(&board, Side::White).unwrap();
        assert_eq!(result.search_type, SearchType::Mcts);
        assert_eq!(result.nodes, 20);
        assert!(candidates(&board).contains(&result.best_move));
    }

    #[test]
    fn test_engine_mcts_without_iterations_fails() {
        let mut board = Board::new();
        board.place(Pos::new(7, 7), Side::Black).unwrap();

        let mut engine = Engine::with_config(EngineConfig {
            strategy: Strategy::Mcts,
            mcts_iterations: 0,
            ..test_config()
        })
        .unwrap();
        assert_matches!(engine.select_move(&board, Side::White), Err(EngineError::NoMoveAvailable));
    }

    #[test]
    fn test_engine_hybrid_falls_back_to_minimax() {
        let mut board = Board::new();
        board.place(Pos::new(7, 7), Side::Black).unwrap();

        let mut engine = Engine::with_config(EngineConfig {
            strategy: Strategy::Hybrid,
            mcts_iterations: 0,
            ..test_config()
        })
        .unwrap();
        let result = engine.select_move(&board, Side::White).unwrap();
        assert_eq!(result.search_type, SearchType::AlphaBeta);
    }

    #[test]
    fn test_engine_hybrid_prefers_mcts() {
        let mut board = Board::new();
        board.place(Pos::new(7, 7), Side::Black).unwrap();

        let mut engine = engine();
        engine.set_strategy(Strategy::Hybrid);
        let result = engine.select_move(&board, Side::White).unwrap();
        assert_eq!(result.search_type, SearchType::Mcts);
    }

    #[test]
    fn test_on_game_end_win_raises_weights() {
        let mut board = Board::new();
        board.place(Pos::new(7, 7), Side::White).unwrap();

        let mut engine = engine();
        let before = engine.evaluator().weights().clone();
        engine.on_game_end(&board, Outcome::Win);

        for ((_, old), (_, new)) in before.iter().zip(engine.evaluator().weights().iter()) {
            assert!(new > old);
        }
    }

    #[test]
    fn test_on_game_end_draw_keeps_patterns_but_trains_model() {
        let mut board = Board::new();
        board.place(Pos::new(7, 7), Side::White).unwrap();

        let mut engine = engine();
        let weights = engine.evaluator().weights().clone();
        let model = engine.evaluator().model().clone();
        engine.on_game_end(&board, Outcome::Draw);

        assert_eq!(engine.evaluator().weights(), &weights);
        assert_ne!(engine.evaluator().model(), &model);
    }

    #[test]
    fn test_on_game_end_clears_cache() {
        let mut board = Board::new();
        board.place(Pos::new(7, 7), Side::Black).unwrap();

        let mut engine = engine();
        let _ = engine.select_move(&board, Side::White).unwrap();
        assert!(engine.cache_stats().entries > 0);

        engine.on_game_end(&board, Outcome::Loss);
        assert_eq!(engine.cache_stats().entries, 0);
    }

    #[test]
    fn test_on_game_end_with_winner() {
        let mut engine = engine();
        let board = Board::new();
        assert_eq!(engine.on_game_end_with_winner(&board, Some(Side::White)), Outcome::Win);
        assert_eq!(engine.on_game_end_with_winner(&board, Some(Side::Black)), Outcome::Loss);
        assert_eq!(engine.on_game_end_with_winner(&board, None), Outcome::Draw);
    }

    #[test]
    fn test_set_cache_policy_reaches_searcher() {
        let mut board = Board::new();
        board.place(Pos::new(7, 7), Side::Black).unwrap();

        let mut engine = engine();
        engine.set_cache_policy(CachePolicy::Disabled);
        assert_eq!(engine.config().cache_policy, CachePolicy::Disabled);
        assert_eq!(engine.searcher.cache_policy(), CachePolicy::Disabled);

        let _ = engine.select_move(&board, Side::White).unwrap();
        assert_eq!(engine.cache_stats().entries, 0);
    }
}
