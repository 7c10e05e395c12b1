//! Five-in-a-row move selection engine
//!
//! An adaptive engine for the 15x15 five-in-a-row game:
//! - Standard 15x15 board, two sides (Black `X`, White `O`)
//! - Five or more in a row wins, in any of the four directions
//! - No captures, no forbidden moves
//!
//! # Architecture
//!
//! The engine is organized into several modules:
//! - [`board`]: Board representation with bitboards and a text format
//! - [`rules`]: Five-in-a-row detection
//! - [`eval`]: Pattern evaluation, the learned model and post-game updates
//! - [`search`]: Candidates, threats, score cache and alpha-beta search
//! - [`mcts`]: Monte Carlo tree search over the same evaluator
//! - [`engine`]: Main engine integrating the searchers and the learning step
//! - [`worker`]: The engine on its own thread behind a request channel
//! - [`config`]: TOML configuration with environment overrides
//!
//! # Quick Start
//!
//! ```
//! use omok::{Board, Engine, EngineConfig, Pos, Side};
//!
//! // Shallow search for a fast doc test
//! let mut engine = Engine::with_config(EngineConfig {
//!     max_depth: Some(1),
//!     hidden_size: 8,
//!     ..EngineConfig::default()
//! })
//! .unwrap();
//!
//! let mut board = Board::new();
//! board.place(Pos::new(7, 7), Side::Black).unwrap();
//!
//! // Engine responds as White
//! let result = engine.select_move(&board, Side::White).unwrap();
//! board.place(result.best_move, Side::White).unwrap();
//! for line in &result.log {
//!     println!("{line}");
//! }
//! ```
//!
//! # Move Selection
//!
//! 1. Blank board: the centre point
//! 2. Minimax: threats and nearby cells ordered by a one-ply evaluation,
//!    then iterative deepening with alpha-beta pruning
//! 3. MCTS or hybrid (MCTS first, minimax as fallback) when configured
//!
//! After a game, [`Engine::on_game_end`] scales the pattern weights and
//! trains the learned model towards the outcome.

pub mod board;
pub mod config;
pub mod engine;
pub mod error;
pub mod eval;
pub mod mcts;
pub mod rules;
pub mod search;
pub mod worker;

// Re-export commonly used types for convenience
pub use board::{Board, Pos, Side, BOARD_SIZE};
pub use config::{load_config, load_from_path, EngineConfig, Strategy};
pub use engine::{Engine, MoveResult, SearchType};
pub use error::EngineError;
pub use eval::{Evaluator, Outcome};
pub use search::CachePolicy;
pub use worker::{EngineWorker, Request, Response};
