//! Command-line front end for the five-in-a-row engine.
//!
//! ## Usage
//!
//! - `omok analyze board.txt --side white` - Pick a move for a position file
//! - `omok selfplay --max-moves 60` - Let the engine play itself and learn

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use flexi_logger::Logger;

use omok::rules::winner;
use omok::{load_config, load_from_path, Board, EngineConfig, EngineWorker, Side, Strategy};

/// Adaptive five-in-a-row engine
#[derive(Parser)]
#[command(name = "omok")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (default: OMOK_CONFIG or ./omok.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured strategy (minimax, mcts, hybrid)
    #[arg(long, global = true)]
    strategy: Option<Strategy>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Choose a move for a board read from a text file
    Analyze {
        /// 15 rows of `.`, `X` (black) and `O` (white)
        file: PathBuf,
        /// Side to move
        #[arg(long, default_value = "black")]
        side: Side,
    },
    /// Play the engine against itself and feed the result back
    Selfplay {
        /// Stop after this many moves and score the game as a draw
        #[arg(long, default_value_t = 225)]
        max_moves: usize,
    },
}

fn main() -> Result<()> {
    let _logger = Logger::try_with_env_or_str("info")?
        .format(flexi_logger::colored_default_format)
        .start()?;

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => load_from_path(path).with_context(|| format!("loading {}", path.display()))?,
        None => load_config().context("loading configuration")?,
    };
    if let Some(strategy) = cli.strategy {
        config.strategy = strategy;
    }

    match cli.command {
        Commands::Analyze { file, side } => analyze(config, &file, side),
        Commands::Selfplay { max_moves } => selfplay(config, max_moves),
    }
}

fn analyze(config: EngineConfig, file: &Path, side: Side) -> Result<()> {
    let text = std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let board: Board = text.parse().with_context(|| format!("parsing {}", file.display()))?;

    let worker = EngineWorker::spawn(config)?;
    let result = worker.select_move(&board, side)?;

    for line in &result.log {
        println!("{line}");
    }
    println!(
        "{side} plays {} ({:?}, score {:.1}, {} nodes, {}ms)",
        result.best_move, result.search_type, result.score, result.nodes, result.time_ms
    );
    Ok(())
}

fn selfplay(config: EngineConfig, max_moves: usize) -> Result<()> {
    let engine_side = config.engine_side;
    let worker = EngineWorker::spawn(config)?;
    let mut board = Board::new();
    let mut side = Side::Black;

    for ply in 0..max_moves {
        let result = match worker.select_move(&board, side) {
            Ok(result) => result,
            Err(omok::EngineError::NoMoveAvailable) => break,
            Err(e) => return Err(e.into()),
        };
        board
            .place(result.best_move, side)
            .with_context(|| format!("engine returned an illegal move {}", result.best_move))?;
        log::info!("ply {}: {side} {}", ply + 1, result.best_move);

        if board.has_five_in_row(side) {
            break;
        }
        side = side.opponent();
    }

    println!("{board}");
    let winner = winner(&board);
    let outcome = omok::Outcome::for_side(winner, engine_side);
    match winner {
        Some(w) => println!("{w} wins ({engine_side}: {outcome})"),
        None => println!("no winner ({engine_side}: {outcome})"),
    }

    worker.report_game_over(&board, outcome)?;
    worker.recv()?;
    Ok(())
}
