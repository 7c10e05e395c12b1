//! Engine configuration.
//!
//! Configuration is read from a TOML file and then adjusted by `OMOK_<KEY>`
//! environment variables. Every field has a default, so an empty file (or no
//! file at all) yields a working engine.
//!
//! ```toml
//! time_budget_ms = 2000
//! max_depth = 4
//! cache_policy = "depth_tagged"
//! strategy = "hybrid"
//! mcts_iterations = 500
//! seed = 7
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::board::Side;
use crate::error::EngineError;
use crate::eval::{DEFAULT_MODEL_SCALE, MODEL_LEARNING_RATE, PATTERN_LEARNING_RATE};
use crate::search::{CachePolicy, SearchLimits};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "OMOK_CONFIG";

/// Standard locations to search for a config file
pub const CONFIG_SEARCH_PATHS: &[&str] = &["omok.toml", "../omok.toml"];

/// Move selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Iterative-deepening alpha-beta
    #[default]
    Minimax,
    /// Monte Carlo tree search only
    Mcts,
    /// MCTS first, minimax when MCTS yields no move
    Hybrid,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Minimax => write!(f, "minimax"),
            Strategy::Mcts => write!(f, "mcts"),
            Strategy::Hybrid => write!(f, "hybrid"),
        }
    }
}

impl std::str::FromStr for Strategy {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "minimax" | "alphabeta" | "alpha_beta" => Ok(Strategy::Minimax),
            "mcts" => Ok(Strategy::Mcts),
            "hybrid" => Ok(Strategy::Hybrid),
            other => Err(EngineError::InvalidArgument(format!("unknown strategy '{other}'"))),
        }
    }
}

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Iterative deepening budget, checked between depths
    pub time_budget_ms: u64,
    /// Cap applied on top of the dynamic depth limit
    pub max_depth: Option<u8>,
    pub cache_policy: CachePolicy,
    pub strategy: Strategy,
    pub mcts_iterations: u32,
    pub pattern_learning_rate: f64,
    pub model_learning_rate: f64,
    /// Hidden units of the learned model
    pub hidden_size: usize,
    /// Multiplier on the model output inside the evaluation
    pub model_scale: f64,
    /// Seeds model initialisation and MCTS playouts
    pub seed: Option<u64>,
    /// Side the engine trains for when told a game outcome
    pub engine_side: Side,
    /// Play the centre on a blank board instead of reporting no move
    pub open_at_center: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            time_budget_ms: 5000,
            max_depth: None,
            cache_policy: CachePolicy::Unconditional,
            strategy: Strategy::Minimax,
            mcts_iterations: 1000,
            pattern_learning_rate: PATTERN_LEARNING_RATE,
            model_learning_rate: MODEL_LEARNING_RATE,
            hidden_size: 64,
            model_scale: DEFAULT_MODEL_SCALE,
            seed: None,
            engine_side: Side::White,
            open_at_center: true,
        }
    }
}

impl EngineConfig {
    /// Parse a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, EngineError> {
        let config: EngineConfig =
            toml::from_str(content).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.hidden_size == 0 {
            return Err(EngineError::Config("hidden_size must be positive".into()));
        }
        if !(self.pattern_learning_rate.is_finite() && self.pattern_learning_rate >= 0.0) {
            return Err(EngineError::Config(
                "pattern_learning_rate must be a non-negative number".into(),
            ));
        }
        if !(self.model_learning_rate.is_finite() && self.model_learning_rate >= 0.0) {
            return Err(EngineError::Config(
                "model_learning_rate must be a non-negative number".into(),
            ));
        }
        if !self.model_scale.is_finite() {
            return Err(EngineError::Config("model_scale must be finite".into()));
        }
        Ok(())
    }

    #[inline]
    pub fn time_budget(&self) -> Duration {
        Duration::from_millis(self.time_budget_ms)
    }

    pub fn search_limits(&self) -> SearchLimits {
        SearchLimits {
            time_budget: self.time_budget(),
            max_depth: self.max_depth,
        }
    }
}

/// Load the configuration.
///
/// Looks for a file in this order:
/// 1. Path given by `OMOK_CONFIG`
/// 2. `omok.toml` in the current directory
/// 3. `../omok.toml`
///
/// Falls back to defaults when none exists. Environment overrides are
/// applied last in every case.
pub fn load_config() -> Result<EngineConfig, EngineError> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        let path = PathBuf::from(&path);
        if path.exists() {
            log::info!("Loading config from {CONFIG_ENV}: {}", path.display());
            return load_from_path(&path);
        }
        log::warn!("{CONFIG_ENV}={} not found, searching defaults", path.display());
    }

    for path_str in CONFIG_SEARCH_PATHS {
        let path = Path::new(path_str);
        if path.exists() {
            log::info!("Loading config from {}", path.display());
            return load_from_path(path);
        }
    }

    log::debug!("No omok.toml found, using built-in defaults");
    apply_env_overrides(EngineConfig::default())
}

/// Load configuration from a specific path, then apply env overrides.
pub fn load_from_path(path: &Path) -> Result<EngineConfig, EngineError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| EngineError::Config(format!("failed to read {}: {e}", path.display())))?;
    let config = EngineConfig::from_toml(&content).map_err(|e| match e {
        EngineError::Config(msg) => EngineError::Config(format!("{}: {msg}", path.display())),
        other => other,
    })?;
    apply_env_overrides(config)
}

/// Apply `OMOK_<KEY>` environment variables to `config`.
pub fn apply_env_overrides(config: EngineConfig) -> Result<EngineConfig, EngineError> {
    apply_overrides_with(config, |key| std::env::var(key).ok())
}

macro_rules! env_override {
    // Parseable field
    ($config:expr, $lookup:expr, $field:ident, $key:expr) => {
        if let Some(v) = $lookup($key) {
            $config.$field = v.trim().parse().map_err(|_| {
                EngineError::Config(format!("{}: cannot parse '{}'", $key, v))
            })?;
        }
    };
    // Optional parseable field; "none" clears it
    ($config:expr, $lookup:expr, $field:ident, $key:expr, optional) => {
        if let Some(v) = $lookup($key) {
            $config.$field = match v.trim() {
                "" | "none" => None,
                s => Some(s.parse().map_err(|_| {
                    EngineError::Config(format!("{}: cannot parse '{}'", $key, v))
                })?),
            };
        }
    };
}

/// Apply overrides from an arbitrary key lookup.
pub fn apply_overrides_with<F>(mut config: EngineConfig, lookup: F) -> Result<EngineConfig, EngineError>
where
    F: Fn(&str) -> Option<String>,
{
    env_override!(config, lookup, time_budget_ms, "OMOK_TIME_BUDGET_MS");
    env_override!(config, lookup, max_depth, "OMOK_MAX_DEPTH", optional);
    env_override!(config, lookup, cache_policy, "OMOK_CACHE_POLICY");
    env_override!(config, lookup, strategy, "OMOK_STRATEGY");
    env_override!(config, lookup, mcts_iterations, "OMOK_MCTS_ITERATIONS");
    env_override!(config, lookup, pattern_learning_rate, "OMOK_PATTERN_LEARNING_RATE");
    env_override!(config, lookup, model_learning_rate, "OMOK_MODEL_LEARNING_RATE");
    env_override!(config, lookup, hidden_size, "OMOK_HIDDEN_SIZE");
    env_override!(config, lookup, model_scale, "OMOK_MODEL_SCALE");
    env_override!(config, lookup, seed, "OMOK_SEED", optional);
    env_override!(config, lookup, engine_side, "OMOK_ENGINE_SIDE");
    env_override!(config, lookup, open_at_center, "OMOK_OPEN_AT_CENTER");

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.time_budget(), Duration::from_secs(5));
        assert_eq!(config.cache_policy, CachePolicy::Unconditional);
        assert_eq!(config.strategy, Strategy::Minimax);
        assert_eq!(config.mcts_iterations, 1000);
        assert_eq!(config.hidden_size, 64);
        assert_eq!(config.engine_side, Side::White);
        assert!(config.open_at_center);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(EngineConfig::from_toml("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = EngineConfig::from_toml(
            r#"
            time_budget_ms = 250
            max_depth = 2
            cache_policy = "depth_tagged"
            strategy = "hybrid"
            engine_side = "black"
            seed = 99
            "#,
        )
        .unwrap();

        assert_eq!(config.time_budget_ms, 250);
        assert_eq!(config.max_depth, Some(2));
        assert_eq!(config.cache_policy, CachePolicy::DepthTagged);
        assert_eq!(config.strategy, Strategy::Hybrid);
        assert_eq!(config.engine_side, Side::Black);
        assert_eq!(config.seed, Some(99));
        assert_eq!(config.mcts_iterations, 1000);
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        assert_matches!(
            EngineConfig::from_toml("strategy = \"random\""),
            Err(EngineError::Config(_))
        );
        assert_matches!(EngineConfig::from_toml("hidden_size = 0"), Err(EngineError::Config(_)));
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "mcts_iterations = 42").unwrap();
        writeln!(file, "open_at_center = false").unwrap();

        let config = load_from_path(file.path()).unwrap();
        assert_eq!(config.mcts_iterations, 42);
        assert!(!config.open_at_center);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert_matches!(load_from_path(&missing), Err(EngineError::Config(msg)) if msg.contains("absent.toml"));
    }

    #[test]
    fn test_overrides() {
        let lookup = lookup_from(&[
            ("OMOK_TIME_BUDGET_MS", "100"),
            ("OMOK_MAX_DEPTH", "3"),
            ("OMOK_STRATEGY", "mcts"),
            ("OMOK_CACHE_POLICY", "disabled"),
            ("OMOK_SEED", "5"),
            ("OMOK_ENGINE_SIDE", "black"),
        ]);
        let config = apply_overrides_with(EngineConfig::default(), lookup).unwrap();

        assert_eq!(config.time_budget_ms, 100);
        assert_eq!(config.max_depth, Some(3));
        assert_eq!(config.strategy, Strategy::Mcts);
        assert_eq!(config.cache_policy, CachePolicy::Disabled);
        assert_eq!(config.seed, Some(5));
        assert_eq!(config.engine_side, Side::Black);
    }

    #[test]
    fn test_override_clears_optional() {
        let base = EngineConfig {
            max_depth: Some(4),
            ..EngineConfig::default()
        };
        let config = apply_overrides_with(base, lookup_from(&[("OMOK_MAX_DEPTH", "none")])).unwrap();
        assert_eq!(config.max_depth, None);
    }

    #[test]
    fn test_override_parse_error() {
        let result = apply_overrides_with(
            EngineConfig::default(),
            lookup_from(&[("OMOK_MCTS_ITERATIONS", "lots")]),
        );
        assert_matches!(result, Err(EngineError::Config(msg)) if msg.contains("OMOK_MCTS_ITERATIONS"));
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!("Hybrid".parse::<Strategy>(), Ok(Strategy::Hybrid));
        assert_eq!("alphabeta".parse::<Strategy>(), Ok(Strategy::Minimax));
        assert!("greedy".parse::<Strategy>().is_err());
    }
}
