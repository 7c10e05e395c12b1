//! Transposition cache for minimax scores
//!
//! Scores are keyed by the exact stone layout and the side they were scored
//! for (`BoardKey`), so there are no hash collisions to verify. How a cached score may be reused is decided by
//! the [`CachePolicy`]:
//!
//! - `Unconditional` returns any cached score, whatever depth produced it.
//!   This reproduces the engine's historical behaviour, including reuse of a
//!   shallow score where a deeper search was asked for.
//! - `DepthTagged` only returns scores computed with at least the requested
//!   remaining depth.
//! - `Disabled` never stores anything.
//!
//! # Example
//!
//! ```
//! use omok::board::{Board, Pos, Side};
//! use omok::search::{CachePolicy, TranspositionCache};
//!
//! let mut board = Board::new();
//! board.place(Pos::new(7, 7), Side::Black).unwrap();
//!
//! let mut cache = TranspositionCache::new(CachePolicy::DepthTagged);
//! cache.store(board.key(Side::White), 2, 150.0);
//!
//! assert_eq!(cache.probe(&board.key(Side::White), 2), Some(150.0));
//! assert_eq!(cache.probe(&board.key(Side::White), 3), None);
//! assert_eq!(cache.probe(&board.key(Side::Black), 2), None);
//! ```

use std::collections::HashMap;

use serde::Deserialize;

use crate::board::BoardKey;

/// Reuse rule for cached scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Reuse regardless of depth
    #[default]
    Unconditional,
    /// Reuse only when the entry was searched at least as deep
    DepthTagged,
    /// No caching
    Disabled,
}

impl std::str::FromStr for CachePolicy {
    type Err = crate::error::EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "unconditional" => Ok(CachePolicy::Unconditional),
            "depth_tagged" => Ok(CachePolicy::DepthTagged),
            "disabled" | "off" => Ok(CachePolicy::Disabled),
            other => Err(crate::error::EngineError::InvalidArgument(format!(
                "unknown cache policy '{other}'"
            ))),
        }
    }
}

/// Cached minimax score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheEntry {
    /// Remaining depth the score was computed with
    pub depth: u8,
    pub score: f64,
}

/// Score cache shared across iterative-deepening iterations and moves.
#[derive(Debug, Clone, Default)]
pub struct TranspositionCache {
    entries: HashMap<BoardKey, CacheEntry>,
    policy: CachePolicy,
    probes: u64,
    hits: u64,
}

impl TranspositionCache {
    #[must_use]
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            entries: HashMap::new(),
            policy,
            probes: 0,
            hits: 0,
        }
    }

    #[inline]
    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Change the reuse rule. Existing entries are dropped.
    pub fn set_policy(&mut self, policy: CachePolicy) {
        self.policy = policy;
        self.clear();
    }

    /// Look up a score for `key` that is usable at `depth` remaining plies.
    pub fn probe(&mut self, key: &BoardKey, depth: u8) -> Option<f64> {
        if self.policy == CachePolicy::Disabled {
            return None;
        }
        self.probes += 1;

        let entry = self.entries.get(key)?;
        let usable = match self.policy {
            CachePolicy::Unconditional => true,
            CachePolicy::DepthTagged => entry.depth >= depth,
            CachePolicy::Disabled => false,
        };
        if usable {
            self.hits += 1;
            Some(entry.score)
        } else {
            None
        }
    }

    /// Record a score. Under `DepthTagged` a deeper entry is never
    /// overwritten by a shallower one.
    pub fn store(&mut self, key: BoardKey, depth: u8, score: f64) {
        match self.policy {
            CachePolicy::Disabled => {}
            CachePolicy::Unconditional => {
                self.entries.insert(key, CacheEntry { depth, score });
            }
            CachePolicy::DepthTagged => {
                let slot = self.entries.entry(key).or_insert(CacheEntry { depth, score });
                if depth >= slot.depth {
                    *slot = CacheEntry { depth, score };
                }
            }
        }
    }

    /// Drop all entries and reset the counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.probes = 0;
        self.hits = 0;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            probes: self.probes,
            hits: self.hits,
        }
    }
}

/// Cache usage counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of stored positions
    pub entries: usize,
    pub probes: u64,
    pub hits: u64,
}

impl CacheStats {
    /// Hit rate in percent (0-100)
    pub fn hit_percent(&self) -> u8 {
        if self.probes == 0 {
            return 0;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let pct = (self.hits as f64 / self.probes as f64 * 100.0) as u8;
        pct
    }
}
