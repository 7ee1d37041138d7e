// File: src/config.rs
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default cap on phrases returned by one search.
pub const MAX_RETURN_LENGTH: usize = 10;

const DEFAULT_MAX_QUERY_CHARS: usize = 64;
const DEFAULT_MAX_CANDIDATES: usize = 2_000_000;
const DEFAULT_MAX_PHRASES: usize = 250_000;
const DEFAULT_MAX_CACHED_POOLS: usize = 100_000;

/// Ceilings that keep a single search from running away on adversarial pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchLimits {
    /// Letter sub-multisets examined per search, across all recursion levels.
    pub max_candidates: usize,
    /// Largest complete phrase list a single letter pool may produce.
    pub max_phrases: usize,
    /// Memoized pools a generation may hold before its cache is emptied.
    pub max_cached_pools: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_candidates: DEFAULT_MAX_CANDIDATES,
            max_phrases: DEFAULT_MAX_PHRASES,
            max_cached_pools: DEFAULT_MAX_CACHED_POOLS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub max_results: usize,
    /// Skip first words that cannot reach the current top results.
    /// Never changes the output; turning it off is for testing.
    pub pruning: bool,
    pub max_query_chars: usize,
    pub limits: SearchLimits,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_results: MAX_RETURN_LENGTH,
            pruning: true,
            max_query_chars: DEFAULT_MAX_QUERY_CHARS,
            limits: SearchLimits::default(),
        }
    }
}

impl EngineConfig {
    /// Reads a JSON config. Missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let zero = [
            ("max_results", self.max_results),
            ("max_query_chars", self.max_query_chars),
            ("limits.max_candidates", self.limits.max_candidates),
            ("limits.max_phrases", self.limits.max_phrases),
            ("limits.max_cached_pools", self.limits.max_cached_pools),
        ]
        .into_iter()
        .find(|&(_, value)| value == 0);

        match zero {
            Some((field, _)) => Err(ConfigError::Invalid(format!("{field} must be at least 1"))),
            None => Ok(()),
        }
    }
}
