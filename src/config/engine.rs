//! Engine configuration structures

use serde::Deserialize;

use crate::error::Result;

/// Tunables shared by the parser, deserializer, evaluator and rule cache
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Maximum nesting depth accepted while parsing, deserializing or evaluating.
    /// Each `AND`/`OR` link and each parenthesis group adds one level.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Number of parsed rules kept before the cache is flushed
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

pub const DEFAULT_MAX_DEPTH: usize = 120;
pub const DEFAULT_CACHE_CAPACITY: usize = 2048;

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Load a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_cache_capacity(mut self, cache_capacity: usize) -> Self {
        self.cache_capacity = cache_capacity;
        self
    }
}
