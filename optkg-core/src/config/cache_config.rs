//! Survival cache configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the survival-function cache.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CacheConfig {
    /// File the cache is loaded from and saved to. None disables persistence.
    pub path: Option<String>,
    /// Maximum number of cached entries. None means unbounded.
    pub max_entries: Option<u64>,
}
