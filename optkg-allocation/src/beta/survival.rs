//! Caller-owned memo table for the Beta survival function.
//!
//! Keys are the exact bit patterns of `(alpha, beta)`; values are
//! immutable once computed, so a table saved by one run is valid for any
//! later run. Persistence is a JSON list of entries sorted by key.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use moka::sync::Cache;
use serde::{Deserialize, Serialize};

use optkg_core::errors::{CacheError, StatisticsError};
use optkg_core::types::BetaParams;

use super::beta_survival;

const FORMAT_VERSION: u32 = 1;

/// Hit/miss counters and current size of a [`SurvivalCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: u64,
}

impl CacheStats {
    /// Fraction of lookups served from the cache (0.0 when none).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    alpha: f64,
    beta: f64,
    survival: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    version: u32,
    entries: Vec<CacheEntry>,
}

/// Memoised `Pr(θ > 0.5 | Beta(a, b))`.
///
/// Shared by reference; `moka` makes lookups and inserts safe from the
/// parallel budget sweep.
pub struct SurvivalCache {
    table: Cache<(u64, u64), f64>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SurvivalCache {
    /// Create an unbounded cache.
    pub fn new() -> Self {
        Self::from_table(Cache::builder().build())
    }

    /// Create a cache holding at most `max_entries` values.
    pub fn with_capacity(max_entries: u64) -> Self {
        Self::from_table(Cache::builder().max_capacity(max_entries).build())
    }

    /// Create a cache sized from an optional bound.
    pub fn with_optional_capacity(max_entries: Option<u64>) -> Self {
        match max_entries {
            Some(n) => Self::with_capacity(n),
            None => Self::new(),
        }
    }

    fn from_table(table: Cache<(u64, u64), f64>) -> Self {
        Self {
            table,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// `Pr(θ > 0.5)` for `θ ~ Beta(params)`, computed once per exact pair.
    pub fn survival(&self, params: BetaParams) -> Result<f64, StatisticsError> {
        let key = params.key();
        if let Some(value) = self.table.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(value);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let value = beta_survival(params)?;
        self.table.insert(key, value);
        Ok(value)
    }

    /// Whether a value for exactly `params` is cached.
    pub fn contains(&self, params: BetaParams) -> bool {
        self.table.contains_key(&params.key())
    }

    /// Number of cached entries, after flushing pending maintenance.
    pub fn len(&self) -> u64 {
        self.table.run_pending_tasks();
        self.table.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }

    /// Load a cache saved by [`save`](Self::save). A missing file yields
    /// an empty cache.
    pub fn load(path: &Path, max_entries: Option<u64>) -> Result<Self, CacheError> {
        let cache = Self::with_optional_capacity(max_entries);
        if !path.exists() {
            tracing::info!(path = %path.display(), "no survival cache on disk, starting empty");
            return Ok(cache);
        }
        let loaded = cache.merge_from(path)?;
        tracing::info!(path = %path.display(), entries = loaded, "loaded survival cache");
        Ok(cache)
    }

    /// Merge entries from a saved cache file into this cache.
    /// Returns the number of entries read.
    pub fn merge_from(&self, path: &Path) -> Result<usize, CacheError> {
        let file = File::open(path).map_err(|source| CacheError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let parsed: CacheFile =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| {
                CacheError::Serialization {
                    path: path.display().to_string(),
                    message: e.to_string(),
                }
            })?;
        if parsed.version != FORMAT_VERSION {
            return Err(CacheError::Serialization {
                path: path.display().to_string(),
                message: format!("unsupported cache version {}", parsed.version),
            });
        }
        for entry in &parsed.entries {
            let params = BetaParams::new(entry.alpha, entry.beta);
            if !params.is_valid() || !(0.0..=1.0).contains(&entry.survival) {
                return Err(CacheError::InvalidEntry {
                    alpha: entry.alpha,
                    beta: entry.beta,
                    survival: entry.survival,
                });
            }
        }
        for entry in &parsed.entries {
            self.table
                .insert(BetaParams::new(entry.alpha, entry.beta).key(), entry.survival);
        }
        Ok(parsed.entries.len())
    }

    /// Write every cached entry to `path`, sorted by key.
    pub fn save(&self, path: &Path) -> Result<usize, CacheError> {
        let mut entries: Vec<((u64, u64), f64)> =
            self.table.iter().map(|(k, v)| (*k, v)).collect();
        entries.sort_unstable_by_key(|(k, _)| *k);

        let body = CacheFile {
            version: FORMAT_VERSION,
            entries: entries
                .into_iter()
                .map(|(key, survival)| {
                    let params = BetaParams::from_key(key);
                    CacheEntry {
                        alpha: params.alpha,
                        beta: params.beta,
                        survival,
                    }
                })
                .collect(),
        };

        let file = File::create(path).map_err(|source| CacheError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &body).map_err(|e| CacheError::Serialization {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        writer.flush().map_err(|source| CacheError::Io {
            path: path.display().to_string(),
            source,
        })?;
        tracing::info!(path = %path.display(), entries = body.entries.len(), "saved survival cache");
        Ok(body.entries.len())
    }
}

impl Default for SurvivalCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SurvivalCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurvivalCache")
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish()
    }
}
