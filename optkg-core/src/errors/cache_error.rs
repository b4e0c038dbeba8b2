//! Survival cache persistence errors.

use super::error_code::{self, OptKgErrorCode};

/// Errors that can occur while loading or saving the survival cache.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cache serialization error in {path}: {message}")]
    Serialization { path: String, message: String },

    #[error("Invalid cache entry Beta({alpha}, {beta}) -> {survival}")]
    InvalidEntry {
        alpha: f64,
        beta: f64,
        survival: f64,
    },
}

impl OptKgErrorCode for CacheError {
    fn error_code(&self) -> &'static str {
        error_code::CACHE_ERROR
    }
}
