//! Beta distribution evaluation errors.

use super::error_code::{self, OptKgErrorCode};

/// Errors that can occur when evaluating the Beta survival function.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StatisticsError {
    #[error("Cannot build Beta({alpha}, {beta}): {message}")]
    InvalidShape {
        alpha: f64,
        beta: f64,
        message: String,
    },

    #[error("Survival of Beta({alpha}, {beta}) is not a probability: {value}")]
    OutOfRange { alpha: f64, beta: f64, value: f64 },
}

impl OptKgErrorCode for StatisticsError {
    fn error_code(&self) -> &'static str {
        error_code::STATISTICS_ERROR
    }
}
