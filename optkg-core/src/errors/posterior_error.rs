//! Moment-matching posterior update errors.

use super::error_code::{self, OptKgErrorCode};

/// Errors raised while computing a moment-matched Beta posterior.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PosteriorError {
    #[error("Invalid label {value}: expected 0 or 1")]
    InvalidLabel { value: i64 },

    #[error("Invalid {role} parameters ({alpha}, {beta}): shapes must be finite and > 0")]
    InvalidParameters {
        role: &'static str,
        alpha: f64,
        beta: f64,
    },

    #[error("Degenerate variance {variance:e} (mean {mean}, second moment {second_moment})")]
    DegenerateVariance {
        mean: f64,
        second_moment: f64,
        variance: f64,
    },

    #[error("Moment matching produced non-positive shape ({alpha}, {beta})")]
    NonPositiveShape { alpha: f64, beta: f64 },
}

impl OptKgErrorCode for PosteriorError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidLabel { .. } => error_code::INVALID_LABEL,
            Self::InvalidParameters { .. } => error_code::INVALID_PARAMETERS,
            Self::DegenerateVariance { .. } => error_code::DEGENERATE_VARIANCE,
            Self::NonPositiveShape { .. } => error_code::NON_POSITIVE_SHAPE,
        }
    }
}
