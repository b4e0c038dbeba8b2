//! BetaStatistics: the survival function of a task posterior at the
//! decision threshold, and the symmetric decision score built on it.
//!
//! `I(a, b) = Pr(θ > 0.5 | θ ~ Beta(a, b))` is evaluated through `statrs`
//! and memoised per exact `(a, b)` in a caller-owned [`SurvivalCache`].

pub mod survival;

use statrs::distribution::{Beta, ContinuousCDF};

use optkg_core::constants::DECISION_THRESHOLD;
use optkg_core::errors::StatisticsError;
use optkg_core::types::BetaParams;

pub use survival::{CacheStats, SurvivalCache};

/// Uncached `Pr(θ > 0.5)` for `θ ~ Beta(alpha, beta)`.
pub fn beta_survival(params: BetaParams) -> Result<f64, StatisticsError> {
    if !params.is_valid() {
        return Err(StatisticsError::InvalidShape {
            alpha: params.alpha,
            beta: params.beta,
            message: "shapes must be finite and > 0".to_string(),
        });
    }
    let dist = Beta::new(params.alpha, params.beta).map_err(|e| StatisticsError::InvalidShape {
        alpha: params.alpha,
        beta: params.beta,
        message: e.to_string(),
    })?;
    let value = dist.sf(DECISION_THRESHOLD);
    if !(0.0..=1.0).contains(&value) {
        return Err(StatisticsError::OutOfRange {
            alpha: params.alpha,
            beta: params.beta,
            value,
        });
    }
    Ok(value)
}

/// `h(x) = max(x, 1 - x)`: the probability of being right when deciding
/// by the more likely side.
pub fn decision_score(p: f64) -> f64 {
    p.max(1.0 - p)
}
