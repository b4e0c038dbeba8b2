//! Beta shape parameters for task and worker beliefs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Shape parameters `(alpha, beta)` of a Beta distribution.
///
/// Tasks carry `(a, b)` over the latent probability that the truth is 1;
/// workers carry `(c, d)` over their latent reliability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetaParams {
    pub alpha: f64,
    pub beta: f64,
}

impl BetaParams {
    pub const fn new(alpha: f64, beta: f64) -> Self {
        Self { alpha, beta }
    }

    /// Uniform prior Beta(1, 1).
    pub const fn uniform() -> Self {
        Self::new(1.0, 1.0)
    }

    /// Both shapes finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        self.alpha.is_finite() && self.beta.is_finite() && self.alpha > 0.0 && self.beta > 0.0
    }

    /// Posterior mean `alpha / (alpha + beta)`.
    pub fn mean(&self) -> f64 {
        self.alpha / (self.alpha + self.beta)
    }

    /// Decision rule for tasks: positive when `alpha >= beta`.
    pub fn favours_positive(&self) -> bool {
        self.alpha >= self.beta
    }

    /// Exact-bit cache key.
    pub fn key(&self) -> (u64, u64) {
        (self.alpha.to_bits(), self.beta.to_bits())
    }

    pub fn from_key(key: (u64, u64)) -> Self {
        Self::new(f64::from_bits(key.0), f64::from_bits(key.1))
    }
}

impl fmt::Display for BetaParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Beta({}, {})", self.alpha, self.beta)
    }
}
