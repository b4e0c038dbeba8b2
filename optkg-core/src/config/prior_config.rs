//! Prior configuration for task and worker beliefs.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_TASK_ALPHA, DEFAULT_TASK_BETA, DEFAULT_WORKER_ALPHA, DEFAULT_WORKER_BETA,
};
use crate::types::BetaParams;

/// Initial Beta parameters shared by every task and every worker.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PriorConfig {
    /// Task prior a0. Default: 1.0.
    pub task_alpha: Option<f64>,
    /// Task prior b0. Default: 1.0.
    pub task_beta: Option<f64>,
    /// Worker reliability prior c0. Default: 4.0.
    pub worker_alpha: Option<f64>,
    /// Worker reliability prior d0. Default: 1.0.
    pub worker_beta: Option<f64>,
}

impl PriorConfig {
    /// Returns the effective task prior `(a0, b0)`.
    pub fn effective_task_prior(&self) -> BetaParams {
        BetaParams::new(
            self.task_alpha.unwrap_or(DEFAULT_TASK_ALPHA),
            self.task_beta.unwrap_or(DEFAULT_TASK_BETA),
        )
    }

    /// Returns the effective worker prior `(c0, d0)`.
    pub fn effective_worker_prior(&self) -> BetaParams {
        BetaParams::new(
            self.worker_alpha.unwrap_or(DEFAULT_WORKER_ALPHA),
            self.worker_beta.unwrap_or(DEFAULT_WORKER_BETA),
        )
    }
}
