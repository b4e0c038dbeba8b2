//! Budget sweep configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_SWEEP_START, DEFAULT_SWEEP_STEP, DEFAULT_SWEEP_STOP};

/// Range of budgets swept by the experiment driver: `start..stop` by `step`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ExperimentConfig {
    /// First budget. Default: 0.
    pub budget_start: Option<u64>,
    /// Exclusive upper bound. Default: 8000.
    pub budget_stop: Option<u64>,
    /// Spacing. Default: 100.
    pub budget_step: Option<u64>,
}

impl ExperimentConfig {
    /// Returns the budgets of the sweep in ascending order.
    pub fn budgets(&self) -> Vec<u64> {
        let start = self.budget_start.unwrap_or(DEFAULT_SWEEP_START);
        let stop = self.budget_stop.unwrap_or(DEFAULT_SWEEP_STOP);
        let step = self.budget_step.unwrap_or(DEFAULT_SWEEP_STEP).max(1);
        (start..stop).step_by(step as usize).collect()
    }
}
