//! Allocation loop configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BUDGET, DEFAULT_VARIANCE_EPSILON};

/// What to do when the budget exceeds the available (task, worker) pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPolicy {
    /// Fail before the first iteration.
    #[default]
    Reject,
    /// Stop when the pool empties and report a truncated run.
    Truncate,
}

/// What selection does with a candidate whose lookahead update is degenerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DegeneratePolicy {
    /// Drop the candidate from this round's comparison.
    #[default]
    Skip,
    /// Fail the run.
    Abort,
}

impl BudgetPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Reject => "reject",
            Self::Truncate => "truncate",
        }
    }
}

impl DegeneratePolicy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Abort => "abort",
        }
    }
}

impl FromStr for BudgetPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "truncate" => Ok(Self::Truncate),
            other => Err(format!("unknown budget policy '{other}'")),
        }
    }
}

impl FromStr for DegeneratePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "abort" => Ok(Self::Abort),
            other => Err(format!("unknown degenerate policy '{other}'")),
        }
    }
}

impl fmt::Display for BudgetPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for DegeneratePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Configuration for the allocation loop.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AllocationConfig {
    /// Number of labels to acquire. Default: 0.
    pub budget: Option<u64>,
    /// Budget overrun handling. Default: reject.
    pub budget_policy: Option<BudgetPolicy>,
    /// Degenerate lookahead handling. Default: skip.
    pub degenerate_policy: Option<DegeneratePolicy>,
    /// Minimum posterior variance for moment matching. Default: 1e-12.
    pub variance_epsilon: Option<f64>,
}

impl AllocationConfig {
    pub fn effective_budget(&self) -> u64 {
        self.budget.unwrap_or(DEFAULT_BUDGET)
    }

    pub fn effective_budget_policy(&self) -> BudgetPolicy {
        self.budget_policy.unwrap_or_default()
    }

    pub fn effective_degenerate_policy(&self) -> DegeneratePolicy {
        self.degenerate_policy.unwrap_or_default()
    }

    pub fn effective_variance_epsilon(&self) -> f64 {
        self.variance_epsilon.unwrap_or(DEFAULT_VARIANCE_EPSILON)
    }
}
