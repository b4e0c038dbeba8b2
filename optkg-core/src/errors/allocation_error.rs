//! Allocation loop errors.

use std::fmt;

use super::error_code::{self, OptKgErrorCode};
use super::{PosteriorError, StatisticsError};

/// Which parameter map a lookup missed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    Task,
    Worker,
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Task => "task",
            Self::Worker => "worker",
        })
    }
}

/// Errors that can occur while selecting, observing, and updating.
/// Aggregates numerical errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum AllocationError {
    #[error("Candidate pool is exhausted")]
    PoolExhausted,

    #[error("Budget {budget} exceeds the {available} available (task, worker) pairs")]
    BudgetExceedsPairs { budget: u64, available: usize },

    #[error("No {kind} parameters for {id}")]
    MissingParameter { kind: ParameterKind, id: String },

    #[error("No recorded response for task {task} at position {position}")]
    MissingResponse { task: String, position: usize },

    #[error("No live candidate for task {task} at position {position}")]
    CandidateNotFound { task: String, position: usize },

    #[error("Every remaining candidate was skipped as numerically degenerate")]
    NoViableCandidate,

    #[error("Allocation already terminated")]
    Terminated,

    #[error("Posterior update failed: {0}")]
    Posterior(#[from] PosteriorError),

    #[error("Survival evaluation failed: {0}")]
    Statistics(#[from] StatisticsError),
}

impl OptKgErrorCode for AllocationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::PoolExhausted | Self::NoViableCandidate => error_code::POOL_EXHAUSTED,
            Self::BudgetExceedsPairs { .. } => error_code::BUDGET_EXCEEDS_PAIRS,
            Self::MissingParameter { .. } | Self::MissingResponse { .. } => {
                error_code::MISSING_PARAMETER
            }
            Self::CandidateNotFound { .. } | Self::Terminated => error_code::ALLOCATION_ERROR,
            Self::Posterior(e) => e.error_code(),
            Self::Statistics(e) => e.error_code(),
        }
    }
}
