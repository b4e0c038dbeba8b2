//! OptKgErrorCode trait for structured error reporting.

/// Trait for attaching a stable error code to every Opt-KG error.
/// Every error enum implements this so callers (logs, the experiment
/// binary, downstream tooling) can match on a code instead of a message.
pub trait OptKgErrorCode {
    /// Returns the error code string (e.g., "POOL_EXHAUSTED").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted error string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

// Error code constants.
pub const INVALID_LABEL: &str = "INVALID_LABEL";
pub const INVALID_PARAMETERS: &str = "INVALID_PARAMETERS";
pub const DEGENERATE_VARIANCE: &str = "DEGENERATE_VARIANCE";
pub const NON_POSITIVE_SHAPE: &str = "NON_POSITIVE_SHAPE";
pub const STATISTICS_ERROR: &str = "STATISTICS_ERROR";
pub const CACHE_ERROR: &str = "CACHE_ERROR";
pub const DATASET_ERROR: &str = "DATASET_ERROR";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const POOL_EXHAUSTED: &str = "POOL_EXHAUSTED";
pub const BUDGET_EXCEEDS_PAIRS: &str = "BUDGET_EXCEEDS_PAIRS";
pub const MISSING_PARAMETER: &str = "MISSING_PARAMETER";
pub const ALLOCATION_ERROR: &str = "ALLOCATION_ERROR";
