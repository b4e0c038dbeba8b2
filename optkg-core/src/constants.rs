//! Shared constants for the Opt-KG allocator.

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ---- Priors ----

/// Default task prior alpha: uniform Beta(1, 1).
pub const DEFAULT_TASK_ALPHA: f64 = 1.0;

/// Default task prior beta.
pub const DEFAULT_TASK_BETA: f64 = 1.0;

/// Default worker reliability prior alpha. Beta(4, 1) assumes workers
/// are mostly reliable.
pub const DEFAULT_WORKER_ALPHA: f64 = 4.0;

/// Default worker reliability prior beta.
pub const DEFAULT_WORKER_BETA: f64 = 1.0;

// ---- Allocation ----

/// Default labeling budget.
pub const DEFAULT_BUDGET: u64 = 0;

/// Smallest posterior variance accepted by moment matching.
pub const DEFAULT_VARIANCE_EPSILON: f64 = 1e-12;

/// Point at which the survival function of a task posterior is evaluated.
pub const DECISION_THRESHOLD: f64 = 0.5;

// ---- Experiment ----

/// Default first budget of a sweep.
pub const DEFAULT_SWEEP_START: u64 = 0;

/// Default (exclusive) upper bound of a sweep.
pub const DEFAULT_SWEEP_STOP: u64 = 8000;

/// Default spacing between sweep budgets.
pub const DEFAULT_SWEEP_STEP: u64 = 100;

// ---- Dataset columns ----

/// Task identifier column.
pub const COLUMN_TASK: &str = "orig_id";

/// Worker identifier column.
pub const COLUMN_WORKER: &str = "!amt_worker_ids";

/// Worker response column.
pub const COLUMN_RESPONSE: &str = "response";

/// Gold label column.
pub const COLUMN_GOLD: &str = "gold";

/// Project-level config file name.
pub const CONFIG_FILE_NAME: &str = "optkg.toml";

/// Environment variable holding the log filter.
pub const LOG_ENV_VAR: &str = "OPTKG_LOG";
