//! Top-level Opt-KG configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{
    AllocationConfig, BudgetPolicy, CacheConfig, DegeneratePolicy, ExperimentConfig, PriorConfig,
};
use crate::constants::{CONFIG_FILE_NAME, DEFAULT_SWEEP_START, DEFAULT_SWEEP_STOP};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`OPTKG_*`)
/// 3. Project config (`optkg.toml` in project root)
/// 4. User config (`~/.optkg/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OptKgConfig {
    pub priors: PriorConfig,
    pub allocation: AllocationConfig,
    pub cache: CacheConfig,
    pub experiment: ExperimentConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub budget: Option<u64>,
    pub budget_policy: Option<BudgetPolicy>,
    pub degenerate_policy: Option<DegeneratePolicy>,
    pub cache_path: Option<String>,
}

impl OptKgConfig {
    /// Load configuration with layered resolution rooted at `root`.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Layer 4 (lowest priority): user config
        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(e @ ConfigError::ParseError { .. }) => return Err(e),
                    Err(e) => {
                        tracing::warn!(error = %e, "ignoring unreadable user config");
                    }
                }
            }
        }

        // Layer 3: project config
        let project_config_path = root.join(CONFIG_FILE_NAME);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        // Layer 2: environment variables
        Self::apply_env_overrides(&mut config)?;

        // Layer 1 (highest priority): CLI flags
        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(config: &OptKgConfig) -> Result<(), ConfigError> {
        let priors = [
            ("priors.task_alpha", config.priors.task_alpha),
            ("priors.task_beta", config.priors.task_beta),
            ("priors.worker_alpha", config.priors.worker_alpha),
            ("priors.worker_beta", config.priors.worker_beta),
        ];
        for (field, value) in priors {
            if let Some(v) = value {
                if !(v.is_finite() && v > 0.0) {
                    return Err(ConfigError::ValidationFailed {
                        field: field.to_string(),
                        message: "must be finite and greater than 0".to_string(),
                    });
                }
            }
        }
        if let Some(eps) = config.allocation.variance_epsilon {
            if !(eps.is_finite() && eps > 0.0) {
                return Err(ConfigError::ValidationFailed {
                    field: "allocation.variance_epsilon".to_string(),
                    message: "must be finite and greater than 0".to_string(),
                });
            }
        }
        if config.experiment.budget_step == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "experiment.budget_step".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        let start = config.experiment.budget_start.unwrap_or(DEFAULT_SWEEP_START);
        let stop = config.experiment.budget_stop.unwrap_or(DEFAULT_SWEEP_STOP);
        if start >= stop {
            return Err(ConfigError::ValidationFailed {
                field: "experiment.budget_stop".to_string(),
                message: format!("must be greater than budget_start ({start}), got {stop}"),
            });
        }
        Ok(())
    }

    /// Returns the user config path: `~/.optkg/config.toml`.
    fn user_config_path() -> Option<PathBuf> {
        home_dir().map(|h| h.join(".optkg").join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored.
    fn merge_toml_file(config: &mut OptKgConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: OptKgConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; `other` wins wherever it has a `Some` value.
    fn merge(base: &mut OptKgConfig, other: &OptKgConfig) {
        // Priors
        if other.priors.task_alpha.is_some() {
            base.priors.task_alpha = other.priors.task_alpha;
        }
        if other.priors.task_beta.is_some() {
            base.priors.task_beta = other.priors.task_beta;
        }
        if other.priors.worker_alpha.is_some() {
            base.priors.worker_alpha = other.priors.worker_alpha;
        }
        if other.priors.worker_beta.is_some() {
            base.priors.worker_beta = other.priors.worker_beta;
        }

        // Allocation
        if other.allocation.budget.is_some() {
            base.allocation.budget = other.allocation.budget;
        }
        if other.allocation.budget_policy.is_some() {
            base.allocation.budget_policy = other.allocation.budget_policy;
        }
        if other.allocation.degenerate_policy.is_some() {
            base.allocation.degenerate_policy = other.allocation.degenerate_policy;
        }
        if other.allocation.variance_epsilon.is_some() {
            base.allocation.variance_epsilon = other.allocation.variance_epsilon;
        }

        // Cache
        if other.cache.path.is_some() {
            base.cache.path = other.cache.path.clone();
        }
        if other.cache.max_entries.is_some() {
            base.cache.max_entries = other.cache.max_entries;
        }

        // Experiment
        if other.experiment.budget_start.is_some() {
            base.experiment.budget_start = other.experiment.budget_start;
        }
        if other.experiment.budget_stop.is_some() {
            base.experiment.budget_stop = other.experiment.budget_stop;
        }
        if other.experiment.budget_step.is_some() {
            base.experiment.budget_step = other.experiment.budget_step;
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `OPTKG_ALLOCATION_BUDGET`, `OPTKG_PRIORS_WORKER_ALPHA`, etc.
    fn apply_env_overrides(config: &mut OptKgConfig) -> Result<(), ConfigError> {
        if let Some(v) = env_parse::<f64>("OPTKG_PRIORS_TASK_ALPHA")? {
            config.priors.task_alpha = Some(v);
        }
        if let Some(v) = env_parse::<f64>("OPTKG_PRIORS_TASK_BETA")? {
            config.priors.task_beta = Some(v);
        }
        if let Some(v) = env_parse::<f64>("OPTKG_PRIORS_WORKER_ALPHA")? {
            config.priors.worker_alpha = Some(v);
        }
        if let Some(v) = env_parse::<f64>("OPTKG_PRIORS_WORKER_BETA")? {
            config.priors.worker_beta = Some(v);
        }
        if let Some(v) = env_parse::<u64>("OPTKG_ALLOCATION_BUDGET")? {
            config.allocation.budget = Some(v);
        }
        if let Some(v) = env_parse::<BudgetPolicy>("OPTKG_ALLOCATION_BUDGET_POLICY")? {
            config.allocation.budget_policy = Some(v);
        }
        if let Some(v) = env_parse::<DegeneratePolicy>("OPTKG_ALLOCATION_DEGENERATE_POLICY")? {
            config.allocation.degenerate_policy = Some(v);
        }
        if let Some(v) = env_parse::<f64>("OPTKG_ALLOCATION_VARIANCE_EPSILON")? {
            config.allocation.variance_epsilon = Some(v);
        }
        if let Ok(val) = std::env::var("OPTKG_CACHE_PATH") {
            config.cache.path = Some(val);
        }
        Ok(())
    }

    /// Apply CLI overrides (highest priority).
    fn apply_cli_overrides(config: &mut OptKgConfig, cli: &CliOverrides) {
        if let Some(v) = cli.budget {
            config.allocation.budget = Some(v);
        }
        if let Some(v) = cli.budget_policy {
            config.allocation.budget_policy = Some(v);
        }
        if let Some(v) = cli.degenerate_policy {
            config.allocation.degenerate_policy = Some(v);
        }
        if let Some(ref v) = cli.cache_path {
            config.cache.path = Some(v.clone());
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

/// Read and parse an env var. Unset is `None`; set but unparseable is an error.
fn env_parse<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                field: key.to_string(),
                message: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
