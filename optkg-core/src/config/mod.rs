//! Configuration system for Opt-KG.
//! TOML-based, layered resolution: CLI > env > project > user > defaults.

pub mod allocation_config;
pub mod cache_config;
pub mod experiment_config;
pub mod optkg_config;
pub mod prior_config;

pub use allocation_config::{AllocationConfig, BudgetPolicy, DegeneratePolicy};
pub use cache_config::CacheConfig;
pub use experiment_config::ExperimentConfig;
pub use optkg_config::{CliOverrides, OptKgConfig};
pub use prior_config::PriorConfig;
