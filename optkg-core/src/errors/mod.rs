//! Error handling for Opt-KG.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod allocation_error;
pub mod cache_error;
pub mod config_error;
pub mod dataset_error;
pub mod error_code;
pub mod posterior_error;
pub mod statistics_error;

pub use allocation_error::{AllocationError, ParameterKind};
pub use cache_error::CacheError;
pub use config_error::ConfigError;
pub use dataset_error::DatasetError;
pub use error_code::OptKgErrorCode;
pub use posterior_error::PosteriorError;
pub use statistics_error::StatisticsError;
