//! # optkg-core
//!
//! Foundation shared by the Opt-KG allocator crates: interned identifiers,
//! Beta parameter and label types, per-subsystem error enums, layered TOML
//! configuration, tracing setup, and the synchronous event system.
//!
//! Nothing in this crate performs inference; see `optkg-allocation`.

pub mod config;
pub mod constants;
pub mod errors;
pub mod events;
pub mod tracing;
pub mod types;

pub use types::{BetaParams, Label, TaskId, WorkerId};
