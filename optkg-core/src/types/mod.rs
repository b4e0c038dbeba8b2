//! Core types shared across Opt-KG crates.

pub mod identifiers;
pub mod label;
pub mod params;

pub use identifiers::{TaskId, WorkerId};
pub use label::Label;
pub use params::BetaParams;
