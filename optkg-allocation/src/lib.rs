//! # optkg-allocation
//!
//! Optimistic knowledge-gradient allocation of a crowd-labeling budget.
//!
//! Tasks and workers each carry a Beta posterior. Every iteration picks
//! the live (task, worker) pair whose simulated answer would move the
//! task's decision score the most, reveals the label that worker actually
//! recorded, and moment-matches both posteriors. Once the budget is spent
//! the queried tasks are split into a positive and a negative set.
//!
//! - [`dataset`]: immutable response registry and TSV loader
//! - [`beta`]: Beta survival function, decision score, shared cache
//! - [`posterior`]: moment-matched task and worker updates
//! - [`pool`]: depleting pool of queryable pairs
//! - [`policy`]: knowledge-gradient selection
//! - [`allocation`]: the select, observe, update, evict loop
//! - [`evaluation`]: accuracy against gold labels and budget sweeps

pub mod allocation;
pub mod beta;
pub mod dataset;
pub mod evaluation;
pub mod policy;
pub mod pool;
pub mod posterior;

pub use allocation::{AllocationOutcome, AllocationSettings, Allocator, DecisionPartition, Phase};
pub use beta::SurvivalCache;
pub use dataset::Registry;
pub use evaluation::{budget_sweep, evaluate, Evaluation, SweepPoint};
