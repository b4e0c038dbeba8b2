//! Event payloads emitted by the allocation loop.

use crate::types::{BetaParams, Label, TaskId, WorkerId};

/// A run is about to start iterating.
#[derive(Debug, Clone)]
pub struct RunStartedEvent {
    pub budget: u64,
    pub available_pairs: usize,
    pub task_count: usize,
    pub worker_count: usize,
}

/// One iteration completed: a label was queried and both posteriors updated.
#[derive(Debug, Clone)]
pub struct LabelAcquiredEvent {
    /// Zero-based iteration number.
    pub iteration: u64,
    pub task: TaskId,
    pub worker: WorkerId,
    /// Position of the worker in the task's original response list.
    pub position: usize,
    pub reward: f64,
    pub label: Label,
    pub task_before: BetaParams,
    pub task_after: BetaParams,
    pub worker_before: BetaParams,
    pub worker_after: BetaParams,
}

/// Selection dropped a candidate whose lookahead update was degenerate.
#[derive(Debug, Clone)]
pub struct CandidateSkippedEvent {
    pub iteration: u64,
    pub task: TaskId,
    pub worker: WorkerId,
    pub position: usize,
    pub reason: String,
}

/// The run terminated and the decision partition was computed.
#[derive(Debug, Clone)]
pub struct RunCompleteEvent {
    pub iterations: u64,
    pub truncated: bool,
    pub positive: usize,
    pub negative: usize,
}
