//! AllocationEventHandler trait, all methods with no-op defaults.

use super::types::*;

/// Trait for observing an allocation run.
///
/// Handlers only override the events they care about. `Send + Sync` so
/// the same handler can watch several runs of a parallel budget sweep.
pub trait AllocationEventHandler: Send + Sync {
    fn on_run_started(&self, _event: &RunStartedEvent) {}
    fn on_label_acquired(&self, _event: &LabelAcquiredEvent) {}
    fn on_candidate_skipped(&self, _event: &CandidateSkippedEvent) {}
    fn on_run_complete(&self, _event: &RunCompleteEvent) {}
}
