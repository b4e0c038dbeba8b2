//! AllocationLoop: spend a labeling budget one query at a time.
//!
//! Each iteration selects the pair with the highest knowledge-gradient
//! reward, looks up the label that worker actually gave in the registry,
//! moment-matches the task and worker posteriors in place, and evicts the
//! pair from the pool. After the last iteration every task queried at
//! least once is classified by its final posterior.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashSet;

use optkg_core::config::{BudgetPolicy, DegeneratePolicy, OptKgConfig};
use optkg_core::constants::DEFAULT_VARIANCE_EPSILON;
use optkg_core::errors::{AllocationError, ParameterKind};
use optkg_core::events::{
    AllocationEventHandler, CandidateSkippedEvent, EventDispatcher, LabelAcquiredEvent,
    RunCompleteEvent, RunStartedEvent,
};
use optkg_core::types::{BetaParams, Label, TaskId, WorkerId};

use crate::beta::SurvivalCache;
use crate::dataset::Registry;
use crate::policy::KnowledgeGradient;
use crate::pool::CandidatePool;
use crate::posterior::PosteriorUpdater;

/// Where the loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initializing,
    Selecting,
    Observing,
    Updating,
    Evicting,
    Terminated,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::Selecting => "selecting",
            Self::Observing => "observing",
            Self::Updating => "updating",
            Self::Evicting => "evicting",
            Self::Terminated => "terminated",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Knobs of one allocation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllocationSettings {
    pub task_prior: BetaParams,
    pub worker_prior: BetaParams,
    pub budget_policy: BudgetPolicy,
    pub degenerate_policy: DegeneratePolicy,
    pub variance_epsilon: f64,
}

impl AllocationSettings {
    pub fn from_config(config: &OptKgConfig) -> Self {
        Self {
            task_prior: config.priors.effective_task_prior(),
            worker_prior: config.priors.effective_worker_prior(),
            budget_policy: config.allocation.effective_budget_policy(),
            degenerate_policy: config.allocation.effective_degenerate_policy(),
            variance_epsilon: config.allocation.effective_variance_epsilon(),
        }
    }
}

impl Default for AllocationSettings {
    fn default() -> Self {
        Self {
            task_prior: BetaParams::uniform(),
            worker_prior: BetaParams::new(4.0, 1.0),
            budget_policy: BudgetPolicy::default(),
            degenerate_policy: DegeneratePolicy::default(),
            variance_epsilon: DEFAULT_VARIANCE_EPSILON,
        }
    }
}

/// One completed iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepRecord {
    pub iteration: u64,
    pub task: TaskId,
    pub worker: WorkerId,
    pub position: usize,
    pub reward: f64,
    pub label: Label,
    pub task_after: BetaParams,
    pub worker_after: BetaParams,
}

/// Final split of the queried tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecisionPartition {
    /// Tasks with `a >= b`, in order of first query.
    pub positive: Vec<TaskId>,
    /// Tasks with `a < b`, in order of first query.
    pub negative: Vec<TaskId>,
}

impl DecisionPartition {
    pub fn len(&self) -> usize {
        self.positive.len() + self.negative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positive.is_empty() && self.negative.is_empty()
    }

    pub fn decision(&self, task: TaskId) -> Option<Label> {
        if self.positive.contains(&task) {
            Some(Label::Positive)
        } else if self.negative.contains(&task) {
            Some(Label::Negative)
        } else {
            None
        }
    }
}

/// Everything a finished run reports.
#[derive(Debug, Clone)]
pub struct AllocationOutcome {
    pub partition: DecisionPartition,
    /// Every queried task, once per query.
    pub chosen: Vec<TaskId>,
    pub task_params: Vec<BetaParams>,
    pub worker_params: Vec<BetaParams>,
    pub iterations: u64,
    /// True when the pool ran dry before the budget was spent.
    pub truncated: bool,
}

/// Drives select → observe → update → evict over a registry.
pub struct Allocator<'a> {
    registry: &'a Registry,
    policy: KnowledgeGradient<'a>,
    updater: PosteriorUpdater,
    settings: AllocationSettings,
    task_params: Vec<BetaParams>,
    worker_params: Vec<BetaParams>,
    pool: CandidatePool,
    chosen: Vec<TaskId>,
    iterations: u64,
    phase: Phase,
    events: EventDispatcher,
}

impl<'a> Allocator<'a> {
    /// Initialise priors and the candidate pool. The allocator stays in
    /// [`Phase::Initializing`] until the first `step` or `run`.
    pub fn new(registry: &'a Registry, cache: &'a SurvivalCache, settings: AllocationSettings) -> Self {
        let updater = PosteriorUpdater::new(settings.variance_epsilon);
        Self {
            registry,
            policy: KnowledgeGradient::new(cache, updater, settings.degenerate_policy),
            updater,
            settings,
            task_params: vec![settings.task_prior; registry.task_count()],
            worker_params: vec![settings.worker_prior; registry.worker_count()],
            pool: CandidatePool::from_registry(registry),
            chosen: Vec::new(),
            iterations: 0,
            phase: Phase::Initializing,
            events: EventDispatcher::new(),
        }
    }

    pub fn register_handler(&mut self, handler: Arc<dyn AllocationEventHandler>) {
        self.events.register(handler);
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn pool(&self) -> &CandidatePool {
        &self.pool
    }

    pub fn chosen(&self) -> &[TaskId] {
        &self.chosen
    }

    pub fn settings(&self) -> &AllocationSettings {
        &self.settings
    }

    pub fn task_params(&self, task: TaskId) -> Option<BetaParams> {
        self.task_params.get(task.index()).copied()
    }

    pub fn worker_params(&self, worker: WorkerId) -> Option<BetaParams> {
        self.worker_params.get(worker.index()).copied()
    }

    /// Run one full iteration.
    pub fn step(&mut self) -> Result<StepRecord, AllocationError> {
        if self.phase == Phase::Terminated {
            return Err(AllocationError::Terminated);
        }

        self.phase = Phase::Selecting;
        let outcome =
            self.policy
                .select_next(&self.task_params, &self.worker_params, &self.pool)?;
        for skipped in &outcome.skipped {
            self.events.emit_candidate_skipped(&CandidateSkippedEvent {
                iteration: self.iterations,
                task: skipped.task,
                worker: skipped.worker,
                position: skipped.position,
                reason: skipped.error.to_string(),
            });
        }
        let selection = outcome.selection;

        self.phase = Phase::Observing;
        let response = self
            .registry
            .response_at(selection.task, selection.position)
            .filter(|r| r.worker == selection.worker)
            .ok_or_else(|| AllocationError::MissingResponse {
                task: self.registry.task_name(selection.task).to_string(),
                position: selection.position,
            })?;
        let label = response.label;

        self.phase = Phase::Updating;
        let task_before = self.lookup_task(selection.task)?;
        let worker_before = self.lookup_worker(selection.worker)?;
        let task_after = self.updater.update_task(task_before, worker_before, label)?;
        let worker_after = self.updater.update_worker(task_before, worker_before, label)?;
        self.task_params[selection.task.index()] = task_after;
        self.worker_params[selection.worker.index()] = worker_after;

        self.phase = Phase::Evicting;
        self.pool.evict(selection.task, selection.position)?;
        self.chosen.push(selection.task);

        let record = StepRecord {
            iteration: self.iterations,
            task: selection.task,
            worker: selection.worker,
            position: selection.position,
            reward: selection.reward,
            label,
            task_after,
            worker_after,
        };
        tracing::debug!(
            iteration = record.iteration,
            task = self.registry.task_name(record.task),
            worker = self.registry.worker_name(record.worker),
            label = %label,
            reward = record.reward,
            a = task_after.alpha,
            b = task_after.beta,
            "label acquired"
        );
        self.events.emit_label_acquired(&LabelAcquiredEvent {
            iteration: record.iteration,
            task: record.task,
            worker: record.worker,
            position: record.position,
            reward: record.reward,
            label,
            task_before,
            task_after,
            worker_before,
            worker_after,
        });

        self.iterations += 1;
        self.phase = Phase::Selecting;
        Ok(record)
    }

    /// Spend `budget` labels and classify every queried task.
    pub fn run(&mut self, budget: u64) -> Result<AllocationOutcome, AllocationError> {
        if self.phase == Phase::Terminated {
            return Err(AllocationError::Terminated);
        }
        let available = self.pool.pair_count();
        if budget > available as u64 && self.settings.budget_policy == BudgetPolicy::Reject {
            return Err(AllocationError::BudgetExceedsPairs { budget, available });
        }
        self.phase = Phase::Selecting;

        tracing::info!(
            budget,
            available,
            tasks = self.registry.task_count(),
            workers = self.registry.worker_count(),
            "allocation started"
        );
        self.events.emit_run_started(&RunStartedEvent {
            budget,
            available_pairs: available,
            task_count: self.registry.task_count(),
            worker_count: self.registry.worker_count(),
        });

        let start = self.iterations;
        while self.iterations - start < budget {
            if self.pool.is_empty() {
                break;
            }
            self.step()?;
        }
        let spent = self.iterations - start;
        let truncated = spent < budget;
        if truncated {
            tracing::warn!(budget, spent, "candidate pool exhausted before budget was spent");
        }

        let partition = self.finish();
        tracing::info!(
            iterations = spent,
            positive = partition.positive.len(),
            negative = partition.negative.len(),
            truncated,
            "allocation finished"
        );
        self.events.emit_run_complete(&RunCompleteEvent {
            iterations: spent,
            truncated,
            positive: partition.positive.len(),
            negative: partition.negative.len(),
        });

        Ok(AllocationOutcome {
            partition,
            chosen: self.chosen.clone(),
            task_params: self.task_params.clone(),
            worker_params: self.worker_params.clone(),
            iterations: spent,
            truncated,
        })
    }

    /// Terminate and split the distinct chosen tasks by `a >= b`.
    pub fn finish(&mut self) -> DecisionPartition {
        self.phase = Phase::Terminated;
        let mut seen = FxHashSet::default();
        let mut partition = DecisionPartition::default();
        for &task in &self.chosen {
            if !seen.insert(task) {
                continue;
            }
            let params = self.task_params[task.index()];
            if params.favours_positive() {
                partition.positive.push(task);
            } else {
                partition.negative.push(task);
            }
        }
        partition
    }

    fn lookup_task(&self, task: TaskId) -> Result<BetaParams, AllocationError> {
        self.task_params(task)
            .ok_or_else(|| AllocationError::MissingParameter {
                kind: ParameterKind::Task,
                id: self.registry.task_name(task).to_string(),
            })
    }

    fn lookup_worker(&self, worker: WorkerId) -> Result<BetaParams, AllocationError> {
        self.worker_params(worker)
            .ok_or_else(|| AllocationError::MissingParameter {
                kind: ParameterKind::Worker,
                id: self.registry.worker_name(worker).to_string(),
            })
    }
}

impl fmt::Debug for Allocator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Allocator")
            .field("phase", &self.phase)
            .field("iterations", &self.iterations)
            .field("remaining_pairs", &self.pool.pair_count())
            .field("chosen", &self.chosen.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry {
        let mut b = Registry::builder();
        b.response("T1", "W1", Label::Positive)
            .response("T1", "W2", Label::Negative)
            .response("T2", "W1", Label::Positive);
        b.build().unwrap()
    }

    #[test]
    fn test_phase_progression() {
        let reg = registry();
        let cache = SurvivalCache::new();
        let mut alloc = Allocator::new(&reg, &cache, AllocationSettings::default());
        assert_eq!(alloc.phase(), Phase::Initializing);
        alloc.step().unwrap();
        assert_eq!(alloc.phase(), Phase::Selecting);
        alloc.finish();
        assert_eq!(alloc.phase(), Phase::Terminated);
        assert!(matches!(alloc.step(), Err(AllocationError::Terminated)));
        assert!(matches!(alloc.run(1), Err(AllocationError::Terminated)));
    }

    #[test]
    fn test_rejected_run_stays_initializing() {
        let reg = registry();
        let cache = SurvivalCache::new();
        let mut alloc = Allocator::new(&reg, &cache, AllocationSettings::default());
        assert!(alloc.run(4).is_err());
        assert_eq!(alloc.phase(), Phase::Initializing);

        let outcome = alloc.run(0).unwrap();
        assert!(outcome.partition.is_empty());
        assert_eq!(alloc.phase(), Phase::Terminated);
    }

    #[test]
    fn test_updates_use_pre_update_parameters() {
        let reg = registry();
        let cache = SurvivalCache::new();
        let settings = AllocationSettings::default();
        let mut alloc = Allocator::new(&reg, &cache, settings);
        let record = alloc.step().unwrap();

        let up = PosteriorUpdater::default();
        let expected_task = up
            .update_task(settings.task_prior, settings.worker_prior, record.label)
            .unwrap();
        let expected_worker = up
            .update_worker(settings.task_prior, settings.worker_prior, record.label)
            .unwrap();
        assert_eq!(record.task_after, expected_task);
        assert_eq!(record.worker_after, expected_worker);
    }

    #[test]
    fn test_budget_over_pairs_rejected_by_default() {
        let reg = registry();
        let cache = SurvivalCache::new();
        let mut alloc = Allocator::new(&reg, &cache, AllocationSettings::default());
        let err = alloc.run(4).unwrap_err();
        assert!(matches!(
            err,
            AllocationError::BudgetExceedsPairs {
                budget: 4,
                available: 3
            }
        ));
        assert_eq!(alloc.iterations(), 0);
    }

    #[test]
    fn test_budget_over_pairs_truncates_when_configured() {
        let reg = registry();
        let cache = SurvivalCache::new();
        let settings = AllocationSettings {
            budget_policy: BudgetPolicy::Truncate,
            ..Default::default()
        };
        let mut alloc = Allocator::new(&reg, &cache, settings);
        let outcome = alloc.run(10).unwrap();
        assert!(outcome.truncated);
        assert_eq!(outcome.iterations, 3);
        assert_eq!(outcome.chosen.len(), 3);
        assert_eq!(outcome.partition.len(), 2);
        assert!(alloc.pool().is_empty());
    }

    #[test]
    fn test_partition_is_distinct() {
        let reg = registry();
        let cache = SurvivalCache::new();
        let mut alloc = Allocator::new(&reg, &cache, AllocationSettings::default());
        let outcome = alloc.run(3).unwrap();
        assert!(!outcome.truncated);
        let t1 = reg.task_id("T1").unwrap();
        assert_eq!(outcome.chosen.iter().filter(|&&t| t == t1).count(), 2);
        assert_eq!(outcome.partition.len(), 2);
        for task in reg.task_ids() {
            let p = outcome.task_params[task.index()];
            let expected = if p.alpha >= p.beta {
                Label::Positive
            } else {
                Label::Negative
            };
            assert_eq!(outcome.partition.decision(task), Some(expected));
        }
    }
}
