//! SelectionPolicy: one-step knowledge-gradient choice of the next pair.
//!
//! For every live (task, worker) pair the policy simulates both possible
//! labels, moment-matches the task posterior for each, and scores the
//! change in `h(I(a, b))`. A pair's reward is the larger of the two
//! branch rewards; the pair with the strictly greatest reward wins and
//! the first maximiser in pool order breaks ties.

use optkg_core::config::DegeneratePolicy;
use optkg_core::errors::{AllocationError, ParameterKind, PosteriorError};
use optkg_core::types::{BetaParams, Label, TaskId, WorkerId};

use crate::beta::{decision_score, SurvivalCache};
use crate::pool::CandidatePool;
use crate::posterior::PosteriorUpdater;

/// The pair chosen for the next query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub reward: f64,
    pub task: TaskId,
    pub worker: WorkerId,
    /// Position of the worker in the task's response list.
    pub position: usize,
}

/// A candidate dropped because a lookahead update was degenerate.
#[derive(Debug, Clone)]
pub struct SkippedCandidate {
    pub task: TaskId,
    pub worker: WorkerId,
    pub position: usize,
    pub error: PosteriorError,
}

/// Result of one selection sweep.
#[derive(Debug, Clone)]
pub struct SelectionOutcome {
    pub selection: Selection,
    pub skipped: Vec<SkippedCandidate>,
    /// Number of pairs scored.
    pub evaluated: usize,
}

/// Knowledge-gradient selection over a [`CandidatePool`].
#[derive(Debug, Clone, Copy)]
pub struct KnowledgeGradient<'c> {
    cache: &'c SurvivalCache,
    updater: PosteriorUpdater,
    on_degenerate: DegeneratePolicy,
}

impl<'c> KnowledgeGradient<'c> {
    pub fn new(
        cache: &'c SurvivalCache,
        updater: PosteriorUpdater,
        on_degenerate: DegeneratePolicy,
    ) -> Self {
        Self {
            cache,
            updater,
            on_degenerate,
        }
    }

    /// `h(I(a', b')) - h(I(a, b))` if `worker` were to answer `label`.
    pub fn branch_reward(
        &self,
        task: BetaParams,
        worker: BetaParams,
        label: Label,
        current_score: f64,
    ) -> Result<Result<f64, PosteriorError>, AllocationError> {
        let next = match self.updater.update_task(task, worker, label) {
            Ok(next) => next,
            Err(e) => return Ok(Err(e)),
        };
        let score = decision_score(self.cache.survival(next)?);
        Ok(Ok(score - current_score))
    }

    /// `max(R1, R0)` for one pair; the inner error marks a degenerate branch.
    pub fn pair_reward(
        &self,
        task: BetaParams,
        worker: BetaParams,
    ) -> Result<Result<f64, PosteriorError>, AllocationError> {
        let current = decision_score(self.cache.survival(task)?);
        let r1 = match self.branch_reward(task, worker, Label::Positive, current)? {
            Ok(r) => r,
            Err(e) => return Ok(Err(e)),
        };
        let r0 = match self.branch_reward(task, worker, Label::Negative, current)? {
            Ok(r) => r,
            Err(e) => return Ok(Err(e)),
        };
        Ok(Ok(if r1 >= r0 { r1 } else { r0 }))
    }

    /// Score every live pair and return the maximiser.
    pub fn select_next(
        &self,
        task_params: &[BetaParams],
        worker_params: &[BetaParams],
        pool: &CandidatePool,
    ) -> Result<SelectionOutcome, AllocationError> {
        if pool.is_empty() {
            return Err(AllocationError::PoolExhausted);
        }

        let mut best: Option<Selection> = None;
        let mut skipped = Vec::new();
        let mut evaluated = 0usize;

        for task in pool.remaining_tasks() {
            let ab = *task_params
                .get(task.index())
                .ok_or_else(|| AllocationError::MissingParameter {
                    kind: ParameterKind::Task,
                    id: format!("#{}", task.index()),
                })?;

            for (position, candidate) in pool.workers_of(task) {
                let cd = *worker_params.get(candidate.worker.index()).ok_or_else(|| {
                    AllocationError::MissingParameter {
                        kind: ParameterKind::Worker,
                        id: format!("#{}", candidate.worker.index()),
                    }
                })?;

                let reward = match self.pair_reward(ab, cd)? {
                    Ok(r) => r,
                    Err(error) => match self.on_degenerate {
                        DegeneratePolicy::Abort => return Err(error.into()),
                        DegeneratePolicy::Skip => {
                            tracing::warn!(
                                task = task.index(),
                                worker = candidate.worker.index(),
                                position,
                                %error,
                                "skipping degenerate candidate"
                            );
                            skipped.push(SkippedCandidate {
                                task,
                                worker: candidate.worker,
                                position,
                                error,
                            });
                            continue;
                        }
                    },
                };
                evaluated += 1;

                if best.map_or(true, |b| reward > b.reward) {
                    best = Some(Selection {
                        reward,
                        task,
                        worker: candidate.worker,
                        position,
                    });
                }
            }
        }

        let selection = best.ok_or(AllocationError::NoViableCandidate)?;
        tracing::trace!(
            task = selection.task.index(),
            worker = selection.worker.index(),
            reward = selection.reward,
            evaluated,
            "selected pair"
        );
        Ok(SelectionOutcome {
            selection,
            skipped,
            evaluated,
        })
    }
}
