//! CandidatePool: the (task, worker) pairs that may still be queried.
//!
//! The pool is an arena indexed by `TaskId::index()`. Each task keeps one
//! slot per recorded response, at the same position as in the registry.
//! Evicting clears a slot in O(1) without shifting its neighbours, so
//! positions stay valid and enumeration order never changes. A task whose
//! last slot is cleared stops being live.

use smallvec::SmallVec;

use optkg_core::errors::AllocationError;
use optkg_core::types::{Label, TaskId, WorkerId};

use crate::dataset::Registry;

/// A still-eligible (worker, recorded label) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub worker: WorkerId,
    pub label: Label,
}

#[derive(Debug, Clone)]
struct TaskSlots {
    task: TaskId,
    slots: SmallVec<[Option<Candidate>; 8]>,
    live: usize,
}

/// Depleting pool of queryable pairs.
#[derive(Debug, Clone)]
pub struct CandidatePool {
    tasks: Vec<TaskSlots>,
    live_tasks: usize,
    live_pairs: usize,
}

impl CandidatePool {
    /// Working copy of every response in the registry.
    pub fn from_registry(registry: &Registry) -> Self {
        let tasks: Vec<TaskSlots> = registry
            .records()
            .iter()
            .map(|record| {
                let slots: SmallVec<[Option<Candidate>; 8]> = record
                    .responses
                    .iter()
                    .map(|r| {
                        Some(Candidate {
                            worker: r.worker,
                            label: r.label,
                        })
                    })
                    .collect();
                TaskSlots {
                    task: record.id,
                    live: slots.len(),
                    slots,
                }
            })
            .collect();
        let live_tasks = tasks.iter().filter(|t| t.live > 0).count();
        let live_pairs = tasks.iter().map(|t| t.live).sum();
        Self {
            tasks,
            live_tasks,
            live_pairs,
        }
    }

    /// Tasks with at least one eligible worker, in registry order.
    pub fn remaining_tasks(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.tasks.iter().filter(|t| t.live > 0).map(|t| t.task)
    }

    /// Eligible `(position, candidate)` pairs of a task, in recorded order.
    /// Empty when the task is not live.
    pub fn workers_of(&self, task: TaskId) -> impl Iterator<Item = (usize, Candidate)> + '_ {
        self.tasks
            .get(task.index())
            .into_iter()
            .flat_map(|t| t.slots.iter().enumerate())
            .filter_map(|(pos, slot)| slot.map(|c| (pos, c)))
    }

    pub fn contains_task(&self, task: TaskId) -> bool {
        self.tasks.get(task.index()).is_some_and(|t| t.live > 0)
    }

    pub fn candidate(&self, task: TaskId, position: usize) -> Option<Candidate> {
        self.tasks
            .get(task.index())
            .and_then(|t| t.slots.get(position).copied().flatten())
    }

    /// Remove the pair at `position`; the task leaves the pool with its
    /// last worker.
    pub fn evict(&mut self, task: TaskId, position: usize) -> Result<Candidate, AllocationError> {
        let not_found = || AllocationError::CandidateNotFound {
            task: format!("#{}", task.index()),
            position,
        };
        let entry = self.tasks.get_mut(task.index()).ok_or_else(not_found)?;
        let candidate = entry
            .slots
            .get_mut(position)
            .and_then(Option::take)
            .ok_or_else(not_found)?;
        entry.live -= 1;
        self.live_pairs -= 1;
        if entry.live == 0 {
            self.live_tasks -= 1;
        }
        Ok(candidate)
    }

    pub fn task_count(&self) -> usize {
        self.live_tasks
    }

    pub fn pair_count(&self) -> usize {
        self.live_pairs
    }

    pub fn is_empty(&self) -> bool {
        self.live_pairs == 0
    }
}
