//! Read-only response registry: which workers labeled which task, what
//! they answered, and the optional gold label used for evaluation.
//!
//! Task and worker names are interned on load so that every downstream
//! structure can be a dense `Vec` addressed by `TaskId::index()` or
//! `WorkerId::index()`. The registry is never mutated after `build()`.

pub mod tsv;

use lasso::{Rodeo, RodeoReader};
use rustc_hash::FxHashMap;

use optkg_core::errors::DatasetError;
use optkg_core::types::{Label, TaskId, WorkerId};

/// One recorded answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response {
    pub worker: WorkerId,
    pub label: Label,
}

/// Everything recorded for one task.
#[derive(Debug, Clone)]
pub struct TaskRecord {
    pub id: TaskId,
    /// Responses in recorded order.
    pub responses: Vec<Response>,
    pub gold: Option<Label>,
}

/// Immutable task/worker/response registry.
#[derive(Debug)]
pub struct Registry {
    task_names: RodeoReader,
    worker_names: RodeoReader,
    records: Vec<TaskRecord>,
    pair_count: usize,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Task ids in first-appearance order.
    pub fn task_ids(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.records.iter().map(|r| r.id)
    }

    /// Distinct worker ids in first-appearance order.
    pub fn worker_ids(&self) -> impl Iterator<Item = WorkerId> + '_ {
        (0..self.worker_names.len()).filter_map(WorkerId::from_index)
    }

    pub fn task_count(&self) -> usize {
        self.records.len()
    }

    pub fn worker_count(&self) -> usize {
        self.worker_names.len()
    }

    /// Total number of recorded (task, worker) responses.
    pub fn pair_count(&self) -> usize {
        self.pair_count
    }

    pub fn records(&self) -> &[TaskRecord] {
        &self.records
    }

    pub fn record(&self, task: TaskId) -> Option<&TaskRecord> {
        self.records.get(task.index())
    }

    /// Responses for a task in recorded order.
    pub fn responses(&self, task: TaskId) -> &[Response] {
        self.record(task).map(|r| r.responses.as_slice()).unwrap_or(&[])
    }

    /// The response recorded at `position` in the task's list.
    pub fn response_at(&self, task: TaskId, position: usize) -> Option<Response> {
        self.responses(task).get(position).copied()
    }

    /// First response a given worker gave to a task.
    pub fn response_of(&self, task: TaskId, worker: WorkerId) -> Option<Label> {
        self.responses(task)
            .iter()
            .find(|r| r.worker == worker)
            .map(|r| r.label)
    }

    pub fn gold(&self, task: TaskId) -> Option<Label> {
        self.record(task).and_then(|r| r.gold)
    }

    pub fn task_name(&self, task: TaskId) -> &str {
        self.task_names.resolve(&task.inner())
    }

    pub fn worker_name(&self, worker: WorkerId) -> &str {
        self.worker_names.resolve(&worker.inner())
    }

    pub fn task_id(&self, name: &str) -> Option<TaskId> {
        self.task_names.get(name).map(TaskId::new)
    }

    pub fn worker_id(&self, name: &str) -> Option<WorkerId> {
        self.worker_names.get(name).map(WorkerId::new)
    }

    /// Tasks whose gold label is 1 and tasks whose gold label is 0.
    pub fn ground_truth(&self) -> (Vec<TaskId>, Vec<TaskId>) {
        let mut positive = Vec::new();
        let mut negative = Vec::new();
        for record in &self.records {
            match record.gold {
                Some(Label::Positive) => positive.push(record.id),
                Some(Label::Negative) => negative.push(record.id),
                None => {}
            }
        }
        (positive, negative)
    }
}

/// Incrementally assembles a [`Registry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    task_names: Rodeo,
    worker_names: Rodeo,
    responses: Vec<Vec<Response>>,
    gold: FxHashMap<TaskId, Label>,
}

impl RegistryBuilder {
    /// Intern a task, creating an empty record on first sight.
    pub fn task(&mut self, name: &str) -> TaskId {
        let id = TaskId::new(self.task_names.get_or_intern(name));
        if id.index() == self.responses.len() {
            self.responses.push(Vec::new());
        }
        id
    }

    /// Record that `worker` answered `label` for `task`.
    pub fn response(&mut self, task: &str, worker: &str, label: Label) -> &mut Self {
        let task = self.task(task);
        let worker = WorkerId::new(self.worker_names.get_or_intern(worker));
        self.responses[task.index()].push(Response { worker, label });
        self
    }

    /// Set a task's gold label. A second, different gold label is an error.
    pub fn gold(&mut self, task: &str, label: Label) -> Result<&mut Self, DatasetError> {
        let id = self.task(task);
        match self.gold.get(&id) {
            Some(existing) if *existing != label => {
                return Err(DatasetError::ConflictingGold {
                    task: task.to_string(),
                })
            }
            _ => {
                self.gold.insert(id, label);
            }
        }
        Ok(self)
    }

    pub fn build(self) -> Result<Registry, DatasetError> {
        let pair_count: usize = self.responses.iter().map(Vec::len).sum();
        if pair_count == 0 {
            return Err(DatasetError::Empty);
        }
        let records = self
            .responses
            .into_iter()
            .enumerate()
            .filter_map(|(i, responses)| {
                TaskId::from_index(i).map(|id| TaskRecord {
                    id,
                    responses,
                    gold: self.gold.get(&id).copied(),
                })
            })
            .collect();
        Ok(Registry {
            task_names: self.task_names.into_reader(),
            worker_names: self.worker_names.into_reader(),
            records,
            pair_count,
        })
    }
}
