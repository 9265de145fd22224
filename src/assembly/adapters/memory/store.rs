//! In-memory task store for tests and embedded use.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::assembly::{
    domain::{JobId, Task, TaskId},
    ports::{JobMutator, TaskMutator, TaskQuery, TaskStore, TaskStoreError, TaskStoreResult},
};

/// Thread-safe in-memory task store.
///
/// Tasks are kept in insertion order, which is the order scans return.
/// Mutators run under the write lock, so read-modify-write cycles never
/// interleave.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: Vec<Task>,
    positions: HashMap<TaskId, usize>,
}

impl InMemoryTaskState {
    fn push(&mut self, task: &Task) {
        self.positions.insert(task.id(), self.tasks.len());
        self.tasks.push(task.clone());
    }

    fn has_stage(&self, task: &Task) -> bool {
        self.tasks.iter().any(|existing| {
            existing.job_id() == task.job_id()
                && existing.role().id == task.role().id
                && existing.stage().id == task.stage().id
        })
    }
}

impl InMemoryTaskStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read_state(&self) -> TaskStoreResult<RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state
            .read()
            .map_err(|err| TaskStoreError::persistence(std::io::Error::other(err.to_string())))
    }

    fn write_state(&self) -> TaskStoreResult<RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state
            .write()
            .map_err(|err| TaskStoreError::persistence(std::io::Error::other(err.to_string())))
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn insert(&self, task: &Task) -> TaskStoreResult<()> {
        let mut state = self.write_state()?;
        if state.positions.contains_key(&task.id()) {
            return Err(TaskStoreError::DuplicateTask(task.id()));
        }
        state.push(task);
        Ok(())
    }

    async fn insert_stage(&self, task: &Task) -> TaskStoreResult<bool> {
        let mut state = self.write_state()?;
        if state.positions.contains_key(&task.id()) {
            return Err(TaskStoreError::DuplicateTask(task.id()));
        }
        if state.has_stage(task) {
            return Ok(false);
        }
        state.push(task);
        Ok(true)
    }

    async fn find_by_id(&self, id: TaskId) -> TaskStoreResult<Option<Task>> {
        let state = self.read_state()?;
        Ok(state
            .positions
            .get(&id)
            .and_then(|position| state.tasks.get(*position))
            .cloned())
    }

    async fn scan(&self, query: &TaskQuery) -> TaskStoreResult<Vec<Task>> {
        let state = self.read_state()?;
        Ok(state
            .tasks
            .iter()
            .filter(|task| query.matches(task))
            .cloned()
            .collect())
    }

    async fn update(&self, id: TaskId, mutator: TaskMutator) -> TaskStoreResult<Task> {
        let mut state = self.write_state()?;
        let position = *state.positions.get(&id).ok_or(TaskStoreError::NotFound(id))?;
        let slot = state
            .tasks
            .get_mut(position)
            .ok_or(TaskStoreError::NotFound(id))?;

        // Mutate a copy so a rejected change leaves the stored task intact.
        let mut candidate = slot.clone();
        mutator(&mut candidate).map_err(TaskStoreError::Rejected)?;
        *slot = candidate.clone();
        Ok(candidate)
    }

    async fn update_job(
        &self,
        job_id: &JobId,
        mutator: JobMutator,
    ) -> TaskStoreResult<Vec<Task>> {
        let mut state = self.write_state()?;
        let positions: Vec<usize> = state
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| task.job_id() == job_id)
            .map(|(position, _)| position)
            .collect();
        let mut candidates: Vec<Task> = positions
            .iter()
            .filter_map(|position| state.tasks.get(*position).cloned())
            .collect();

        mutator(&mut candidates).map_err(TaskStoreError::Rejected)?;

        for (position, candidate) in positions.iter().zip(&candidates) {
            if let Some(slot) = state.tasks.get_mut(*position) {
                *slot = candidate.clone();
            }
        }
        Ok(candidates)
    }
}
