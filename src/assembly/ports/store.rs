//! Store port for task persistence, filtered scans, and atomic updates.

use crate::assembly::domain::{
    JobId, RoleId, ScheduleDate, Task, TaskDomainError, TaskId, TaskStatus, TeamId,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// Read-modify-write step applied to one task while the store holds it
/// exclusively.
pub type TaskMutator = Box<dyn FnOnce(&mut Task) -> Result<(), TaskDomainError> + Send>;

/// Read-modify-write step applied to every task of a job while the store
/// holds all of them exclusively. Tasks are passed in store order.
pub type JobMutator = Box<dyn FnOnce(&mut [Task]) -> Result<(), TaskDomainError> + Send>;

/// Conjunction of optional task filters.
///
/// Every filter the store understands is indexable; derived predicates such
/// as "overdue" are applied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    /// Restrict to one job.
    pub job_id: Option<JobId>,
    /// Restrict to one role.
    pub role_id: Option<RoleId>,
    /// Restrict to one crew.
    pub team_id: Option<TeamId>,
    /// Restrict to one status.
    pub status: Option<TaskStatus>,
    /// Planned date lower bound, inclusive, compared as strings.
    pub planned_from: Option<String>,
    /// Planned date upper bound, inclusive, compared as strings.
    pub planned_to: Option<String>,
    /// Exact planned date.
    pub planned_on: Option<ScheduleDate>,
}

impl TaskQuery {
    /// Matches every task.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Matches the tasks of one job.
    #[must_use]
    pub fn for_job(job_id: JobId) -> Self {
        Self {
            job_id: Some(job_id),
            ..Self::default()
        }
    }

    /// Matches tasks planned for `day`.
    #[must_use]
    pub fn planned_on(day: NaiveDate) -> Self {
        Self {
            planned_on: Some(ScheduleDate::from_date(day)),
            ..Self::default()
        }
    }

    /// Restricts to one crew.
    #[must_use]
    pub fn with_team(mut self, team_id: TeamId) -> Self {
        self.team_id = Some(team_id);
        self
    }

    /// Evaluates the query against a task.
    ///
    /// A task without a planned date compares as the empty string, so it
    /// never satisfies a lower bound but always satisfies an upper bound.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        let planned = task.planned_date().map_or("", ScheduleDate::as_str);
        self.job_id.as_ref().is_none_or(|id| id == task.job_id())
            && self.role_id.as_ref().is_none_or(|id| *id == task.role().id)
            && self
                .team_id
                .as_ref()
                .is_none_or(|id| task.team_id() == Some(id))
            && self.status.is_none_or(|status| status == task.status())
            && self
                .planned_from
                .as_deref()
                .is_none_or(|from| planned >= from)
            && self.planned_to.as_deref().is_none_or(|to| planned <= to)
            && self
                .planned_on
                .as_ref()
                .is_none_or(|day| planned == day.as_str())
    }
}

/// Task persistence contract.
///
/// `update` and `update_job` must be atomic: no other read-modify-write on
/// the same task may interleave with the mutator.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::DuplicateTask`] when the task ID already
    /// exists.
    async fn insert(&self, task: &Task) -> TaskStoreResult<()>;

    /// Stores a new task unless its job already has a task for the same role
    /// and stage. The check and the insert are atomic.
    ///
    /// Returns `false` when an equivalent task already exists.
    async fn insert_stage(&self, task: &Task) -> TaskStoreResult<bool>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskStoreResult<Option<Task>>;

    /// Returns the tasks matching `query`, in store order.
    async fn scan(&self, query: &TaskQuery) -> TaskStoreResult<Vec<Task>>;

    /// Applies `mutator` to one task atomically and persists the result.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist and
    /// [`TaskStoreError::Rejected`] when the mutator refuses the change, in
    /// which case nothing is written.
    async fn update(&self, id: TaskId, mutator: TaskMutator) -> TaskStoreResult<Task>;

    /// Applies `mutator` to every task of a job atomically and persists the
    /// results. A job without tasks yields an empty vector.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Rejected`] when the mutator refuses the
    /// change, in which case no task of the job is written.
    async fn update_job(&self, job_id: &JobId, mutator: JobMutator)
    -> TaskStoreResult<Vec<Task>>;
}

/// Errors returned by task store implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskStoreError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The mutator refused the change.
    #[error(transparent)]
    Rejected(TaskDomainError),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
