//! Service-level errors shared by the assembly services.

use crate::assembly::{
    domain::{JobId, TaskDomainError, TaskId},
    ports::{JobCatalogError, ReplacementOrderError, TaskStoreError},
};
use thiserror::Error;

/// Caller-facing classification of an [`AssemblyError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssemblyErrorKind {
    /// A task, job, or issue identifier does not resolve.
    NotFound,
    /// The request conflicts with open issues; resolve them and retry.
    PrerequisiteViolation,
    /// The request payload is malformed; nothing was changed.
    Validation,
    /// A collaborator (store, catalog, order sink) failed.
    Collaborator,
}

/// Errors returned by assembly services.
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// Domain validation or a lifecycle guard failed.
    #[error(transparent)]
    Domain(TaskDomainError),
    /// No task exists with the given identifier.
    #[error("assembly task {0} not found")]
    TaskNotFound(TaskId),
    /// The job catalog has no such job.
    #[error("job {0} not found")]
    JobNotFound(JobId),
    /// The job has no assembly tasks.
    #[error("no assembly tasks found for job {0}")]
    NoTasksForJob(JobId),
    /// Task store failure.
    #[error(transparent)]
    Store(TaskStoreError),
    /// Job catalog failure.
    #[error(transparent)]
    Catalog(#[from] JobCatalogError),
    /// Replacement order sink failure.
    #[error(transparent)]
    ReplacementOrder(#[from] ReplacementOrderError),
}

impl AssemblyError {
    /// Classifies the error for callers.
    #[must_use]
    pub const fn kind(&self) -> AssemblyErrorKind {
        match self {
            Self::Domain(
                TaskDomainError::PendingIssues { .. } | TaskDomainError::JobPendingIssues { .. },
            ) => AssemblyErrorKind::PrerequisiteViolation,
            Self::Domain(TaskDomainError::UnknownIssue { .. })
            | Self::TaskNotFound(_)
            | Self::JobNotFound(_)
            | Self::NoTasksForJob(_) => AssemblyErrorKind::NotFound,
            Self::Domain(_) => AssemblyErrorKind::Validation,
            Self::Store(_) | Self::Catalog(_) | Self::ReplacementOrder(_) => {
                AssemblyErrorKind::Collaborator
            }
        }
    }

    /// Returns the number of open issues behind a prerequisite violation.
    #[must_use]
    pub const fn blocking_issue_count(&self) -> Option<usize> {
        match self {
            Self::Domain(
                TaskDomainError::PendingIssues { count, .. }
                | TaskDomainError::JobPendingIssues { count, .. },
            ) => Some(*count),
            _ => None,
        }
    }
}

impl From<TaskDomainError> for AssemblyError {
    fn from(err: TaskDomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<TaskStoreError> for AssemblyError {
    fn from(err: TaskStoreError) -> Self {
        match err {
            TaskStoreError::NotFound(task_id) => Self::TaskNotFound(task_id),
            TaskStoreError::Rejected(domain) => Self::Domain(domain),
            other => Self::Store(other),
        }
    }
}

/// Result type for assembly service operations.
pub type AssemblyResult<T> = Result<T, AssemblyError>;
