//! Error types for assembly domain validation and parsing.

use super::{IssueId, JobId, TaskId};
use thiserror::Error;

/// Errors returned while constructing or mutating assembly domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// An externally supplied identifier is empty after trimming.
    #[error("{0} identifier must not be empty")]
    EmptyIdentifier(&'static str),

    /// A role or stage display name is empty after trimming.
    #[error("{0} name must not be empty")]
    EmptyName(&'static str),

    /// The reported issue item is empty after trimming.
    #[error("issue item must not be empty")]
    EmptyIssueItem,

    /// Issue quantities must be positive.
    #[error("issue quantity must be a positive integer")]
    ZeroQuantity,

    /// The issue type value is unsupported.
    #[error("unsupported issue type: {0}")]
    InvalidIssueType(String),

    /// The fault source value is unsupported.
    #[error("unsupported fault source: {0}")]
    InvalidFaultSource(String),

    /// The issue is not attached to the task.
    #[error("issue {issue_id} not found on task {task_id}")]
    UnknownIssue {
        /// Task that was searched.
        task_id: TaskId,
        /// Issue that was requested.
        issue_id: IssueId,
    },

    /// The issue was reported without requesting a replacement.
    #[error("issue {0} has no replacement request")]
    NoReplacementRequested(IssueId),

    /// The task cannot be completed while issues remain open.
    #[error("task {task_id} has {count} pending issue(s); resolve them first")]
    PendingIssues {
        /// Task carrying the open issues.
        task_id: TaskId,
        /// Number of open issues.
        count: usize,
    },

    /// Bulk completion is refused while any task of the job has open issues.
    #[error("job {job_id} has {count} pending issue(s); resolve them first")]
    JobPendingIssues {
        /// Job whose tasks carry the open issues.
        job_id: JobId,
        /// Number of open issues across the job.
        count: usize,
    },
}

/// Error returned while parsing task statuses from persistence or requests.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing issue statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown issue status: {0}")]
pub struct ParseIssueStatusError(pub String);
