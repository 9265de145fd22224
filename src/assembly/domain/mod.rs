//! Domain model for the assembly task lifecycle.
//!
//! Tasks, their issues, and the status rules live here with no knowledge of
//! storage, the job catalog, or the production-order subsystem.

mod error;
mod ids;
mod issue;
mod schedule;
mod status;
mod task;
mod update;

pub use error::{ParseIssueStatusError, ParseTaskStatusError, TaskDomainError};
pub use ids::{
    IssueId, JobId, PersonId, ReplacementOrderId, RoleId, StageId, SupplierId, TaskId, TeamId,
};
pub use issue::{FaultSource, Issue, IssueDetails, IssueStatus, IssueType, ReplacementState};
pub use schedule::{ScheduleDate, days_until};
pub use status::TaskStatus;
pub use task::{CompletionEvidence, JobSnapshot, NewTask, Photos, RoleRef, StageRef, Task};
pub use update::{FieldUpdate, TaskUpdate};
