//! Application services for the assembly lifecycle.

mod error;
mod issues;
mod lifecycle;
mod provisioning;
mod query;
mod views;

pub use error::{AssemblyError, AssemblyErrorKind, AssemblyResult};
pub use issues::{IssueReport, IssueService, ReportIssueRequest};
pub use lifecycle::{
    CompleteTaskRequest, CreateTaskRequest, JobCompletion, StartTaskRequest, TaskLifecycleService,
};
pub use provisioning::{ProvisioningOutcome, ProvisioningService};
pub use query::{TaskListFilter, TaskQueryService};
pub use views::{
    AssemblySummary, JobCard, JobRollup, JobRollupSummary, RoleProgress, StatusCounts, TaskView,
    TeamAvailability,
};
