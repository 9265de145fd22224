//! Read-side views computed from stored tasks.
//!
//! Nothing here is persisted; annotations are recomputed on every read from
//! the clock's current date.

use crate::assembly::domain::{JobId, RoleId, ScheduleDate, Task, TaskStatus, TeamId};
use chrono::NaiveDate;
use serde::Serialize;

/// Task annotated with date-derived fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskView {
    /// Stored task.
    #[serde(flatten)]
    pub task: Task,
    /// Estimated date has passed without completion.
    pub is_overdue: bool,
    /// Days until the estimated date; 0 when missing or malformed.
    pub days_until_estimated: i64,
    /// Days until the planned date; 0 when missing or malformed.
    pub days_until_planned: i64,
}

impl TaskView {
    /// Annotates `task` relative to `today`.
    #[must_use]
    pub fn annotate(task: Task, today: NaiveDate) -> Self {
        Self {
            is_overdue: task.is_overdue(today),
            days_until_estimated: task.days_until_estimated(today),
            days_until_planned: task.days_until_planned(today),
            task,
        }
    }
}

/// Tasks of one job scheduled for the same day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobCard {
    /// Job identifier.
    pub job_id: JobId,
    /// Customer name.
    pub customer_name: Option<String>,
    /// Customer phone number.
    pub customer_phone: Option<String>,
    /// Installation site.
    pub location: Option<String>,
    /// Tasks ordered by manifest priority, then stage order.
    pub tasks: Vec<Task>,
}

impl JobCard {
    pub(super) fn open(task: &Task) -> Self {
        let job = task.job();
        Self {
            job_id: task.job_id().clone(),
            customer_name: job.customer_name.clone(),
            customer_phone: job.customer_phone.clone(),
            location: job.location.clone(),
            tasks: Vec::new(),
        }
    }
}

/// Progress of one trade within a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleProgress {
    /// Role identifier.
    pub role_id: RoleId,
    /// Role display name.
    pub role_name: String,
    /// Tasks ordered by stage order.
    pub tasks: Vec<Task>,
    /// Completed task count.
    pub completed: usize,
    /// Task count.
    pub total: usize,
    /// Every task of the role is completed.
    pub is_complete: bool,
}

/// Job-level aggregate of a rollup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JobRollupSummary {
    /// Task count.
    pub total: usize,
    /// Completed task count.
    pub completed: usize,
    /// In-progress task count.
    pub in_progress: usize,
    /// Pending task count.
    pub pending: usize,
    /// Blocked task count.
    pub blocked: usize,
    /// Every role is complete; false for a job without roles.
    pub all_completed: bool,
    /// Tasks with at least one pending issue.
    pub tasks_with_pending_issues: usize,
    /// Pending issues across all tasks.
    pub pending_issues: usize,
}

/// Per-role progress of one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRollup {
    /// Job identifier.
    pub job_id: JobId,
    /// Role groups ordered by role name.
    pub roles: Vec<RoleProgress>,
    /// Job-level aggregate.
    pub summary: JobRollupSummary,
}

/// Task counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    /// All tasks.
    pub total: usize,
    /// `pending` tasks.
    pub pending: usize,
    /// `planned` tasks.
    pub planned: usize,
    /// `in_progress` tasks.
    pub in_progress: usize,
    /// `completed` tasks.
    pub completed: usize,
    /// `blocked` tasks.
    pub blocked: usize,
}

impl StatusCounts {
    pub(super) const fn record(&mut self, status: TaskStatus) {
        self.total += 1;
        match status {
            TaskStatus::Pending => self.pending += 1,
            TaskStatus::Planned => self.planned += 1,
            TaskStatus::InProgress => self.in_progress += 1,
            TaskStatus::Completed => self.completed += 1,
            TaskStatus::Blocked => self.blocked += 1,
        }
    }
}

/// Dashboard counters across every task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssemblySummary {
    /// Task counts per status.
    pub counts: StatusCounts,
    /// Overdue task count.
    pub overdue: usize,
    /// Tasks planned for today.
    pub planned_today: usize,
    /// Head of the overdue list.
    pub overdue_tasks: Vec<TaskView>,
}

/// Informational crew load for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamAvailability {
    /// Crew identifier.
    pub team_id: TeamId,
    /// Day checked.
    pub date: ScheduleDate,
    /// Always `true`; the check never blocks an assignment.
    pub available: bool,
    /// Tasks already assigned that day.
    pub tasks: Vec<Task>,
    /// Shown when the crew already has work that day.
    pub warning: Option<String>,
}

impl TeamAvailability {
    /// Returns the number of tasks already assigned that day.
    #[must_use]
    pub const fn task_count(&self) -> usize {
        self.tasks.len()
    }
}
