//! Assembly task aggregate root.

use super::{
    FieldUpdate, Issue, IssueId, JobId, PersonId, ReplacementOrderId, RoleId, ScheduleDate,
    StageId, TaskDomainError, TaskId, TaskStatus, TaskUpdate, TeamId, days_until,
};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Trade the task belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRef {
    /// Role identifier.
    pub id: RoleId,
    /// Role display name.
    pub name: String,
}

/// Stage of the role's template the task covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRef {
    /// Stage identifier.
    pub id: StageId,
    /// Stage display name.
    pub name: String,
    /// Position of the stage within its role.
    pub order: i32,
}

/// Job display fields copied onto the task when it is created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSnapshot {
    /// Customer name.
    pub customer_name: Option<String>,
    /// Customer phone number.
    pub customer_phone: Option<String>,
    /// Installation site.
    pub location: Option<String>,
}

/// Proof-of-work photo references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photos {
    /// Photos taken before work started.
    pub before: Vec<String>,
    /// Photos taken after work finished.
    pub after: Vec<String>,
}

/// Evidence attached when a task is completed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionEvidence {
    /// Before photos to append.
    pub photos_before: Vec<String>,
    /// After photos to append.
    pub photos_after: Vec<String>,
    /// Customer signature reference, overwriting any earlier one.
    pub customer_signature: Option<String>,
}

/// Parameter object for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Owning job.
    pub job_id: JobId,
    /// Job display fields.
    pub job: JobSnapshot,
    /// Trade.
    pub role: RoleRef,
    /// Stage within the trade.
    pub stage: StageRef,
    /// Customer-facing commitment date.
    pub estimated_date: Option<ScheduleDate>,
    /// Internal planned date.
    pub planned_date: Option<ScheduleDate>,
    /// Assigned crew identifier.
    pub team_id: Option<TeamId>,
    /// Assigned crew display name.
    pub team_name: Option<String>,
    /// Assigned people.
    pub assigned_personnel: BTreeSet<PersonId>,
}

/// Assembly task aggregate root.
///
/// One task covers one stage of one trade for one job. Issues are owned by
/// the task and live exactly as long as it does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    job_id: JobId,
    job: JobSnapshot,
    role: RoleRef,
    stage: StageRef,
    estimated_date: Option<ScheduleDate>,
    planned_date: Option<ScheduleDate>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    team_id: Option<TeamId>,
    team_name: Option<String>,
    assigned_personnel: BTreeSet<PersonId>,
    status: TaskStatus,
    note: Option<String>,
    photos: Photos,
    customer_signature: Option<String>,
    issues: Vec<Issue>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a pending task with no evidence or issues.
    ///
    /// The status starts as `pending` even when a planned date is supplied;
    /// only a later update advances it.
    #[must_use]
    pub fn new(new_task: NewTask, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            job_id: new_task.job_id,
            job: new_task.job,
            role: new_task.role,
            stage: new_task.stage,
            estimated_date: new_task.estimated_date,
            planned_date: new_task.planned_date,
            started_at: None,
            completed_at: None,
            team_id: new_task.team_id,
            team_name: new_task.team_name,
            assigned_personnel: new_task.assigned_personnel,
            status: TaskStatus::Pending,
            note: None,
            photos: Photos::default(),
            customer_signature: None,
            issues: Vec::new(),
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning job identifier.
    #[must_use]
    pub const fn job_id(&self) -> &JobId {
        &self.job_id
    }

    /// Returns the job display fields captured at creation.
    #[must_use]
    pub const fn job(&self) -> &JobSnapshot {
        &self.job
    }

    /// Returns the trade.
    #[must_use]
    pub const fn role(&self) -> &RoleRef {
        &self.role
    }

    /// Returns the stage.
    #[must_use]
    pub const fn stage(&self) -> &StageRef {
        &self.stage
    }

    /// Returns the stage position within the role.
    #[must_use]
    pub const fn stage_order(&self) -> i32 {
        self.stage.order
    }

    /// Returns the customer-facing commitment date.
    #[must_use]
    pub const fn estimated_date(&self) -> Option<&ScheduleDate> {
        self.estimated_date.as_ref()
    }

    /// Returns the internal planned date.
    #[must_use]
    pub const fn planned_date(&self) -> Option<&ScheduleDate> {
        self.planned_date.as_ref()
    }

    /// Returns when work started.
    #[must_use]
    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Returns when work was completed.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the assigned crew identifier.
    #[must_use]
    pub const fn team_id(&self) -> Option<&TeamId> {
        self.team_id.as_ref()
    }

    /// Returns the assigned crew display name.
    #[must_use]
    pub fn team_name(&self) -> Option<&str> {
        self.team_name.as_deref()
    }

    /// Returns the assigned people.
    #[must_use]
    pub const fn assigned_personnel(&self) -> &BTreeSet<PersonId> {
        &self.assigned_personnel
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the free-text note.
    #[must_use]
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    /// Returns the photo evidence.
    #[must_use]
    pub const fn photos(&self) -> &Photos {
        &self.photos
    }

    /// Returns the customer signature reference.
    #[must_use]
    pub fn customer_signature(&self) -> Option<&str> {
        self.customer_signature.as_deref()
    }

    /// Returns the issues in report order.
    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Returns an issue by identifier.
    #[must_use]
    pub fn issue(&self, issue_id: IssueId) -> Option<&Issue> {
        self.issues.iter().find(|issue| issue.id() == issue_id)
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the number of unresolved issues.
    #[must_use]
    pub fn pending_issue_count(&self) -> usize {
        self.issues.iter().filter(|issue| issue.is_pending()).count()
    }

    /// Returns `true` when at least one issue is unresolved.
    #[must_use]
    pub fn has_pending_issues(&self) -> bool {
        self.issues.iter().any(Issue::is_pending)
    }

    /// Returns `true` when the estimated date has passed without completion.
    ///
    /// A missing or malformed estimated date is never overdue.
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status != TaskStatus::Completed
            && self
                .estimated_date
                .as_ref()
                .is_some_and(|date| date.is_before(today))
    }

    /// Days from `today` until the estimated date (negative once passed).
    #[must_use]
    pub fn days_until_estimated(&self, today: NaiveDate) -> i64 {
        days_until(self.estimated_date.as_ref(), today)
    }

    /// Days from `today` until the planned date (negative once passed).
    #[must_use]
    pub fn days_until_planned(&self, today: NaiveDate) -> i64 {
        days_until(self.planned_date.as_ref(), today)
    }

    /// Returns `true` when the task is planned for `day`.
    #[must_use]
    pub fn is_planned_on(&self, day: NaiveDate) -> bool {
        self.planned_date.as_ref().is_some_and(|date| date.is_on(day))
    }

    /// Applies a partial schedule and assignment update.
    ///
    /// Setting a planned date on a pending task advances it to `planned`;
    /// an explicit status in the update wins over that advance.
    pub fn apply_update(&mut self, update: TaskUpdate, clock: &impl Clock) {
        let TaskUpdate {
            planned_date,
            team_id,
            team_name,
            assigned_personnel,
            status,
            note,
        } = update;

        let schedules = matches!(planned_date, FieldUpdate::Set(_));
        planned_date.merge_into(&mut self.planned_date);
        if schedules && self.status == TaskStatus::Pending {
            self.status = TaskStatus::Planned;
        }

        team_id.merge_into(&mut self.team_id);
        team_name.merge_into(&mut self.team_name);
        match assigned_personnel {
            FieldUpdate::Absent => {}
            FieldUpdate::Clear => self.assigned_personnel.clear(),
            FieldUpdate::Set(personnel) => self.assigned_personnel = personnel,
        }
        if let Some(forced) = status {
            self.status = forced;
        }
        note.merge_into(&mut self.note);
        self.touch(clock);
    }

    /// Marks work as started.
    ///
    /// No status guard applies: a completed or blocked task is moved back to
    /// `in_progress` as well.
    pub fn start(
        &mut self,
        started_at: Option<DateTime<Utc>>,
        note: Option<String>,
        clock: &impl Clock,
    ) {
        self.status = TaskStatus::InProgress;
        self.started_at = Some(started_at.unwrap_or_else(|| clock.utc()));
        self.overwrite_note(note);
        self.touch(clock);
    }

    /// Completes the task and appends the supplied evidence.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::PendingIssues`] when any issue is still
    /// pending. The task is left unchanged in that case.
    pub fn complete(
        &mut self,
        completed_at: Option<DateTime<Utc>>,
        note: Option<String>,
        evidence: CompletionEvidence,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        let count = self.pending_issue_count();
        if count > 0 {
            return Err(TaskDomainError::PendingIssues {
                task_id: self.id,
                count,
            });
        }

        let CompletionEvidence {
            photos_before,
            photos_after,
            customer_signature,
        } = evidence;

        self.status = TaskStatus::Completed;
        self.completed_at = Some(completed_at.unwrap_or_else(|| clock.utc()));
        self.overwrite_note(note);
        self.photos.before.extend(photos_before);
        self.photos.after.extend(photos_after);
        if let Some(signature) = customer_signature.filter(|value| !value.trim().is_empty()) {
            self.customer_signature = Some(signature);
        }
        self.touch(clock);
        Ok(())
    }

    /// Appends a pending issue and blocks the task.
    ///
    /// Returns the status the task had before it was blocked.
    pub fn report_issue(&mut self, issue: Issue, clock: &impl Clock) -> TaskStatus {
        let previous = self.status;
        self.issues.push(issue);
        self.status = TaskStatus::Blocked;
        self.touch(clock);
        previous
    }

    /// Resolves an issue and unblocks the task once no issue is pending.
    ///
    /// An unblocked task returns to `in_progress` if work had started, else
    /// to `planned`. Returns the status after resolution.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::UnknownIssue`] when the issue is not
    /// attached to this task.
    pub fn resolve_issue(
        &mut self,
        issue_id: IssueId,
        clock: &impl Clock,
    ) -> Result<TaskStatus, TaskDomainError> {
        let resolved_at = clock.utc();
        let issue = self
            .issues
            .iter_mut()
            .find(|candidate| candidate.id() == issue_id)
            .ok_or(TaskDomainError::UnknownIssue {
                task_id: self.id,
                issue_id,
            })?;
        issue.resolve(resolved_at);

        if !self.has_pending_issues() {
            self.status = if self.started_at.is_some() {
                TaskStatus::InProgress
            } else {
                TaskStatus::Planned
            };
        }
        self.touch(clock);
        Ok(self.status)
    }

    /// Stores the replacement order created for a queued issue.
    ///
    /// Returns `false` when the issue had no queued replacement, which leaves
    /// the task untouched.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::UnknownIssue`] when the issue is not
    /// attached to this task.
    pub fn record_replacement_order(
        &mut self,
        issue_id: IssueId,
        order_id: ReplacementOrderId,
        clock: &impl Clock,
    ) -> Result<bool, TaskDomainError> {
        let task_id = self.id;
        let issue = self
            .issues
            .iter_mut()
            .find(|candidate| candidate.id() == issue_id)
            .ok_or(TaskDomainError::UnknownIssue { task_id, issue_id })?;
        let recorded = issue.record_replacement_order(order_id);
        if recorded {
            self.touch(clock);
        }
        Ok(recorded)
    }

    fn overwrite_note(&mut self, note: Option<String>) {
        if let Some(text) = note.filter(|value| !value.trim().is_empty()) {
            self.note = Some(text);
        }
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
