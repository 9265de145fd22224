//! Service layer for task creation, scheduling, and completion.

use super::error::{AssemblyError, AssemblyResult};
use crate::assembly::{
    domain::{
        CompletionEvidence, JobId, NewTask, PersonId, RoleId, RoleRef, ScheduleDate, StageId,
        StageRef, Task, TaskDomainError, TaskId, TaskStatus, TaskUpdate, TeamId,
    },
    ports::{JobCatalog, TaskStore},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, warn};

/// Request payload for creating a single task outside provisioning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    job_id: String,
    role_id: String,
    role_name: String,
    stage_id: String,
    stage_name: String,
    stage_order: i32,
    estimated_date: Option<String>,
    planned_date: Option<String>,
    team: Option<(String, String)>,
    assigned_personnel: Vec<String>,
}

impl CreateTaskRequest {
    /// Creates a request with the required job, role, and stage fields.
    #[must_use]
    pub fn new(
        job_id: impl Into<String>,
        role_id: impl Into<String>,
        role_name: impl Into<String>,
        stage_id: impl Into<String>,
        stage_name: impl Into<String>,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            role_id: role_id.into(),
            role_name: role_name.into(),
            stage_id: stage_id.into(),
            stage_name: stage_name.into(),
            stage_order: 1,
            estimated_date: None,
            planned_date: None,
            team: None,
            assigned_personnel: Vec::new(),
        }
    }

    /// Sets the stage position within the role.
    #[must_use]
    pub const fn with_stage_order(mut self, order: i32) -> Self {
        self.stage_order = order;
        self
    }

    /// Sets the customer-facing commitment date.
    #[must_use]
    pub fn with_estimated_date(mut self, date: impl Into<String>) -> Self {
        self.estimated_date = Some(date.into());
        self
    }

    /// Sets the internal planned date.
    #[must_use]
    pub fn with_planned_date(mut self, date: impl Into<String>) -> Self {
        self.planned_date = Some(date.into());
        self
    }

    /// Assigns a crew.
    #[must_use]
    pub fn with_team(mut self, team_id: impl Into<String>, team_name: impl Into<String>) -> Self {
        self.team = Some((team_id.into(), team_name.into()));
        self
    }

    /// Assigns people.
    #[must_use]
    pub fn with_personnel(mut self, personnel: impl IntoIterator<Item = String>) -> Self {
        self.assigned_personnel = personnel.into_iter().collect();
        self
    }
}

/// Request payload for marking work as started.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartTaskRequest {
    started_at: Option<DateTime<Utc>>,
    note: Option<String>,
}

impl StartTaskRequest {
    /// Creates a request stamped with the service clock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses an explicit start timestamp.
    #[must_use]
    pub const fn at(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = Some(started_at);
        self
    }

    /// Overwrites the task note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Request payload for completing a task or a whole job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompleteTaskRequest {
    completed_at: Option<DateTime<Utc>>,
    note: Option<String>,
    photos_before: Vec<String>,
    photos_after: Vec<String>,
    customer_signature: Option<String>,
}

impl CompleteTaskRequest {
    /// Creates a request stamped with the service clock and no evidence.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses an explicit completion timestamp.
    #[must_use]
    pub const fn at(mut self, completed_at: DateTime<Utc>) -> Self {
        self.completed_at = Some(completed_at);
        self
    }

    /// Overwrites the task note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Appends before photos.
    #[must_use]
    pub fn with_photos_before(mut self, photos: impl IntoIterator<Item = String>) -> Self {
        self.photos_before.extend(photos);
        self
    }

    /// Appends after photos.
    #[must_use]
    pub fn with_photos_after(mut self, photos: impl IntoIterator<Item = String>) -> Self {
        self.photos_after.extend(photos);
        self
    }

    /// Records the customer signature.
    #[must_use]
    pub fn with_customer_signature(mut self, signature: impl Into<String>) -> Self {
        self.customer_signature = Some(signature.into());
        self
    }

    fn evidence(&self) -> CompletionEvidence {
        CompletionEvidence {
            photos_before: self.photos_before.clone(),
            photos_after: self.photos_after.clone(),
            customer_signature: self.customer_signature.clone(),
        }
    }
}

/// Outcome of completing every task of a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobCompletion {
    /// Job that was completed.
    pub job_id: JobId,
    /// Tasks after completion, in store order.
    pub tasks: Vec<Task>,
}

impl JobCompletion {
    /// Returns the number of tasks completed.
    #[must_use]
    pub const fn completed(&self) -> usize {
        self.tasks.len()
    }
}

/// Task lifecycle orchestration service.
#[derive(Clone)]
pub struct TaskLifecycleService<S, J, C>
where
    S: TaskStore,
    J: JobCatalog,
    C: Clock + Send + Sync + 'static,
{
    store: Arc<S>,
    catalog: Arc<J>,
    clock: Arc<C>,
}

impl<S, J, C> TaskLifecycleService<S, J, C>
where
    S: TaskStore,
    J: JobCatalog,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub const fn new(store: Arc<S>, catalog: Arc<J>, clock: Arc<C>) -> Self {
        Self {
            store,
            catalog,
            clock,
        }
    }

    /// Creates one task for an existing job.
    ///
    /// The job's display fields are copied onto the task. The task starts as
    /// `pending` even when a planned date is supplied.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::JobNotFound`] when the catalog has no such
    /// job, or a validation error when identifiers or names are blank.
    pub async fn create_task(&self, request: CreateTaskRequest) -> AssemblyResult<Task> {
        let CreateTaskRequest {
            job_id,
            role_id,
            role_name,
            stage_id,
            stage_name,
            stage_order,
            estimated_date,
            planned_date,
            team,
            assigned_personnel,
        } = request;

        let job = JobId::new(job_id)?;
        let role = RoleRef {
            id: RoleId::new(role_id)?,
            name: required_name(&role_name, "role")?,
        };
        let stage = StageRef {
            id: StageId::new(stage_id)?,
            name: required_name(&stage_name, "stage")?,
            order: stage_order,
        };
        let assignment = team
            .map(|(id, name)| TeamId::new(id).map(|team| (team, name)))
            .transpose()?;
        let (team_id, team_name) =
            assignment.map_or((None, None), |(team, name)| (Some(team), Some(name)));
        let personnel = assigned_personnel
            .into_iter()
            .map(PersonId::new)
            .collect::<Result<BTreeSet<_>, _>>()?;

        let profile = self
            .catalog
            .find_job(&job)
            .await?
            .ok_or_else(|| AssemblyError::JobNotFound(job.clone()))?;

        let task = Task::new(
            NewTask {
                job_id: job,
                job: profile.snapshot(),
                role,
                stage,
                estimated_date: estimated_date.and_then(ScheduleDate::new),
                planned_date: planned_date.and_then(ScheduleDate::new),
                team_id,
                team_name,
                assigned_personnel: personnel,
            },
            &*self.clock,
        );
        self.store.insert(&task).await?;
        info!(
            task_id = %task.id(),
            job_id = %task.job_id(),
            role_id = %task.role().id,
            stage_id = %task.stage().id,
            "assembly task created"
        );
        Ok(task)
    }

    /// Applies a partial schedule, assignment, status, or note update.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::TaskNotFound`] when the task does not exist.
    pub async fn update_task(&self, task_id: TaskId, update: TaskUpdate) -> AssemblyResult<Task> {
        let clock = Arc::clone(&self.clock);
        let task = self
            .store
            .update(
                task_id,
                Box::new(move |task: &mut Task| {
                    let previous = task.status();
                    task.apply_update(update, &*clock);
                    note_transition(task, previous);
                    Ok(())
                }),
            )
            .await?;
        info!(task_id = %task_id, status = %task.status(), "assembly task updated");
        Ok(task)
    }

    /// Marks work as started.
    ///
    /// No status guard applies; the task always moves to `in_progress`.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::TaskNotFound`] when the task does not exist.
    pub async fn start_task(
        &self,
        task_id: TaskId,
        request: StartTaskRequest,
    ) -> AssemblyResult<Task> {
        let clock = Arc::clone(&self.clock);
        let StartTaskRequest { started_at, note } = request;
        let task = self
            .store
            .update(
                task_id,
                Box::new(move |task: &mut Task| {
                    let previous = task.status();
                    task.start(started_at, note, &*clock);
                    note_transition(task, previous);
                    Ok(())
                }),
            )
            .await?;
        info!(task_id = %task_id, "assembly task started");
        Ok(task)
    }

    /// Completes a task and appends the supplied evidence.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::TaskNotFound`] when the task does not exist
    /// and a prerequisite violation when any of its issues is pending.
    pub async fn complete_task(
        &self,
        task_id: TaskId,
        request: CompleteTaskRequest,
    ) -> AssemblyResult<Task> {
        let clock = Arc::clone(&self.clock);
        let result = self
            .store
            .update(
                task_id,
                Box::new(move |task: &mut Task| {
                    let previous = task.status();
                    let evidence = request.evidence();
                    task.complete(request.completed_at, request.note, evidence, &*clock)?;
                    note_transition(task, previous);
                    Ok(())
                }),
            )
            .await
            .map_err(AssemblyError::from);
        match &result {
            Ok(task) => info!(task_id = %task.id(), "assembly task completed"),
            Err(err) => warn!(task_id = %task_id, error = %err, "assembly task not completed"),
        }
        result
    }

    /// Completes every task of a job in one atomic step.
    ///
    /// Before photos are attached to the tasks of the lowest stage order,
    /// after photos and the signature to those of the highest. All tasks
    /// share one completion timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::NoTasksForJob`] when the job has no tasks and
    /// a prerequisite violation when any task of the job has a pending
    /// issue, in which case no task is changed.
    pub async fn complete_job(
        &self,
        job_id: &JobId,
        request: CompleteTaskRequest,
    ) -> AssemblyResult<JobCompletion> {
        let clock = Arc::clone(&self.clock);
        let guarded_job = job_id.clone();
        let tasks = self
            .store
            .update_job(
                job_id,
                Box::new(move |tasks: &mut [Task]| {
                    complete_all(tasks, &guarded_job, request, &*clock)
                }),
            )
            .await?;
        if tasks.is_empty() {
            return Err(AssemblyError::NoTasksForJob(job_id.clone()));
        }
        info!(job_id = %job_id, completed = tasks.len(), "assembly job completed");
        Ok(JobCompletion {
            job_id: job_id.clone(),
            tasks,
        })
    }
}

fn complete_all(
    tasks: &mut [Task],
    job_id: &JobId,
    request: CompleteTaskRequest,
    clock: &impl Clock,
) -> Result<(), TaskDomainError> {
    let count: usize = tasks.iter().map(Task::pending_issue_count).sum();
    if count > 0 {
        return Err(TaskDomainError::JobPendingIssues {
            job_id: job_id.clone(),
            count,
        });
    }
    let orders = tasks.iter().map(Task::stage_order);
    let (Some(first), Some(last)) = (orders.clone().min(), orders.max()) else {
        return Ok(());
    };

    let completed_at = Some(request.completed_at.unwrap_or_else(|| clock.utc()));
    for task in tasks.iter_mut() {
        let order = task.stage_order();
        let evidence = CompletionEvidence {
            photos_before: if order == first {
                request.photos_before.clone()
            } else {
                Vec::new()
            },
            photos_after: if order == last {
                request.photos_after.clone()
            } else {
                Vec::new()
            },
            customer_signature: request
                .customer_signature
                .clone()
                .filter(|_| order == last),
        };
        task.complete(completed_at, request.note.clone(), evidence, clock)?;
    }
    Ok(())
}

fn required_name(value: &str, field: &'static str) -> Result<String, TaskDomainError> {
    let normalized = value.trim();
    if normalized.is_empty() {
        return Err(TaskDomainError::EmptyName(field));
    }
    Ok(normalized.to_owned())
}

fn note_transition(task: &Task, previous: TaskStatus) {
    let current = task.status();
    if previous != current && !previous.can_transition_to(current) {
        warn!(
            task_id = %task.id(),
            from = %previous,
            to = %current,
            "status change outside the canonical lifecycle"
        );
    }
}
