//! Query and rollup service: listings, manifests, and dashboard counters.

use super::error::{AssemblyError, AssemblyResult};
use super::views::{
    AssemblySummary, JobCard, JobRollup, JobRollupSummary, RoleProgress, StatusCounts,
    TaskView, TeamAvailability,
};
use crate::assembly::{
    domain::{JobId, RoleId, ScheduleDate, Task, TaskId, TaskStatus, TeamId},
    ports::{TaskQuery, TaskStore},
};
use crate::config::{OverdueRanking, SummarySettings};
use chrono::NaiveDate;
use mockable::Clock;
use std::sync::Arc;
use tracing::debug;

/// Filters for task listings.
///
/// Store-level filters are combined with an optional overdue-only predicate
/// evaluated at read time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListFilter {
    query: TaskQuery,
    overdue_only: bool,
}

impl TaskListFilter {
    /// Matches every task.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to one job.
    #[must_use]
    pub fn for_job(mut self, job_id: JobId) -> Self {
        self.query.job_id = Some(job_id);
        self
    }

    /// Restricts to one role.
    #[must_use]
    pub fn for_role(mut self, role_id: RoleId) -> Self {
        self.query.role_id = Some(role_id);
        self
    }

    /// Restricts to one crew.
    #[must_use]
    pub fn for_team(mut self, team_id: TeamId) -> Self {
        self.query.team_id = Some(team_id);
        self
    }

    /// Restricts to one status.
    #[must_use]
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.query.status = Some(status);
        self
    }

    /// Restricts planned dates to `from..=to`, compared as strings.
    #[must_use]
    pub fn planned_between(mut self, from: Option<String>, to: Option<String>) -> Self {
        self.query.planned_from = from;
        self.query.planned_to = to;
        self
    }

    /// Keeps only overdue tasks.
    #[must_use]
    pub const fn overdue_only(mut self) -> Self {
        self.overdue_only = true;
        self
    }
}

/// Read-side service computing derived views.
#[derive(Clone)]
pub struct TaskQueryService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
    settings: SummarySettings,
}

impl<S, C> TaskQueryService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    /// Creates a new query service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>, settings: SummarySettings) -> Self {
        Self {
            store,
            clock,
            settings,
        }
    }

    fn today(&self) -> NaiveDate {
        self.clock.utc().date_naive()
    }

    /// Fetches one annotated task.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::TaskNotFound`] when the task does not exist.
    pub async fn get_task(&self, task_id: TaskId) -> AssemblyResult<TaskView> {
        let task = self
            .store
            .find_by_id(task_id)
            .await?
            .ok_or(AssemblyError::TaskNotFound(task_id))?;
        Ok(TaskView::annotate(task, self.today()))
    }

    /// Lists annotated tasks matching `filter`, in store order.
    ///
    /// # Errors
    ///
    /// Returns a collaborator error when the store scan fails.
    pub async fn list_tasks(&self, filter: &TaskListFilter) -> AssemblyResult<Vec<TaskView>> {
        let today = self.today();
        let views = self
            .store
            .scan(&filter.query)
            .await?
            .into_iter()
            .map(|task| TaskView::annotate(task, today))
            .filter(|view| !filter.overdue_only || view.is_overdue)
            .collect::<Vec<_>>();
        debug!(count = views.len(), "tasks listed");
        Ok(views)
    }

    /// Builds today's crew manifest, one card per job.
    ///
    /// Cards appear in the order their first task is found. Within a card,
    /// in-progress work comes first, then pending, then the rest, each by
    /// stage order.
    ///
    /// # Errors
    ///
    /// Returns a collaborator error when the store scan fails.
    pub async fn today_manifest(&self, team_id: Option<TeamId>) -> AssemblyResult<Vec<JobCard>> {
        let mut query = TaskQuery::planned_on(self.today());
        query.team_id = team_id;

        let mut cards: Vec<JobCard> = Vec::new();
        for task in self.store.scan(&query).await? {
            push_job_task(&mut cards, task);
        }
        for card in &mut cards {
            card.tasks
                .sort_by_key(|task| (task.status().manifest_priority(), task.stage_order()));
        }
        debug!(jobs = cards.len(), "manifest built");
        Ok(cards)
    }

    /// Summarises a job's progress per role.
    ///
    /// # Errors
    ///
    /// Returns a collaborator error when the store scan fails.
    pub async fn job_rollup(&self, job_id: &JobId) -> AssemblyResult<JobRollup> {
        let tasks = self.store.scan(&TaskQuery::for_job(job_id.clone())).await?;

        let mut summary = JobRollupSummary::default();
        let mut roles: Vec<RoleProgress> = Vec::new();
        for task in tasks {
            summary.total += 1;
            match task.status() {
                TaskStatus::Completed => summary.completed += 1,
                TaskStatus::InProgress => summary.in_progress += 1,
                TaskStatus::Pending => summary.pending += 1,
                TaskStatus::Blocked => summary.blocked += 1,
                TaskStatus::Planned => {}
            }
            let pending_issues = task.pending_issue_count();
            if pending_issues > 0 {
                summary.tasks_with_pending_issues += 1;
                summary.pending_issues += pending_issues;
            }
            push_role_task(&mut roles, task);
        }

        for role in &mut roles {
            role.tasks.sort_by_key(Task::stage_order);
            role.total = role.tasks.len();
            role.completed = role
                .tasks
                .iter()
                .filter(|task| task.status() == TaskStatus::Completed)
                .count();
            role.is_complete = role.total > 0 && role.completed == role.total;
        }
        roles.sort_by(|left, right| left.role_name.cmp(&right.role_name));
        summary.all_completed = !roles.is_empty() && roles.iter().all(|role| role.is_complete);

        Ok(JobRollup {
            job_id: job_id.clone(),
            roles,
            summary,
        })
    }

    /// Computes dashboard counters across every task.
    ///
    /// # Errors
    ///
    /// Returns a collaborator error when the store scan fails.
    pub async fn summary(&self) -> AssemblyResult<AssemblySummary> {
        let today = self.today();
        let mut counts = StatusCounts::default();
        let mut planned_today = 0;
        let mut overdue = Vec::new();
        for task in self.store.scan(&TaskQuery::all()).await? {
            counts.record(task.status());
            if task.is_planned_on(today) {
                planned_today += 1;
            }
            if task.is_overdue(today) {
                overdue.push(TaskView::annotate(task, today));
            }
        }

        let overdue_count = overdue.len();
        if self.settings.overdue_ranking == OverdueRanking::MostOverdueFirst {
            overdue.sort_by_key(|view| view.days_until_estimated);
        }
        overdue.truncate(self.settings.overdue_list_limit);
        debug!(total = counts.total, overdue = overdue_count, "summary computed");

        Ok(AssemblySummary {
            counts,
            overdue: overdue_count,
            planned_today,
            overdue_tasks: overdue,
        })
    }

    /// Reports how much work a crew already has on `date`.
    ///
    /// The result is informational; availability is always reported.
    ///
    /// # Errors
    ///
    /// Returns a collaborator error when the store scan fails.
    pub async fn team_availability(
        &self,
        team_id: TeamId,
        date: ScheduleDate,
    ) -> AssemblyResult<TeamAvailability> {
        let query = TaskQuery {
            team_id: Some(team_id.clone()),
            planned_on: Some(date.clone()),
            ..TaskQuery::default()
        };
        let tasks = self.store.scan(&query).await?;
        let warning = (!tasks.is_empty()).then(|| {
            format!(
                "team {team_id} already has {} task(s) on {date}",
                tasks.len()
            )
        });
        Ok(TeamAvailability {
            team_id,
            date,
            available: true,
            tasks,
            warning,
        })
    }
}

fn push_job_task(cards: &mut Vec<JobCard>, task: Task) {
    if let Some(card) = cards.iter_mut().find(|card| card.job_id == *task.job_id()) {
        card.tasks.push(task);
        return;
    }
    let mut card = JobCard::open(&task);
    card.tasks.push(task);
    cards.push(card);
}

fn push_role_task(roles: &mut Vec<RoleProgress>, task: Task) {
    if let Some(group) = roles.iter_mut().find(|group| group.role_id == task.role().id) {
        group.tasks.push(task);
        return;
    }
    roles.push(RoleProgress {
        role_id: task.role().id.clone(),
        role_name: task.role().name.clone(),
        tasks: vec![task],
        completed: 0,
        total: 0,
        is_complete: false,
    });
}
