//! Issue sub-protocol: reporting, resolving, and replacement orders.
//!
//! Reporting an issue that asks for a replacement is a two-step exchange.
//! The issue is first persisted with a queued replacement, then the request
//! is sent to the order sink and the returned order identifier is recorded.
//! A failed send leaves the replacement queued; callers retry it with
//! [`IssueService::dispatch_replacement`].

use super::error::{AssemblyError, AssemblyResult};
use crate::assembly::{
    domain::{
        FaultSource, Issue, IssueDetails, IssueId, IssueType, PersonId, ReplacementOrderId,
        ReplacementState, SupplierId, Task, TaskDomainError, TaskId, TaskStatus,
    },
    ports::{ReplacementLineItem, ReplacementOrderRequest, ReplacementOrderSink, TaskStore},
};
use crate::config::ReplacementSettings;
use mockable::Clock;
use std::sync::Arc;
use tracing::{info, warn};

/// Request payload for reporting an issue.
///
/// Enumerated fields are accepted as text and validated by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportIssueRequest {
    issue_type: String,
    item: String,
    fault_source: String,
    quantity: Option<u32>,
    responsible_person_id: Option<String>,
    photo_url: Option<String>,
    note: Option<String>,
    create_replacement: bool,
    supplier_id: Option<String>,
}

impl ReportIssueRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(
        issue_type: impl Into<String>,
        item: impl Into<String>,
        fault_source: impl Into<String>,
    ) -> Self {
        Self {
            issue_type: issue_type.into(),
            item: item.into(),
            fault_source: fault_source.into(),
            quantity: None,
            responsible_person_id: None,
            photo_url: None,
            note: None,
            create_replacement: false,
            supplier_id: None,
        }
    }

    /// Sets the affected quantity. Defaults to one.
    #[must_use]
    pub const fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Names the person held responsible.
    #[must_use]
    pub fn with_responsible_person(mut self, person_id: impl Into<String>) -> Self {
        self.responsible_person_id = Some(person_id.into());
        self
    }

    /// Attaches a photo reference.
    #[must_use]
    pub fn with_photo_url(mut self, photo_url: impl Into<String>) -> Self {
        self.photo_url = Some(photo_url.into());
        self
    }

    /// Attaches a note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Requests a replacement order, optionally from a given supplier.
    #[must_use]
    pub fn with_replacement(mut self, supplier_id: Option<String>) -> Self {
        self.create_replacement = true;
        self.supplier_id = supplier_id;
        self
    }

    fn into_parts(self) -> Result<(IssueDetails, Option<ReplacementState>), TaskDomainError> {
        let Self {
            issue_type,
            item,
            fault_source,
            quantity,
            responsible_person_id,
            photo_url,
            note,
            create_replacement,
            supplier_id,
        } = self;

        let mut details = IssueDetails::new(
            IssueType::try_from(issue_type.as_str())?,
            item,
            FaultSource::try_from(fault_source.as_str())?,
        )?;
        if let Some(count) = quantity {
            details = details.with_quantity(count)?;
        }
        if let Some(person) = responsible_person_id {
            details = details.with_responsible_person(PersonId::new(person)?);
        }
        if let Some(url) = photo_url {
            details = details.with_photo_url(url);
        }
        if let Some(text) = note {
            details = details.with_note(text);
        }

        if !create_replacement {
            return Ok((details, None));
        }
        let supplier = supplier_id
            .filter(|value| !value.trim().is_empty())
            .map(SupplierId::new)
            .transpose()?;
        Ok((
            details,
            Some(ReplacementState::Queued {
                supplier_id: supplier,
            }),
        ))
    }
}

/// Response envelope of an issue report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueReport {
    /// The issue as stored on the task.
    pub issue: Issue,
    /// The task after the report.
    pub task: Task,
    /// Created replacement order; `None` when none was requested or the
    /// sink was unavailable.
    pub replacement_order_id: Option<ReplacementOrderId>,
}

/// Issue reporting and resolution service.
#[derive(Clone)]
pub struct IssueService<S, R, C>
where
    S: TaskStore,
    R: ReplacementOrderSink,
    C: Clock + Send + Sync + 'static,
{
    store: Arc<S>,
    sink: Arc<R>,
    clock: Arc<C>,
    settings: ReplacementSettings,
}

impl<S, R, C> IssueService<S, R, C>
where
    S: TaskStore,
    R: ReplacementOrderSink,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a new issue service.
    #[must_use]
    pub const fn new(
        store: Arc<S>,
        sink: Arc<R>,
        clock: Arc<C>,
        settings: ReplacementSettings,
    ) -> Self {
        Self {
            store,
            sink,
            clock,
            settings,
        }
    }

    /// Reports an issue and blocks the task.
    ///
    /// The task is blocked whatever its prior status, including
    /// `completed`. When a replacement is requested and the sink fails, the
    /// report still succeeds with the replacement left queued.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed payloads and
    /// [`AssemblyError::TaskNotFound`] when the task does not exist.
    pub async fn report_issue(
        &self,
        task_id: TaskId,
        request: ReportIssueRequest,
    ) -> AssemblyResult<IssueReport> {
        let (details, replacement) = request.into_parts()?;
        let wants_replacement = replacement.is_some();
        let issue = Issue::open(details, replacement, &*self.clock);
        let issue_id = issue.id();

        let clock = Arc::clone(&self.clock);
        let mut task = self
            .store
            .update(
                task_id,
                Box::new(move |task: &mut Task| {
                    let previous = task.report_issue(issue, &*clock);
                    if previous == TaskStatus::Completed {
                        warn!(
                            task_id = %task.id(),
                            "issue reported against a completed task; task is blocked again"
                        );
                    }
                    Ok(())
                }),
            )
            .await?;
        info!(task_id = %task_id, issue_id = %issue_id, "issue reported");

        let mut replacement_order_id = None;
        if wants_replacement {
            match self.send_replacement(&task, issue_id).await {
                Ok((updated, order_id)) => {
                    task = updated;
                    replacement_order_id = Some(order_id);
                }
                Err(err) => warn!(
                    task_id = %task_id,
                    issue_id = %issue_id,
                    error = %err,
                    "replacement order not created; left queued"
                ),
            }
        }

        let stored = stored_issue(&task, issue_id)?.clone();
        Ok(IssueReport {
            issue: stored,
            task,
            replacement_order_id,
        })
    }

    /// Resolves an issue and unblocks the task once none is pending.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::TaskNotFound`] or an issue-not-found error
    /// when either identifier does not resolve.
    pub async fn resolve_issue(&self, task_id: TaskId, issue_id: IssueId) -> AssemblyResult<Task> {
        let clock = Arc::clone(&self.clock);
        let task = self
            .store
            .update(
                task_id,
                Box::new(move |task: &mut Task| {
                    task.resolve_issue(issue_id, &*clock)?;
                    Ok(())
                }),
            )
            .await?;
        info!(
            task_id = %task_id,
            issue_id = %issue_id,
            status = %task.status(),
            "issue resolved"
        );
        Ok(task)
    }

    /// Sends a queued replacement request to the order sink.
    ///
    /// An issue whose order already exists returns that order without
    /// contacting the sink.
    ///
    /// # Errors
    ///
    /// Returns a not-found error when the task or issue does not exist, a
    /// validation error when the issue never requested a replacement, and a
    /// collaborator error when the sink fails.
    pub async fn dispatch_replacement(
        &self,
        task_id: TaskId,
        issue_id: IssueId,
    ) -> AssemblyResult<ReplacementOrderId> {
        let task = self
            .store
            .find_by_id(task_id)
            .await?
            .ok_or(AssemblyError::TaskNotFound(task_id))?;
        if let Some(order_id) = stored_issue(&task, issue_id)?.replacement_order_id() {
            return Ok(order_id.clone());
        }
        let (_, order_id) = self.send_replacement(&task, issue_id).await?;
        Ok(order_id)
    }

    async fn send_replacement(
        &self,
        task: &Task,
        issue_id: IssueId,
    ) -> AssemblyResult<(Task, ReplacementOrderId)> {
        let issue = stored_issue(task, issue_id)?;
        let Some(ReplacementState::Queued { supplier_id }) = issue.replacement() else {
            return Err(TaskDomainError::NoReplacementRequested(issue_id).into());
        };
        let request = replacement_request(task, issue, supplier_id.clone(), &self.settings);
        let order_id = self.sink.create_replacement_order(&request).await?;

        let clock = Arc::clone(&self.clock);
        let recorded_id = order_id.clone();
        let updated = self
            .store
            .update(
                task.id(),
                Box::new(move |stored: &mut Task| {
                    stored.record_replacement_order(issue_id, recorded_id, &*clock)?;
                    Ok(())
                }),
            )
            .await?;
        info!(
            task_id = %task.id(),
            issue_id = %issue_id,
            order_id = %order_id,
            "replacement order created"
        );

        // A concurrent dispatch may have recorded its own order first.
        let effective = stored_issue(&updated, issue_id)?
            .replacement_order_id()
            .cloned()
            .unwrap_or(order_id);
        Ok((updated, effective))
    }
}

fn stored_issue(task: &Task, issue_id: IssueId) -> Result<&Issue, TaskDomainError> {
    task.issue(issue_id).ok_or(TaskDomainError::UnknownIssue {
        task_id: task.id(),
        issue_id,
    })
}

fn replacement_request(
    task: &Task,
    issue: &Issue,
    supplier_id: Option<SupplierId>,
    settings: &ReplacementSettings,
) -> ReplacementOrderRequest {
    let customer_name = task.job().customer_name.clone();
    let job_title = customer_name.as_deref().map_or_else(
        || format!("{} - replacement", task.job_id()),
        |customer| format!("{customer} - replacement"),
    );

    ReplacementOrderRequest {
        job_id: task.job_id().clone(),
        job_title,
        customer_name,
        role_id: task.role().id.clone(),
        role_name: task.role().name.clone(),
        order_type: settings.order_type.clone(),
        supplier_id,
        items: vec![ReplacementLineItem {
            name: issue.item().to_owned(),
            quantity: issue.quantity(),
            unit: settings.unit.clone(),
            notes: format!(
                "Replacement - {}",
                issue.note().unwrap_or("assembly issue")
            ),
            is_replacement: true,
            original_issue_id: issue.id(),
        }],
        notes: format!("Replacement order for assembly issue on task {}", task.id()),
        task_id: task.id(),
    }
}
