//! Job catalog port: job metadata and per-role stage templates.

use crate::assembly::domain::{JobId, JobSnapshot, RoleId, RoleRef, ScheduleDate, StageId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for job catalog lookups.
pub type JobCatalogResult<T> = Result<T, JobCatalogError>;

/// Job metadata relevant to assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobProfile {
    /// Job identifier.
    pub id: JobId,
    /// Customer name.
    pub customer_name: Option<String>,
    /// Customer phone number.
    pub customer_phone: Option<String>,
    /// Installation site.
    pub location: Option<String>,
    /// Assembly date committed to the customer.
    pub estimated_assembly_date: Option<ScheduleDate>,
    /// Trades involved in the job, in catalog order.
    pub roles: Vec<RoleRef>,
}

impl JobProfile {
    /// Returns the display fields copied onto each task.
    #[must_use]
    pub fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            customer_name: self.customer_name.clone(),
            customer_phone: self.customer_phone.clone(),
            location: self.location.clone(),
        }
    }
}

/// One step of a role's assembly template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageTemplate {
    /// Stage identifier.
    pub id: StageId,
    /// Stage display name.
    pub name: String,
    /// Position within the role.
    pub order: i32,
}

/// Assembly configuration of a role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleTemplate {
    /// Stages to provision, in template order.
    pub assembly_stages: Vec<StageTemplate>,
}

/// Read-only access to the job catalog.
#[async_trait]
pub trait JobCatalog: Send + Sync {
    /// Finds a job by identifier.
    ///
    /// Returns `None` when the job does not exist.
    async fn find_job(&self, job_id: &JobId) -> JobCatalogResult<Option<JobProfile>>;

    /// Finds the assembly template configured for a role.
    ///
    /// Returns `None` when the role has no configuration.
    async fn find_role_template(
        &self,
        role_id: &RoleId,
    ) -> JobCatalogResult<Option<RoleTemplate>>;
}

/// Errors returned by job catalog implementations.
#[derive(Debug, Clone, Error)]
pub enum JobCatalogError {
    /// Backend failure.
    #[error("job catalog error: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl JobCatalogError {
    /// Wraps a backend error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}
