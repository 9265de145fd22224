//! In-memory job catalog.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::assembly::{
    domain::{JobId, RoleId},
    ports::{JobCatalog, JobCatalogError, JobCatalogResult, JobProfile, RoleTemplate},
};

/// Thread-safe in-memory job catalog.
#[derive(Debug, Clone, Default)]
pub struct InMemoryJobCatalog {
    state: Arc<RwLock<InMemoryCatalogState>>,
}

#[derive(Debug, Default)]
struct InMemoryCatalogState {
    jobs: HashMap<JobId, JobProfile>,
    role_templates: HashMap<RoleId, RoleTemplate>,
}

impl InMemoryJobCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a job.
    ///
    /// # Errors
    ///
    /// Returns [`JobCatalogError::Backend`] if the catalog lock is poisoned.
    pub fn put_job(&self, job: JobProfile) -> JobCatalogResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| JobCatalogError::backend(std::io::Error::other(err.to_string())))?;
        state.jobs.insert(job.id.clone(), job);
        Ok(())
    }

    /// Adds or replaces the assembly template of a role.
    ///
    /// # Errors
    ///
    /// Returns [`JobCatalogError::Backend`] if the catalog lock is poisoned.
    pub fn put_role_template(
        &self,
        role_id: RoleId,
        template: RoleTemplate,
    ) -> JobCatalogResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| JobCatalogError::backend(std::io::Error::other(err.to_string())))?;
        state.role_templates.insert(role_id, template);
        Ok(())
    }
}

#[async_trait]
impl JobCatalog for InMemoryJobCatalog {
    async fn find_job(&self, job_id: &JobId) -> JobCatalogResult<Option<JobProfile>> {
        let state = self
            .state
            .read()
            .map_err(|err| JobCatalogError::backend(std::io::Error::other(err.to_string())))?;
        Ok(state.jobs.get(job_id).cloned())
    }

    async fn find_role_template(
        &self,
        role_id: &RoleId,
    ) -> JobCatalogResult<Option<RoleTemplate>> {
        let state = self
            .state
            .read()
            .map_err(|err| JobCatalogError::backend(std::io::Error::other(err.to_string())))?;
        Ok(state.role_templates.get(role_id).cloned())
    }
}
