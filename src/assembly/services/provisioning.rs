//! Service layer for expanding a job into its assembly tasks.

use super::error::{AssemblyError, AssemblyResult};
use crate::assembly::{
    domain::{JobId, NewTask, RoleRef, StageId, StageRef, Task},
    ports::{JobCatalog, JobProfile, StageTemplate, TaskStore},
};
use crate::config::ProvisioningSettings;
use mockable::Clock;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of provisioning a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningOutcome {
    /// Job that was provisioned.
    pub job_id: JobId,
    /// Tasks created by this call, in template order. Stages that already
    /// had a task are skipped.
    pub created: Vec<Task>,
}

impl ProvisioningOutcome {
    /// Returns the number of tasks created.
    #[must_use]
    pub const fn created_count(&self) -> usize {
        self.created.len()
    }
}

/// Creates one task per role stage of a job.
#[derive(Clone)]
pub struct ProvisioningService<S, J, C>
where
    S: TaskStore,
    J: JobCatalog,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    catalog: Arc<J>,
    clock: Arc<C>,
    settings: ProvisioningSettings,
}

impl<S, J, C> ProvisioningService<S, J, C>
where
    S: TaskStore,
    J: JobCatalog,
    C: Clock + Send + Sync,
{
    /// Creates a new provisioning service.
    #[must_use]
    pub const fn new(
        store: Arc<S>,
        catalog: Arc<J>,
        clock: Arc<C>,
        settings: ProvisioningSettings,
    ) -> Self {
        Self {
            store,
            catalog,
            clock,
            settings,
        }
    }

    /// Provisions the tasks of a job.
    ///
    /// Roles without a stage template, or with an empty one, receive a
    /// single default stage. Repeated calls create only the tasks that are
    /// still missing.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::JobNotFound`] when the catalog has no such
    /// job, or a collaborator error when the catalog or store fails.
    pub async fn provision_job(&self, job_id: &JobId) -> AssemblyResult<ProvisioningOutcome> {
        let job = self
            .catalog
            .find_job(job_id)
            .await?
            .ok_or_else(|| AssemblyError::JobNotFound(job_id.clone()))?;

        let mut created = Vec::new();
        for role in &job.roles {
            for stage in self.stages_for(role).await? {
                let task = Task::new(new_task(&job, role, stage), &*self.clock);
                if self.store.insert_stage(&task).await? {
                    created.push(task);
                } else {
                    debug!(
                        job_id = %job.id,
                        role_id = %role.id,
                        stage_id = %task.stage().id,
                        "stage already provisioned"
                    );
                }
            }
        }

        info!(job_id = %job_id, created = created.len(), "job provisioned");
        Ok(ProvisioningOutcome {
            job_id: job_id.clone(),
            created,
        })
    }

    async fn stages_for(&self, role: &RoleRef) -> AssemblyResult<Vec<StageTemplate>> {
        let template = self.catalog.find_role_template(&role.id).await?;
        if let Some(found) = template.filter(|found| !found.assembly_stages.is_empty()) {
            return Ok(found.assembly_stages);
        }

        debug!(role_id = %role.id, "role has no stage template; using default stage");
        Ok(vec![StageTemplate {
            id: StageId::new(self.settings.default_stage_id.as_str())?,
            name: format!("{} {}", role.name, self.settings.default_stage_suffix),
            order: 1,
        }])
    }
}

fn new_task(job: &JobProfile, role: &RoleRef, stage: StageTemplate) -> NewTask {
    NewTask {
        job_id: job.id.clone(),
        job: job.snapshot(),
        role: role.clone(),
        stage: StageRef {
            id: stage.id,
            name: stage.name,
            order: stage.order,
        },
        estimated_date: job.estimated_assembly_date.clone(),
        planned_date: None,
        team_id: None,
        team_name: None,
        assigned_personnel: BTreeSet::new(),
    }
}
