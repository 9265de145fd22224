//! Shared fixtures for assembly unit tests.

use std::sync::Arc;

use crate::assembly::{
    adapters::{
        FixedClock,
        memory::{InMemoryJobCatalog, InMemoryReplacementOrderSink, InMemoryTaskStore},
    },
    domain::{JobId, RoleId, RoleRef, ScheduleDate, StageId},
    ports::{JobProfile, RoleTemplate, StageTemplate},
    services::{IssueService, ProvisioningService, TaskLifecycleService, TaskQueryService},
};
use crate::config::AssemblyConfig;
use chrono::NaiveDate;
use rstest::fixture;

pub(super) type Lifecycle =
    TaskLifecycleService<InMemoryTaskStore, InMemoryJobCatalog, FixedClock>;
pub(super) type Provisioning =
    ProvisioningService<InMemoryTaskStore, InMemoryJobCatalog, FixedClock>;
pub(super) type Queries = TaskQueryService<InMemoryTaskStore, FixedClock>;
pub(super) type Issues = IssueService<InMemoryTaskStore, InMemoryReplacementOrderSink, FixedClock>;

/// Services wired over shared in-memory adapters and a frozen clock.
pub(super) struct Harness {
    pub(super) store: Arc<InMemoryTaskStore>,
    pub(super) catalog: Arc<InMemoryJobCatalog>,
    pub(super) sink: Arc<InMemoryReplacementOrderSink>,
    pub(super) clock: Arc<FixedClock>,
    pub(super) lifecycle: Lifecycle,
    pub(super) provisioning: Provisioning,
    pub(super) queries: Queries,
    pub(super) issues: Issues,
}

impl Harness {
    pub(super) fn with_config(config: &AssemblyConfig) -> Self {
        let store = Arc::new(InMemoryTaskStore::new());
        let catalog = Arc::new(InMemoryJobCatalog::new());
        let sink = Arc::new(InMemoryReplacementOrderSink::new());
        let clock = Arc::new(FixedClock::on_date(today()));
        Self {
            lifecycle: TaskLifecycleService::new(
                Arc::clone(&store),
                Arc::clone(&catalog),
                Arc::clone(&clock),
            ),
            provisioning: ProvisioningService::new(
                Arc::clone(&store),
                Arc::clone(&catalog),
                Arc::clone(&clock),
                config.provisioning.clone(),
            ),
            queries: TaskQueryService::new(
                Arc::clone(&store),
                Arc::clone(&clock),
                config.summary.clone(),
            ),
            issues: IssueService::new(
                Arc::clone(&store),
                Arc::clone(&sink),
                Arc::clone(&clock),
                config.replacement.clone(),
            ),
            store,
            catalog,
            sink,
            clock,
        }
    }

    /// Registers a job with the given `(role id, role name)` pairs.
    pub(super) fn seed_job(&self, id: &str, roles: &[(&str, &str)], estimated: Option<&str>) {
        let profile = JobProfile {
            id: job_id(id),
            customer_name: Some("Ayşe Demir".to_owned()),
            customer_phone: Some("+90 555 010 2030".to_owned()),
            location: Some("Kadıköy, İstanbul".to_owned()),
            estimated_assembly_date: estimated.and_then(ScheduleDate::new),
            roles: roles
                .iter()
                .map(|(role_id, role_name)| RoleRef {
                    id: RoleId::new(*role_id).expect("valid role id"),
                    name: (*role_name).to_owned(),
                })
                .collect(),
        };
        self.catalog.put_job(profile).expect("catalog accepts job");
    }

    /// Registers a stage template as `(stage id, stage name, order)` triples.
    pub(super) fn seed_template(&self, role_id: &str, stages: &[(&str, &str, i32)]) {
        let template = RoleTemplate {
            assembly_stages: stages
                .iter()
                .map(|(id, name, order)| StageTemplate {
                    id: StageId::new(*id).expect("valid stage id"),
                    name: (*name).to_owned(),
                    order: *order,
                })
                .collect(),
        };
        self.catalog
            .put_role_template(RoleId::new(role_id).expect("valid role id"), template)
            .expect("catalog accepts template");
    }
}

/// Calendar date the harness clock is frozen on.
pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 10).expect("valid date")
}

/// Formats `today` shifted by `offset` days.
pub(super) fn day(offset: i64) -> String {
    (today() + chrono::Duration::days(offset))
        .format("%Y-%m-%d")
        .to_string()
}

pub(super) fn job_id(value: &str) -> JobId {
    JobId::new(value).expect("valid job id")
}

#[fixture]
pub(super) fn harness() -> Harness {
    Harness::with_config(&AssemblyConfig::default())
}
