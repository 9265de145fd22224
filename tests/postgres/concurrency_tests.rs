//! Row locking under concurrent mutation of the `PostgreSQL` store.

use crate::postgres::helpers::{BoxError, PgContext, pg_context, stage_task};
use assembly_tracker::assembly::{
    domain::{PersonId, Task, TaskDomainError, TaskStatus, TaskUpdate},
    ports::{TaskQuery, TaskStore},
    services::{AssemblyErrorKind, CompleteTaskRequest, ReportIssueRequest},
};
use rstest::rstest;
use std::sync::Arc;

const WRITERS: usize = 12;
const ROUNDS: usize = 4;

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_crew_assignments_all_survive(
    #[future] pg_context: Result<Option<PgContext>, BoxError>,
) -> Result<(), BoxError> {
    let Some(ctx) = pg_context.await? else {
        return Ok(());
    };
    let task = stage_task(&ctx.clock, "JOB-CREW", "install", None)?;
    ctx.store.insert(&task).await?;

    let writers: Vec<_> = (0..WRITERS)
        .map(|writer| {
            let store = Arc::clone(&ctx.store);
            let clock = Arc::clone(&ctx.clock);
            let task_id = task.id();
            tokio::spawn(async move {
                store
                    .update(
                        task_id,
                        Box::new(move |stored: &mut Task| -> Result<(), TaskDomainError> {
                            let mut crew = stored.assigned_personnel().clone();
                            crew.insert(PersonId::new(format!("fitter-{writer:02}"))?);
                            stored.apply_update(TaskUpdate::new().with_personnel(crew), &*clock);
                            Ok(())
                        }),
                    )
                    .await
            })
        })
        .collect();
    for writer in writers {
        writer.await??;
    }

    let stored = ctx
        .store
        .find_by_id(task.id())
        .await?
        .ok_or("task vanished")?;
    assert_eq!(stored.assigned_personnel().len(), WRITERS);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn job_completion_sees_issue_reports_whole(
    #[future] pg_context: Result<Option<PgContext>, BoxError>,
) -> Result<(), BoxError> {
    let Some(ctx) = pg_context.await? else {
        return Ok(());
    };
    ctx.seed_template("glass", &[("measure", "Measure", 1), ("fit", "Fit", 2)])?;
    let shared = Arc::new(ctx);

    for round in 0..ROUNDS {
        let job = shared.seed_job(&format!("JOB-RACE-{round}"), &[("glass", "Glass")])?;
        let provisioned = shared.provisioning.provision_job(&job).await?;
        let target = provisioned
            .created
            .first()
            .map(Task::id)
            .ok_or("job provisioned without tasks")?;

        let reporter = Arc::clone(&shared);
        let report_handle = tokio::spawn(async move {
            reporter
                .issues
                .report_issue(target, ReportIssueRequest::new("damage", "frame", "production"))
                .await
        });
        let completer = Arc::clone(&shared);
        let completed_job = job.clone();
        let completion_handle = tokio::spawn(async move {
            completer
                .lifecycle
                .complete_job(&completed_job, CompleteTaskRequest::new())
                .await
        });

        let report = report_handle.await??;
        let completion = completion_handle.await?;
        let stored = shared.store.scan(&TaskQuery::for_job(job)).await?;
        match completion {
            Ok(finished) => {
                assert!(finished.tasks.iter().all(|task| {
                    task.status() == TaskStatus::Completed && !task.has_pending_issues()
                }));
                assert_eq!(report.task.status(), TaskStatus::Blocked);
                assert!(report.task.completed_at().is_some());
            }
            Err(err) => {
                assert_eq!(err.kind(), AssemblyErrorKind::PrerequisiteViolation);
                assert!(stored.iter().all(|task| task.completed_at().is_none()));
            }
        }
        assert_eq!(
            stored.iter().map(Task::pending_issue_count).sum::<usize>(),
            1
        );
    }
    Ok(())
}
