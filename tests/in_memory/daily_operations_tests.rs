//! Daily manifest, dashboard summary, and crew availability flows.

use super::helpers::{Services, services, today};
use assembly_tracker::{
    assembly::{
        domain::{ScheduleDate, TaskStatus, TeamId},
        services::{CompleteTaskRequest, CreateTaskRequest, StartTaskRequest},
    },
    config::{AssemblyConfig, OverdueRanking, SummarySettings},
};
use rstest::rstest;

fn stage(job: &str, role: (&str, &str), stage: &str, order: i32) -> CreateTaskRequest {
    CreateTaskRequest::new(job, role.0, role.1, stage, stage).with_stage_order(order)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn manifest_lists_todays_work_per_job_for_one_crew(
    services: Services,
) -> Result<(), eyre::Report> {
    services.register_job("JOB-200", "Elif Şahin", &[("glass", "Glass")]);
    services.register_job("JOB-201", "Burak Öztürk", &[("frame", "Frame")]);
    let today = services.day(0);

    let seal = services
        .lifecycle
        .create_task(
            stage("JOB-200", ("glass", "Glass"), "seal", 2)
                .with_planned_date(today.clone())
                .with_team("crew-1", "Crew One"),
        )
        .await?;
    let fit = services
        .lifecycle
        .create_task(
            stage("JOB-200", ("glass", "Glass"), "fit", 1)
                .with_planned_date(today.clone())
                .with_team("crew-1", "Crew One"),
        )
        .await?;
    services
        .lifecycle
        .create_task(
            stage("JOB-201", ("frame", "Frame"), "fit", 1)
                .with_planned_date(today.clone())
                .with_team("crew-2", "Crew Two"),
        )
        .await?;
    services
        .lifecycle
        .start_task(seal.id(), StartTaskRequest::new())
        .await?;

    let manifest = services
        .queries
        .today_manifest(Some(TeamId::new("crew-1")?))
        .await?;

    eyre::ensure!(manifest.len() == 1, "only crew-1 work is listed");
    let card = manifest
        .first()
        .ok_or_else(|| eyre::eyre!("expected a job card"))?;
    eyre::ensure!(card.customer_name.as_deref() == Some("Elif Şahin"), "card customer");
    let ids: Vec<_> = card.tasks.iter().map(|task| task.id()).collect();
    eyre::ensure!(ids == [seal.id(), fit.id()], "in-progress work comes first");

    let everyone = services.queries.today_manifest(None).await?;
    eyre::ensure!(everyone.len() == 2, "both jobs listed without a crew filter");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn summary_tracks_overdue_work_until_completed() -> Result<(), eyre::Report> {
    let config = AssemblyConfig {
        summary: SummarySettings {
            overdue_list_limit: 1,
            overdue_ranking: OverdueRanking::MostOverdueFirst,
        },
        ..AssemblyConfig::default()
    };
    let services = Services::new(config, today());
    services.register_job("JOB-300", "Deniz Aydın", &[("glass", "Glass")]);

    let slightly_late = services
        .lifecycle
        .create_task(
            stage("JOB-300", ("glass", "Glass"), "a", 1).with_estimated_date(services.day(-1)),
        )
        .await?;
    let very_late = services
        .lifecycle
        .create_task(
            stage("JOB-300", ("glass", "Glass"), "b", 2).with_estimated_date(services.day(-9)),
        )
        .await?;
    services
        .lifecycle
        .create_task(
            stage("JOB-300", ("glass", "Glass"), "c", 3)
                .with_estimated_date(services.day(4))
                .with_planned_date(services.day(0)),
        )
        .await?;

    let summary = services.queries.summary().await?;
    eyre::ensure!(summary.counts.total == 3, "three tasks counted");
    eyre::ensure!(summary.counts.pending == 3, "all tasks still pending");
    eyre::ensure!(summary.overdue == 2, "two tasks are overdue");
    eyre::ensure!(summary.planned_today == 1, "one task planned today");
    let listed: Vec<_> = summary.overdue_tasks.iter().map(|view| view.task.id()).collect();
    eyre::ensure!(listed == [very_late.id()], "most overdue task listed first");

    services
        .lifecycle
        .complete_task(very_late.id(), CompleteTaskRequest::new())
        .await?;
    let after = services.queries.summary().await?;
    eyre::ensure!(after.overdue == 1, "completed work is never overdue");
    eyre::ensure!(after.counts.completed == 1, "completion counted");
    let remaining: Vec<_> = after.overdue_tasks.iter().map(|view| view.task.id()).collect();
    eyre::ensure!(remaining == [slightly_late.id()], "remaining overdue task listed");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn crew_availability_warns_without_refusing(services: Services) -> Result<(), eyre::Report> {
    services.register_job("JOB-400", "Selin Koç", &[("glass", "Glass")]);
    let date = services.day(2);
    services
        .lifecycle
        .create_task(
            stage("JOB-400", ("glass", "Glass"), "install", 1)
                .with_planned_date(date.clone())
                .with_team("crew-9", "Crew Nine"),
        )
        .await?;
    let schedule = ScheduleDate::new(date.clone())
        .ok_or_else(|| eyre::eyre!("harness date is well formed"))?;

    let busy = services
        .queries
        .team_availability(TeamId::new("crew-9")?, schedule.clone())
        .await?;
    let free = services
        .queries
        .team_availability(TeamId::new("crew-3")?, schedule)
        .await?;

    eyre::ensure!(busy.available && free.available, "availability is advisory");
    eyre::ensure!(busy.task_count() == 1, "one task already booked");
    let expected_warning = format!("team crew-9 already has 1 task(s) on {date}");
    eyre::ensure!(
        busy.warning.as_deref() == Some(expected_warning.as_str()),
        "busy crew carries a warning"
    );
    eyre::ensure!(free.warning.is_none(), "idle crew carries no warning");
    eyre::ensure!(
        busy.tasks.iter().all(|task| task.status() == TaskStatus::Pending),
        "booked task stays pending"
    );
    Ok(())
}
