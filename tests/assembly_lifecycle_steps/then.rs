//! Then steps for assembly lifecycle BDD scenarios.

use super::world::{AssemblyWorld, run_async};
use assembly_tracker::assembly::{
    domain::TaskStatus,
    services::{AssemblyErrorKind, CompleteTaskRequest},
};
use eyre::{WrapErr, eyre};
use rstest_bdd_macros::then;

/// Assert a condition, returning an error with the given message if false.
fn assert_that(condition: bool, message: impl Into<String>) -> Result<(), eyre::Report> {
    if condition {
        Ok(())
    } else {
        Err(eyre!(message.into()))
    }
}

#[then("the job rollup counts {completed} completed tasks")]
fn rollup_counts_completed(world: &AssemblyWorld, completed: usize) -> Result<(), eyre::Report> {
    let job_id = world.job_id()?;
    let rollup = run_async(world.queries.job_rollup(&job_id)).wrap_err("compute rollup")?;
    assert_that(
        rollup.summary.completed == completed,
        format!(
            "expected {completed} completed tasks, found {}",
            rollup.summary.completed
        ),
    )
}

#[then("the job rollup reports every task completed")]
fn rollup_reports_all_completed(world: &AssemblyWorld) -> Result<(), eyre::Report> {
    let job_id = world.job_id()?;
    let rollup = run_async(world.queries.job_rollup(&job_id)).wrap_err("compute rollup")?;
    assert_that(
        rollup.summary.all_completed && rollup.roles.iter().all(|role| role.is_complete),
        "expected every role of the job to be complete",
    )
}

#[then("the task is overdue")]
fn task_is_overdue(world: &AssemblyWorld) -> Result<(), eyre::Report> {
    let view = run_async(world.queries.get_task(world.task()?.id())).wrap_err("read task")?;
    assert_that(view.is_overdue, "expected the task to be overdue")
}

#[then("the task is no longer overdue")]
fn task_is_not_overdue(world: &AssemblyWorld) -> Result<(), eyre::Report> {
    let view = run_async(world.queries.get_task(world.task()?.id())).wrap_err("read task")?;
    assert_that(!view.is_overdue, "expected the overdue flag to be cleared")?;
    assert_that(
        view.days_until_estimated < 0,
        "expected the estimated date to stay in the past",
    )
}

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &AssemblyWorld, status: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre!("invalid expected status in scenario: {err}"))?;
    let actual = world.task()?.status();
    assert_that(
        actual == expected,
        format!("expected status {expected}, found {actual}"),
    )
}

#[then(r#"a replacement order was sent for "{item}""#)]
fn replacement_order_was_sent(world: &AssemblyWorld, item: String) -> Result<(), eyre::Report> {
    let report = world
        .last_report
        .as_ref()
        .ok_or_else(|| eyre!("missing issue report in scenario world"))?;
    let order_id = report
        .replacement_order_id
        .as_ref()
        .ok_or_else(|| eyre!("expected a replacement order identifier"))?;

    let orders = world.sink.orders().wrap_err("read sent orders")?;
    let (sent_id, request) = orders
        .first()
        .ok_or_else(|| eyre!("no replacement order was sent"))?;
    assert_that(sent_id == order_id, "report and sink disagree on the order")?;
    assert_that(
        request.items.iter().any(|line| line.name == item && line.is_replacement),
        format!("expected a replacement line item for {item}"),
    )
}

#[then("completing the task fails with {count} blocking issue")]
fn completing_fails(world: &AssemblyWorld, count: usize) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let Err(err) = run_async(
        world
            .lifecycle
            .complete_task(task_id, CompleteTaskRequest::new()),
    ) else {
        return Err(eyre!("expected completion to be refused"));
    };
    assert_that(
        err.kind() == AssemblyErrorKind::PrerequisiteViolation,
        format!("expected a prerequisite violation, got {err}"),
    )?;
    assert_that(
        err.blocking_issue_count() == Some(count),
        format!("expected {count} blocking issue(s), got {err}"),
    )
}
