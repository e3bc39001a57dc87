//! Then steps for task lifecycle BDD scenarios.

use std::time::Duration;

use super::world::{TaskLifecycleWorld, run_async};
use rstest_bdd_macros::then;
use taskwork::task::{
    domain::{Task, TaskStatus},
    services::TaskServiceError,
};

fn expected_status(raw: &str) -> Result<TaskStatus, eyre::Report> {
    TaskStatus::try_from(raw).map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))
}

fn submitted_task(world: &TaskLifecycleWorld) -> Result<&Task, eyre::Report> {
    match world.last_submission.as_ref() {
        Some(Ok(task)) => Ok(task),
        Some(Err(err)) => Err(eyre::eyre!("submission failed: {err}")),
        None => Err(eyre::eyre!("missing submission result")),
    }
}

#[then(r#"the submission is acknowledged as "{status}""#)]
fn acknowledged_as(world: &TaskLifecycleWorld, status: String) -> Result<(), eyre::Report> {
    let expected = expected_status(&status)?;
    let task = submitted_task(world)?;
    eyre::ensure!(
        task.status() == expected,
        "expected acknowledgement status {expected}, found {}",
        task.status()
    );
    Ok(())
}

#[then(r#"the task eventually reaches "{status}""#)]
fn eventually_reaches(world: &TaskLifecycleWorld, status: String) -> Result<(), eyre::Report> {
    let expected = expected_status(&status)?;
    let id = submitted_task(world)?.id();
    let service = world.service()?;

    let reached = run_async(async {
        for _ in 0..500 {
            let task = service.get_task_status(id).await?;
            if task.status().is_terminal() {
                return Ok::<_, eyre::Report>(task.status());
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        Err(eyre::eyre!("task {id} did not reach a terminal status"))
    })?;

    eyre::ensure!(reached == expected, "expected {expected}, found {reached}");
    Ok(())
}

#[then("the submission is rejected because the service is shutting down")]
fn rejected_as_shutting_down(world: &TaskLifecycleWorld) -> Result<(), eyre::Report> {
    match world.last_submission.as_ref() {
        Some(Err(TaskServiceError::ShuttingDown)) => Ok(()),
        other => Err(eyre::eyre!("expected ShuttingDown rejection, got {other:?}")),
    }
}

#[then("the lookup reports the task as not found")]
fn lookup_not_found(world: &TaskLifecycleWorld) -> Result<(), eyre::Report> {
    match world.last_lookup.as_ref() {
        Some(Err(TaskServiceError::NotFound(_))) => Ok(()),
        other => Err(eyre::eyre!("expected NotFound, got {other:?}")),
    }
}
