//! In-memory integration tests for task submission and processing.

use std::sync::Arc;
use std::time::Duration;

use mockable::DefaultClock;
use rstest::rstest;
use taskwork::config::ProcessorConfig;
use taskwork::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{NewTask, Task, TaskId, TaskStatus},
    services::{RetryPolicy, TaskService, TaskServiceError},
};
use taskwork::worker::{SimulatedWork, WorkerPool};

type TestService = TaskService<InMemoryTaskRepository, WorkerPool, DefaultClock>;

fn service(workers: usize, work_ms: u64) -> Result<TestService, eyre::Report> {
    let config = ProcessorConfig::default()
        .with_workers(workers)
        .with_work_duration_ms(work_ms);
    let clock = Arc::new(DefaultClock);
    let pool = WorkerPool::start(
        &config,
        Arc::new(SimulatedWork::new(config.work_duration())),
        Arc::clone(&clock),
    )?;
    Ok(TaskService::new(
        Arc::new(InMemoryTaskRepository::new()),
        Arc::new(pool),
        clock,
    )
    .with_retry_policy(RetryPolicy::fixed(3, Duration::from_millis(5))))
}

async fn wait_for_terminal(service: &TestService, id: TaskId) -> Result<Task, eyre::Report> {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let task = service.get_task_status(id).await?;
        if task.status().is_terminal() {
            return Ok(task);
        }
        eyre::ensure!(
            tokio::time::Instant::now() < deadline,
            "task {id} stuck in {}",
            task.status()
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn submitted_task_is_observable_while_processing() -> Result<(), eyre::Report> {
    let service = service(1, 100)?;

    let submitted = service.submit_task(NewTask::new("slow")).await?;
    tokio::time::sleep(Duration::from_millis(30)).await;
    let midway = service.get_task_status(submitted.id()).await?;
    eyre::ensure!(
        midway.status() == TaskStatus::Processing,
        "expected processing, found {}",
        midway.status()
    );

    let finished = wait_for_terminal(&service, submitted.id()).await?;
    eyre::ensure!(finished.status() == TaskStatus::Completed, "task should complete");
    service.shutdown().await;
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn queued_tasks_are_listed_and_eventually_complete()
-> Result<(), eyre::Report> {
    let service = service(1, 30)?;

    let mut ids = Vec::new();
    for n in 0..3 {
        ids.push(service.submit_task(NewTask::new(format!("queued {n}"))).await?.id());
    }
    let snapshot = service.get_all_tasks().await?;
    eyre::ensure!(snapshot.len() == 3, "all submissions should be listed");

    for id in ids {
        let finished = wait_for_terminal(&service, id).await?;
        eyre::ensure!(finished.status() == TaskStatus::Completed, "task {id} should complete");
    }
    service.shutdown().await;
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn shutdown_is_idempotent_and_blocks_new_work() -> Result<(), eyre::Report> {
    let service = service(2, 10)?;
    let accepted = service.submit_task(NewTask::new("before")).await?;

    service.shutdown().await;
    service.shutdown().await;

    let stored = service.get_task_status(accepted.id()).await?;
    eyre::ensure!(stored.status().is_terminal(), "accepted task must be terminal");
    let rejected = service.submit_task(NewTask::new("after")).await;
    eyre::ensure!(
        matches!(rejected, Err(TaskServiceError::ShuttingDown)),
        "expected ShuttingDown, got {rejected:?}"
    );
    Ok(())
}
