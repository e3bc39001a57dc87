//! Shared world state for task lifecycle BDD scenarios.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::DefaultClock;
use rstest::fixture;
use taskwork::config::ProcessorConfig;
use taskwork::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::Task,
    ports::ProcessingError,
    services::{TaskService, TaskServiceError},
};
use taskwork::worker::{TaskWork, WorkerPool};

/// Service type used by the BDD world.
pub type TestTaskService = TaskService<InMemoryTaskRepository, WorkerPool, DefaultClock>;

/// Short simulated work that fails titles starting with `fail`.
pub struct ScenarioWork;

#[async_trait]
impl TaskWork for ScenarioWork {
    async fn run(&self, task: &Task, scratch: &mut String) -> Result<(), ProcessingError> {
        scratch.push_str(task.title());
        tokio::time::sleep(Duration::from_millis(5)).await;
        if task.title().starts_with("fail") {
            return Err(ProcessingError::failed(task.id(), scratch.as_str()));
        }
        Ok(())
    }
}

/// Scenario world for task lifecycle behaviour tests.
#[derive(Default)]
pub struct TaskLifecycleWorld {
    pub service: Option<TestTaskService>,
    pub last_submission: Option<Result<Task, TaskServiceError>>,
    pub last_lookup: Option<Result<Task, TaskServiceError>>,
}

impl TaskLifecycleWorld {
    /// Starts a service backed by `workers` workers.
    ///
    /// # Errors
    ///
    /// Returns an error when the worker pool rejects the configuration.
    pub fn start_service(&mut self, workers: usize) -> Result<(), eyre::Report> {
        let config = ProcessorConfig::default().with_workers(workers);
        let clock = Arc::new(DefaultClock);
        let pool = WorkerPool::start(&config, Arc::new(ScenarioWork), Arc::clone(&clock))?;
        self.service = Some(TaskService::new(
            Arc::new(InMemoryTaskRepository::new()),
            Arc::new(pool),
            clock,
        ));
        Ok(())
    }

    /// Returns the running service.
    ///
    /// # Errors
    ///
    /// Returns an error when no service was started by a Given step.
    pub fn service(&self) -> Result<&TestTaskService, eyre::Report> {
        self.service
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing task service in scenario world"))
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskLifecycleWorld {
    TaskLifecycleWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
