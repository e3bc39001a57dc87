//! Service layer for task submission, background processing and lookup.

use super::RetryPolicy;
use crate::identity::CallerIdentity;
use crate::task::{
    domain::{NewTask, Task, TaskId, TaskStatus, UnsavedTask},
    ports::{
        ProcessingError, ProcessorError, TaskProcessor, TaskRepository, TaskRepositoryError,
    },
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::task::TaskTracker;
use tracing::Instrument;

/// Service-level errors for task operations.
#[derive(Debug, Error)]
pub enum TaskServiceError {
    /// No task exists for the identifier.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The service no longer accepts submissions.
    #[error("task service is shutting down")]
    ShuttingDown,

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
}

/// Result type for task service operations.
pub type TaskServiceResult<T> = Result<T, TaskServiceError>;

/// Task orchestration service.
///
/// Persists submissions, hands them to the processor in a tracked background
/// continuation, and records the outcome. Only failures that happen before a
/// task is durably accepted are returned to the submitter.
pub struct TaskService<R, P, C>
where
    R: TaskRepository,
    P: TaskProcessor,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    processor: Arc<P>,
    clock: Arc<C>,
    retry: RetryPolicy,
    continuations: TaskTracker,
}

impl<R, P, C> Clone for TaskService<R, P, C>
where
    R: TaskRepository,
    P: TaskProcessor,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            processor: Arc::clone(&self.processor),
            clock: Arc::clone(&self.clock),
            retry: self.retry,
            continuations: self.continuations.clone(),
        }
    }
}

impl<R, P, C> TaskService<R, P, C>
where
    R: TaskRepository + 'static,
    P: TaskProcessor + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a new task service.
    ///
    /// Background store writes are not retried until a policy is set with
    /// [`Self::with_retry_policy`].
    #[must_use]
    pub fn new(repository: Arc<R>, processor: Arc<P>, clock: Arc<C>) -> Self {
        Self {
            repository,
            processor,
            clock,
            retry: RetryPolicy::None,
            continuations: TaskTracker::new(),
        }
    }

    /// Sets the retry policy for background store writes.
    #[must_use]
    pub const fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Accepts a task for asynchronous processing.
    ///
    /// Returns the persisted `pending` record as soon as it is stored;
    /// processing continues in the background.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::ShuttingDown`] after shutdown has begun
    /// and [`TaskServiceError::Repository`] when the record cannot be
    /// created. No background work is started in either case.
    pub async fn submit_task(&self, new_task: NewTask) -> TaskServiceResult<Task> {
        // Held until the continuation ends so `shutdown` cannot finish while
        // this submission is still being stored.
        let admission = self.continuations.token();
        if self.continuations.is_closed() || self.processor.is_shut_down() {
            return Err(TaskServiceError::ShuttingDown);
        }

        let unsaved = UnsavedTask::pending(new_task, &*self.clock);
        let task = self.repository.create(&unsaved).await?;
        let task_id = task.id();
        tracing::info!(%task_id, "task accepted");

        let span = tracing::info_span!("task_lifecycle", %task_id);
        let continuation = self.continuation();
        let accepted = task.clone();
        self.continuations.spawn(
            async move {
                continuation.run(accepted).await;
                drop(admission);
            }
            .instrument(span),
        );
        Ok(task)
    }

    /// Accepts a task on behalf of an authenticated caller.
    ///
    /// # Errors
    ///
    /// Same as [`Self::submit_task`].
    pub async fn submit_task_for(
        &self,
        caller: &CallerIdentity,
        new_task: NewTask,
    ) -> TaskServiceResult<Task> {
        let span = tracing::info_span!("submit_task", caller = %caller);
        self.submit_task(new_task).instrument(span).await
    }

    /// Returns the current stored record for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] for unknown identifiers and
    /// [`TaskServiceError::Repository`] when the lookup fails.
    pub async fn get_task_status(&self, id: TaskId) -> TaskServiceResult<Task> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(TaskServiceError::NotFound(id))
    }

    /// Returns every stored task ordered by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Repository`] when the lookup fails.
    pub async fn get_all_tasks(&self) -> TaskServiceResult<Vec<Task>> {
        Ok(self.repository.find_all().await?)
    }

    /// Returns the number of background continuations still running.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.continuations.len()
    }

    /// Stops intake, shuts the processor down, and waits for every
    /// background continuation to record its final status.
    ///
    /// Submissions already past the intake check are waited for too: they
    /// return their `pending` record before this call returns.
    pub async fn shutdown(&self) {
        self.continuations.close();
        self.processor.shutdown().await;
        self.continuations.wait().await;
        tracing::info!("task service stopped");
    }

    fn continuation(&self) -> Continuation<R, P, C> {
        Continuation {
            repository: Arc::clone(&self.repository),
            processor: Arc::clone(&self.processor),
            clock: Arc::clone(&self.clock),
            retry: self.retry,
        }
    }
}

/// Background half of a submission.
struct Continuation<R, P, C> {
    repository: Arc<R>,
    processor: Arc<P>,
    clock: Arc<C>,
    retry: RetryPolicy,
}

impl<R, P, C> Continuation<R, P, C>
where
    R: TaskRepository,
    P: TaskProcessor,
    C: Clock + Send + Sync,
{
    async fn run(self, mut task: Task) {
        if let Err(err) = task.transition_to(TaskStatus::Processing, &*self.clock) {
            tracing::error!(error = %err, "accepted task is not pending");
            return;
        }
        // Without a stored `processing` record the task must not run: writing
        // `failed` next would skip a status.
        if !self.persist(&task).await {
            return;
        }

        let retained = task.clone();
        let finished = match self.process(task).await {
            Ok(completed) => completed,
            Err(err) => {
                tracing::warn!(error = %err, "task failed");
                let mut failed = retained;
                if let Err(transition) = failed.transition_to(TaskStatus::Failed, &*self.clock) {
                    tracing::error!(error = %transition, "cannot mark task failed");
                    return;
                }
                failed
            }
        };

        if self.persist(&finished).await {
            tracing::info!(status = %finished.status(), "task finished");
        }
    }

    async fn process(&self, task: Task) -> Result<Task, ProcessingError> {
        let task_id = task.id();
        let ticket = self
            .processor
            .submit(task)
            .await
            .map_err(|ProcessorError::ShutDown| ProcessingError::Abandoned(task_id))?;
        let mut processed = ticket.outcome().await?;
        if processed.status() == TaskStatus::Processing {
            processed.transition_to(TaskStatus::Completed, &*self.clock)?;
        }
        Ok(processed)
    }

    /// Writes `task`, retrying transient failures per the retry policy.
    ///
    /// Returns `false` when the write was given up; the failure is logged.
    async fn persist(&self, task: &Task) -> bool {
        let mut attempt = 0_u32;
        loop {
            let err = match self.repository.update(task).await {
                Ok(()) => {
                    tracing::debug!(status = %task.status(), "task status persisted");
                    return true;
                }
                Err(err) => err,
            };

            attempt = attempt.saturating_add(1);
            let delay = if err.is_transient() {
                self.retry.delay_for_attempt(attempt)
            } else {
                None
            };
            let Some(delay) = delay else {
                tracing::error!(
                    status = %task.status(),
                    attempts = attempt,
                    error = %err,
                    "giving up persisting task status"
                );
                return false;
            };

            tracing::warn!(
                status = %task.status(),
                attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %err,
                "retrying task status write"
            );
            tokio::time::sleep(delay).await;
        }
    }
}
