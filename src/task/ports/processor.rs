//! Processor port for asynchronous task execution.
//!
//! A processor accepts a task, queues it, and later reports the outcome
//! through a [`ProcessingTicket`]. Processors never persist tasks; the
//! caller owns that responsibility.

use crate::task::domain::{Task, TaskDomainError, TaskId};
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::oneshot;

/// Outcome of processing a single task.
///
/// On success the returned task is in its terminal success status.
pub type ProcessingResult = Result<Task, ProcessingError>;

/// Task execution contract.
#[async_trait]
pub trait TaskProcessor: Send + Sync {
    /// Queues a task for processing.
    ///
    /// Waits for queue space when the queue is full and returns as soon as
    /// the task has been accepted.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessorError::ShutDown`] once shutdown has begun.
    async fn submit(&self, task: Task) -> Result<ProcessingTicket, ProcessorError>;

    /// Stops accepting work and waits for running tasks to finish.
    async fn shutdown(&self);

    /// Returns `true` once shutdown has begun.
    fn is_shut_down(&self) -> bool;
}

/// Errors returned when a processor refuses a submission.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProcessorError {
    /// The processor has been shut down.
    #[error("task processor is shut down")]
    ShutDown,
}

/// Errors reported for an individual task after it was accepted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProcessingError {
    /// The processing algorithm reported a failure.
    #[error("processing task {task_id} failed: {reason}")]
    Failed {
        /// Task that failed.
        task_id: TaskId,
        /// Failure description.
        reason: String,
    },

    /// The processing algorithm panicked.
    #[error("processing task {0} panicked")]
    Panicked(TaskId),

    /// The task was dropped before a worker picked it up.
    #[error("task {0} was abandoned before processing")]
    Abandoned(TaskId),

    /// The task was not in a status the processor can complete.
    #[error(transparent)]
    Lifecycle(#[from] TaskDomainError),
}

impl ProcessingError {
    /// Builds a [`ProcessingError::Failed`] value.
    pub fn failed(task_id: TaskId, reason: impl Into<String>) -> Self {
        Self::Failed {
            task_id,
            reason: reason.into(),
        }
    }
}

/// Handle to the pending outcome of an accepted task.
#[derive(Debug)]
pub struct ProcessingTicket {
    task_id: TaskId,
    receiver: oneshot::Receiver<ProcessingResult>,
}

/// Sending half paired with a [`ProcessingTicket`].
#[derive(Debug)]
pub struct ProcessingReply {
    task_id: TaskId,
    sender: oneshot::Sender<ProcessingResult>,
}

impl ProcessingTicket {
    /// Creates a connected reply/ticket pair for `task_id`.
    #[must_use]
    pub fn channel(task_id: TaskId) -> (ProcessingReply, Self) {
        let (sender, receiver) = oneshot::channel();
        (
            ProcessingReply { task_id, sender },
            Self { task_id, receiver },
        )
    }

    /// Creates a ticket that is already resolved with `result`.
    #[must_use]
    pub fn resolved(task_id: TaskId, result: ProcessingResult) -> Self {
        let (reply, ticket) = Self::channel(task_id);
        reply.send(result);
        ticket
    }

    /// Returns the identifier of the task this ticket tracks.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Waits for the processing outcome.
    ///
    /// A reply dropped without an answer resolves to
    /// [`ProcessingError::Abandoned`].
    ///
    /// # Errors
    ///
    /// Returns the [`ProcessingError`] reported by the processor.
    pub async fn outcome(self) -> ProcessingResult {
        self.receiver
            .await
            .unwrap_or(Err(ProcessingError::Abandoned(self.task_id)))
    }
}

impl ProcessingReply {
    /// Returns the identifier of the task this reply answers for.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Delivers the outcome to the ticket holder.
    ///
    /// Delivery to a dropped ticket is logged and otherwise ignored.
    pub fn send(self, result: ProcessingResult) {
        if self.sender.send(result).is_err() {
            tracing::debug!(task_id = %self.task_id, "processing outcome receiver dropped");
        }
    }

    /// Resolves the ticket as abandoned.
    pub fn abandon(self) {
        let task_id = self.task_id;
        self.send(Err(ProcessingError::Abandoned(task_id)));
    }
}
