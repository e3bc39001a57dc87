//! Error types for task domain validation and parsing.

use super::{TaskId, TaskStatus};
use thiserror::Error;

/// Errors returned while constructing or mutating domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task identifier is not a positive integer.
    #[error("invalid task identifier {0}, expected a positive integer")]
    InvalidTaskId(i64),

    /// The requested status change is not permitted by the lifecycle.
    #[error("task {task_id} cannot transition from {from} to {to}")]
    InvalidStateTransition {
        /// Task whose transition was rejected.
        task_id: TaskId,
        /// Status the task was in.
        from: TaskStatus,
        /// Status that was requested.
        to: TaskStatus,
    },
}

/// Error returned while parsing task statuses from persistence or input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);
