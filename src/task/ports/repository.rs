//! Repository port for task persistence and lookup.

use crate::task::domain::{Task, TaskId, UnsavedTask};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
///
/// Implementations must provide read-after-write consistency for a single
/// record.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task and assigns its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Persistence`] when the record cannot be
    /// written.
    async fn create(&self, task: &UnsavedTask) -> TaskRepositoryResult<Task>;

    /// Replaces the stored record with the same identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist
    /// and [`TaskRepositoryError::StaleWrite`] when the incoming
    /// `updated_at` is older than the stored one.
    async fn update(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns every stored task ordered by identifier.
    async fn find_all(&self) -> TaskRepositoryResult<Vec<Task>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The update would move `updated_at` backward.
    #[error("stale write for task {task_id}: stored update at {stored}, attempted {attempted}")]
    StaleWrite {
        /// Task whose update was rejected.
        task_id: TaskId,
        /// Timestamp currently stored.
        stored: DateTime<Utc>,
        /// Timestamp carried by the rejected write.
        attempted: DateTime<Utc>,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Returns `true` when repeating the same write may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }
}
