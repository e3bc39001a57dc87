//! Processing algorithms run by pool workers.

use crate::task::{domain::Task, ports::ProcessingError};
use async_trait::async_trait;
use std::fmt::Write;
use std::time::Duration;

/// Work performed for each task picked up by a worker.
///
/// Implementations must not persist the task; they only report success or
/// failure. `scratch` is an empty buffer the implementation may use freely.
#[async_trait]
pub trait TaskWork: Send + Sync + 'static {
    /// Runs the work for `task`.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessingError`] when the task cannot be processed.
    async fn run(&self, task: &Task, scratch: &mut String) -> Result<(), ProcessingError>;
}

/// Bounded-duration stand-in for real processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedWork {
    duration: Duration,
}

impl SimulatedWork {
    /// Creates simulated work that takes `duration` per task.
    #[must_use]
    pub const fn new(duration: Duration) -> Self {
        Self { duration }
    }

    /// Returns the per-task duration.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }
}

#[async_trait]
impl TaskWork for SimulatedWork {
    async fn run(&self, task: &Task, scratch: &mut String) -> Result<(), ProcessingError> {
        write!(scratch, "processed task '{}' ({})", task.title(), task.id())
            .map_err(|err| ProcessingError::failed(task.id(), err.to_string()))?;
        tokio::time::sleep(self.duration).await;
        Ok(())
    }
}
