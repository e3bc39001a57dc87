//! Domain model for asynchronous task processing.
//!
//! The task domain models submission payloads, the persisted task record and
//! its status lifecycle while keeping all infrastructure concerns outside of
//! the domain boundary.

mod error;
mod ids;
mod task;

pub use error::{ParseTaskStatusError, TaskDomainError};
pub use ids::TaskId;
pub use task::{NewTask, PersistedTaskData, Task, TaskStatus, UnsavedTask};
