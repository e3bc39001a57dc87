//! Application services for task orchestration.

mod lifecycle;
mod retry;

pub use lifecycle::{TaskService, TaskServiceError, TaskServiceResult};
pub use retry::RetryPolicy;
