//! Port contracts for task processing.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod processor;
pub mod repository;

pub use processor::{
    ProcessingError, ProcessingReply, ProcessingResult, ProcessingTicket, ProcessorError,
    TaskProcessor,
};
pub use repository::{TaskRepository, TaskRepositoryError, TaskRepositoryResult};
