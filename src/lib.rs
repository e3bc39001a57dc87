//! Taskwork: asynchronous task submission and processing.
//!
//! Callers submit tasks that are persisted as `pending` and acknowledged
//! immediately. A bounded worker pool processes them in the background while
//! the orchestration service records each status change.
//!
//! # Architecture
//!
//! Taskwork follows hexagonal architecture principles:
//!
//! - **Domain**: the task record and its status lifecycle
//! - **Ports**: repository and processor contracts
//! - **Adapters**: in-memory and `PostgreSQL` repositories
//! - **Services**: submission, background orchestration and lookup
//!
//! # Modules
//!
//! - [`task`]: task domain, ports, adapters and services
//! - [`worker`]: bounded worker pool implementing the processor port
//! - [`config`]: TOML configuration with environment overrides
//! - [`logging`]: `tracing` subscriber installation
//! - [`identity`]: authenticated caller identities

pub mod config;
pub mod identity;
pub mod logging;
pub mod task;
pub mod worker;
