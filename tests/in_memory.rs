//! In-memory integration tests.
//!
//! Tests are organized into modules by functionality:
//! - `task_store_tests`: repository contract for the in-memory store
//! - `task_lifecycle_tests`: submission, processing and shutdown

mod in_memory {
    mod task_lifecycle_tests;
    mod task_store_tests;
}
