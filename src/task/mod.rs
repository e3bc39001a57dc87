//! Task submission and lifecycle tracking.
//!
//! A task is created `pending`, moves to `processing` when handed to the
//! processor, and ends `completed` or `failed`. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
