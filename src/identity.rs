//! Caller identity supplied by the surrounding API.
//!
//! Authentication happens outside this crate. The API layer verifies the
//! caller and hands the resulting identity to the task service, which only
//! records it.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors returned while constructing a caller identity.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// The subject is empty after trimming.
    #[error("caller subject must not be empty")]
    EmptySubject,
}

/// Already-authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallerIdentity(String);

impl CallerIdentity {
    /// Creates an identity from the authenticated subject.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::EmptySubject`] when the subject is blank.
    pub fn new(subject: impl Into<String>) -> Result<Self, IdentityError> {
        let raw = subject.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(IdentityError::EmptySubject);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the subject.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
