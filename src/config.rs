//! Runtime configuration.
//!
//! Configuration is read from a TOML document and then overridden from
//! `TASKWORK_*` environment variables. Every field has a default, so an
//! empty document is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Default number of concurrent workers.
pub const DEFAULT_WORKERS: usize = 5;
/// Default bounded queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;
/// Default duration of the simulated processing step, in milliseconds.
pub const DEFAULT_WORK_DURATION_MS: u64 = 1_000;

/// Errors returned while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration document is not valid TOML for [`AppConfig`].
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// An environment override could not be parsed.
    #[error("invalid value '{value}' for {key}")]
    InvalidOverride {
        /// Environment variable name.
        key: &'static str,
        /// Rejected value.
        value: String,
    },

    /// A setting is outside its permitted range.
    #[error("invalid setting {setting}: {reason}")]
    Invalid {
        /// Dotted setting path.
        setting: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Worker pool settings.
    pub processor: ProcessorConfig,
    /// Retry settings for background persistence.
    pub retry: RetryConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Worker pool settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessorConfig {
    /// Number of concurrent worker loops.
    pub workers: usize,
    /// Capacity of the bounded task queue.
    pub queue_capacity: usize,
    /// Duration of the simulated processing step, in milliseconds.
    pub work_duration_ms: u64,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            work_duration_ms: DEFAULT_WORK_DURATION_MS,
        }
    }
}

impl ProcessorConfig {
    /// Sets the worker count.
    #[must_use]
    pub const fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Sets the queue capacity.
    #[must_use]
    pub const fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    /// Sets the simulated work duration.
    #[must_use]
    pub const fn with_work_duration_ms(mut self, work_duration_ms: u64) -> Self {
        self.work_duration_ms = work_duration_ms;
        self
    }

    /// Returns the simulated work duration.
    #[must_use]
    pub const fn work_duration(&self) -> Duration {
        Duration::from_millis(self.work_duration_ms)
    }

    /// Checks that the pool can be started with these settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the worker count or queue
    /// capacity is zero.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::Invalid {
                setting: "processor.workers",
                reason: "must be at least 1",
            });
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::Invalid {
                setting: "processor.queue_capacity",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}

/// Retry settings for store writes made after a task was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    /// Retries after the first failed attempt; zero disables retrying.
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds.
    pub initial_delay_ms: u64,
    /// Upper bound on the delay between retries, in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 50,
            max_delay_ms: 2_000,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset, e.g. `info` or
    /// `taskwork=debug`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
        }
    }
}

impl AppConfig {
    /// Parses configuration from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the document is malformed or
    /// contains unknown keys.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Reads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read and
    /// [`ConfigError::Parse`] when its contents are invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Applies `TASKWORK_*` overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOverride`] when a numeric override does
    /// not parse.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides read through `lookup`.
    ///
    /// Blank values are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOverride`] when a numeric override does
    /// not parse.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let read = |key: &'static str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = read("TASKWORK_WORKERS") {
            self.processor.workers = parse_override("TASKWORK_WORKERS", &value)?;
        }
        if let Some(value) = read("TASKWORK_QUEUE_CAPACITY") {
            self.processor.queue_capacity = parse_override("TASKWORK_QUEUE_CAPACITY", &value)?;
        }
        if let Some(value) = read("TASKWORK_WORK_DURATION_MS") {
            self.processor.work_duration_ms =
                parse_override("TASKWORK_WORK_DURATION_MS", &value)?;
        }
        if let Some(value) = read("TASKWORK_LOG_LEVEL") {
            self.logging.level = value.trim().to_owned();
        }
        Ok(())
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::Invalid`] found.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        self.processor.validate()
    }
}

fn parse_override<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidOverride {
            key,
            value: value.to_owned(),
        })
}
