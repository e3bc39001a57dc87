//! Retry policy for store writes made after a task was accepted.

use crate::config::RetryConfig;
use std::time::Duration;

/// Policy for retrying transient persistence failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryPolicy {
    /// No retries; fail after the first attempt.
    #[default]
    None,

    /// Fixed delay between retries.
    Fixed {
        /// Maximum number of retries.
        max_attempts: u32,
        /// Delay between attempts.
        delay: Duration,
    },

    /// Exponential backoff between retries.
    Exponential {
        /// Maximum number of retries.
        max_attempts: u32,
        /// Initial delay, doubled for each further attempt.
        initial_delay: Duration,
        /// Maximum delay cap.
        max_delay: Duration,
    },
}

impl RetryPolicy {
    /// Creates a fixed delay policy.
    #[must_use]
    pub const fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self::Fixed {
            max_attempts,
            delay,
        }
    }

    /// Calculates the delay before retry number `attempt` (1-indexed).
    ///
    /// Returns `None` once the retries are exhausted.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_attempts() {
            return None;
        }
        match *self {
            Self::None => None,
            Self::Fixed { delay, .. } => Some(delay),
            Self::Exponential {
                initial_delay,
                max_delay,
                ..
            } => {
                let multiplier = 2_u32.saturating_pow(attempt.saturating_sub(1));
                Some(initial_delay.saturating_mul(multiplier).min(max_delay))
            }
        }
    }

    /// Returns the maximum number of retries.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        match self {
            Self::None => 0,
            Self::Fixed { max_attempts, .. } | Self::Exponential { max_attempts, .. } => {
                *max_attempts
            }
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        if config.max_attempts == 0 {
            return Self::None;
        }
        Self::Exponential {
            max_attempts: config.max_attempts,
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
        }
    }
}
