//! Tracing subscriber installation.

use crate::config::LoggingConfig;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Errors returned while installing the global subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The filter directive could not be parsed.
    #[error("invalid log filter '{directive}': {source}")]
    Filter {
        /// Rejected directive.
        directive: String,
        /// Parser failure.
        source: tracing_subscriber::filter::ParseError,
    },

    /// A global subscriber is already installed.
    #[error("failed to install tracing subscriber: {0}")]
    Install(#[from] tracing_subscriber::util::TryInitError),
}

/// Builds the event filter.
///
/// A non-blank `RUST_LOG` value wins over the configured level.
///
/// # Errors
///
/// Returns [`LoggingError::Filter`] when the chosen directive is invalid.
pub fn build_filter(
    logging: &LoggingConfig,
    rust_log: Option<&str>,
) -> Result<EnvFilter, LoggingError> {
    let directive = rust_log
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(logging.level.as_str());
    EnvFilter::try_new(directive).map_err(|source| LoggingError::Filter {
        directive: directive.to_owned(),
        source,
    })
}

/// Installs a stderr `fmt` subscriber filtered by `RUST_LOG` or the
/// configured level.
///
/// # Errors
///
/// Returns [`LoggingError`] when the filter is invalid or a subscriber is
/// already installed.
pub fn init_tracing(logging: &LoggingConfig) -> Result<(), LoggingError> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = build_filter(logging, rust_log.as_deref())?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::build_filter;
    use crate::config::LoggingConfig;
    use rstest::rstest;

    #[rstest]
    #[case(None, "debug")]
    #[case(Some("  "), "debug")]
    #[case(Some("taskwork=trace"), "taskwork=trace")]
    fn filter_prefers_non_blank_rust_log(#[case] rust_log: Option<&str>, #[case] expected: &str) {
        let logging = LoggingConfig {
            level: "debug".to_owned(),
        };
        let filter = build_filter(&logging, rust_log).expect("filter should build");
        assert_eq!(filter.to_string(), expected);
    }
}
