//! Logging initialisation.

use crate::config::LogFormat;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Errors raised while installing the global subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The configured log filter does not parse.
    #[error("invalid log filter '{filter}': {source}")]
    Filter {
        /// Rejected filter directive.
        filter: String,
        /// Parser diagnostic.
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    /// A global subscriber is already installed.
    #[error("failed to install log subscriber: {0}")]
    Install(String),
}

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `level` when set.
///
/// # Errors
///
/// Returns [`TelemetryError`] when the filter is invalid or a subscriber is
/// already installed.
pub fn init_logging(level: &str, format: LogFormat) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|source| TelemetryError::Filter {
            filter: level.to_owned(),
            source,
        })?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    let installed = match format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|err| TelemetryError::Install(err.to_string()))
}
