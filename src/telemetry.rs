//! Structured log output.

use crate::config::LoggingSettings;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;

/// Environment variable holding a filter directive that overrides the
/// configured level.
pub const LOG_ENV: &str = "ASSEMBLY_LOG";

/// Errors raised while installing the log subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The configured level is not a valid filter directive.
    #[error("invalid log filter: {0}")]
    InvalidFilter(#[from] ParseError),

    /// A global subscriber is already installed.
    #[error("log subscriber already installed: {0}")]
    AlreadyInstalled(String),
}

/// Installs a global `fmt` subscriber.
///
/// The filter comes from `ASSEMBLY_LOG` when it is set and valid, else from
/// `settings.level`.
///
/// # Errors
///
/// Returns [`TelemetryError`] when the configured level does not parse or a
/// subscriber has already been installed.
pub fn init(settings: &LoggingSettings) -> Result<(), TelemetryError> {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).or_else(|_| EnvFilter::try_new(&settings.level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|err| TelemetryError::AlreadyInstalled(err.to_string()))
}
