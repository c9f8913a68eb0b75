//! Logging setup failures.

use thiserror::Error;

use crate::init::LogFormat;

/// Result alias for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Errors raised while installing logging.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global subscriber was already installed, or installation was rejected.
    #[error("failed to install tracing subscriber")]
    SubscriberInstall {
        /// Format the rejected subscriber would have used.
        format: LogFormat,
        /// Underlying tracing subscriber error.
        #[source]
        source: tracing_subscriber::util::TryInitError,
    },
}
