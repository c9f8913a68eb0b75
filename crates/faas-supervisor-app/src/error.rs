//! # Design
//!
//! - Errors raised outside the invocation pipeline: logging setup and entry-point I/O.
//! - Keep error messages constant while carrying context fields for debugging.
//! - Pipeline failures never surface here; they become error responses.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Telemetry operations failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: faas_supervisor_telemetry::TelemetryError,
    },
    /// IO operations failed.
    #[error("io operation failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Optional path involved in the failure.
        path: Option<PathBuf>,
        /// Source IO error.
        source: io::Error,
    },
    /// The invocation context document could not be parsed.
    #[error("invalid invocation context")]
    InvalidContext {
        /// Where the context came from (`argument` or a file path).
        origin: String,
        /// Source JSON error.
        source: serde_json::Error,
    },
}

impl AppError {
    pub(crate) const fn telemetry(
        operation: &'static str,
        source: faas_supervisor_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }

    /// Message and context for logs and error responses.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Telemetry { operation, source } => format!("{self}: {operation}: {source}"),
            Self::Io {
                operation,
                path: Some(path),
                source,
            } => format!("{self}: {operation}: {}: {source}", path.display()),
            Self::Io {
                operation, source, ..
            } => format!("{self}: {operation}: {source}"),
            Self::InvalidContext { origin, source } => format!("{self}: {origin}: {source}"),
        }
    }

    pub(crate) const fn io(
        operation: &'static str,
        path: Option<PathBuf>,
        source: io::Error,
    ) -> Self {
        Self::Io {
            operation,
            path,
            source,
        }
    }
}
