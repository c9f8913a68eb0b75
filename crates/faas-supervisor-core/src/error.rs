//! # Design
//!
//! - One fatal taxonomy for the whole invocation pipeline.
//! - Keep error messages constant while carrying context fields for debugging.
//! - Soft transfer failures are not errors; see [`crate::UploadOutcome`].

use std::error::Error;
use std::io;
use std::path::PathBuf;

use faas_supervisor_config::ConfigError;
use thiserror::Error;

/// Result alias for supervisor operations.
pub type SupervisorResult<T> = Result<T, SupervisorError>;

/// Fatal errors caught by the top-level handler and turned into error responses.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// `SUPERVISOR_TYPE` named no known execution backend.
    #[error("invalid supervisor type")]
    InvalidSupervisorType {
        /// Configured value.
        value: String,
    },
    /// No provider implementation exists for the storage type.
    #[error("unsupported storage provider")]
    UnsupportedProvider {
        /// Storage type label that could not be resolved.
        storage_type: String,
    },
    /// A required credential field was absent.
    #[error("missing storage credential")]
    MissingCredential {
        /// Storage identifier whose credentials are incomplete.
        storage_id: String,
        /// Name of the missing field.
        field: &'static str,
    },
    /// Storage client construction failed.
    #[error("storage provider initialisation failed")]
    ProviderInit {
        /// Storage identifier being initialised.
        storage_id: String,
        /// Underlying client error.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The wrapped user function exited unsuccessfully.
    #[error("function execution failed")]
    FunctionExecution {
        /// Exit code when the process exited normally.
        exit_code: Option<i32>,
        /// Captured stdout and stderr.
        output: String,
    },
    /// Temporary workspace could not be prepared.
    #[error("workspace operation failed")]
    Workspace {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying filesystem error.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// Configuration contained an invalid value.
    #[error("configuration invalid")]
    Config {
        /// Source configuration error.
        #[from]
        source: ConfigError,
    },
    /// User script could not be materialised or spawned.
    #[error("user script unavailable")]
    Script {
        /// Operation identifier.
        operation: &'static str,
        /// Script path when known.
        path: Option<PathBuf>,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl SupervisorError {
    /// Short machine-readable identifier of the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidSupervisorType { .. } => "invalid_supervisor_type",
            Self::UnsupportedProvider { .. } => "unsupported_provider",
            Self::MissingCredential { .. } => "missing_credential",
            Self::ProviderInit { .. } => "provider_init",
            Self::FunctionExecution { .. } => "function_execution",
            Self::Workspace { .. } => "workspace",
            Self::Config { .. } => "config",
            Self::Script { .. } => "script",
        }
    }

    /// Human-readable description including context, used in error response bodies.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::InvalidSupervisorType { value } => {
                format!("{self}: '{value}' is not one of LAMBDA, BATCH, OPENFAAS")
            }
            Self::UnsupportedProvider { storage_type } => {
                format!("{self}: '{storage_type}'")
            }
            Self::MissingCredential { storage_id, field } => {
                format!("{self}: storage '{storage_id}' requires '{field}'")
            }
            Self::ProviderInit { storage_id, source } => {
                format!("{self}: storage '{storage_id}': {source}")
            }
            Self::FunctionExecution { exit_code, output } => match exit_code {
                Some(code) => format!("{self} with exit code {code}: {output}"),
                None => format!("{self} (terminated by signal): {output}"),
            },
            Self::Workspace { operation, source } => format!("{self} ({operation}): {source}"),
            Self::Config { source } => match source {
                ConfigError::InvalidOption { option, reason, .. } => {
                    format!("{self}: option '{option}' ({reason})")
                }
            },
            Self::Script {
                operation,
                path,
                source,
            } => match path {
                Some(path) => format!("{self} ({operation} {}): {source}", path.display()),
                None => format!("{self} ({operation}): {source}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_stay_constant_while_detail_carries_context() {
        let err = SupervisorError::MissingCredential {
            storage_id: "ONE".to_string(),
            field: "TOKEN",
        };
        assert_eq!(err.to_string(), "missing storage credential");
        assert_eq!(
            err.detail(),
            "missing storage credential: storage 'ONE' requires 'TOKEN'"
        );
        assert_eq!(err.kind(), "missing_credential");
    }

    #[test]
    fn function_failures_report_exit_code_and_output() {
        let err = SupervisorError::FunctionExecution {
            exit_code: Some(3),
            output: "boom".to_string(),
        };
        assert_eq!(
            err.detail(),
            "function execution failed with exit code 3: boom"
        );
    }

    #[test]
    fn invalid_supervisor_type_names_the_value() {
        let err = SupervisorError::InvalidSupervisorType {
            value: "KNATIVE".to_string(),
        };
        assert!(err.detail().contains("'KNATIVE'"));
    }
}
