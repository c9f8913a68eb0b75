//! Error types for configuration loading.

use thiserror::Error;

/// Errors raised while building a [`crate::SupervisorConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Option contained an invalid value.
    #[error("invalid configuration option")]
    InvalidOption {
        /// Name of the offending option.
        option: String,
        /// Machine-readable reason for the failure.
        reason: &'static str,
        /// Offending value when it is safe to report.
        value: Option<String>,
    },
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;

impl ConfigError {
    pub(crate) fn invalid(option: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidOption {
            option: option.into(),
            reason,
            value: None,
        }
    }

    pub(crate) fn invalid_value(
        option: impl Into<String>,
        reason: &'static str,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidOption {
            option: option.into(),
            reason,
            value: Some(value.into()),
        }
    }
}
