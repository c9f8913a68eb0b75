//! Invocation state and response types shared by the orchestrator and adapters.

use std::collections::BTreeMap;
use std::path::PathBuf;

use faas_supervisor_config::defaults::{EVENT, INPUT_FILE_PATH, TMP_INPUT_DIR, TMP_OUTPUT_DIR};
use serde::{Deserialize, Serialize};

/// Placeholder used when an invocation context value is absent.
pub const UNKNOWN_CONTEXT_VALUE: &str = "unknown";

/// Optional execution context supplied by the hosting runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvocationContext {
    /// Request identifier assigned by the platform.
    pub aws_request_id: Option<String>,
    /// Log group receiving the function logs.
    pub log_group_name: Option<String>,
    /// Log stream receiving the function logs.
    pub log_stream_name: Option<String>,
    /// Deployed function name.
    pub function_name: Option<String>,
}

impl InvocationContext {
    /// Request identifier or [`UNKNOWN_CONTEXT_VALUE`].
    #[must_use]
    pub fn request_id(&self) -> &str {
        self.aws_request_id.as_deref().unwrap_or(UNKNOWN_CONTEXT_VALUE)
    }

    /// Log group name or [`UNKNOWN_CONTEXT_VALUE`].
    #[must_use]
    pub fn log_group(&self) -> &str {
        self.log_group_name.as_deref().unwrap_or(UNKNOWN_CONTEXT_VALUE)
    }

    /// Log stream name or [`UNKNOWN_CONTEXT_VALUE`].
    #[must_use]
    pub fn log_stream(&self) -> &str {
        self.log_stream_name
            .as_deref()
            .unwrap_or(UNKNOWN_CONTEXT_VALUE)
    }
}

/// Per-invocation values passed to adapters and exported to the user function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationState {
    /// Input workspace directory.
    pub input_dir: PathBuf,
    /// Output workspace directory.
    pub output_dir: PathBuf,
    /// Staged input file, when a download succeeded or one was supplied.
    pub input_file_path: Option<PathBuf>,
    /// Raw trigger payload.
    pub event: String,
}

impl InvocationState {
    /// Environment exported to the user function.
    #[must_use]
    pub fn child_env(&self) -> Vec<(&'static str, String)> {
        let mut env = vec![
            (TMP_INPUT_DIR, self.input_dir.display().to_string()),
            (TMP_OUTPUT_DIR, self.output_dir.display().to_string()),
            (EVENT, self.event.clone()),
        ];
        if let Some(path) = &self.input_file_path {
            env.push((INPUT_FILE_PATH, path.display().to_string()));
        }
        env
    }
}

/// Result of a best-effort upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Remote accepted the file.
    Uploaded {
        /// Remote location the file was written to.
        location: String,
    },
    /// Remote rejected the file or could not be reached.
    Failed {
        /// Description of the failure.
        reason: String,
    },
}

impl UploadOutcome {
    /// Whether the upload succeeded.
    #[must_use]
    pub const fn is_uploaded(&self) -> bool {
        matches!(self, Self::Uploaded { .. })
    }
}

/// HTTP-style response returned to synchronous callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpResponse {
    /// HTTP status code.
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    /// Response headers.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// Response body.
    pub body: String,
    /// Whether `body` is base64 encoded.
    #[serde(
        rename = "isBase64Encoded",
        default,
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub is_base64_encoded: bool,
}

/// Log-only response produced when there is no synchronous caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InformationalResponse {
    /// Whether the phase completed successfully.
    pub success: bool,
    /// Summary of what happened.
    pub message: String,
}

/// Response produced at the end of every invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SupervisorResponse {
    /// Structured HTTP response.
    Http(HttpResponse),
    /// Informational record for asynchronous backends.
    Informational(InformationalResponse),
}

impl SupervisorResponse {
    /// Generic error response used when no adapter could be constructed.
    #[must_use]
    pub fn fallback_error(message: impl Into<String>) -> Self {
        Self::Http(HttpResponse {
            status_code: 500,
            headers: BTreeMap::new(),
            body: message.into(),
            is_base64_encoded: false,
        })
    }

    /// Whether the response signals failure.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        match self {
            Self::Http(response) => response.status_code >= 400,
            Self::Informational(response) => !response.success,
        }
    }
}
