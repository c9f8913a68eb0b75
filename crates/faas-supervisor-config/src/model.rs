//! Typed configuration options.

use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Execution backend the supervisor is wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SupervisorType {
    /// Synchronous request/response platform.
    Lambda,
    /// Phase-aware batch job platform.
    Batch,
    /// Open-source FaaS platform invoked over HTTP.
    OpenFaas,
}

impl SupervisorType {
    /// Parse the `SUPERVISOR_TYPE` option; unknown values yield `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "LAMBDA" => Some(Self::Lambda),
            "BATCH" => Some(Self::Batch),
            "OPENFAAS" => Some(Self::OpenFaas),
            _ => None,
        }
    }

    /// Canonical option value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lambda => "LAMBDA",
            Self::Batch => "BATCH",
            Self::OpenFaas => "OPENFAAS",
        }
    }
}

impl Display for SupervisorType {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Batch lifecycle phase, supplied externally through `STEP`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExecutionPhase {
    /// Stage input data; never executes or uploads.
    Init,
    /// Execute the function; never touches storage.
    #[default]
    Run,
    /// Stage output data and respond.
    End,
}

impl ExecutionPhase {
    /// Parse the `STEP` option. Anything other than `INIT` or `END` means `RUN`.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("INIT") => Self::Init,
            Some("END") => Self::End,
            _ => Self::Run,
        }
    }

    /// Canonical option value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Init => "INIT",
            Self::Run => "RUN",
            Self::End => "END",
        }
    }
}

impl Display for ExecutionPhase {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Where the user script comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptSource {
    /// Script body decoded from the `SCRIPT` option.
    Inline(String),
    /// Existing script file named by `SCRIPT_PATH`.
    Path(PathBuf),
}
