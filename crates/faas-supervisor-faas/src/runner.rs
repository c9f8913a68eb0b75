//! User script execution.
//!
//! # Design
//! - Scripts always run through `/bin/sh` with the invocation values exported to the child.
//! - Inline scripts are materialised into the input directory as `script.sh`; a script left
//!   there by an earlier batch phase is reused when nothing else is configured.
//! - Process-wide environment is never modified; overrides apply to the child only.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use faas_supervisor_config::defaults::INPUT_FILE_PATH;
use faas_supervisor_config::{ScriptSource, SupervisorConfig};
use faas_supervisor_core::{InvocationState, SupervisorError, SupervisorResult};
use faas_supervisor_fsops::{SCRIPT_FILE_NAME, write_script};
use tokio::process::Command;
use tracing::{debug, error, info};

/// Interpreter used for every user script.
pub const SHELL: &str = "/bin/sh";

const LIBRARY_PATH: &str = "LD_LIBRARY_PATH";

/// Runs the configured user script for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptRunner {
    script: Option<ScriptSource>,
    library_path_override: Option<String>,
}

impl ScriptRunner {
    /// Runner for an explicit script source.
    #[must_use]
    pub const fn new(script: Option<ScriptSource>, library_path_override: Option<String>) -> Self {
        Self {
            script,
            library_path_override,
        }
    }

    /// Runner for the script named by the configuration.
    #[must_use]
    pub fn from_config(config: &SupervisorConfig) -> Self {
        Self::new(config.script.clone(), config.library_path_override.clone())
    }

    /// Write an inline script into `input_dir`; other sources need no staging.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError::Script`] when the script cannot be written.
    pub fn materialise(&self, input_dir: &Path) -> SupervisorResult<Option<PathBuf>> {
        let Some(ScriptSource::Inline(body)) = &self.script else {
            return Ok(None);
        };
        let path = write_script(input_dir, body).map_err(|err| SupervisorError::Script {
            operation: "write_script",
            path: Some(input_dir.join(SCRIPT_FILE_NAME)),
            source: io::Error::other(err),
        })?;
        info!(path = %path.display(), "script file created");
        Ok(Some(path))
    }

    fn resolve(&self, input_dir: &Path) -> SupervisorResult<Option<PathBuf>> {
        match &self.script {
            Some(ScriptSource::Inline(_)) => self.materialise(input_dir),
            Some(ScriptSource::Path(path)) => Ok(Some(path.clone())),
            None => {
                let staged = input_dir.join(SCRIPT_FILE_NAME);
                Ok(staged.is_file().then_some(staged))
            }
        }
    }

    /// Execute the script, returning its captured stdout followed by stderr.
    ///
    /// A missing script is logged and yields empty output.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError::Script`] when the script cannot be started and
    /// [`SupervisorError::FunctionExecution`] when it exits unsuccessfully.
    pub async fn run(&self, state: &InvocationState) -> SupervisorResult<Vec<u8>> {
        let Some(script) = self.resolve(&state.input_dir)? else {
            error!("no user script found");
            return Ok(Vec::new());
        };

        info!(script = %script.display(), "executing user script");
        let mut command = Command::new(SHELL);
        command
            .arg(&script)
            .env_remove(INPUT_FILE_PATH)
            .envs(state.child_env())
            .stdin(Stdio::null())
            .kill_on_drop(true);
        if let Some(library_path) = &self.library_path_override {
            command.env(LIBRARY_PATH, library_path);
        }
        let output = command
            .output()
            .await
            .map_err(|source| SupervisorError::Script {
                operation: "spawn_script",
                path: Some(script.clone()),
                source,
            })?;

        let mut combined = output.stdout;
        combined.extend_from_slice(&output.stderr);
        let rendered = String::from_utf8_lossy(&combined).into_owned();
        if output.status.success() {
            debug!(output = %rendered, "user script finished");
            Ok(combined)
        } else {
            Err(SupervisorError::FunctionExecution {
                exit_code: output.status.code(),
                output: rendered,
            })
        }
    }
}
