//! Build a [`SupervisorConfig`] from environment-style key/value pairs.
//!
//! # Design
//! - The process environment is read exactly once, in [`SupervisorConfig::from_env`].
//! - [`SupervisorConfig::from_vars`] accepts any pair iterator so tests never mutate
//!   process state.
//! - Empty values are treated as absent.
//! - `SUPERVISOR_TYPE` is kept raw; the orchestrator rejects unknown values before
//!   any work begins.

use std::collections::BTreeMap;
use std::path::PathBuf;

use base64::{Engine as _, engine::general_purpose};
use tracing::debug;

use crate::auth::{OutputTarget, StorageAuth};
use crate::defaults::{
    DEFAULT_LOG_LEVEL, EVENT, INPUT_FILE_PATH, LIBRARY_PATH_ORIG, LOG_FORMAT, LOG_LEVEL, SCRIPT,
    SCRIPT_PATH, STEP, SUPERVISOR_TYPE, TMP_INPUT_DIR, TMP_OUTPUT_DIR,
};
use crate::error::{ConfigError, ConfigResult};
use crate::model::{ExecutionPhase, ScriptSource, SupervisorType};

/// Explicit configuration snapshot consumed by the supervisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorConfig {
    /// Raw `SUPERVISOR_TYPE` value.
    pub supervisor_type: String,
    /// Batch phase; ignored for non-batch supervisors.
    pub step: ExecutionPhase,
    /// Pre-existing input workspace directory.
    pub tmp_input_dir: Option<PathBuf>,
    /// Pre-existing output workspace directory.
    pub tmp_output_dir: Option<PathBuf>,
    /// Staged input path carried over from an earlier batch phase.
    pub input_file_path: Option<PathBuf>,
    /// User script to execute.
    pub script: Option<ScriptSource>,
    /// Storage credentials keyed by storage identifier.
    pub storage_auth: StorageAuth,
    /// Output destinations ordered by storage identifier.
    pub output_targets: Vec<OutputTarget>,
    /// Trigger payload supplied through configuration.
    pub event: Option<String>,
    /// `LD_LIBRARY_PATH` handed to the user function instead of the inherited one.
    pub library_path_override: Option<String>,
    /// Log level filter.
    pub log_level: String,
    /// Requested log format, when set.
    pub log_format: Option<String>,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            supervisor_type: String::new(),
            step: ExecutionPhase::default(),
            tmp_input_dir: None,
            tmp_output_dir: None,
            input_file_path: None,
            script: None,
            storage_auth: StorageAuth::default(),
            output_targets: Vec::new(),
            event: None,
            library_path_override: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_format: None,
        }
    }
}

impl SupervisorConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error when an option is malformed.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from explicit key/value pairs.
    ///
    /// # Errors
    ///
    /// Returns an error when a storage option is malformed or `SCRIPT` is not
    /// valid base64-encoded UTF-8.
    pub fn from_vars<I>(vars: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: BTreeMap<String, String> = vars.into_iter().collect();
        let lookup = |name: &str| {
            vars.get(name)
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };
        let pairs = || vars.iter().map(|(key, value)| (key.as_str(), value.as_str()));

        let storage_auth = StorageAuth::from_pairs(pairs())?;
        let output_targets = OutputTarget::from_pairs(pairs())?;
        let script = match (lookup(SCRIPT), lookup(SCRIPT_PATH)) {
            (Some(encoded), _) => Some(ScriptSource::Inline(decode_script(&encoded)?)),
            (None, Some(path)) => Some(ScriptSource::Path(PathBuf::from(path))),
            (None, None) => None,
        };

        let config = Self {
            supervisor_type: lookup(SUPERVISOR_TYPE).unwrap_or_default(),
            step: ExecutionPhase::parse(lookup(STEP).as_deref()),
            tmp_input_dir: lookup(TMP_INPUT_DIR).map(PathBuf::from),
            tmp_output_dir: lookup(TMP_OUTPUT_DIR).map(PathBuf::from),
            input_file_path: lookup(INPUT_FILE_PATH).map(PathBuf::from),
            script,
            storage_auth,
            output_targets,
            event: vars.get(EVENT).filter(|value| !value.trim().is_empty()).cloned(),
            library_path_override: lookup(LIBRARY_PATH_ORIG),
            log_level: lookup(LOG_LEVEL).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_format: lookup(LOG_FORMAT),
        };
        debug!(
            supervisor_type = %config.supervisor_type,
            storages = config.storage_auth.len(),
            outputs = config.output_targets.len(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Whether the configured supervisor is the batch adapter.
    #[must_use]
    pub fn is_batch(&self) -> bool {
        SupervisorType::parse(&self.supervisor_type) == Some(SupervisorType::Batch)
    }

    /// Active batch phase; `None` for non-batch supervisors.
    #[must_use]
    pub fn phase(&self) -> Option<ExecutionPhase> {
        self.is_batch().then_some(self.step)
    }
}

fn decode_script(encoded: &str) -> ConfigResult<String> {
    let bytes = general_purpose::STANDARD
        .decode(encoded.as_bytes())
        .map_err(|_| ConfigError::invalid(SCRIPT, "invalid_base64"))?;
    String::from_utf8(bytes).map_err(|_| ConfigError::invalid(SCRIPT, "invalid_utf8"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect()
    }

    #[test]
    fn empty_environment_yields_defaults() -> ConfigResult<()> {
        let config = SupervisorConfig::from_vars(Vec::new())?;
        assert_eq!(config, SupervisorConfig::default());
        assert!(config.storage_auth.is_empty());
        assert_eq!(config.log_level, "info");
        assert!(!config.is_batch());
        assert_eq!(config.phase(), None);
        Ok(())
    }

    #[test]
    fn batch_step_is_honoured_only_for_batch() -> ConfigResult<()> {
        let batch = SupervisorConfig::from_vars(vars(&[
            ("SUPERVISOR_TYPE", "BATCH"),
            ("STEP", "INIT"),
        ]))?;
        assert_eq!(batch.phase(), Some(ExecutionPhase::Init));

        let lambda = SupervisorConfig::from_vars(vars(&[
            ("SUPERVISOR_TYPE", "LAMBDA"),
            ("STEP", "INIT"),
        ]))?;
        assert_eq!(lambda.phase(), None);
        Ok(())
    }

    #[test]
    fn inline_script_is_decoded_and_preferred() -> ConfigResult<()> {
        let encoded = general_purpose::STANDARD.encode("echo hi");
        let config = SupervisorConfig::from_vars(vars(&[
            ("SCRIPT", encoded.as_str()),
            ("SCRIPT_PATH", "/opt/func/script.sh"),
        ]))?;
        assert_eq!(
            config.script,
            Some(ScriptSource::Inline("echo hi".to_string()))
        );
        Ok(())
    }

    #[test]
    fn script_path_is_used_without_inline_script() -> ConfigResult<()> {
        let config = SupervisorConfig::from_vars(vars(&[("SCRIPT_PATH", "/opt/func/script.sh")]))?;
        assert_eq!(
            config.script,
            Some(ScriptSource::Path(PathBuf::from("/opt/func/script.sh")))
        );
        Ok(())
    }

    #[test]
    fn invalid_inline_script_is_rejected() {
        let err = SupervisorConfig::from_vars(vars(&[("SCRIPT", "%%%not-base64")]))
            .expect_err("invalid base64 should fail");
        assert!(matches!(
            err,
            ConfigError::InvalidOption { reason: "invalid_base64", .. }
        ));
    }

    #[test]
    fn workspace_and_storage_options_are_collected() -> ConfigResult<()> {
        let config = SupervisorConfig::from_vars(vars(&[
            ("TMP_INPUT_DIR", "/tmp/in"),
            ("TMP_OUTPUT_DIR", "/tmp/out"),
            ("INPUT_FILE_PATH", "/tmp/in/data.csv"),
            ("STORAGE_AUTH_MINIO_LOCAL_USER", "minio"),
            ("STORAGE_AUTH_MINIO_LOCAL_PASS", "minio123"),
            ("STORAGE_PATH_OUTPUT_LOCAL", "results/run"),
            ("EVENT", "{\"k\": 1}"),
            ("LOG_FORMAT", "json"),
            ("LD_LIBRARY_PATH_ORIG", "/usr/lib"),
        ]))?;
        assert_eq!(config.tmp_input_dir, Some(PathBuf::from("/tmp/in")));
        assert_eq!(config.tmp_output_dir, Some(PathBuf::from("/tmp/out")));
        assert_eq!(
            config.input_file_path,
            Some(PathBuf::from("/tmp/in/data.csv"))
        );
        assert_eq!(config.storage_auth.len(), 1);
        assert_eq!(config.output_targets.len(), 1);
        assert_eq!(config.event.as_deref(), Some("{\"k\": 1}"));
        assert_eq!(config.log_format.as_deref(), Some("json"));
        assert_eq!(config.library_path_override.as_deref(), Some("/usr/lib"));
        Ok(())
    }
}
