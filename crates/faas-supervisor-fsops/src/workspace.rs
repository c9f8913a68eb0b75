//! Input/output directory pair owned by one invocation.
//!
//! # Design
//! - Ephemeral workspaces live in fresh temporary directories and are removed on
//!   [`TempWorkspace::close`] or drop.
//! - Persistent workspaces use externally supplied paths so a batch job can carry
//!   staged data from its INIT phase to its END phase; they are never removed here.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::error::{FsOpsError, FsOpsResult};

const INPUT_PREFIX: &str = "faas-input-";
const OUTPUT_PREFIX: &str = "faas-output-";

/// Pair of input and output directories used by one invocation.
#[derive(Debug)]
pub struct TempWorkspace {
    input_dir: PathBuf,
    output_dir: PathBuf,
    guards: Option<(TempDir, TempDir)>,
}

impl TempWorkspace {
    /// Create fresh temporary input and output directories.
    ///
    /// # Errors
    ///
    /// Returns an error when a temporary directory cannot be created.
    pub fn ephemeral() -> FsOpsResult<Self> {
        let input = create_temp(INPUT_PREFIX)?;
        let output = create_temp(OUTPUT_PREFIX)?;
        let workspace = Self {
            input_dir: input.path().to_path_buf(),
            output_dir: output.path().to_path_buf(),
            guards: Some((input, output)),
        };
        debug!(
            input = %workspace.input_dir.display(),
            output = %workspace.output_dir.display(),
            "created ephemeral workspace"
        );
        Ok(workspace)
    }

    /// Use externally supplied directories, creating them when `create` is set.
    ///
    /// # Errors
    ///
    /// Returns an error when a directory cannot be created.
    pub fn persistent(input_dir: &Path, output_dir: &Path, create: bool) -> FsOpsResult<Self> {
        if create {
            for dir in [input_dir, output_dir] {
                fs::create_dir_all(dir)
                    .map_err(|source| FsOpsError::io("create_workspace_dir", dir, source))?;
            }
            debug!(
                input = %input_dir.display(),
                output = %output_dir.display(),
                "created persistent workspace"
            );
        }
        Ok(Self {
            input_dir: input_dir.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            guards: None,
        })
    }

    /// Input directory.
    #[must_use]
    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    /// Output directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Whether the directories are removed when the workspace is closed.
    #[must_use]
    pub const fn is_ephemeral(&self) -> bool {
        self.guards.is_some()
    }

    /// Release the workspace, deleting ephemeral directories.
    ///
    /// Removal failures are logged; the directories are left for external cleanup.
    pub fn close(self) {
        let Some((input, output)) = self.guards else {
            return;
        };
        for dir in [input, output] {
            let path = dir.path().to_path_buf();
            if let Err(err) = dir.close() {
                warn!(path = %path.display(), error = %err, "failed to remove workspace directory");
            }
        }
    }
}

fn create_temp(prefix: &'static str) -> FsOpsResult<TempDir> {
    tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .map_err(|source| FsOpsError::io("create_temp_dir", std::env::temp_dir(), source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn ephemeral_workspace_is_removed_on_close() -> Result<()> {
        let workspace = TempWorkspace::ephemeral()?;
        let input = workspace.input_dir().to_path_buf();
        let output = workspace.output_dir().to_path_buf();
        assert!(workspace.is_ephemeral());
        assert!(input.is_dir());
        assert!(output.is_dir());
        assert_ne!(input, output);

        workspace.close();
        assert!(!input.exists());
        assert!(!output.exists());
        Ok(())
    }

    #[test]
    fn persistent_workspace_creates_and_keeps_directories() -> Result<()> {
        let root = tempfile::tempdir()?;
        let input = root.path().join("batch/in");
        let output = root.path().join("batch/out");

        let workspace = TempWorkspace::persistent(&input, &output, true)?;
        assert!(!workspace.is_ephemeral());
        assert!(input.is_dir());
        assert!(output.is_dir());

        workspace.close();
        assert!(input.is_dir());
        assert!(output.is_dir());
        Ok(())
    }

    #[test]
    fn persistent_workspace_without_create_touches_nothing() -> Result<()> {
        let root = tempfile::tempdir()?;
        let input = root.path().join("in");
        let output = root.path().join("out");

        let workspace = TempWorkspace::persistent(&input, &output, false)?;
        assert_eq!(workspace.input_dir(), input);
        assert!(!input.exists());
        assert!(!output.exists());
        Ok(())
    }
}
