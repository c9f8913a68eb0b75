//! File helpers for staging input, materialising scripts and walking output.

use std::fs;
use std::path::{Component, Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use walkdir::WalkDir;

use crate::error::{FsOpsError, FsOpsResult};

/// File name used when the user script is materialised into a workspace.
pub const SCRIPT_FILE_NAME: &str = "script.sh";

#[cfg(unix)]
const SCRIPT_MODE: u32 = 0o755;

/// Regular file found under the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    /// Absolute local path.
    pub path: PathBuf,
    /// Path relative to the output directory, `/`-separated.
    pub remote_name: String,
}

/// List every regular file below `dir`, sorted by remote name.
///
/// # Errors
///
/// Returns an error when the directory cannot be traversed.
pub fn collect_output_files(dir: &Path) -> FsOpsResult<Vec<OutputFile>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|source| FsOpsError::walkdir("collect_output", dir, source))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(dir) else {
            continue;
        };
        let remote_name = relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/");
        files.push(OutputFile {
            path: entry.path().to_path_buf(),
            remote_name,
        });
    }
    Ok(files)
}

/// Resolve the local path for `file_name` inside `dir`.
///
/// # Errors
///
/// Returns an error unless `file_name` is a single plain path segment.
pub fn local_target(dir: &Path, file_name: &str) -> FsOpsResult<PathBuf> {
    let mut components = Path::new(file_name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(dir.join(file_name)),
        _ => Err(FsOpsError::invalid_input(
            "file_name",
            "not_a_plain_file_name",
            Some(file_name.to_string()),
        )),
    }
}

/// Write `bytes` to `file_name` inside `dir`, returning the written path.
///
/// # Errors
///
/// Returns an error when the name is not a plain file name or the write fails.
pub fn stage_bytes(dir: &Path, file_name: &str, bytes: &[u8]) -> FsOpsResult<PathBuf> {
    let target = local_target(dir, file_name)?;
    fs::write(&target, bytes).map_err(|source| FsOpsError::io("stage_bytes", &target, source))?;
    Ok(target)
}

/// Write the user script into `dir` as an executable [`SCRIPT_FILE_NAME`].
///
/// # Errors
///
/// Returns an error when the script cannot be written or made executable.
pub fn write_script(dir: &Path, body: &str) -> FsOpsResult<PathBuf> {
    let target = stage_bytes(dir, SCRIPT_FILE_NAME, body.as_bytes())?;
    #[cfg(unix)]
    fs::set_permissions(&target, fs::Permissions::from_mode(SCRIPT_MODE))
        .map_err(|source| FsOpsError::io("set_script_permissions", &target, source))?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn output_files_use_relative_names() -> Result<()> {
        let root = tempfile::tempdir()?;
        fs::create_dir_all(root.path().join("nested/deeper"))?;
        fs::write(root.path().join("b.txt"), "b")?;
        fs::write(root.path().join("a.txt"), "a")?;
        fs::write(root.path().join("nested/deeper/c.bin"), "c")?;

        let names: Vec<_> = collect_output_files(root.path())?
            .into_iter()
            .map(|file| file.remote_name)
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "nested/deeper/c.bin"]);
        Ok(())
    }

    #[test]
    fn empty_output_directory_yields_nothing() -> Result<()> {
        let root = tempfile::tempdir()?;
        assert!(collect_output_files(root.path())?.is_empty());
        Ok(())
    }

    #[test]
    fn missing_output_directory_is_an_error() -> Result<()> {
        let root = tempfile::tempdir()?;
        let err = collect_output_files(&root.path().join("missing"))
            .expect_err("missing directory should fail");
        assert!(matches!(err, FsOpsError::Walkdir { .. }));
        Ok(())
    }

    #[test]
    fn staged_names_must_be_plain() -> Result<()> {
        let root = tempfile::tempdir()?;
        let path = stage_bytes(root.path(), "obj.txt", b"payload")?;
        assert_eq!(path, root.path().join("obj.txt"));
        assert_eq!(fs::read(&path)?, b"payload");

        for name in ["", "../escape", "dir/obj.txt", "/abs"] {
            assert!(local_target(root.path(), name).is_err(), "name {name:?}");
        }
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn scripts_are_executable() -> Result<()> {
        let root = tempfile::tempdir()?;
        let path = write_script(root.path(), "echo hi\n")?;
        assert_eq!(path.file_name().and_then(|name| name.to_str()), Some("script.sh"));
        let mode = fs::metadata(&path)?.permissions().mode() & 0o777;
        assert_eq!(mode, SCRIPT_MODE);
        Ok(())
    }
}
