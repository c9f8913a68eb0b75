//! Workspace directories and file helpers for the FaaS supervisor.
#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod files;
pub mod workspace;

pub use error::{FsOpsError, FsOpsResult};
pub use files::{
    OutputFile, SCRIPT_FILE_NAME, collect_output_files, local_target, stage_bytes, write_script,
};
pub use workspace::TempWorkspace;
