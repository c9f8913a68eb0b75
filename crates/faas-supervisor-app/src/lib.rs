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

//! FaaS supervisor lifecycle wiring.
//!
//! Layout: `orchestrator.rs` (invocation lifecycle), `bootstrap.rs` (entry points).

/// Embedded and standalone entry points.
pub mod bootstrap;
/// Application-level errors.
pub mod error;
/// Invocation lifecycle orchestration.
pub mod orchestrator;

pub use bootstrap::{
    init_telemetry, load_context, parse_context, read_payload, read_stdin_payload,
    run_supervisor, start_standalone, start_supervisor,
};
pub use error::{AppError, AppResult};
pub use orchestrator::Supervisor;
