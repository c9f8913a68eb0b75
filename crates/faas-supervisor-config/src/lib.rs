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

//! Configuration snapshot for the FaaS supervisor.
//!
//! Layout: `defaults.rs` (recognised option names and default values),
//! `model.rs` (typed options), `auth.rs` (storage credentials and output
//! targets), `loader.rs` (`SupervisorConfig` construction from key/value pairs).

pub mod auth;
pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;

pub use auth::{OutputTarget, StorageAuth, StorageCredentials};
pub use error::{ConfigError, ConfigResult};
pub use loader::SupervisorConfig;
pub use model::{ExecutionPhase, ScriptSource, SupervisorType};
