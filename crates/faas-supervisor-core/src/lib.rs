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

//! Contracts shared by the FaaS supervisor crates.
//!
//! Layout: `error.rs` (fatal error taxonomy), `model/` (invocation state, upload
//! outcomes and responses), `service/` (storage provider, provider factory and
//! execution adapter traits).

pub mod error;
pub mod model;
pub mod service;

pub use error::{SupervisorError, SupervisorResult};
pub use model::{
    HttpResponse, InformationalResponse, InvocationContext, InvocationState,
    SupervisorResponse, UNKNOWN_CONTEXT_VALUE, UploadOutcome,
};
pub use service::{ExecutionAdapter, ProviderFactory, StorageProvider};
