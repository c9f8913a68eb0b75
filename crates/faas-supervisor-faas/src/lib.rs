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

//! Execution backend adapters for the FaaS supervisor.
//!
//! Layout: `runner.rs` (user script execution), `lambda.rs`, `batch.rs` and
//! `openfaas.rs` (one adapter per backend), `select.rs` (adapter selection).

pub mod batch;
pub mod lambda;
pub mod openfaas;
pub mod runner;
pub mod select;

pub use batch::BatchAdapter;
pub use lambda::LambdaAdapter;
pub use openfaas::OpenFaasAdapter;
pub use runner::{SHELL, ScriptRunner};
pub use select::{build_adapter, select_adapter};
