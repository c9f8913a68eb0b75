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

//! Storage providers used to stage FaaS supervisor input and output.
//!
//! Layout: `onedata.rs` (CDMI over HTTP), `object_storage.rs` (S3 and `MinIO` via
//! `object_store`), `request_body.rs` (HTTP invocation bodies), `factory.rs`
//! (`StandardProviderFactory`).

mod error;
pub mod factory;
pub mod object_storage;
pub mod onedata;
pub mod request_body;

pub use factory::StandardProviderFactory;
pub use object_storage::{ObjectStorageProvider, ObjectStorageSettings};
pub use onedata::{OnedataProvider, OnedataSettings};
pub use request_body::RequestBodyProvider;
