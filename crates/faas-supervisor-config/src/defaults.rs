//! Recognised configuration option names and default values.
//!
//! # Design
//! - Keep every option name in one place so the loader, docs and tests agree.
//! - Defaults mirror the conventions of the supported backends.

/// Selects the execution adapter (`LAMBDA`, `BATCH`, `OPENFAAS`).
pub const SUPERVISOR_TYPE: &str = "SUPERVISOR_TYPE";
/// Batch phase (`INIT`, `RUN`, `END`); read only for batch supervisors.
pub const STEP: &str = "STEP";
/// Input workspace directory.
pub const TMP_INPUT_DIR: &str = "TMP_INPUT_DIR";
/// Output workspace directory.
pub const TMP_OUTPUT_DIR: &str = "TMP_OUTPUT_DIR";
/// Path of the staged input file, exported to the user function.
pub const INPUT_FILE_PATH: &str = "INPUT_FILE_PATH";
/// Raw trigger payload, exported to the user function.
pub const EVENT: &str = "EVENT";
/// Base64-encoded user script.
pub const SCRIPT: &str = "SCRIPT";
/// Path of an existing user script.
pub const SCRIPT_PATH: &str = "SCRIPT_PATH";
/// Library search path restored for the user function when the supervisor runs
/// from a bundled binary that rewrote `LD_LIBRARY_PATH`.
pub const LIBRARY_PATH_ORIG: &str = "LD_LIBRARY_PATH_ORIG";
/// Log level filter.
pub const LOG_LEVEL: &str = "LOG_LEVEL";
/// Log output format (`json` or `pretty`).
pub const LOG_FORMAT: &str = "LOG_FORMAT";

/// Prefix of storage credential options (`STORAGE_AUTH_<TYPE>_<ID>_<FIELD>`).
pub const STORAGE_AUTH_PREFIX: &str = "STORAGE_AUTH_";
/// Prefix of output target options (`STORAGE_PATH_OUTPUT_<ID>`).
pub const STORAGE_OUTPUT_PREFIX: &str = "STORAGE_PATH_OUTPUT_";

/// Default log level when `LOG_LEVEL` is absent.
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Default `MinIO` endpoint inside a cluster deployment.
pub const DEFAULT_MINIO_ENDPOINT: &str = "http://minio-service.minio:9000";
/// Default region used for `MinIO` and S3 clients.
pub const DEFAULT_REGION: &str = "us-east-1";
