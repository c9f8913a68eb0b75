//! Transfer failures. These never leave the crate: providers log them and report
//! a soft outcome instead.

use std::path::PathBuf;

use faas_supervisor_fsops::FsOpsError;
use thiserror::Error;

pub(crate) type TransferResult<T> = Result<T, TransferError>;

#[derive(Debug, Error)]
pub(crate) enum TransferError {
    #[error("remote returned unexpected status")]
    Status { url: String, status: u16 },
    #[error("http request failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("object store operation failed")]
    ObjectStore {
        location: String,
        #[source]
        source: object_store::Error,
    },
    #[error("object key is not a valid store path")]
    InvalidKey {
        key: String,
        #[source]
        source: object_store::path::Error,
    },
    #[error("local file operation failed")]
    Local {
        #[source]
        source: FsOpsError,
    },
    #[error("local file read failed")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("event carries no object to fetch")]
    MissingObject { field: &'static str },
}

impl From<FsOpsError> for TransferError {
    fn from(source: FsOpsError) -> Self {
        Self::Local { source }
    }
}

impl TransferError {
    pub(crate) fn request(url: &str, source: reqwest::Error) -> Self {
        Self::Request {
            url: url.to_string(),
            source,
        }
    }

    pub(crate) fn object_store(location: impl Into<String>, source: object_store::Error) -> Self {
        Self::ObjectStore {
            location: location.into(),
            source,
        }
    }

    /// Message and context for logs and upload outcomes.
    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Status { url, status } => format!("{self}: {status} from {url}"),
            Self::Request { url, source } => format!("{self}: {url}: {source}"),
            Self::ObjectStore { location, source } => format!("{self}: {location}: {source}"),
            Self::InvalidKey { key, source } => format!("{self}: '{key}': {source}"),
            Self::Local { source } => format!("{self}: {source:?}"),
            Self::Read { path, source } => format!("{self}: {}: {source}", path.display()),
            Self::MissingObject { field } => format!("{self}: missing {field}"),
        }
    }
}
