//! Wire shapes of the trigger payloads recognised by the classifier.
//!
//! # Design
//! - Deserialize only the fields the classifier reads; everything else is ignored.
//! - Every field is optional so a partially matching payload never fails to parse.

use serde::Deserialize;

pub(crate) const S3_EVENT_SOURCE: &str = "aws:s3";
pub(crate) const MINIO_EVENT_SOURCE: &str = "minio:s3";
pub(crate) const ONEDATA_EVENT_SOURCE: &str = "OneTrigger";

/// Bucket notification as delivered by S3, `MinIO` and `OneTrigger`.
#[derive(Debug, Deserialize)]
pub(crate) struct StorageNotification {
    #[serde(rename = "Records", default)]
    pub(crate) records: Vec<NotificationRecord>,
    /// Absolute Onedata path of the object (`/space/dir/file`).
    #[serde(rename = "Key")]
    pub(crate) key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NotificationRecord {
    #[serde(rename = "eventSource")]
    pub(crate) event_source: Option<String>,
    pub(crate) s3: Option<S3Entity>,
    /// File name reported by `OneTrigger`.
    #[serde(rename = "objectKey")]
    pub(crate) object_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct S3Entity {
    pub(crate) bucket: S3Bucket,
    pub(crate) object: S3Object,
}

#[derive(Debug, Deserialize)]
pub(crate) struct S3Bucket {
    pub(crate) name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct S3Object {
    pub(crate) key: String,
}

/// API-gateway style HTTP invocation.
#[derive(Debug, Deserialize)]
pub(crate) struct HttpInvocation {
    #[serde(rename = "httpMethod")]
    pub(crate) http_method: String,
    pub(crate) body: Option<String>,
    #[serde(rename = "isBase64Encoded", default)]
    pub(crate) is_base64_encoded: bool,
}
