//! Trigger payload classification for the FaaS supervisor.
//!
//! Every invocation starts with an opaque payload whose shape depends on the
//! backend that fired it: a bucket notification, an HTTP request, or nothing at
//! all for batch jobs. [`classify`] turns that payload into a [`ParsedEvent`]
//! that names the storage system holding the input object. Unrecognised shapes
//! classify as [`SourceType::Unknown`] instead of failing, which downstream code
//! treats as "no input staging needed".

mod payloads;

use std::fmt::{self, Display, Formatter};

use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};

use crate::payloads::{
    HttpInvocation, MINIO_EVENT_SOURCE, NotificationRecord, ONEDATA_EVENT_SOURCE,
    S3_EVENT_SOURCE, StorageNotification,
};

/// Local file name used when staging an HTTP request body.
pub const HTTP_EVENT_FILE_NAME: &str = "event_file";

/// Storage system that originated a trigger event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceType {
    /// Amazon S3 bucket notification.
    ObjectStorage,
    /// `MinIO` bucket notification.
    Minio,
    /// Onedata `OneTrigger` notification.
    Onedata,
    /// HTTP invocation carrying the function input in its body.
    Http,
    /// No recognised storage event.
    Unknown,
}

impl SourceType {
    /// Label used in configuration keys (`STORAGE_AUTH_<LABEL>_...`) and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ObjectStorage => "S3",
            Self::Minio => "MINIO",
            Self::Onedata => "ONEDATA",
            Self::Http => "HTTP",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Resolve a configuration label back into a source type.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_uppercase().as_str() {
            "S3" => Some(Self::ObjectStorage),
            "MINIO" => Some(Self::Minio),
            "ONEDATA" => Some(Self::Onedata),
            "HTTP" => Some(Self::Http),
            _ => None,
        }
    }

    /// Whether a provider for this source needs configured credentials.
    #[must_use]
    pub const fn requires_credentials(self) -> bool {
        !matches!(self, Self::Http | Self::Unknown)
    }
}

impl Display for SourceType {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Normalised view of a trigger payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedEvent {
    /// Storage system the input object lives in.
    pub source_type: SourceType,
    /// Backend-specific locator of the input object.
    pub object_key: String,
    /// Name the object receives once staged locally.
    pub file_name: String,
    /// Bucket holding the object, for bucket-addressed backends.
    pub bucket: Option<String>,
    /// Inline input carried by HTTP invocations.
    pub body: Option<Vec<u8>>,
}

impl ParsedEvent {
    /// Event used when the payload matches no known shape.
    #[must_use]
    pub const fn unknown() -> Self {
        Self {
            source_type: SourceType::Unknown,
            object_key: String::new(),
            file_name: String::new(),
            bucket: None,
            body: None,
        }
    }

    /// Whether input staging should be skipped for this event.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.source_type == SourceType::Unknown
    }
}

/// Classify a raw trigger payload.
///
/// Never fails: empty payloads, non-JSON payloads and JSON documents that match
/// no storage or HTTP shape all yield [`ParsedEvent::unknown`].
#[must_use]
pub fn classify(raw: &str) -> ParsedEvent {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return ParsedEvent::unknown();
    }
    let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) else {
        return ParsedEvent::unknown();
    };
    if !value.is_object() {
        return ParsedEvent::unknown();
    }

    if let Some(event) = classify_notification(&value) {
        return event;
    }
    if let Some(event) = classify_http(&value) {
        return event;
    }
    ParsedEvent::unknown()
}

fn classify_notification(value: &serde_json::Value) -> Option<ParsedEvent> {
    if value.get("Records").is_none() {
        return None;
    }
    let notification = StorageNotification::deserialize(value).ok()?;
    let record = notification.records.first()?;
    match record.event_source.as_deref()? {
        S3_EVENT_SOURCE => bucket_event(SourceType::ObjectStorage, record),
        MINIO_EVENT_SOURCE => bucket_event(SourceType::Minio, record),
        ONEDATA_EVENT_SOURCE => {
            let object_key = notification.key?;
            let file_name = record
                .object_key
                .clone()
                .unwrap_or_else(|| file_name_of(&object_key));
            Some(ParsedEvent {
                source_type: SourceType::Onedata,
                object_key,
                file_name,
                bucket: None,
                body: None,
            })
        }
        _ => None,
    }
}

fn bucket_event(source_type: SourceType, record: &NotificationRecord) -> Option<ParsedEvent> {
    let entity = record.s3.as_ref()?;
    let object_key = decode_object_key(&entity.object.key);
    Some(ParsedEvent {
        source_type,
        file_name: file_name_of(&object_key),
        object_key,
        bucket: Some(entity.bucket.name.clone()),
        body: None,
    })
}

fn classify_http(value: &serde_json::Value) -> Option<ParsedEvent> {
    value.get("httpMethod")?;
    let invocation = HttpInvocation::deserialize(value).ok()?;
    if invocation.http_method.is_empty() {
        return None;
    }
    let body = invocation.body?;
    let bytes = if invocation.is_base64_encoded {
        general_purpose::STANDARD
            .decode(body.as_bytes())
            .unwrap_or_else(|_| body.into_bytes())
    } else {
        body.into_bytes()
    };
    Some(ParsedEvent {
        source_type: SourceType::Http,
        object_key: String::new(),
        file_name: HTTP_EVENT_FILE_NAME.to_string(),
        bucket: None,
        body: Some(bytes),
    })
}

/// Bucket notifications URL-encode keys and use `+` for spaces.
fn decode_object_key(key: &str) -> String {
    let spaced = key.replace('+', " ");
    urlencoding::decode(&spaced).map_or(spaced.clone(), std::borrow::Cow::into_owned)
}

fn file_name_of(key: &str) -> String {
    key.rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or(key)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn s3_notification(source: &str, key: &str) -> String {
        json!({
            "Records": [{
                "eventSource": source,
                "eventName": "ObjectCreated:Put",
                "s3": {
                    "bucket": {"name": "input-bucket"},
                    "object": {"key": key, "size": 12}
                }
            }]
        })
        .to_string()
    }

    #[test]
    fn s3_notification_yields_object_storage_event() {
        let event = classify(&s3_notification("aws:s3", "dir/obj.txt"));
        assert_eq!(event.source_type, SourceType::ObjectStorage);
        assert_eq!(event.object_key, "dir/obj.txt");
        assert_eq!(event.file_name, "obj.txt");
        assert_eq!(event.bucket.as_deref(), Some("input-bucket"));
    }

    #[test]
    fn s3_keys_are_url_decoded() {
        let event = classify(&s3_notification("aws:s3", "my+dir/report%281%29.csv"));
        assert_eq!(event.object_key, "my dir/report(1).csv");
        assert_eq!(event.file_name, "report(1).csv");
    }

    #[test]
    fn minio_notification_yields_minio_event() {
        let event = classify(&s3_notification("minio:s3", "images/cat.png"));
        assert_eq!(event.source_type, SourceType::Minio);
        assert_eq!(event.file_name, "cat.png");
    }

    #[test]
    fn onedata_notification_uses_top_level_key() {
        let payload = json!({
            "Key": "/my-space/files/input.dat",
            "Records": [{
                "objectKey": "input.dat",
                "objectId": "0000abcd",
                "eventSource": "OneTrigger"
            }]
        })
        .to_string();
        let event = classify(&payload);
        assert_eq!(event.source_type, SourceType::Onedata);
        assert_eq!(event.object_key, "/my-space/files/input.dat");
        assert_eq!(event.file_name, "input.dat");
        assert!(event.bucket.is_none());
    }

    #[test]
    fn http_invocation_decodes_base64_body() {
        let payload = json!({
            "httpMethod": "POST",
            "body": general_purpose::STANDARD.encode(b"raw bytes"),
            "isBase64Encoded": true
        })
        .to_string();
        let event = classify(&payload);
        assert_eq!(event.source_type, SourceType::Http);
        assert_eq!(event.file_name, HTTP_EVENT_FILE_NAME);
        assert_eq!(event.body.as_deref(), Some(&b"raw bytes"[..]));
    }

    #[test]
    fn http_invocation_keeps_plain_body() {
        let payload = json!({"httpMethod": "POST", "body": "{\"n\": 3}"}).to_string();
        let event = classify(&payload);
        assert_eq!(event.body.as_deref(), Some(&b"{\"n\": 3}"[..]));
    }

    #[test]
    fn unrecognised_shapes_are_unknown() {
        for payload in [
            "",
            "   ",
            "plain text body",
            "[1, 2, 3]",
            "{\"hello\": \"world\"}",
            "{\"Records\": []}",
            "{\"Records\": [{\"eventSource\": \"aws:sqs\"}]}",
            "{\"httpMethod\": \"GET\"}",
        ] {
            assert!(classify(payload).is_unknown(), "payload {payload:?}");
        }
    }

    #[test]
    fn source_type_labels_round_trip() {
        for source in [
            SourceType::ObjectStorage,
            SourceType::Minio,
            SourceType::Onedata,
            SourceType::Http,
        ] {
            assert_eq!(SourceType::from_label(source.as_str()), Some(source));
        }
        assert_eq!(SourceType::from_label("unknown"), None);
        assert!(!SourceType::Http.requires_credentials());
        assert!(SourceType::Onedata.requires_credentials());
    }
}
