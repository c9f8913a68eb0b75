//! Trigger payloads and configuration builders.

use base64::{Engine as _, engine::general_purpose};
use serde_json::json;

fn bucket_notification(event_source: &str, bucket: &str, key: &str) -> String {
    json!({
        "Records": [{
            "eventSource": event_source,
            "eventName": "s3:ObjectCreated:Put",
            "s3": {
                "bucket": { "name": bucket },
                "object": { "key": key }
            }
        }]
    })
    .to_string()
}

/// Object-storage bucket notification for `bucket/key`.
#[must_use]
pub fn s3_event(bucket: &str, key: &str) -> String {
    bucket_notification("aws:s3", bucket, key)
}

/// `MinIO` bucket notification for `bucket/key`.
#[must_use]
pub fn minio_event(bucket: &str, key: &str) -> String {
    bucket_notification("minio:s3", bucket, key)
}

/// Onedata trigger for the object at `key` (absolute CDMI path).
#[must_use]
pub fn onedata_event(key: &str) -> String {
    let file_name = key.rsplit('/').next().unwrap_or(key);
    json!({
        "Key": key,
        "Records": [{
            "eventSource": "OneTrigger",
            "objectKey": file_name
        }]
    })
    .to_string()
}

/// API-gateway style HTTP invocation carrying `body` as plain text.
#[must_use]
pub fn http_event(body: &str) -> String {
    json!({
        "httpMethod": "POST",
        "path": "/",
        "body": body,
        "isBase64Encoded": false
    })
    .to_string()
}

/// Base64 encoding of a user script, as expected by the `SCRIPT` option.
#[must_use]
pub fn encode_script(body: &str) -> String {
    general_purpose::STANDARD.encode(body)
}

/// Owned key/value pairs suitable for `SupervisorConfig::from_vars`.
#[must_use]
pub fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use faas_supervisor_events::{SourceType, classify};

    #[test]
    fn fixtures_classify_to_their_source() {
        let s3 = classify(&s3_event("images", "dir/obj.txt"));
        assert_eq!(s3.source_type, SourceType::ObjectStorage);
        assert_eq!(s3.file_name, "obj.txt");

        assert_eq!(classify(&minio_event("b", "k")).source_type, SourceType::Minio);

        let onedata = classify(&onedata_event("/space/in/photo.png"));
        assert_eq!(onedata.source_type, SourceType::Onedata);
        assert_eq!(onedata.object_key, "/space/in/photo.png");
        assert_eq!(onedata.file_name, "photo.png");

        let http = classify(&http_event("hello"));
        assert_eq!(http.source_type, SourceType::Http);
        assert_eq!(http.body.as_deref(), Some(b"hello".as_slice()));
    }

    #[test]
    fn vars_are_owned_pairs() {
        assert_eq!(
            vars(&[("SUPERVISOR_TYPE", "LAMBDA")]),
            vec![("SUPERVISOR_TYPE".to_string(), "LAMBDA".to_string())]
        );
        assert_eq!(encode_script("echo"), "ZWNobw==");
    }
}
