//! Storage credentials and output targets.
//!
//! # Design
//! - Credentials are keyed by storage identifier and loaded once per supervisor lifetime.
//! - The storage type is kept as the raw configured label; provider construction decides
//!   whether that label has an implementation.
//! - Secret values never appear in `Debug` output.

use std::collections::BTreeMap;
use std::fmt::{self, Debug, Formatter};

use faas_supervisor_events::SourceType;

use crate::defaults::{STORAGE_AUTH_PREFIX, STORAGE_OUTPUT_PREFIX};
use crate::error::{ConfigError, ConfigResult};

/// Credential set for one configured storage system.
#[derive(Clone, PartialEq, Eq)]
pub struct StorageCredentials {
    storage_id: String,
    storage_type: String,
    fields: BTreeMap<String, String>,
}

impl StorageCredentials {
    /// Build a credential set from explicit parts.
    #[must_use]
    pub fn new(
        storage_id: impl Into<String>,
        storage_type: impl Into<String>,
        fields: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        Self {
            storage_id: storage_id.into(),
            storage_type: storage_type.into().to_ascii_uppercase(),
            fields: fields.into_iter().collect(),
        }
    }

    /// Credential-less set used for sources that need no authentication.
    #[must_use]
    pub fn anonymous(source_type: SourceType) -> Self {
        Self::new(source_type.as_str(), source_type.as_str(), [])
    }

    /// Identifier of the storage system.
    #[must_use]
    pub fn storage_id(&self) -> &str {
        &self.storage_id
    }

    /// Configured storage type label (`S3`, `MINIO`, `ONEDATA`, ...).
    #[must_use]
    pub fn storage_type(&self) -> &str {
        &self.storage_type
    }

    /// Source type matching the configured label, when one exists.
    #[must_use]
    pub fn source_type(&self) -> Option<SourceType> {
        SourceType::from_label(&self.storage_type)
    }

    /// Look up a credential field by name.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

impl Debug for StorageCredentials {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("StorageCredentials")
            .field("storage_id", &self.storage_id)
            .field("storage_type", &self.storage_type)
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// All configured storage credentials, keyed by storage identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageAuth {
    entries: BTreeMap<String, StorageCredentials>,
}

impl StorageAuth {
    /// Parse every `STORAGE_AUTH_<TYPE>_<ID>_<FIELD>` option from the given pairs.
    ///
    /// # Errors
    ///
    /// Returns an error when an option key is malformed or when one identifier is
    /// configured with two different storage types.
    pub fn from_pairs<'a>(
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> ConfigResult<Self> {
        let mut entries: BTreeMap<String, StorageCredentials> = BTreeMap::new();
        for (key, value) in pairs {
            let Some(rest) = key.strip_prefix(STORAGE_AUTH_PREFIX) else {
                continue;
            };
            let mut parts = rest.splitn(3, '_');
            let (Some(storage_type), Some(storage_id), Some(field)) =
                (parts.next(), parts.next(), parts.next())
            else {
                return Err(ConfigError::invalid(key, "expected_type_id_field"));
            };
            if storage_type.is_empty() || storage_id.is_empty() || field.is_empty() {
                return Err(ConfigError::invalid(key, "expected_type_id_field"));
            }

            let entry = entries
                .entry(storage_id.to_string())
                .or_insert_with(|| StorageCredentials::new(storage_id, storage_type, []));
            if !entry.storage_type.eq_ignore_ascii_case(storage_type) {
                return Err(ConfigError::invalid_value(
                    key,
                    "conflicting_storage_type",
                    entry.storage_type.clone(),
                ));
            }
            entry.fields.insert(field.to_string(), value.to_string());
        }
        Ok(Self { entries })
    }

    /// Credentials registered under a storage identifier.
    #[must_use]
    pub fn by_id(&self, storage_id: &str) -> Option<&StorageCredentials> {
        self.entries.get(storage_id)
    }

    /// First credential set whose type matches the event source.
    ///
    /// Sources that need no credentials always resolve to an anonymous set;
    /// [`SourceType::Unknown`] never resolves.
    #[must_use]
    pub fn by_source_type(&self, source_type: SourceType) -> Option<StorageCredentials> {
        if source_type == SourceType::Unknown {
            return None;
        }
        if !source_type.requires_credentials() {
            return Some(StorageCredentials::anonymous(source_type));
        }
        self.entries
            .values()
            .find(|entry| entry.storage_type == source_type.as_str())
            .cloned()
    }

    /// Number of configured storage systems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no storage system is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Destination for uploaded output data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    /// Storage identifier whose credentials are used.
    pub storage_id: String,
    /// Destination path inside that storage system.
    pub path: String,
}

impl OutputTarget {
    /// Parse every `STORAGE_PATH_OUTPUT_<ID>` option, ordered by identifier.
    ///
    /// # Errors
    ///
    /// Returns an error when the identifier or the path is empty.
    pub fn from_pairs<'a>(
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> ConfigResult<Vec<Self>> {
        let mut targets = BTreeMap::new();
        for (key, value) in pairs {
            let Some(storage_id) = key.strip_prefix(STORAGE_OUTPUT_PREFIX) else {
                continue;
            };
            if storage_id.is_empty() {
                return Err(ConfigError::invalid(key, "missing_storage_id"));
            }
            let path = value.trim().trim_matches('/');
            if path.is_empty() {
                return Err(ConfigError::invalid(key, "empty_output_path"));
            }
            targets.insert(storage_id.to_string(), path.to_string());
        }
        Ok(targets
            .into_iter()
            .map(|(storage_id, path)| Self { storage_id, path })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_are_grouped_by_identifier() -> ConfigResult<()> {
        let auth = StorageAuth::from_pairs([
            ("STORAGE_AUTH_ONEDATA_ONE_HOST", "provider.example.org"),
            ("STORAGE_AUTH_ONEDATA_ONE_TOKEN", "secret-token"),
            ("STORAGE_AUTH_ONEDATA_ONE_SPACE", "my-space"),
            ("STORAGE_AUTH_MINIO_LOCAL_ACCESS_KEY", "minio"),
            ("UNRELATED", "ignored"),
        ])?;

        assert_eq!(auth.len(), 2);
        let onedata = auth.by_id("ONE").expect("onedata credentials");
        assert_eq!(onedata.storage_type(), "ONEDATA");
        assert_eq!(onedata.get("SPACE"), Some("my-space"));
        let minio = auth.by_id("LOCAL").expect("minio credentials");
        assert_eq!(minio.get("ACCESS_KEY"), Some("minio"));
        Ok(())
    }

    #[test]
    fn malformed_credential_keys_are_rejected() {
        let err = StorageAuth::from_pairs([("STORAGE_AUTH_ONEDATA_HOST", "host")])
            .expect_err("missing identifier should fail");
        assert!(matches!(
            err,
            ConfigError::InvalidOption { reason: "expected_type_id_field", .. }
        ));
    }

    #[test]
    fn conflicting_types_for_one_identifier_are_rejected() {
        let err = StorageAuth::from_pairs([
            ("STORAGE_AUTH_S3_X_REGION", "eu-west-1"),
            ("STORAGE_AUTH_MINIO_X_USER", "minio"),
        ])
        .expect_err("conflicting types should fail");
        assert!(matches!(
            err,
            ConfigError::InvalidOption { reason: "conflicting_storage_type", .. }
        ));
    }

    #[test]
    fn source_type_lookup_handles_anonymous_and_unknown_sources() -> ConfigResult<()> {
        let auth = StorageAuth::from_pairs([("STORAGE_AUTH_S3_AWS_REGION", "eu-west-1")])?;

        let s3 = auth
            .by_source_type(SourceType::ObjectStorage)
            .expect("s3 credentials");
        assert_eq!(s3.storage_id(), "AWS");
        assert!(auth.by_source_type(SourceType::Onedata).is_none());
        assert!(auth.by_source_type(SourceType::Unknown).is_none());
        let http = auth
            .by_source_type(SourceType::Http)
            .expect("http resolves without credentials");
        assert_eq!(http.source_type(), Some(SourceType::Http));
        Ok(())
    }

    #[test]
    fn debug_output_hides_secret_values() -> ConfigResult<()> {
        let auth = StorageAuth::from_pairs([("STORAGE_AUTH_ONEDATA_ONE_TOKEN", "hunter2")])?;
        let rendered = format!("{auth:?}");
        assert!(rendered.contains("TOKEN"));
        assert!(!rendered.contains("hunter2"));
        Ok(())
    }

    #[test]
    fn output_targets_are_sorted_and_trimmed() -> ConfigResult<()> {
        let targets = OutputTarget::from_pairs([
            ("STORAGE_PATH_OUTPUT_ZETA", "/bucket/out/"),
            ("STORAGE_PATH_OUTPUT_ALPHA", "results"),
            ("STORAGE_PATH_INPUT_ALPHA", "ignored"),
        ])?;
        assert_eq!(
            targets,
            vec![
                OutputTarget {
                    storage_id: "ALPHA".to_string(),
                    path: "results".to_string(),
                },
                OutputTarget {
                    storage_id: "ZETA".to_string(),
                    path: "bucket/out".to_string(),
                },
            ]
        );
        Ok(())
    }

    #[test]
    fn empty_output_paths_are_rejected() {
        let err = OutputTarget::from_pairs([("STORAGE_PATH_OUTPUT_A", " / ")])
            .expect_err("empty path should fail");
        assert!(matches!(
            err,
            ConfigError::InvalidOption { reason: "empty_output_path", .. }
        ));
    }
}
