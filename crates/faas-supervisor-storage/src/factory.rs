//! Provider construction from configured credentials.
//!
//! # Design
//! - Map each [`SourceType`] to exactly one provider constructor; no dynamic lookup.
//! - Validate required credential fields up front and name the first missing one.
//! - Construction performs no network I/O.

use std::sync::Arc;

use faas_supervisor_config::StorageCredentials;
use faas_supervisor_config::defaults::{DEFAULT_MINIO_ENDPOINT, DEFAULT_REGION};
use faas_supervisor_core::{ProviderFactory, StorageProvider, SupervisorError, SupervisorResult};
use faas_supervisor_events::SourceType;
use object_store::ObjectStore;
use reqwest::Client;
use tracing::debug;

use crate::object_storage::{ObjectStorageProvider, ObjectStorageSettings};
use crate::onedata::{OnedataProvider, OnedataSettings};
use crate::request_body::RequestBodyProvider;

/// Onedata credential fields.
pub mod onedata_fields {
    /// Oneprovider host.
    pub const HOST: &str = "HOST";
    /// Access token.
    pub const TOKEN: &str = "TOKEN";
    /// Space name.
    pub const SPACE: &str = "SPACE";
}

/// `MinIO` credential fields.
pub mod minio_fields {
    /// Access key.
    pub const USER: &str = "USER";
    /// Secret key.
    pub const PASS: &str = "PASS";
    /// Endpoint URL.
    pub const ENDPOINT: &str = "ENDPOINT";
    /// Region.
    pub const REGION: &str = "REGION";
}

/// Amazon S3 credential fields.
pub mod s3_fields {
    /// Access key identifier.
    pub const ACCESS_KEY: &str = "ACCESS_KEY";
    /// Secret access key.
    pub const SECRET_KEY: &str = "SECRET_KEY";
    /// Region.
    pub const REGION: &str = "REGION";
}

/// Factory producing the built-in providers.
#[derive(Clone)]
pub struct StandardProviderFactory {
    client: Client,
    shared_store: Option<Arc<dyn ObjectStore>>,
}

impl StandardProviderFactory {
    /// Factory using a default HTTP client and remote object stores.
    #[must_use]
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    /// Factory using the given HTTP client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self {
            client,
            shared_store: None,
        }
    }

    /// Serve S3 and `MinIO` buckets from one pre-built store.
    #[must_use]
    pub fn with_shared_store(mut self, store: Arc<dyn ObjectStore>) -> Self {
        self.shared_store = Some(store);
        self
    }

    fn object_storage(
        &self,
        credentials: &StorageCredentials,
        source_type: SourceType,
        settings: ObjectStorageSettings,
        output_path: Option<&str>,
    ) -> SupervisorResult<Box<dyn StorageProvider>> {
        let provider = match &self.shared_store {
            Some(store) => ObjectStorageProvider::shared(
                credentials.storage_id(),
                source_type,
                Arc::clone(store),
                output_path,
            )?,
            None => ObjectStorageProvider::remote(
                credentials.storage_id(),
                source_type,
                settings,
                output_path,
            )?,
        };
        Ok(Box::new(provider))
    }
}

impl Default for StandardProviderFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderFactory for StandardProviderFactory {
    fn create(
        &self,
        credentials: &StorageCredentials,
        source_type: SourceType,
        output_path: Option<&str>,
    ) -> SupervisorResult<Box<dyn StorageProvider>> {
        debug!(
            storage_id = credentials.storage_id(),
            storage_type = %source_type,
            output = output_path.unwrap_or_default(),
            "constructing storage provider"
        );
        match source_type {
            SourceType::Onedata => {
                let settings = OnedataSettings {
                    host: required(credentials, onedata_fields::HOST)?,
                    token: required(credentials, onedata_fields::TOKEN)?,
                    space: required(credentials, onedata_fields::SPACE)?,
                };
                Ok(Box::new(OnedataProvider::new(
                    credentials.storage_id(),
                    self.client.clone(),
                    settings,
                    output_path,
                )))
            }
            SourceType::Minio => {
                let settings = ObjectStorageSettings {
                    access_key: Some(required(credentials, minio_fields::USER)?),
                    secret_key: Some(required(credentials, minio_fields::PASS)?),
                    endpoint: Some(optional(
                        credentials,
                        minio_fields::ENDPOINT,
                        DEFAULT_MINIO_ENDPOINT,
                    )),
                    region: Some(optional(
                        credentials,
                        minio_fields::REGION,
                        DEFAULT_REGION,
                    )),
                    ambient_credentials: false,
                };
                self.object_storage(credentials, source_type, settings, output_path)
            }
            SourceType::ObjectStorage => {
                let settings = ObjectStorageSettings {
                    access_key: credentials.get(s3_fields::ACCESS_KEY).map(str::to_string),
                    secret_key: credentials.get(s3_fields::SECRET_KEY).map(str::to_string),
                    region: credentials.get(s3_fields::REGION).map(str::to_string),
                    endpoint: None,
                    ambient_credentials: true,
                };
                self.object_storage(credentials, source_type, settings, output_path)
            }
            SourceType::Http if output_path.is_none() => Ok(Box::new(RequestBodyProvider)),
            SourceType::Http | SourceType::Unknown => Err(SupervisorError::UnsupportedProvider {
                storage_type: source_type.as_str().to_string(),
            }),
        }
    }
}

fn required(credentials: &StorageCredentials, field: &'static str) -> SupervisorResult<String> {
    credentials
        .get(field)
        .map(str::to_string)
        .ok_or_else(|| SupervisorError::MissingCredential {
            storage_id: credentials.storage_id().to_string(),
            field,
        })
}

fn optional(credentials: &StorageCredentials, field: &str, default: &str) -> String {
    credentials.get(field).unwrap_or(default).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;

    fn credentials(storage_type: &str, fields: &[(&str, &str)]) -> StorageCredentials {
        StorageCredentials::new(
            "ID",
            storage_type,
            fields
                .iter()
                .map(|(key, value)| ((*key).to_string(), (*value).to_string())),
        )
    }

    fn create_err(
        credentials: &StorageCredentials,
        source_type: SourceType,
        output_path: Option<&str>,
    ) -> SupervisorError {
        match StandardProviderFactory::new().create(credentials, source_type, output_path) {
            Ok(provider) => panic!("expected failure, built {}", provider.storage_type()),
            Err(err) => err,
        }
    }

    #[test]
    fn onedata_requires_host_token_and_space() {
        let partial = credentials("ONEDATA", &[("HOST", "provider"), ("TOKEN", "t")]);
        let err = create_err(&partial, SourceType::Onedata, None);
        assert!(matches!(
            err,
            SupervisorError::MissingCredential { field: "SPACE", .. }
        ));

        let complete = credentials(
            "ONEDATA",
            &[("HOST", "provider"), ("TOKEN", "t"), ("SPACE", "s")],
        );
        let provider = StandardProviderFactory::new()
            .create(&complete, SourceType::Onedata, Some("out"))
            .map_err(|err| err.detail());
        assert_eq!(
            provider.map(|provider| provider.storage_type()),
            Ok(SourceType::Onedata)
        );
    }

    #[test]
    fn minio_requires_user_and_password() {
        let err = create_err(&credentials("MINIO", &[("USER", "minio")]), SourceType::Minio, None);
        assert!(matches!(
            err,
            SupervisorError::MissingCredential { field: "PASS", .. }
        ));
    }

    #[test]
    fn s3_needs_no_explicit_credentials() {
        let factory = StandardProviderFactory::new().with_shared_store(Arc::new(InMemory::new()));
        let provider = factory
            .create(&credentials("S3", &[]), SourceType::ObjectStorage, Some("bucket/out"))
            .map(|provider| provider.storage_id().to_string())
            .map_err(|err| err.detail());
        assert_eq!(provider, Ok("ID".to_string()));
    }

    #[test]
    fn http_is_input_only() {
        let http = StorageCredentials::anonymous(SourceType::Http);
        assert!(
            StandardProviderFactory::new()
                .create(&http, SourceType::Http, None)
                .is_ok()
        );
        let err = create_err(&http, SourceType::Http, Some("anywhere"));
        assert!(matches!(err, SupervisorError::UnsupportedProvider { .. }));
    }

    #[test]
    fn unknown_sources_are_unsupported() {
        let err = create_err(&credentials("UNKNOWN", &[]), SourceType::Unknown, None);
        assert!(matches!(
            err,
            SupervisorError::UnsupportedProvider { storage_type } if storage_type == "UNKNOWN"
        ));
    }
}
