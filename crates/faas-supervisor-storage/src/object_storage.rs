//! S3-compatible provider used for both Amazon S3 and `MinIO`.
//!
//! # Design
//! - Stores are built per bucket with `AmazonS3Builder`; building performs no I/O.
//! - Output paths have the form `bucket[/folder]`; uploads land at `folder/<remote name>`.
//! - A shared store can be injected instead; object paths are then prefixed with the
//!   bucket name so several buckets can live in one store.
//! - Keys are taken literally: notification keys arrive decoded, so they are never
//!   re-encoded. Keys with empty or relative segments are rejected.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use faas_supervisor_core::{StorageProvider, SupervisorError, SupervisorResult, UploadOutcome};
use faas_supervisor_events::{ParsedEvent, SourceType};
use faas_supervisor_fsops::stage_bytes;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutPayload};
use tracing::{error, info};

use crate::error::{TransferError, TransferResult};

/// Client settings for an S3-compatible endpoint.
#[derive(Clone, Default)]
pub struct ObjectStorageSettings {
    /// Region; the ambient configuration applies when absent.
    pub region: Option<String>,
    /// Access key identifier.
    pub access_key: Option<String>,
    /// Secret access key.
    pub secret_key: Option<String>,
    /// Custom endpoint (`MinIO`); Amazon S3 is used when absent.
    pub endpoint: Option<String>,
    /// Seed the builder from the ambient AWS environment.
    pub ambient_credentials: bool,
}

enum Backend {
    Remote(ObjectStorageSettings),
    Shared(Arc<dyn ObjectStore>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct OutputLocation {
    bucket: String,
    folder: Option<String>,
}

impl OutputLocation {
    fn parse(path: &str) -> Option<Self> {
        let path = path.trim_matches('/');
        let (bucket, folder) = match path.split_once('/') {
            Some((bucket, folder)) => (bucket, Some(folder.trim_matches('/'))),
            None => (path, None),
        };
        if bucket.is_empty() {
            return None;
        }
        Some(Self {
            bucket: bucket.to_string(),
            folder: folder
                .filter(|folder| !folder.is_empty())
                .map(str::to_string),
        })
    }

    fn key(&self, remote_name: &str) -> String {
        match &self.folder {
            Some(folder) => format!("{folder}/{remote_name}"),
            None => remote_name.to_string(),
        }
    }
}

/// Storage provider for S3 and `MinIO` buckets.
pub struct ObjectStorageProvider {
    storage_id: String,
    storage_type: SourceType,
    backend: Backend,
    output: Option<OutputLocation>,
}

impl ObjectStorageProvider {
    /// Build a provider talking to a remote S3-compatible endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError::ProviderInit`] when the output path names no bucket or
    /// the client for the output bucket cannot be configured.
    pub fn remote(
        storage_id: impl Into<String>,
        storage_type: SourceType,
        settings: ObjectStorageSettings,
        output_path: Option<&str>,
    ) -> SupervisorResult<Self> {
        let storage_id = storage_id.into();
        let output = parse_output(&storage_id, output_path)?;
        if let Some(output) = &output {
            build_store(&settings, &output.bucket).map_err(|source| {
                SupervisorError::ProviderInit {
                    storage_id: storage_id.clone(),
                    source: Box::new(source),
                }
            })?;
        }
        Ok(Self {
            storage_id,
            storage_type,
            backend: Backend::Remote(settings),
            output,
        })
    }

    /// Build a provider over an existing store holding every bucket.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError::ProviderInit`] when the output path names no bucket.
    pub fn shared(
        storage_id: impl Into<String>,
        storage_type: SourceType,
        store: Arc<dyn ObjectStore>,
        output_path: Option<&str>,
    ) -> SupervisorResult<Self> {
        let storage_id = storage_id.into();
        let output = parse_output(&storage_id, output_path)?;
        Ok(Self {
            storage_id,
            storage_type,
            backend: Backend::Shared(store),
            output,
        })
    }

    fn locate(
        &self,
        bucket: &str,
        key: &str,
    ) -> TransferResult<(Arc<dyn ObjectStore>, ObjectPath)> {
        match &self.backend {
            Backend::Remote(settings) => {
                let store = build_store(settings, bucket)
                    .map_err(|source| TransferError::object_store(bucket, source))?;
                Ok((Arc::new(store), object_path(key)?))
            }
            Backend::Shared(store) => {
                Ok((Arc::clone(store), object_path(&format!("{bucket}/{key}"))?))
            }
        }
    }

    async fn fetch(&self, event: &ParsedEvent, input_dir: &Path) -> TransferResult<PathBuf> {
        let bucket = event
            .bucket
            .as_deref()
            .ok_or(TransferError::MissingObject { field: "bucket" })?;
        let (store, location) = self.locate(bucket, &event.object_key)?;
        let bytes = store
            .get(&location)
            .await
            .map_err(|source| TransferError::object_store(location.to_string(), source))?
            .bytes()
            .await
            .map_err(|source| TransferError::object_store(location.to_string(), source))?;
        Ok(stage_bytes(input_dir, &event.file_name, &bytes)?)
    }

    async fn push(&self, local_path: &Path, remote_name: &str) -> TransferResult<String> {
        let output = self
            .output
            .as_ref()
            .ok_or(TransferError::MissingObject {
                field: "output_path",
            })?;
        let (store, location) = self.locate(&output.bucket, &output.key(remote_name))?;
        let body = tokio::fs::read(local_path)
            .await
            .map_err(|source| TransferError::Read {
                path: local_path.to_path_buf(),
                source,
            })?;
        store
            .put(&location, PutPayload::from(body))
            .await
            .map_err(|source| TransferError::object_store(location.to_string(), source))?;
        Ok(format!("{}/{}", output.bucket, output.key(remote_name)))
    }
}

#[async_trait]
impl StorageProvider for ObjectStorageProvider {
    fn storage_type(&self) -> SourceType {
        self.storage_type
    }

    fn storage_id(&self) -> &str {
        &self.storage_id
    }

    async fn download_file(&self, event: &ParsedEvent, input_dir: &Path) -> Option<PathBuf> {
        info!(
            bucket = event.bucket.as_deref().unwrap_or_default(),
            object_key = %event.object_key,
            storage_type = %self.storage_type,
            "downloading from bucket"
        );
        match self.fetch(event, input_dir).await {
            Ok(path) => {
                info!(path = %path.display(), "bucket download complete");
                Some(path)
            }
            Err(err) => {
                error!(
                    object_key = %event.object_key,
                    error = %err.describe(),
                    "bucket download failed"
                );
                None
            }
        }
    }

    async fn upload_file(&self, local_path: &Path, remote_name: &str) -> UploadOutcome {
        match self.push(local_path, remote_name).await {
            Ok(location) => {
                info!(%location, storage_type = %self.storage_type, "uploaded to bucket");
                UploadOutcome::Uploaded { location }
            }
            Err(err) => {
                let reason = err.describe();
                error!(remote_name, error = %reason, "bucket upload failed");
                UploadOutcome::Failed { reason }
            }
        }
    }
}

fn parse_output(
    storage_id: &str,
    output_path: Option<&str>,
) -> SupervisorResult<Option<OutputLocation>> {
    output_path
        .map(|path| {
            OutputLocation::parse(path).ok_or_else(|| SupervisorError::ProviderInit {
                storage_id: storage_id.to_string(),
                source: format!("output path '{path}' names no bucket").into(),
            })
        })
        .transpose()
}

fn object_path(key: &str) -> TransferResult<ObjectPath> {
    ObjectPath::parse(key).map_err(|source| TransferError::InvalidKey {
        key: key.to_string(),
        source,
    })
}

fn build_store(
    settings: &ObjectStorageSettings,
    bucket: &str,
) -> object_store::Result<object_store::aws::AmazonS3> {
    let mut builder = if settings.ambient_credentials {
        AmazonS3Builder::from_env()
    } else {
        AmazonS3Builder::new()
    };
    builder = builder.with_bucket_name(bucket);
    if let Some(region) = &settings.region {
        builder = builder.with_region(region);
    }
    if let Some(access_key) = &settings.access_key {
        builder = builder.with_access_key_id(access_key);
    }
    if let Some(secret_key) = &settings.secret_key {
        builder = builder.with_secret_access_key(secret_key);
    }
    if let Some(endpoint) = &settings.endpoint {
        builder = builder
            .with_endpoint(endpoint)
            .with_allow_http(endpoint.starts_with("http://"));
    }
    builder.build()
}
