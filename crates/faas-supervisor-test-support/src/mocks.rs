//! Recording storage doubles.
//!
//! [`RecordingProviderFactory`] hands out providers that log every call into a
//! shared journal instead of talking to a remote system. Downloads stage a fixed
//! payload (or soft-fail when none is configured); uploads capture the file
//! contents and can be told to soft-fail per storage identifier.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use faas_supervisor_config::StorageCredentials;
use faas_supervisor_core::{
    ProviderFactory, StorageProvider, SupervisorError, SupervisorResult, UploadOutcome,
};
use faas_supervisor_events::{ParsedEvent, SourceType};

/// One call observed by the recording doubles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    /// The factory constructed a provider.
    Create {
        /// Storage identifier of the credentials used.
        storage_id: String,
        /// Requested source type.
        source_type: SourceType,
        /// Output path, for output providers.
        output_path: Option<String>,
    },
    /// A provider was asked to download.
    Download {
        /// Storage identifier of the provider.
        storage_id: String,
        /// Object key requested.
        object_key: String,
    },
    /// A provider was asked to upload.
    Upload {
        /// Storage identifier of the provider.
        storage_id: String,
        /// Remote name requested.
        remote_name: String,
        /// File contents at the time of the call.
        content: Vec<u8>,
    },
}

#[derive(Debug, Clone, Default)]
struct Behaviour {
    download: Option<Vec<u8>>,
    failing_uploads: BTreeSet<String>,
    unsupported: BTreeSet<String>,
}

type Journal = Arc<Mutex<Vec<ProviderCall>>>;

/// Factory producing [`RecordingProvider`]s.
#[derive(Debug, Clone, Default)]
pub struct RecordingProviderFactory {
    behaviour: Arc<Behaviour>,
    journal: Journal,
}

impl RecordingProviderFactory {
    /// Factory whose downloads soft-fail and whose uploads succeed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage `content` on every download.
    #[must_use]
    pub fn with_download(mut self, content: impl Into<Vec<u8>>) -> Self {
        Arc::make_mut(&mut self.behaviour).download = Some(content.into());
        self
    }

    /// Make uploads through `storage_id` soft-fail.
    #[must_use]
    pub fn with_failing_upload(mut self, storage_id: &str) -> Self {
        Arc::make_mut(&mut self.behaviour)
            .failing_uploads
            .insert(storage_id.to_string());
        self
    }

    /// Reject provider construction for `storage_id` as unsupported.
    #[must_use]
    pub fn with_unsupported(mut self, storage_id: &str) -> Self {
        Arc::make_mut(&mut self.behaviour)
            .unsupported
            .insert(storage_id.to_string());
        self
    }

    /// Every call recorded so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of download calls.
    #[must_use]
    pub fn download_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, ProviderCall::Download { .. }))
            .count()
    }

    /// `(storage_id, remote_name)` of every upload attempt, in order.
    #[must_use]
    pub fn uploads(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ProviderCall::Upload {
                    storage_id,
                    remote_name,
                    ..
                } => Some((storage_id, remote_name)),
                _ => None,
            })
            .collect()
    }

    /// Whether any call at all reached the factory or its providers.
    #[must_use]
    pub fn is_untouched(&self) -> bool {
        self.calls().is_empty()
    }
}

fn record(journal: &Journal, call: ProviderCall) {
    journal
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(call);
}

impl ProviderFactory for RecordingProviderFactory {
    fn create(
        &self,
        credentials: &StorageCredentials,
        source_type: SourceType,
        output_path: Option<&str>,
    ) -> SupervisorResult<Box<dyn StorageProvider>> {
        let storage_id = credentials.storage_id().to_string();
        record(
            &self.journal,
            ProviderCall::Create {
                storage_id: storage_id.clone(),
                source_type,
                output_path: output_path.map(str::to_string),
            },
        );
        if self.behaviour.unsupported.contains(&storage_id) {
            return Err(SupervisorError::UnsupportedProvider {
                storage_type: credentials.storage_type().to_string(),
            });
        }
        Ok(Box::new(RecordingProvider {
            fail_uploads: self.behaviour.failing_uploads.contains(&storage_id),
            download: self.behaviour.download.clone(),
            storage_id,
            source_type,
            journal: Arc::clone(&self.journal),
        }))
    }
}

/// Provider double recording its calls into the factory journal.
#[derive(Debug)]
pub struct RecordingProvider {
    storage_id: String,
    source_type: SourceType,
    download: Option<Vec<u8>>,
    fail_uploads: bool,
    journal: Journal,
}

#[async_trait]
impl StorageProvider for RecordingProvider {
    fn storage_type(&self) -> SourceType {
        self.source_type
    }

    fn storage_id(&self) -> &str {
        &self.storage_id
    }

    async fn download_file(&self, event: &ParsedEvent, input_dir: &Path) -> Option<PathBuf> {
        record(
            &self.journal,
            ProviderCall::Download {
                storage_id: self.storage_id.clone(),
                object_key: event.object_key.clone(),
            },
        );
        let content = self.download.as_ref()?;
        let target = input_dir.join(&event.file_name);
        tokio::fs::write(&target, content).await.ok()?;
        Some(target)
    }

    async fn upload_file(&self, local_path: &Path, remote_name: &str) -> UploadOutcome {
        let content = tokio::fs::read(local_path).await.unwrap_or_default();
        record(
            &self.journal,
            ProviderCall::Upload {
                storage_id: self.storage_id.clone(),
                remote_name: remote_name.to_string(),
                content,
            },
        );
        if self.fail_uploads {
            return UploadOutcome::Failed {
                reason: format!("upload to '{}' rejected", self.storage_id),
            };
        }
        UploadOutcome::Uploaded {
            location: format!("{}/{remote_name}", self.storage_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::collections::BTreeMap;

    fn credentials(storage_id: &str) -> StorageCredentials {
        StorageCredentials::new(storage_id, "MINIO", BTreeMap::new())
    }

    #[tokio::test]
    async fn calls_are_journaled_in_order() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let factory = RecordingProviderFactory::new()
            .with_download("payload")
            .with_failing_upload("bad");
        let mut event = faas_supervisor_events::ParsedEvent::unknown();
        event.object_key = "in/data.csv".to_string();
        event.file_name = "data.csv".to_string();

        let input = factory.create(&credentials("good"), SourceType::Minio, None)?;
        let staged = input.download_file(&event, dir.path()).await;
        assert_eq!(staged, Some(dir.path().join("data.csv")));

        let output = factory.create(&credentials("bad"), SourceType::Minio, Some("out"))?;
        let outcome = output.upload_file(&dir.path().join("data.csv"), "data.csv").await;
        assert!(!outcome.is_uploaded());

        assert_eq!(factory.download_count(), 1);
        assert_eq!(
            factory.uploads(),
            vec![("bad".to_string(), "data.csv".to_string())]
        );
        assert!(matches!(
            factory.calls().last(),
            Some(ProviderCall::Upload { content, .. }) if content == b"payload"
        ));
        Ok(())
    }

    #[tokio::test]
    async fn downloads_soft_fail_without_content() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let factory = RecordingProviderFactory::new().with_unsupported("gone");
        let provider = factory.create(&credentials("s"), SourceType::Minio, None)?;
        assert_eq!(
            provider
                .download_file(&faas_supervisor_events::ParsedEvent::unknown(), dir.path())
                .await,
            None
        );
        assert!(
            factory
                .create(&credentials("gone"), SourceType::Minio, None)
                .is_err()
        );
        Ok(())
    }
}
