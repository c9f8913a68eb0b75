//! Provider staging the body of an HTTP invocation as the function input.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use faas_supervisor_core::{StorageProvider, UploadOutcome};
use faas_supervisor_events::{ParsedEvent, SourceType};
use faas_supervisor_fsops::stage_bytes;
use tracing::{error, info};

/// Input-only provider writing the decoded request body into the input directory.
#[derive(Debug, Default)]
pub struct RequestBodyProvider;

#[async_trait]
impl StorageProvider for RequestBodyProvider {
    fn storage_type(&self) -> SourceType {
        SourceType::Http
    }

    fn storage_id(&self) -> &str {
        SourceType::Http.as_str()
    }

    async fn download_file(&self, event: &ParsedEvent, input_dir: &Path) -> Option<PathBuf> {
        let Some(body) = event.body.as_deref() else {
            error!("http event carries no body");
            return None;
        };
        match stage_bytes(input_dir, &event.file_name, body) {
            Ok(path) => {
                info!(path = %path.display(), bytes = body.len(), "staged request body");
                Some(path)
            }
            Err(err) => {
                error!(error = ?err, "failed to stage request body");
                None
            }
        }
    }

    async fn upload_file(&self, _local_path: &Path, remote_name: &str) -> UploadOutcome {
        error!(remote_name, "http requests cannot receive output");
        UploadOutcome::Failed {
            reason: "http provider does not accept uploads".to_string(),
        }
    }
}
