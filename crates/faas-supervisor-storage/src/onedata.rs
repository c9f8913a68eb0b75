//! Onedata provider speaking CDMI over HTTP.
//!
//! # Design
//! - Download: `GET {host}/cdmi{object_key}`; only `200 OK` counts as success.
//! - Upload: `PUT {host}/cdmi/{space}/{path}/{name}`; `201`, `202` and `204` count as success.
//! - Every request carries the access token in `X-Auth-Token`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use faas_supervisor_core::{StorageProvider, UploadOutcome};
use faas_supervisor_events::{ParsedEvent, SourceType};
use faas_supervisor_fsops::stage_bytes;
use reqwest::{Client, StatusCode};
use tracing::{error, info};

use crate::error::{TransferError, TransferResult};

const CDMI_PATH: &str = "cdmi";
const AUTH_HEADER: &str = "X-Auth-Token";
const UPLOAD_SUCCESS: [StatusCode; 3] = [
    StatusCode::CREATED,
    StatusCode::ACCEPTED,
    StatusCode::NO_CONTENT,
];

/// Connection settings for one Onedata space.
#[derive(Clone)]
pub struct OnedataSettings {
    /// Oneprovider host, with or without scheme.
    pub host: String,
    /// Access token.
    pub token: String,
    /// Space name.
    pub space: String,
}

/// Storage provider for a Onedata space.
pub struct OnedataProvider {
    storage_id: String,
    client: Client,
    base_url: String,
    token: String,
    space: String,
    output_path: Option<String>,
}

impl OnedataProvider {
    /// Build a provider; performs no network I/O.
    #[must_use]
    pub fn new(
        storage_id: impl Into<String>,
        client: Client,
        settings: OnedataSettings,
        output_path: Option<&str>,
    ) -> Self {
        Self {
            storage_id: storage_id.into(),
            client,
            base_url: base_url(&settings.host),
            token: settings.token,
            space: settings.space.trim_matches('/').to_string(),
            output_path: output_path
                .map(|path| path.trim_matches('/').to_string())
                .filter(|path| !path.is_empty()),
        }
    }

    fn download_url(&self, object_key: &str) -> String {
        if object_key.starts_with('/') {
            format!("{}/{CDMI_PATH}{object_key}", self.base_url)
        } else {
            format!("{}/{CDMI_PATH}/{object_key}", self.base_url)
        }
    }

    fn upload_url(&self, remote_name: &str) -> String {
        match &self.output_path {
            Some(path) => format!(
                "{}/{CDMI_PATH}/{}/{path}/{remote_name}",
                self.base_url, self.space
            ),
            None => format!("{}/{CDMI_PATH}/{}/{remote_name}", self.base_url, self.space),
        }
    }

    async fn fetch(&self, event: &ParsedEvent, input_dir: &Path) -> TransferResult<PathBuf> {
        let url = self.download_url(&event.object_key);
        let response = self
            .client
            .get(&url)
            .header(AUTH_HEADER, &self.token)
            .send()
            .await
            .map_err(|source| TransferError::request(&url, source))?;
        if response.status() != StatusCode::OK {
            return Err(TransferError::Status {
                url,
                status: response.status().as_u16(),
            });
        }
        let body = response
            .bytes()
            .await
            .map_err(|source| TransferError::request(&url, source))?;
        Ok(stage_bytes(input_dir, &event.file_name, &body)?)
    }

    async fn push(&self, local_path: &Path, remote_name: &str) -> TransferResult<String> {
        let url = self.upload_url(remote_name);
        let body = tokio::fs::read(local_path)
            .await
            .map_err(|source| TransferError::Read {
                path: local_path.to_path_buf(),
                source,
            })?;
        let response = self
            .client
            .put(&url)
            .header(AUTH_HEADER, &self.token)
            .body(body)
            .send()
            .await
            .map_err(|source| TransferError::request(&url, source))?;
        if !UPLOAD_SUCCESS.contains(&response.status()) {
            return Err(TransferError::Status {
                url,
                status: response.status().as_u16(),
            });
        }
        Ok(url)
    }
}

#[async_trait]
impl StorageProvider for OnedataProvider {
    fn storage_type(&self) -> SourceType {
        SourceType::Onedata
    }

    fn storage_id(&self) -> &str {
        &self.storage_id
    }

    async fn download_file(&self, event: &ParsedEvent, input_dir: &Path) -> Option<PathBuf> {
        info!(
            host = %self.base_url,
            object_key = %event.object_key,
            "downloading from onedata"
        );
        match self.fetch(event, input_dir).await {
            Ok(path) => {
                info!(
                    file_name = %event.file_name,
                    path = %path.display(),
                    "onedata download complete"
                );
                Some(path)
            }
            Err(err) => {
                error!(
                    file_name = %event.file_name,
                    host = %self.base_url,
                    error = %err.describe(),
                    "onedata download failed"
                );
                None
            }
        }
    }

    async fn upload_file(&self, local_path: &Path, remote_name: &str) -> UploadOutcome {
        info!(
            remote_name,
            space = %self.space,
            path = self.output_path.as_deref().unwrap_or_default(),
            "uploading to onedata"
        );
        match self.push(local_path, remote_name).await {
            Ok(location) => UploadOutcome::Uploaded { location },
            Err(err) => {
                let reason = err.describe();
                error!(remote_name, error = %reason, "onedata upload failed");
                UploadOutcome::Failed { reason }
            }
        }
    }
}

fn base_url(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use httpmock::MockServer;
    use httpmock::prelude::*;

    fn provider(server: &MockServer, output_path: Option<&str>) -> OnedataProvider {
        OnedataProvider::new(
            "ONE",
            Client::new(),
            OnedataSettings {
                host: server.base_url(),
                token: "secret-token".to_string(),
                space: "my-space".to_string(),
            },
            output_path,
        )
    }

    fn event() -> ParsedEvent {
        ParsedEvent {
            source_type: SourceType::Onedata,
            object_key: "/my-space/files/input.dat".to_string(),
            file_name: "input.dat".to_string(),
            bucket: None,
            body: None,
        }
    }

    #[test]
    fn hosts_without_scheme_use_https() {
        assert_eq!(base_url("provider.example.org"), "https://provider.example.org");
        assert_eq!(base_url("http://127.0.0.1:9000/"), "http://127.0.0.1:9000");
    }

    #[tokio::test]
    async fn download_writes_body_on_success() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/cdmi/my-space/files/input.dat")
                .header("X-Auth-Token", "secret-token");
            then.status(200).body("input bytes");
        });
        let dir = tempfile::tempdir()?;

        let path = provider(&server, None)
            .download_file(&event(), dir.path())
            .await
            .ok_or_else(|| anyhow::anyhow!("download should succeed"))?;

        mock.assert();
        assert_eq!(path, dir.path().join("input.dat"));
        assert_eq!(std::fs::read(&path)?, b"input bytes");
        Ok(())
    }

    #[tokio::test]
    async fn download_is_soft_on_not_found() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET).path("/cdmi/my-space/files/input.dat");
            then.status(404);
        });
        let dir = tempfile::tempdir()?;

        let result = provider(&server, None)
            .download_file(&event(), dir.path())
            .await;

        mock.assert();
        assert!(result.is_none());
        assert!(!dir.path().join("input.dat").exists());
        Ok(())
    }

    #[tokio::test]
    async fn upload_targets_space_and_path() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(PUT)
                .path("/cdmi/my-space/results/run-1/out.txt")
                .header("X-Auth-Token", "secret-token")
                .body("output");
            then.status(201);
        });
        let dir = tempfile::tempdir()?;
        let local = dir.path().join("out.txt");
        std::fs::write(&local, "output")?;

        let outcome = provider(&server, Some("/results/run-1/"))
            .upload_file(&local, "out.txt")
            .await;

        mock.assert();
        assert!(outcome.is_uploaded());
        Ok(())
    }

    #[tokio::test]
    async fn upload_rejections_are_reported_not_raised() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(PUT).path("/cdmi/my-space/out/out.txt");
            then.status(403);
        });
        let dir = tempfile::tempdir()?;
        let local = dir.path().join("out.txt");
        std::fs::write(&local, "output")?;

        let outcome = provider(&server, Some("out"))
            .upload_file(&local, "out.txt")
            .await;

        mock.assert();
        assert!(matches!(
            outcome,
            UploadOutcome::Failed { ref reason } if reason.contains("403")
        ));
        Ok(())
    }
}
