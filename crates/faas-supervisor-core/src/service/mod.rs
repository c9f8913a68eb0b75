//! Storage provider, provider factory and execution adapter traits.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use faas_supervisor_config::{StorageCredentials, SupervisorType};
use faas_supervisor_events::{ParsedEvent, SourceType};

use crate::error::{SupervisorError, SupervisorResult};
use crate::model::{InvocationState, SupervisorResponse, UploadOutcome};

/// Uniform download/upload contract implemented once per storage backend.
///
/// Transfers are best effort: remote failures are logged by the implementation and
/// reported as values, never as errors.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Storage type served by this provider.
    fn storage_type(&self) -> SourceType;

    /// Identifier of the configured storage system.
    fn storage_id(&self) -> &str;

    /// Fetch the object named by `event` into `input_dir` as `event.file_name`.
    ///
    /// Returns the local path on success and `None` on any remote failure.
    async fn download_file(&self, event: &ParsedEvent, input_dir: &Path) -> Option<PathBuf>;

    /// Push `local_path` to the configured destination under `remote_name`.
    async fn upload_file(&self, local_path: &Path, remote_name: &str) -> UploadOutcome;
}

/// Constructs storage providers from credentials.
///
/// Construction validates required credential fields and performs no I/O.
pub trait ProviderFactory: Send + Sync {
    /// Build the provider for `source_type`, optionally bound to an output path.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError::UnsupportedProvider`] when no implementation exists for
    /// `source_type` and [`SupervisorError::MissingCredential`] when a required field is
    /// absent.
    fn create(
        &self,
        credentials: &StorageCredentials,
        source_type: SourceType,
        output_path: Option<&str>,
    ) -> SupervisorResult<Box<dyn StorageProvider>>;

    /// Build an output provider from the storage type named by the credentials.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError::UnsupportedProvider`] when the configured label names no
    /// known storage type, plus every error of [`ProviderFactory::create`].
    fn create_output(
        &self,
        credentials: &StorageCredentials,
        output_path: &str,
    ) -> SupervisorResult<Box<dyn StorageProvider>> {
        let source_type =
            credentials
                .source_type()
                .ok_or_else(|| SupervisorError::UnsupportedProvider {
                    storage_type: credentials.storage_type().to_string(),
                })?;
        self.create(credentials, source_type, Some(output_path))
    }
}

/// Execution backend wrapping the user function.
#[async_trait]
pub trait ExecutionAdapter: Send + Sync {
    /// Backend implemented by this adapter.
    fn supervisor_type(&self) -> SupervisorType;

    /// Backend-specific input staging performed before the generic download.
    ///
    /// # Errors
    ///
    /// Returns an error when the extra staging step fails.
    async fn parse_input(&mut self, state: &InvocationState) -> SupervisorResult<()> {
        let _ = state;
        Ok(())
    }

    /// Run the user function.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError::FunctionExecution`] when the function fails and
    /// [`SupervisorError::Script`] when it cannot be started.
    async fn execute_function(&mut self, state: &InvocationState) -> SupervisorResult<()>;

    /// Success response for the invocation.
    fn create_response(&self) -> SupervisorResponse;

    /// Error response for the invocation; constructible in any adapter state.
    fn create_error_response(&self, error: &SupervisorError) -> SupervisorResponse;
}
