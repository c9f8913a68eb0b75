//! Invocation lifecycle: workspace, input staging, execution, output staging, response.
//!
//! # Design
//! - The execution adapter is built before anything touches storage or the filesystem, so an
//!   unknown `SUPERVISOR_TYPE` fails without side effects.
//! - For batch jobs the configured phase gates each stage: INIT stages input, RUN executes,
//!   END stages output. Every other backend runs all three.
//! - Transfer failures are values and only logged. Fatal errors from any stage become the
//!   adapter's error response.
//! - A failing output target does not stop the remaining targets; its error is reported once
//!   every target has been attempted.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use faas_supervisor_config::{ExecutionPhase, SupervisorConfig};
use faas_supervisor_core::{
    ExecutionAdapter, InvocationContext, InvocationState, ProviderFactory, SupervisorError,
    SupervisorResponse, SupervisorResult, UNKNOWN_CONTEXT_VALUE, UploadOutcome,
};
use faas_supervisor_events::{ParsedEvent, classify};
use faas_supervisor_faas::build_adapter;
use faas_supervisor_fsops::{OutputFile, TempWorkspace, collect_output_files};
use faas_supervisor_telemetry::{invocation_span, record_event_source};
use tracing::{Instrument, debug, error, info, warn};

const UNCONFIGURED_STORAGE_FIELD: &str = "STORAGE_AUTH";

/// Drives one invocation from trigger payload to response.
pub struct Supervisor {
    config: SupervisorConfig,
    factory: Arc<dyn ProviderFactory>,
}

impl Supervisor {
    /// Build a supervisor over an explicit configuration and provider factory.
    #[must_use]
    pub fn new(config: SupervisorConfig, factory: Arc<dyn ProviderFactory>) -> Self {
        Self { config, factory }
    }

    /// Run the full lifecycle for `payload`.
    ///
    /// Never fails: every fatal error is logged and turned into an error response.
    pub async fn run(
        &self,
        payload: &str,
        context: Option<InvocationContext>,
    ) -> SupervisorResponse {
        let span = invocation_span(
            &self.config.supervisor_type,
            context
                .as_ref()
                .map_or(UNKNOWN_CONTEXT_VALUE, InvocationContext::request_id),
        );
        self.run_inner(payload, context).instrument(span).await
    }

    async fn run_inner(
        &self,
        payload: &str,
        context: Option<InvocationContext>,
    ) -> SupervisorResponse {
        let mut adapter = match build_adapter(&self.config, context) {
            Ok(adapter) => adapter,
            Err(err) => {
                error!(
                    kind = err.kind(),
                    error = %err.detail(),
                    "supervisor initialisation failed"
                );
                return SupervisorResponse::fallback_error(err.detail());
            }
        };

        match self.orchestrate(adapter.as_mut(), payload).await {
            Ok(()) => {
                info!("invocation complete");
                adapter.create_response()
            }
            Err(err) => {
                error!(kind = err.kind(), error = %err.detail(), "invocation failed");
                adapter.create_error_response(&err)
            }
        }
    }

    async fn orchestrate(
        &self,
        adapter: &mut dyn ExecutionAdapter,
        payload: &str,
    ) -> SupervisorResult<()> {
        let phase = self.config.phase();
        let workspace = self.open_workspace(phase)?;
        let result = self
            .run_stages(adapter, &workspace, payload, phase)
            .await;
        workspace.close();
        result
    }

    fn open_workspace(&self, phase: Option<ExecutionPhase>) -> SupervisorResult<TempWorkspace> {
        let Some(phase) = phase else {
            return TempWorkspace::ephemeral().map_err(|err| SupervisorError::Workspace {
                operation: "create_ephemeral_workspace",
                source: Box::new(err),
            });
        };
        let (Some(input_dir), Some(output_dir)) =
            (&self.config.tmp_input_dir, &self.config.tmp_output_dir)
        else {
            return Err(SupervisorError::Workspace {
                operation: "locate_batch_workspace",
                source: "TMP_INPUT_DIR and TMP_OUTPUT_DIR are required for batch jobs".into(),
            });
        };
        TempWorkspace::persistent(input_dir, output_dir, phase == ExecutionPhase::Init).map_err(
            |err| SupervisorError::Workspace {
                operation: "open_batch_workspace",
                source: Box::new(err),
            },
        )
    }

    async fn run_stages(
        &self,
        adapter: &mut dyn ExecutionAdapter,
        workspace: &TempWorkspace,
        payload: &str,
        phase: Option<ExecutionPhase>,
    ) -> SupervisorResult<()> {
        let event = classify(payload);
        record_event_source(event.source_type.as_str());
        debug!(
            source = event.source_type.as_str(),
            object_key = %event.object_key,
            "classified trigger event"
        );

        let mut state = InvocationState {
            input_dir: workspace.input_dir().to_path_buf(),
            output_dir: workspace.output_dir().to_path_buf(),
            input_file_path: phase.and(self.config.input_file_path.clone()),
            event: payload.to_string(),
        };

        if enters(phase, ExecutionPhase::Init) {
            adapter.parse_input(&state).await?;
            if let Some(path) = self.stage_input(&event, &state.input_dir).await? {
                state.input_file_path = Some(path);
            }
        }
        if enters(phase, ExecutionPhase::Run) {
            adapter.execute_function(&state).await?;
        }
        if enters(phase, ExecutionPhase::End) {
            self.stage_output(&state.output_dir).await?;
        }
        Ok(())
    }

    async fn stage_input(
        &self,
        event: &ParsedEvent,
        input_dir: &Path,
    ) -> SupervisorResult<Option<PathBuf>> {
        if event.is_unknown() {
            info!("no storage event; skipping input staging");
            return Ok(None);
        }
        let Some(credentials) = self.config.storage_auth.by_source_type(event.source_type) else {
            warn!(
                source = event.source_type.as_str(),
                "no storage configured for event source; skipping input staging"
            );
            return Ok(None);
        };
        let provider = match self.factory.create(&credentials, event.source_type, None) {
            Ok(provider) => provider,
            Err(SupervisorError::UnsupportedProvider { storage_type }) => {
                warn!(
                    %storage_type,
                    "no provider registered for event source; skipping input staging"
                );
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        let staged = provider.download_file(event, input_dir).await;
        match &staged {
            Some(path) => info!(
                storage_id = provider.storage_id(),
                path = %path.display(),
                "input staged"
            ),
            None => warn!(
                storage_id = provider.storage_id(),
                object_key = %event.object_key,
                "input download failed; continuing without input file"
            ),
        }
        Ok(staged)
    }

    async fn stage_output(&self, output_dir: &Path) -> SupervisorResult<()> {
        let targets = &self.config.output_targets;
        if targets.is_empty() {
            debug!("no output targets configured");
            return Ok(());
        }
        let files = collect_output_files(output_dir).map_err(|err| SupervisorError::Workspace {
            operation: "collect_output_files",
            source: Box::new(err),
        })?;

        let mut first_error = None;
        for target in targets {
            if let Err(err) = self.upload_target(&target.storage_id, &target.path, &files).await {
                error!(
                    storage_id = %target.storage_id,
                    kind = err.kind(),
                    error = %err.detail(),
                    "output target unavailable"
                );
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    async fn upload_target(
        &self,
        storage_id: &str,
        output_path: &str,
        files: &[OutputFile],
    ) -> SupervisorResult<()> {
        let credentials = self.config.storage_auth.by_id(storage_id).ok_or_else(|| {
            SupervisorError::MissingCredential {
                storage_id: storage_id.to_string(),
                field: UNCONFIGURED_STORAGE_FIELD,
            }
        })?;
        let provider = self.factory.create_output(credentials, output_path)?;

        let mut uploaded = 0_usize;
        for file in files {
            match provider.upload_file(&file.path, &file.remote_name).await {
                UploadOutcome::Uploaded { location } => {
                    uploaded += 1;
                    debug!(%storage_id, %location, "output uploaded");
                }
                UploadOutcome::Failed { reason } => {
                    warn!(%storage_id, file = %file.remote_name, %reason, "output upload failed");
                }
            }
        }
        info!(
            %storage_id,
            path = output_path,
            uploaded,
            total = files.len(),
            "output staging finished"
        );
        Ok(())
    }
}

/// Whether a stage runs: always for non-batch, only in its own phase for batch.
fn enters(phase: Option<ExecutionPhase>, stage: ExecutionPhase) -> bool {
    phase.is_none_or(|phase| phase == stage)
}
