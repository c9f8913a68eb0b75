//! Phase-aware batch adapter. Responses are informational only; there is no caller
//! waiting on them.

use async_trait::async_trait;
use faas_supervisor_config::{ExecutionPhase, SupervisorType};
use faas_supervisor_core::{
    ExecutionAdapter, InformationalResponse, InvocationState, SupervisorError, SupervisorResponse,
    SupervisorResult,
};
use tracing::info;

use crate::runner::ScriptRunner;

/// Adapter for the batch-job backend.
#[derive(Debug)]
pub struct BatchAdapter {
    phase: ExecutionPhase,
    runner: ScriptRunner,
}

impl BatchAdapter {
    /// Build the adapter for one phase of a batch job.
    #[must_use]
    pub fn new(phase: ExecutionPhase, runner: ScriptRunner) -> Self {
        info!(%phase, "initialising batch supervisor");
        Self { phase, runner }
    }
}

#[async_trait]
impl ExecutionAdapter for BatchAdapter {
    fn supervisor_type(&self) -> SupervisorType {
        SupervisorType::Batch
    }

    /// Stage the user script so the RUN phase finds it in the input directory.
    async fn parse_input(&mut self, state: &InvocationState) -> SupervisorResult<()> {
        self.runner.materialise(&state.input_dir)?;
        Ok(())
    }

    async fn execute_function(&mut self, state: &InvocationState) -> SupervisorResult<()> {
        let output = self.runner.run(state).await?;
        info!(output = %String::from_utf8_lossy(&output), "batch function output");
        Ok(())
    }

    fn create_response(&self) -> SupervisorResponse {
        let message = format!("batch phase {} complete", self.phase);
        info!(%message);
        SupervisorResponse::Informational(InformationalResponse {
            success: true,
            message,
        })
    }

    fn create_error_response(&self, error: &SupervisorError) -> SupervisorResponse {
        let message = format!("batch phase {} failed: {}", self.phase, error.detail());
        SupervisorResponse::Informational(InformationalResponse {
            success: false,
            message,
        })
    }
}
