//! Adapter for the HTTP-triggered open-source FaaS backend.

use std::collections::BTreeMap;

use async_trait::async_trait;
use faas_supervisor_config::SupervisorType;
use faas_supervisor_core::{
    ExecutionAdapter, HttpResponse, InvocationState, SupervisorError, SupervisorResponse,
    SupervisorResult,
};
use tracing::info;

use crate::runner::ScriptRunner;

/// Adapter returning the function output as a plain-text HTTP body.
#[derive(Debug)]
pub struct OpenFaasAdapter {
    runner: ScriptRunner,
    output: String,
}

impl OpenFaasAdapter {
    /// Build the adapter.
    #[must_use]
    pub fn new(runner: ScriptRunner) -> Self {
        info!("initialising openfaas supervisor");
        Self {
            runner,
            output: String::new(),
        }
    }

    const fn response(status_code: u16, body: String) -> SupervisorResponse {
        SupervisorResponse::Http(HttpResponse {
            status_code,
            headers: BTreeMap::new(),
            body,
            is_base64_encoded: false,
        })
    }
}

#[async_trait]
impl ExecutionAdapter for OpenFaasAdapter {
    fn supervisor_type(&self) -> SupervisorType {
        SupervisorType::OpenFaas
    }

    async fn execute_function(&mut self, state: &InvocationState) -> SupervisorResult<()> {
        let output = self.runner.run(state).await?;
        self.output = String::from_utf8_lossy(&output).into_owned();
        Ok(())
    }

    fn create_response(&self) -> SupervisorResponse {
        Self::response(200, self.output.clone())
    }

    fn create_error_response(&self, error: &SupervisorError) -> SupervisorResponse {
        let detail = error.detail();
        Self::response(500, detail)
    }
}
