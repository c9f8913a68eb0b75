//! Synchronous request/response adapter.

use std::collections::BTreeMap;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use faas_supervisor_config::SupervisorType;
use faas_supervisor_core::{
    ExecutionAdapter, HttpResponse, InvocationContext, InvocationState, SupervisorError,
    SupervisorResponse, SupervisorResult,
};
use tracing::info;

use crate::runner::ScriptRunner;

const REQUEST_ID_HEADER: &str = "amz-lambda-request-id";
const LOG_GROUP_HEADER: &str = "amz-log-group-name";
const LOG_STREAM_HEADER: &str = "amz-log-stream-name";

/// Adapter for the synchronous request/response backend.
///
/// Bodies are base64 encoded; the error body wraps the message as `{"exception": ...}`.
#[derive(Debug)]
pub struct LambdaAdapter {
    context: InvocationContext,
    runner: ScriptRunner,
    output: Vec<u8>,
}

impl LambdaAdapter {
    /// Build the adapter; a missing context yields `unknown` header values.
    #[must_use]
    pub fn new(context: Option<InvocationContext>, runner: ScriptRunner) -> Self {
        let context = context.unwrap_or_else(|| {
            info!("no invocation context supplied");
            InvocationContext::default()
        });
        info!(
            request_id = context.request_id(),
            function = context.function_name.as_deref().unwrap_or_default(),
            "initialising lambda supervisor"
        );
        Self {
            context,
            runner,
            output: Vec::new(),
        }
    }

    fn response(&self, status_code: u16, body: String) -> SupervisorResponse {
        let headers = BTreeMap::from([
            (REQUEST_ID_HEADER.to_string(), self.context.request_id().to_string()),
            (LOG_GROUP_HEADER.to_string(), self.context.log_group().to_string()),
            (LOG_STREAM_HEADER.to_string(), self.context.log_stream().to_string()),
        ]);
        SupervisorResponse::Http(HttpResponse {
            status_code,
            headers,
            body,
            is_base64_encoded: true,
        })
    }
}

#[async_trait]
impl ExecutionAdapter for LambdaAdapter {
    fn supervisor_type(&self) -> SupervisorType {
        SupervisorType::Lambda
    }

    async fn execute_function(&mut self, state: &InvocationState) -> SupervisorResult<()> {
        self.output = self.runner.run(state).await?;
        Ok(())
    }

    fn create_response(&self) -> SupervisorResponse {
        self.response(200, general_purpose::STANDARD.encode(&self.output))
    }

    fn create_error_response(&self, error: &SupervisorError) -> SupervisorResponse {
        let detail = error.detail();
        let body = serde_json::json!({ "exception": detail }).to_string();
        self.response(500, general_purpose::STANDARD.encode(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use faas_supervisor_config::ScriptSource;

    fn http(response: SupervisorResponse) -> Result<HttpResponse> {
        match response {
            SupervisorResponse::Http(response) => Ok(response),
            SupervisorResponse::Informational(_) => Err(anyhow::anyhow!("expected http response")),
        }
    }

    #[tokio::test]
    async fn success_response_carries_base64_output_and_context() -> Result<()> {
        let root = tempfile::tempdir()?;
        let state = InvocationState {
            input_dir: root.path().to_path_buf(),
            output_dir: root.path().to_path_buf(),
            input_file_path: None,
            event: String::new(),
        };
        let context = InvocationContext {
            aws_request_id: Some("req-42".to_string()),
            log_group_name: Some("/aws/lambda/fn".to_string()),
            log_stream_name: Some("stream".to_string()),
            function_name: Some("fn".to_string()),
        };
        let mut adapter = LambdaAdapter::new(
            Some(context),
            ScriptRunner::new(Some(ScriptSource::Inline("printf done".to_string())), None),
        );

        adapter.execute_function(&state).await?;
        let response = http(adapter.create_response())?;

        assert_eq!(response.status_code, 200);
        assert!(response.is_base64_encoded);
        assert_eq!(general_purpose::STANDARD.decode(&response.body)?, b"done");
        assert_eq!(response.headers[REQUEST_ID_HEADER], "req-42");
        assert_eq!(response.headers[LOG_GROUP_HEADER], "/aws/lambda/fn");
        assert_eq!(response.headers[LOG_STREAM_HEADER], "stream");
        Ok(())
    }

    #[test]
    fn error_response_wraps_exception_message() -> Result<()> {
        let adapter = LambdaAdapter::new(None, ScriptRunner::default());
        let response = http(adapter.create_error_response(&SupervisorError::FunctionExecution {
            exit_code: Some(1),
            output: "bad input".to_string(),
        }))?;

        assert_eq!(response.status_code, 500);
        assert_eq!(response.headers[REQUEST_ID_HEADER], "unknown");
        let body: serde_json::Value =
            serde_json::from_slice(&general_purpose::STANDARD.decode(&response.body)?)?;
        assert_eq!(
            body["exception"],
            "function execution failed with exit code 1: bad input"
        );
        Ok(())
    }
}
