//! Entry points: embedded invocation, logging setup and standalone input handling.

use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;

use faas_supervisor_config::SupervisorConfig;
use faas_supervisor_core::{InvocationContext, ProviderFactory, SupervisorError, SupervisorResponse};
use faas_supervisor_storage::StandardProviderFactory;
use faas_supervisor_telemetry::{LoggingConfig, init_logging};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, error};

use crate::error::{AppError, AppResult};
use crate::orchestrator::Supervisor;

/// Load configuration from the process environment, initialise logging and run one
/// invocation with the standard storage providers.
///
/// Always yields a response: configuration errors become a generic error response.
pub async fn start_supervisor(
    payload: &str,
    context: Option<InvocationContext>,
) -> SupervisorResponse {
    let loaded = SupervisorConfig::from_env();
    let logging = loaded.as_ref().map_or_else(
        |_| LoggingConfig::default(),
        |config| LoggingConfig::from_options(&config.log_level, config.log_format.as_deref()),
    );
    if let Err(err) = init_telemetry(&logging) {
        debug!(error = %err, "logging already initialised");
    }

    match loaded {
        Ok(config) => {
            run_supervisor(
                config,
                Arc::new(StandardProviderFactory::new()),
                payload,
                context,
            )
            .await
        }
        Err(err) => {
            let err = SupervisorError::from(err);
            error!(kind = err.kind(), error = %err.detail(), "configuration rejected");
            SupervisorResponse::fallback_error(err.detail())
        }
    }
}

/// Run one invocation from the inputs gathered by the standalone process.
///
/// A context or payload that could not be obtained still yields an error response.
pub async fn start_standalone(
    context: AppResult<Option<InvocationContext>>,
    payload: AppResult<String>,
) -> SupervisorResponse {
    match (context, payload) {
        (Ok(context), Ok(payload)) => start_supervisor(&payload, context).await,
        (Err(err), _) | (_, Err(err)) => {
            if let Err(init_err) = init_telemetry(&LoggingConfig::default()) {
                debug!(error = %init_err, "logging already initialised");
            }
            let detail = err.detail();
            error!(error = %detail, "invocation input rejected");
            SupervisorResponse::fallback_error(detail)
        }
    }
}

/// Run one invocation with explicit configuration and provider factory.
///
/// An empty `payload` falls back to the configured `EVENT` value.
pub async fn run_supervisor(
    config: SupervisorConfig,
    factory: Arc<dyn ProviderFactory>,
    payload: &str,
    context: Option<InvocationContext>,
) -> SupervisorResponse {
    let payload = if payload.trim().is_empty() {
        config.event.clone().unwrap_or_default()
    } else {
        payload.to_string()
    };
    Supervisor::new(config, factory).run(&payload, context).await
}

/// Install the global tracing subscriber.
///
/// # Errors
///
/// Returns an error when a subscriber is already installed.
pub fn init_telemetry(logging: &LoggingConfig<'_>) -> AppResult<()> {
    init_logging(logging).map_err(|err| AppError::telemetry("init_logging", err))
}

/// Parse an invocation context document.
///
/// # Errors
///
/// Returns an error when `raw` is not a JSON object with the expected fields.
pub fn parse_context(raw: &str, origin: &str) -> AppResult<InvocationContext> {
    serde_json::from_str(raw).map_err(|source| AppError::InvalidContext {
        origin: origin.to_string(),
        source,
    })
}

/// Resolve the invocation context from an inline argument or a file; inline wins.
///
/// # Errors
///
/// Returns an error when the file cannot be read or either document is malformed.
pub async fn load_context(
    inline: Option<&str>,
    file: Option<&Path>,
) -> AppResult<Option<InvocationContext>> {
    if let Some(raw) = inline {
        return parse_context(raw, "argument").map(Some);
    }
    let Some(path) = file else {
        return Ok(None);
    };
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| AppError::io("read_context_file", Some(path.to_path_buf()), source))?;
    parse_context(&raw, &path.display().to_string()).map(Some)
}

/// Read the whole trigger payload from `reader`.
///
/// Bytes that are not UTF-8 are replaced rather than rejected.
///
/// # Errors
///
/// Returns an error when reading fails.
pub async fn read_payload<R>(mut reader: R) -> AppResult<String>
where
    R: AsyncRead + Unpin,
{
    let mut raw = Vec::new();
    reader
        .read_to_end(&mut raw)
        .await
        .map_err(|source| AppError::io("read_payload", None, source))?;
    Ok(String::from_utf8_lossy(&raw).into_owned())
}

/// Read the trigger payload from standard input unless it is an interactive terminal.
///
/// # Errors
///
/// Returns an error when reading standard input fails.
pub async fn read_stdin_payload() -> AppResult<String> {
    if std::io::stdin().is_terminal() {
        return Ok(String::new());
    }
    read_payload(tokio::io::stdin()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn context_documents_parse_into_optional_fields() -> Result<()> {
        let context = parse_context(r#"{"aws_request_id": "abc"}"#, "argument")?;
        assert_eq!(context.request_id(), "abc");
        assert_eq!(context.log_group(), "unknown");
        assert!(matches!(
            parse_context("not json", "argument"),
            Err(AppError::InvalidContext { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn inline_context_wins_over_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("context.json");
        std::fs::write(&path, r#"{"aws_request_id": "from-file"}"#)?;

        let inline = load_context(
            Some(r#"{"aws_request_id": "inline"}"#),
            Some(path.as_path()),
        )
        .await?;
        assert_eq!(inline.map(|ctx| ctx.request_id().to_string()), Some("inline".into()));

        let from_file = load_context(None, Some(path.as_path())).await?;
        assert_eq!(
            from_file.map(|ctx| ctx.request_id().to_string()),
            Some("from-file".into())
        );
        assert!(load_context(None, None).await?.is_none());
        assert!(matches!(
            load_context(None, Some(dir.path().join("missing.json").as_path())).await,
            Err(AppError::Io { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn payload_is_read_whole() -> Result<()> {
        let payload = read_payload(&b"{\"Records\": []}\n"[..]).await?;
        assert_eq!(payload, "{\"Records\": []}\n");
        Ok(())
    }

    #[tokio::test]
    async fn binary_payload_is_read_lossily() -> Result<()> {
        let payload = read_payload(&[0x89, b'P', b'N', b'G', 0xff, 0xfe][..]).await?;
        assert!(payload.contains("PNG"), "{payload}");
        assert!(payload.contains(char::REPLACEMENT_CHARACTER));
        Ok(())
    }

    #[tokio::test]
    async fn rejected_context_still_yields_error_response() {
        let context = load_context(Some("{not json"), None).await;
        assert!(context.is_err());

        let response = start_standalone(context, Ok(String::new())).await;

        assert!(response.is_error());
        match response {
            SupervisorResponse::Http(response) => {
                assert_eq!(response.status_code, 500);
                assert!(
                    response.body.starts_with("invalid invocation context: argument"),
                    "{}",
                    response.body
                );
            }
            SupervisorResponse::Informational(other) => panic!("unexpected response {other:?}"),
        }
    }
}
