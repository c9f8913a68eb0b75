//! Span helpers for a single supervisor invocation.

use tracing::Span;

use crate::init::build_sha;

/// Root span for one invocation.
///
/// Attach it with `tracing::Instrument` so every event logged while the
/// invocation runs carries the supervisor type, request identifier and build SHA.
#[must_use]
pub fn invocation_span(supervisor_type: &str, request_id: &str) -> Span {
    tracing::info_span!(
        "invocation",
        supervisor_type = %supervisor_type,
        request_id = %request_id,
        build_sha = %build_sha(),
        event_source = tracing::field::Empty,
    )
}

/// Record the resolved event source on the current invocation span.
pub fn record_event_source(source: &str) {
    Span::current().record("event_source", tracing::field::display(source));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_can_be_entered_and_recorded() {
        let span = invocation_span("LAMBDA", "req-1");
        let _entered = span.enter();
        record_event_source("MINIO");
        tracing::info!("inside invocation");
    }
}
