//! Adapter selection from the configured supervisor type.

use faas_supervisor_config::{ExecutionPhase, SupervisorConfig, SupervisorType};
use faas_supervisor_core::{ExecutionAdapter, InvocationContext, SupervisorError, SupervisorResult};

use crate::batch::BatchAdapter;
use crate::lambda::LambdaAdapter;
use crate::openfaas::OpenFaasAdapter;
use crate::runner::ScriptRunner;

/// Construct the adapter variant for `supervisor_type`.
#[must_use]
pub fn select_adapter(
    supervisor_type: SupervisorType,
    runner: ScriptRunner,
    context: Option<InvocationContext>,
    phase: ExecutionPhase,
) -> Box<dyn ExecutionAdapter> {
    match supervisor_type {
        SupervisorType::Lambda => Box::new(LambdaAdapter::new(context, runner)),
        SupervisorType::Batch => Box::new(BatchAdapter::new(phase, runner)),
        SupervisorType::OpenFaas => Box::new(OpenFaasAdapter::new(runner)),
    }
}

/// Parse `SUPERVISOR_TYPE` and construct the matching adapter.
///
/// # Errors
///
/// Returns [`SupervisorError::InvalidSupervisorType`] for unknown values.
pub fn build_adapter(
    config: &SupervisorConfig,
    context: Option<InvocationContext>,
) -> SupervisorResult<Box<dyn ExecutionAdapter>> {
    let supervisor_type = SupervisorType::parse(&config.supervisor_type).ok_or_else(|| {
        SupervisorError::InvalidSupervisorType {
            value: config.supervisor_type.clone(),
        }
    })?;
    Ok(select_adapter(
        supervisor_type,
        ScriptRunner::from_config(config),
        context,
        config.step,
    ))
}
