//! Reusable todo instance precondition.
//!
//! Every List/Item operation runs this guard as its first side-effecting
//! step, right after dtoIn validation and before any other store access.

use crate::model::instance::{InstanceState, TodoInstance};
use crate::repo::main_repo::TodosMainRepository;
use crate::service::errors::{FailureReason, UseCase, WorkflowError};
use log::warn;

/// The only instance state under which workflows may run.
pub const REQUIRED_INSTANCE_STATE: InstanceState = InstanceState::Active;

/// Resolves the tenant's todo instance and asserts it exists and is active.
///
/// Callers use the returned record only to confirm the guard passed; no
/// downstream logic reads further fields.
pub fn ensure_active_todo_instance<M: TodosMainRepository>(
    main_repo: &M,
    use_case: UseCase,
    awid: &str,
) -> Result<TodoInstance, WorkflowError> {
    let instance = main_repo
        .get_by_awid(awid)
        .map_err(|err| WorkflowError::new(use_case, FailureReason::Repo(err)))?;

    let Some(instance) = instance else {
        warn!(
            "event=instance_guard module=service status=denied use_case={} awid={awid} reason=todoInstanceDoesNotExist",
            use_case.name()
        );
        return Err(WorkflowError::new(
            use_case,
            FailureReason::TodoInstanceDoesNotExist {
                awid: awid.to_string(),
            },
        ));
    };

    if !instance.is_active() {
        warn!(
            "event=instance_guard module=service status=denied use_case={} awid={awid} reason=todoInstanceIsNotInProperState current={}",
            use_case.name(),
            instance.state.as_str()
        );
        return Err(WorkflowError::new(
            use_case,
            FailureReason::TodoInstanceIsNotInProperState {
                awid: awid.to_string(),
                expected: REQUIRED_INSTANCE_STATE,
                current: instance.state,
            },
        ));
    }

    Ok(instance)
}
