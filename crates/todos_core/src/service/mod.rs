//! Workflow services over the repository layer.
//!
//! # Responsibility
//! - Compose every operation as validate -> instance guard ->
//!   operation-specific preconditions -> store call -> dto shaping.
//! - Keep collaborator wiring explicit: each service receives its validator
//!   and repositories at construction time.
//!
//! # Invariants
//! - No operation touches the store before validation passes.
//! - Warnings never abort an operation; they ride along in the dto.

use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::model::item::ItemState;
use crate::model::JsonMap;
use crate::repo::item_repo::PageInfo;
use crate::validation::{ValidationResult, Violation, Warning};

pub mod errors;
pub mod instance_guard;
pub mod item_service;
pub mod list_service;

pub use errors::{FailureReason, UseCase, WorkflowError};

/// Converts a validation outcome into the workflow contract: structural
/// violations become a fatal `invalidDtoIn` error, unsupported keys become
/// one non-fatal warning carried alongside the eventual result.
pub fn process_validation_result(
    use_case: UseCase,
    result: ValidationResult,
) -> Result<Vec<Warning>, WorkflowError> {
    if !result.is_valid() {
        return Err(WorkflowError::new(
            use_case,
            FailureReason::InvalidDtoIn {
                violations: result.violations,
            },
        ));
    }

    let mut warnings = Vec::new();
    if !result.unsupported_keys.is_empty() {
        warnings.push(Warning {
            code: format!("{}unsupportedKeys", use_case.code_prefix()),
            message: "DtoIn contains unsupported keys.".to_string(),
            unsupported_keys: result.unsupported_keys,
        });
    }
    Ok(warnings)
}

/// Wall-clock now in epoch milliseconds.
pub(crate) fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

// Typed payload accessors. Validation has already vetted the shapes, but
// extraction stays total so a schema drift cannot panic.

pub(crate) fn required_id(
    use_case: UseCase,
    payload: &JsonMap,
    key: &str,
) -> Result<Uuid, WorkflowError> {
    optional_id(payload, key).ok_or_else(|| {
        WorkflowError::new(
            use_case,
            FailureReason::InvalidDtoIn {
                violations: vec![Violation {
                    field: key.to_string(),
                    detail: "required id is missing or malformed".to_string(),
                }],
            },
        )
    })
}

pub(crate) fn optional_id(payload: &JsonMap, key: &str) -> Option<Uuid> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .and_then(|text| Uuid::parse_str(text).ok())
}

pub(crate) fn required_text(
    use_case: UseCase,
    payload: &JsonMap,
    key: &str,
) -> Result<String, WorkflowError> {
    optional_text(payload, key).ok_or_else(|| {
        WorkflowError::new(
            use_case,
            FailureReason::InvalidDtoIn {
                violations: vec![Violation {
                    field: key.to_string(),
                    detail: "required text is missing".to_string(),
                }],
            },
        )
    })
}

pub(crate) fn optional_text(payload: &JsonMap, key: &str) -> Option<String> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
}

pub(crate) fn optional_epoch_millis(payload: &JsonMap, key: &str) -> Option<i64> {
    payload.get(key).and_then(Value::as_i64)
}

pub(crate) fn optional_item_state(payload: &JsonMap, key: &str) -> Option<ItemState> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .and_then(ItemState::parse)
}

/// Reads `pageInfo`, defaulting both fields when absent. Validation has
/// already rejected values outside `u32` range, so the fallbacks only fire
/// for payloads that bypassed it.
pub(crate) fn page_info_from(payload: &JsonMap) -> PageInfo {
    let defaults = PageInfo::default();
    let Some(object) = payload.get("pageInfo").and_then(Value::as_object) else {
        return defaults;
    };

    PageInfo {
        page_index: object
            .get("pageIndex")
            .and_then(Value::as_i64)
            .and_then(|index| u32::try_from(index).ok())
            .unwrap_or(defaults.page_index),
        page_size: object
            .get("pageSize")
            .and_then(Value::as_i64)
            .and_then(|size| u32::try_from(size).ok())
            .unwrap_or(defaults.page_size),
    }
}

/// Everything in the payload except the structural keys. Unsupported keys
/// are included on purpose: they were warned about, not rejected.
pub(crate) fn extra_data(payload: &JsonMap, structural: &[&str]) -> JsonMap {
    payload
        .iter()
        .filter(|(key, _)| !structural.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
