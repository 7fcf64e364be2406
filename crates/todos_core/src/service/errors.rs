//! Workflow error taxonomy with stable public codes.
//!
//! # Responsibility
//! - Identify every fatal workflow outcome by a
//!   `todos-main/<entity>/<operation>/<reason>` code.
//! - Carry structured context (ids, expected/actual states) for callers.
//!
//! # Invariants
//! - Codes are part of the public contract and never change spelling.
//! - Messages always include expected and actual state for state-mismatch
//!   failures.

use crate::model::instance::InstanceState;
use crate::model::item::{ItemId, ItemState};
use crate::model::list::ListId;
use crate::repo::RepoError;
use crate::validation::{SchemaName, Violation};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Identifies which workflow operation produced an error or warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UseCase {
    ListCreate,
    ListGet,
    ListUpdate,
    ItemCreate,
    ItemGet,
    ItemUpdate,
    ItemSetFinalState,
    ItemDelete,
    ItemList,
}

impl UseCase {
    /// Short camelCase operation name used in log lines.
    pub fn name(self) -> &'static str {
        match self {
            Self::ListCreate => "listCreate",
            Self::ListGet => "listGet",
            Self::ListUpdate => "listUpdate",
            Self::ItemCreate => "itemCreate",
            Self::ItemGet => "itemGet",
            Self::ItemUpdate => "itemUpdate",
            Self::ItemSetFinalState => "itemSetFinalState",
            Self::ItemDelete => "itemDelete",
            Self::ItemList => "itemList",
        }
    }

    /// Prefix of every error/warning code raised by this operation.
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::ListCreate => "todos-main/list/create/",
            Self::ListGet => "todos-main/list/get/",
            Self::ListUpdate => "todos-main/list/update/",
            Self::ItemCreate => "todos-main/item/create/",
            Self::ItemGet => "todos-main/item/get/",
            Self::ItemUpdate => "todos-main/item/update/",
            Self::ItemSetFinalState => "todos-main/item/setFinalState/",
            Self::ItemDelete => "todos-main/item/delete/",
            Self::ItemList => "todos-main/item/list/",
        }
    }

    /// The dtoIn schema validated by this operation.
    pub fn schema(self) -> SchemaName {
        match self {
            Self::ListCreate => SchemaName::ListCreate,
            Self::ListGet => SchemaName::ListGet,
            Self::ListUpdate => SchemaName::ListUpdate,
            Self::ItemCreate => SchemaName::ItemCreate,
            Self::ItemGet => SchemaName::ItemGet,
            Self::ItemUpdate => SchemaName::ItemUpdate,
            Self::ItemSetFinalState => SchemaName::ItemSetFinalState,
            Self::ItemDelete => SchemaName::ItemDelete,
            Self::ItemList => SchemaName::ItemList,
        }
    }
}

/// Why a workflow operation failed.
#[derive(Debug)]
pub enum FailureReason {
    /// Payload failed schema validation. Raised before any store access.
    InvalidDtoIn { violations: Vec<Violation> },
    /// No todo instance exists for the tenant.
    TodoInstanceDoesNotExist { awid: String },
    /// The instance exists but its state forbids any workflow.
    TodoInstanceIsNotInProperState {
        awid: String,
        expected: InstanceState,
        current: InstanceState,
    },
    /// Referenced or targeted list is missing.
    ListDoesNotExist { id: ListId },
    /// Targeted item is missing.
    ItemDoesNotExist { id: ItemId },
    /// Item update attempted outside the `active` state.
    ItemIsNotInCorrectState {
        id: ItemId,
        expected: ItemState,
        current: ItemState,
    },
    /// Final-state transition attempted outside the `active` state.
    ItemIsNotInProperState {
        id: ItemId,
        expected: ItemState,
        current: ItemState,
    },
    /// Delete attempted on a completed item.
    ItemIsNotDeletable { id: ItemId, current: ItemState },
    /// Supplied deadline is strictly earlier than wall-clock now.
    DeadlineDateIsFromThePast { deadline: i64, now: i64 },
    /// The store rejected the list insert.
    ListDaoCreateFailed(RepoError),
    /// The store rejected the list update.
    ListDaoUpdateFailed(RepoError),
    /// The store rejected the item insert.
    ItemDaoCreateFailed(RepoError),
    /// The store rejected the item update.
    ItemDaoUpdateFailed(RepoError),
    /// A read or delete failed in the repository layer.
    Repo(RepoError),
}

impl FailureReason {
    fn code_suffix(&self) -> &'static str {
        match self {
            Self::InvalidDtoIn { .. } => "invalidDtoIn",
            Self::TodoInstanceDoesNotExist { .. } => "todoInstanceDoesNotExist",
            Self::TodoInstanceIsNotInProperState { .. } => "todoInstanceIsNotInProperState",
            Self::ListDoesNotExist { .. } => "listDoesNotExist",
            Self::ItemDoesNotExist { .. } => "itemDoesNotExist",
            Self::ItemIsNotInCorrectState { .. } => "itemIsNotInCorrectState",
            Self::ItemIsNotInProperState { .. } => "itemIsNotInProperState",
            // Spelling is frozen in the public contract.
            Self::ItemIsNotDeletable { .. } => "itemIsNotInCorectState",
            Self::DeadlineDateIsFromThePast { .. } => "deadlineDateIsFromThePast",
            Self::ListDaoCreateFailed(_) => "listDaoCreateFailed",
            Self::ListDaoUpdateFailed(_) => "listDaoUpdateFailed",
            Self::ItemDaoCreateFailed(_) => "itemDaoCreateFailed",
            Self::ItemDaoUpdateFailed(_) => "itemDaoUpdateFailed",
            Self::Repo(_) => "repositoryFailure",
        }
    }
}

impl Display for FailureReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDtoIn { violations } => {
                write!(f, "dtoIn is not valid")?;
                for violation in violations {
                    write!(f, "; {}: {}", violation.field, violation.detail)?;
                }
                Ok(())
            }
            Self::TodoInstanceDoesNotExist { awid } => {
                write!(f, "todo instance does not exist (awid={awid})")
            }
            Self::TodoInstanceIsNotInProperState {
                awid,
                expected,
                current,
            } => write!(
                f,
                "todo instance is not in proper state (awid={awid}, expected={}, current={})",
                expected.as_str(),
                current.as_str()
            ),
            Self::ListDoesNotExist { id } => {
                write!(f, "list with given id does not exist (id={id})")
            }
            Self::ItemDoesNotExist { id } => {
                write!(f, "item with given id does not exist (id={id})")
            }
            Self::ItemIsNotInCorrectState {
                id,
                expected,
                current,
            } => write!(
                f,
                "item is not in correct state (id={id}, expected={}, current={})",
                expected.as_str(),
                current.as_str()
            ),
            Self::ItemIsNotInProperState {
                id,
                expected,
                current,
            } => write!(
                f,
                "item is not in proper state (id={id}, expected={}, current={})",
                expected.as_str(),
                current.as_str()
            ),
            Self::ItemIsNotDeletable { id, current } => write!(
                f,
                "item cannot be deleted (id={id}, expected one of [active, cancelled], current={})",
                current.as_str()
            ),
            Self::DeadlineDateIsFromThePast { deadline, now } => write!(
                f,
                "deadline date is from the past (deadline={deadline}, now={now})"
            ),
            Self::ListDaoCreateFailed(err) => {
                write!(f, "creating list by list DAO create failed: {err}")
            }
            Self::ListDaoUpdateFailed(err) => {
                write!(f, "updating list by list DAO update failed: {err}")
            }
            Self::ItemDaoCreateFailed(err) => {
                write!(f, "creating item by item DAO create failed: {err}")
            }
            Self::ItemDaoUpdateFailed(err) => {
                write!(f, "updating item by item DAO update failed: {err}")
            }
            Self::Repo(err) => write!(f, "repository call failed: {err}"),
        }
    }
}

/// Fatal workflow error: one use case plus one failure reason.
#[derive(Debug)]
pub struct WorkflowError {
    use_case: UseCase,
    reason: FailureReason,
}

impl WorkflowError {
    pub fn new(use_case: UseCase, reason: FailureReason) -> Self {
        Self { use_case, reason }
    }

    pub fn use_case(&self) -> UseCase {
        self.use_case
    }

    pub fn reason(&self) -> &FailureReason {
        &self.reason
    }

    /// Stable public error code, `todos-main/<entity>/<operation>/<reason>`.
    pub fn code(&self) -> String {
        format!("{}{}", self.use_case.code_prefix(), self.reason.code_suffix())
    }
}

impl Display for WorkflowError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.reason)
    }
}

impl Error for WorkflowError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.reason {
            FailureReason::ListDaoCreateFailed(err)
            | FailureReason::ListDaoUpdateFailed(err)
            | FailureReason::ItemDaoCreateFailed(err)
            | FailureReason::ItemDaoUpdateFailed(err)
            | FailureReason::Repo(err) => Some(err),
            _ => None,
        }
    }
}
