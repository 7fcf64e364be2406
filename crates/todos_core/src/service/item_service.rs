//! Item workflow: create, get, update, delete, setFinalState, list.
//!
//! # Responsibility
//! - Enforce the item state machine on every transition.
//! - Verify list ownership on create/update.
//! - Select the list-lookup strategy from the supplied filters.
//!
//! # Invariants
//! - Items come into existence `active`, whatever the caller supplied.
//! - `setFinalState` returns the merged record without writing; finalizing
//!   the write belongs to the surrounding layer.

use crate::model::item::{ItemId, ItemRecord, ItemState};
use crate::model::JsonMap;
use crate::repo::item_repo::{ItemPage, ItemRepository, NewItem};
use crate::repo::list_repo::ListRepository;
use crate::repo::main_repo::TodosMainRepository;
use crate::repo::RepoError;
use crate::service::errors::{FailureReason, UseCase, WorkflowError};
use crate::service::instance_guard::ensure_active_todo_instance;
use crate::service::{
    extra_data, optional_id, optional_item_state, page_info_from, process_validation_result,
    required_id,
};
use crate::validation::{Validator, Warning};
use log::error;
use uuid::Uuid;

/// Successful single-item result plus accumulated warnings.
#[derive(Debug, Clone)]
pub struct ItemDto {
    pub item: ItemRecord,
    pub warnings: Vec<Warning>,
}

/// Successful deletion result.
#[derive(Debug, Clone)]
pub struct ItemDeleteDto {
    pub id: ItemId,
    pub warnings: Vec<Warning>,
}

/// One page of items plus accumulated warnings.
#[derive(Debug, Clone)]
pub struct ItemListDto {
    pub page: ItemPage,
    pub warnings: Vec<Warning>,
}

/// Item workflow service over injected collaborators.
pub struct ItemService<M, L, I> {
    validator: Validator,
    main_repo: M,
    list_repo: L,
    item_repo: I,
}

impl<M, L, I> ItemService<M, L, I>
where
    M: TodosMainRepository,
    L: ListRepository,
    I: ItemRepository,
{
    /// Creates a service using the provided collaborators.
    pub fn new(validator: Validator, main_repo: M, list_repo: L, item_repo: I) -> Self {
        Self {
            validator,
            main_repo,
            list_repo,
            item_repo,
        }
    }

    /// Creates one item in the referenced list. The item always starts
    /// `active`; a caller-supplied `state` key is warned about and ignored.
    pub fn create(&self, awid: &str, payload: &JsonMap) -> Result<ItemDto, WorkflowError> {
        let use_case = UseCase::ItemCreate;
        let result = self.validator.validate(use_case.schema(), payload);
        let warnings = process_validation_result(use_case, result)?;

        ensure_active_todo_instance(&self.main_repo, use_case, awid)?;

        let list_id = required_id(use_case, payload, "listId")?;
        self.list_repo
            .get(awid, list_id)
            .map_err(|err| WorkflowError::new(use_case, FailureReason::Repo(err)))?
            .ok_or_else(|| {
                WorkflowError::new(use_case, FailureReason::ListDoesNotExist { id: list_id })
            })?;

        let new_item = NewItem {
            id: Uuid::new_v4(),
            list_id,
            state: ItemState::Active,
            data: extra_data(payload, &["listId", "state"]),
        };

        if let Err(err) = self.item_repo.create(awid, &new_item) {
            error!(
                "event=item_create module=service status=error awid={awid} error_code=itemDaoCreateFailed error={err}"
            );
            return Err(WorkflowError::new(
                use_case,
                FailureReason::ItemDaoCreateFailed(err),
            ));
        }

        let item = self.read_back(
            use_case,
            awid,
            new_item.id,
            FailureReason::ItemDaoCreateFailed,
        )?;
        Ok(ItemDto { item, warnings })
    }

    /// Gets one item by id.
    pub fn get(&self, awid: &str, payload: &JsonMap) -> Result<ItemDto, WorkflowError> {
        let use_case = UseCase::ItemGet;
        let result = self.validator.validate(use_case.schema(), payload);
        let warnings = process_validation_result(use_case, result)?;

        ensure_active_todo_instance(&self.main_repo, use_case, awid)?;

        let id = required_id(use_case, payload, "id")?;
        let item = self.fetch_item(use_case, awid, id)?;
        Ok(ItemDto { item, warnings })
    }

    /// Merges the payload's free-form fields into one active item.
    pub fn update(&self, awid: &str, payload: &JsonMap) -> Result<ItemDto, WorkflowError> {
        let use_case = UseCase::ItemUpdate;
        let result = self.validator.validate(use_case.schema(), payload);
        let warnings = process_validation_result(use_case, result)?;

        ensure_active_todo_instance(&self.main_repo, use_case, awid)?;

        let id = required_id(use_case, payload, "id")?;
        let item = self.fetch_item(use_case, awid, id)?;
        if !item.state.can_update() {
            return Err(WorkflowError::new(
                use_case,
                FailureReason::ItemIsNotInCorrectState {
                    id,
                    expected: ItemState::Active,
                    current: item.state,
                },
            ));
        }

        // The owning list must still exist at update time.
        self.list_repo
            .get(awid, item.list_id)
            .map_err(|err| WorkflowError::new(use_case, FailureReason::Repo(err)))?
            .ok_or_else(|| {
                WorkflowError::new(
                    use_case,
                    FailureReason::ListDoesNotExist { id: item.list_id },
                )
            })?;

        let patch = extra_data(payload, &["id"]);
        if let Err(err) = self.item_repo.update_data(awid, id, &patch) {
            error!(
                "event=item_update module=service status=error awid={awid} id={id} error_code=itemDaoUpdateFailed error={err}"
            );
            return Err(WorkflowError::new(
                use_case,
                FailureReason::ItemDaoUpdateFailed(err),
            ));
        }

        let item = self.read_back(use_case, awid, id, FailureReason::ItemDaoUpdateFailed)?;
        Ok(ItemDto { item, warnings })
    }

    /// Moves one active item into a terminal state and returns the merged
    /// record. The store is deliberately left untouched: write semantics for
    /// finalization belong to the surrounding layer.
    pub fn set_final_state(&self, awid: &str, payload: &JsonMap) -> Result<ItemDto, WorkflowError> {
        let use_case = UseCase::ItemSetFinalState;
        let result = self.validator.validate(use_case.schema(), payload);
        let warnings = process_validation_result(use_case, result)?;

        ensure_active_todo_instance(&self.main_repo, use_case, awid)?;

        let id = required_id(use_case, payload, "id")?;
        let item = self.fetch_item(use_case, awid, id)?;
        if !item.state.can_finalize() {
            return Err(WorkflowError::new(
                use_case,
                FailureReason::ItemIsNotInProperState {
                    id,
                    expected: ItemState::Active,
                    current: item.state,
                },
            ));
        }

        let target_state = optional_item_state(payload, "state").ok_or_else(|| {
            WorkflowError::new(
                use_case,
                FailureReason::InvalidDtoIn {
                    violations: vec![crate::validation::Violation {
                        field: "state".to_string(),
                        detail: "required final state is missing".to_string(),
                    }],
                },
            )
        })?;

        let mut merged = item;
        merged.state = target_state;
        for (key, value) in extra_data(payload, &["id", "state"]) {
            merged.data.insert(key, value);
        }

        Ok(ItemDto {
            item: merged,
            warnings,
        })
    }

    /// Deletes one item. Legal from `active` or `cancelled`; completed items
    /// are kept forever.
    pub fn delete(&self, awid: &str, payload: &JsonMap) -> Result<ItemDeleteDto, WorkflowError> {
        let use_case = UseCase::ItemDelete;
        let result = self.validator.validate(use_case.schema(), payload);
        let warnings = process_validation_result(use_case, result)?;

        ensure_active_todo_instance(&self.main_repo, use_case, awid)?;

        let id = required_id(use_case, payload, "id")?;
        let item = self.fetch_item(use_case, awid, id)?;
        if !item.state.can_delete() {
            return Err(WorkflowError::new(
                use_case,
                FailureReason::ItemIsNotDeletable {
                    id,
                    current: item.state,
                },
            ));
        }

        self.item_repo
            .delete(awid, id)
            .map_err(|err| WorkflowError::new(use_case, FailureReason::Repo(err)))?;

        Ok(ItemDeleteDto { id, warnings })
    }

    /// Lists items using one of three strategies, in precedence order:
    /// listId+state, state alone, otherwise all tenant items. A `listId`
    /// without a `state` does not narrow the result.
    pub fn list(&self, awid: &str, payload: &JsonMap) -> Result<ItemListDto, WorkflowError> {
        let use_case = UseCase::ItemList;
        let result = self.validator.validate(use_case.schema(), payload);
        let warnings = process_validation_result(use_case, result)?;

        ensure_active_todo_instance(&self.main_repo, use_case, awid)?;

        let page = page_info_from(payload);
        let list_id = optional_id(payload, "listId");
        let state = optional_item_state(payload, "state");

        let page = match (list_id, state) {
            (Some(list_id), Some(state)) => {
                self.item_repo
                    .list_by_list_and_state(awid, list_id, state, &page)
            }
            (None, Some(state)) => self.item_repo.list_by_state(awid, state, &page),
            _ => self.item_repo.list_all(awid, &page),
        }
        .map_err(|err| WorkflowError::new(use_case, FailureReason::Repo(err)))?;

        Ok(ItemListDto { page, warnings })
    }

    fn fetch_item(
        &self,
        use_case: UseCase,
        awid: &str,
        id: ItemId,
    ) -> Result<ItemRecord, WorkflowError> {
        self.item_repo
            .get(awid, id)
            .map_err(|err| WorkflowError::new(use_case, FailureReason::Repo(err)))?
            .ok_or_else(|| WorkflowError::new(use_case, FailureReason::ItemDoesNotExist { id }))
    }

    fn read_back(
        &self,
        use_case: UseCase,
        awid: &str,
        id: ItemId,
        wrap: fn(RepoError) -> FailureReason,
    ) -> Result<ItemRecord, WorkflowError> {
        self.item_repo
            .get(awid, id)
            .map_err(|err| WorkflowError::new(use_case, wrap(err)))?
            .ok_or_else(|| WorkflowError::new(use_case, wrap(RepoError::NotFound(id))))
    }
}
