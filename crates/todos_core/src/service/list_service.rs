//! List workflow: create, get, update.
//!
//! # Responsibility
//! - Enforce the deadline business rule on every write.
//! - Surface store write failures as the stable DAO failure codes.
//!
//! # Invariants
//! - The instance guard runs before any list-collection access.
//! - `deadline`, when supplied, must not be strictly earlier than now.

use crate::model::list::{ListId, ListRecord};
use crate::model::JsonMap;
use crate::repo::list_repo::{ListPatch, ListRepository, NewList};
use crate::repo::main_repo::TodosMainRepository;
use crate::repo::RepoError;
use crate::service::errors::{FailureReason, UseCase, WorkflowError};
use crate::service::instance_guard::ensure_active_todo_instance;
use crate::service::{
    extra_data, now_epoch_ms, optional_epoch_millis, optional_text, process_validation_result,
    required_id, required_text,
};
use crate::validation::{Validator, Warning};
use log::error;
use uuid::Uuid;

/// Keys mapped to dedicated columns; everything else is free-form data.
const STRUCTURAL_KEYS: &[&str] = &["id", "name", "deadline"];

/// Successful list operation result plus accumulated warnings.
#[derive(Debug, Clone)]
pub struct ListDto {
    pub list: ListRecord,
    pub warnings: Vec<Warning>,
}

/// List workflow service over injected collaborators.
pub struct ListService<M, L> {
    validator: Validator,
    main_repo: M,
    list_repo: L,
}

impl<M: TodosMainRepository, L: ListRepository> ListService<M, L> {
    /// Creates a service using the provided collaborators.
    pub fn new(validator: Validator, main_repo: M, list_repo: L) -> Self {
        Self {
            validator,
            main_repo,
            list_repo,
        }
    }

    /// Creates one list for the tenant.
    pub fn create(&self, awid: &str, payload: &JsonMap) -> Result<ListDto, WorkflowError> {
        let use_case = UseCase::ListCreate;
        let result = self.validator.validate(use_case.schema(), payload);
        let warnings = process_validation_result(use_case, result)?;

        ensure_active_todo_instance(&self.main_repo, use_case, awid)?;

        let deadline = optional_epoch_millis(payload, "deadline");
        check_deadline(use_case, deadline)?;

        let new_list = NewList {
            id: Uuid::new_v4(),
            name: required_text(use_case, payload, "name")?,
            deadline,
            data: extra_data(payload, STRUCTURAL_KEYS),
        };

        if let Err(err) = self.list_repo.create(awid, &new_list) {
            error!(
                "event=list_create module=service status=error awid={awid} error_code=listDaoCreateFailed error={err}"
            );
            return Err(WorkflowError::new(
                use_case,
                FailureReason::ListDaoCreateFailed(err),
            ));
        }

        let list = self.read_back(
            use_case,
            awid,
            new_list.id,
            FailureReason::ListDaoCreateFailed,
        )?;
        Ok(ListDto { list, warnings })
    }

    /// Gets one list by id.
    pub fn get(&self, awid: &str, payload: &JsonMap) -> Result<ListDto, WorkflowError> {
        let use_case = UseCase::ListGet;
        let result = self.validator.validate(use_case.schema(), payload);
        let warnings = process_validation_result(use_case, result)?;

        ensure_active_todo_instance(&self.main_repo, use_case, awid)?;

        let id = required_id(use_case, payload, "id")?;
        let list = self
            .list_repo
            .get(awid, id)
            .map_err(|err| WorkflowError::new(use_case, FailureReason::Repo(err)))?
            .ok_or_else(|| WorkflowError::new(use_case, FailureReason::ListDoesNotExist { id }))?;

        Ok(ListDto { list, warnings })
    }

    /// Applies a partial update to one list.
    pub fn update(&self, awid: &str, payload: &JsonMap) -> Result<ListDto, WorkflowError> {
        let use_case = UseCase::ListUpdate;
        let result = self.validator.validate(use_case.schema(), payload);
        let warnings = process_validation_result(use_case, result)?;

        ensure_active_todo_instance(&self.main_repo, use_case, awid)?;

        let deadline = optional_epoch_millis(payload, "deadline");
        check_deadline(use_case, deadline)?;

        let id = required_id(use_case, payload, "id")?;
        let patch = ListPatch {
            name: optional_text(payload, "name"),
            deadline,
            data: extra_data(payload, STRUCTURAL_KEYS),
        };

        match self.list_repo.update(awid, id, &patch) {
            Ok(()) => {}
            // The store reported no matching row, not a write failure.
            Err(RepoError::NotFound(_)) => {
                return Err(WorkflowError::new(
                    use_case,
                    FailureReason::ListDoesNotExist { id },
                ));
            }
            Err(err) => {
                error!(
                    "event=list_update module=service status=error awid={awid} id={id} error_code=listDaoUpdateFailed error={err}"
                );
                return Err(WorkflowError::new(
                    use_case,
                    FailureReason::ListDaoUpdateFailed(err),
                ));
            }
        }

        let list = self.read_back(use_case, awid, id, FailureReason::ListDaoUpdateFailed)?;
        Ok(ListDto { list, warnings })
    }

    fn read_back(
        &self,
        use_case: UseCase,
        awid: &str,
        id: ListId,
        wrap: fn(RepoError) -> FailureReason,
    ) -> Result<ListRecord, WorkflowError> {
        self.list_repo
            .get(awid, id)
            .map_err(|err| WorkflowError::new(use_case, wrap(err)))?
            .ok_or_else(|| WorkflowError::new(use_case, wrap(RepoError::NotFound(id))))
    }
}

fn check_deadline(use_case: UseCase, deadline: Option<i64>) -> Result<(), WorkflowError> {
    if let Some(deadline) = deadline {
        let now = now_epoch_ms();
        if deadline < now {
            return Err(WorkflowError::new(
                use_case,
                FailureReason::DeadlineDateIsFromThePast { deadline, now },
            ));
        }
    }
    Ok(())
}
