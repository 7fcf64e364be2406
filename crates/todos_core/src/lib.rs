//! Core business logic for the multi-tenant ToDo application.
//! This crate is the single source of truth for workflow invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod validation;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::instance::{InstanceState, TodoInstance};
pub use model::item::{ItemId, ItemRecord, ItemState};
pub use model::list::{ListId, ListRecord};
pub use model::JsonMap;
pub use repo::item_repo::{
    ItemPage, ItemRepository, NewItem, PageInfo, SqliteItemRepository, DEFAULT_PAGE_SIZE,
};
pub use repo::list_repo::{ListPatch, ListRepository, NewList, SqliteListRepository};
pub use repo::main_repo::{SqliteTodosMainRepository, TodosMainRepository};
pub use repo::{RepoError, RepoResult};
pub use service::errors::{FailureReason, UseCase, WorkflowError};
pub use service::instance_guard::{ensure_active_todo_instance, REQUIRED_INSTANCE_STATE};
pub use service::item_service::{ItemDeleteDto, ItemDto, ItemListDto, ItemService};
pub use service::list_service::{ListDto, ListService};
pub use service::process_validation_result;
pub use validation::{SchemaName, ValidationResult, Validator, Violation, Warning};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
