//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for the three
//!   collections (`todos_main`, `list`, `item`).
//! - Isolate SQL details from workflow orchestration.
//!
//! # Invariants
//! - Every query is scoped by tenant key (`awid`) plus entity key.
//! - Read paths reject invalid persisted state instead of masking it.

use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

use crate::db::DbError;

pub mod item_repo;
pub mod list_repo;
pub mod main_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error shared by all three collections.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(Uuid),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

fn parse_data_column(raw: &str, table: &str) -> RepoResult<crate::model::JsonMap> {
    serde_json::from_str(raw).map_err(|err| {
        RepoError::InvalidData(format!("invalid JSON in {table}.data: {err}"))
    })
}

fn parse_uuid_column(raw: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{raw}` in {column}")))
}
