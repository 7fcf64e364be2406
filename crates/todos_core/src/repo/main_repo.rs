//! Todo instance repository contract and SQLite implementation.

use crate::model::instance::{InstanceState, TodoInstance};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection};

/// Repository interface for the per-tenant root resource.
pub trait TodosMainRepository {
    /// Loads the instance owning the given tenant, if any.
    fn get_by_awid(&self, awid: &str) -> RepoResult<Option<TodoInstance>>;
    /// Creates the instance record. Initialization path; workflows never
    /// call this.
    fn create_instance(&self, instance: &TodoInstance) -> RepoResult<()>;
}

/// SQLite-backed todo instance repository.
pub struct SqliteTodosMainRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTodosMainRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TodosMainRepository for SqliteTodosMainRepository<'_> {
    fn get_by_awid(&self, awid: &str) -> RepoResult<Option<TodoInstance>> {
        let mut stmt = self
            .conn
            .prepare("SELECT awid, state FROM todos_main WHERE awid = ?1;")?;
        let mut rows = stmt.query(params![awid])?;

        if let Some(row) = rows.next()? {
            let awid: String = row.get("awid")?;
            let state_text: String = row.get("state")?;
            let state = InstanceState::parse(&state_text).ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "invalid instance state `{state_text}` in todos_main.state"
                ))
            })?;
            return Ok(Some(TodoInstance { awid, state }));
        }

        Ok(None)
    }

    fn create_instance(&self, instance: &TodoInstance) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO todos_main (awid, state) VALUES (?1, ?2);",
            params![instance.awid.as_str(), instance.state.as_str()],
        )?;
        Ok(())
    }
}
