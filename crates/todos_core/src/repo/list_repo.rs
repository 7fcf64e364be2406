//! List repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/get/update persistence for lists, keyed by
//!   (awid, id).
//!
//! # Invariants
//! - `update` touches only the columns named by the patch and always
//!   refreshes `updated_at`.
//! - Free-form `data` is merged key-by-key, never replaced wholesale.

use crate::model::list::{ListId, ListRecord};
use crate::model::JsonMap;
use crate::repo::{parse_data_column, parse_uuid_column, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const LIST_SELECT_SQL: &str = "SELECT
    awid,
    id,
    name,
    deadline,
    data,
    created_at,
    updated_at
FROM list";

/// Write model for list creation.
#[derive(Debug, Clone)]
pub struct NewList {
    pub id: ListId,
    pub name: String,
    pub deadline: Option<i64>,
    pub data: JsonMap,
}

/// Partial update for one list. `None` fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct ListPatch {
    pub name: Option<String>,
    pub deadline: Option<i64>,
    /// Keys merged over the stored free-form data.
    pub data: JsonMap,
}

/// Repository interface for list persistence.
pub trait ListRepository {
    /// Inserts one list scoped to the tenant.
    fn create(&self, awid: &str, list: &NewList) -> RepoResult<()>;
    /// Point lookup by (awid, id).
    fn get(&self, awid: &str, id: ListId) -> RepoResult<Option<ListRecord>>;
    /// Applies the patch to one list. `NotFound` when no row matches.
    fn update(&self, awid: &str, id: ListId, patch: &ListPatch) -> RepoResult<()>;
}

/// SQLite-backed list repository.
pub struct SqliteListRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteListRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ListRepository for SqliteListRepository<'_> {
    fn create(&self, awid: &str, list: &NewList) -> RepoResult<()> {
        let data = serde_json::Value::Object(list.data.clone()).to_string();
        self.conn.execute(
            "INSERT INTO list (awid, id, name, deadline, data)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                awid,
                list.id.to_string(),
                list.name.as_str(),
                list.deadline,
                data,
            ],
        )?;
        Ok(())
    }

    fn get(&self, awid: &str, id: ListId) -> RepoResult<Option<ListRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{LIST_SELECT_SQL} WHERE awid = ?1 AND id = ?2;"))?;
        let mut rows = stmt.query(params![awid, id.to_string()])?;

        if let Some(row) = rows.next()? {
            return Ok(Some(parse_list_row(row)?));
        }
        Ok(None)
    }

    fn update(&self, awid: &str, id: ListId, patch: &ListPatch) -> RepoResult<()> {
        // Read-merge-write for the free-form bag; the two statements are not
        // transactionally bound, matching the advertised consistency model.
        let merged_data = if patch.data.is_empty() {
            None
        } else {
            let current = self
                .get(awid, id)?
                .ok_or(RepoError::NotFound(id))?;
            let mut merged = current.data;
            for (key, value) in &patch.data {
                merged.insert(key.clone(), value.clone());
            }
            Some(serde_json::Value::Object(merged).to_string())
        };

        let mut sets = vec!["updated_at = (strftime('%s', 'now') * 1000)".to_string()];
        let mut values: Vec<Value> = Vec::new();

        if let Some(name) = &patch.name {
            sets.push("name = ?".to_string());
            values.push(Value::Text(name.clone()));
        }
        if let Some(deadline) = patch.deadline {
            sets.push("deadline = ?".to_string());
            values.push(Value::Integer(deadline));
        }
        if let Some(data) = merged_data {
            sets.push("data = ?".to_string());
            values.push(Value::Text(data));
        }

        let sql = format!(
            "UPDATE list SET {} WHERE awid = ? AND id = ?;",
            sets.join(", ")
        );
        values.push(Value::Text(awid.to_string()));
        values.push(Value::Text(id.to_string()));

        let changed = self.conn.execute(&sql, params_from_iter(values))?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn parse_list_row(row: &Row<'_>) -> RepoResult<ListRecord> {
    let id_text: String = row.get("id")?;
    let data_text: String = row.get("data")?;

    Ok(ListRecord {
        awid: row.get("awid")?,
        id: parse_uuid_column(&id_text, "list.id")?,
        name: row.get("name")?,
        deadline: row.get("deadline")?,
        data: parse_data_column(&data_text, "list")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
