//! Item repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD plus the three list-lookup strategies over the `item`
//!   collection.
//!
//! # Invariants
//! - List results are ordered by `created_at ASC, id ASC` for stable
//!   pagination.
//! - `delete` physically removes the row; item lifecycle legality is the
//!   workflow's concern, not the repository's.

use crate::model::item::{ItemId, ItemRecord, ItemState};
use crate::model::list::ListId;
use crate::model::JsonMap;
use crate::repo::{parse_data_column, parse_uuid_column, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const ITEM_SELECT_SQL: &str = "SELECT
    awid,
    id,
    list_id,
    state,
    data,
    created_at,
    updated_at
FROM item";

/// Default page size applied when the caller supplies no `pageInfo`.
pub const DEFAULT_PAGE_SIZE: u32 = 1000;

/// Offset/limit page selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub page_index: u32,
    pub page_size: u32,
}

impl Default for PageInfo {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of items plus the total match count.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemPage {
    pub items: Vec<ItemRecord>,
    pub page_info: PageInfo,
    pub total: u64,
}

/// Write model for item creation.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub id: ItemId,
    pub list_id: ListId,
    pub state: ItemState,
    pub data: JsonMap,
}

/// Repository interface for item persistence.
pub trait ItemRepository {
    /// Inserts one item scoped to the tenant.
    fn create(&self, awid: &str, item: &NewItem) -> RepoResult<()>;
    /// Point lookup by (awid, id).
    fn get(&self, awid: &str, id: ItemId) -> RepoResult<Option<ItemRecord>>;
    /// Merges `patch` over the stored free-form data. `NotFound` when no
    /// row matches. State and list ownership are never changed here.
    fn update_data(&self, awid: &str, id: ItemId, patch: &JsonMap) -> RepoResult<()>;
    /// Writes a terminal state. The finalize workflow returns the merged
    /// record without persisting; the surrounding layer performs this write.
    fn set_final_state(&self, awid: &str, id: ItemId, state: ItemState) -> RepoResult<()>;
    /// Removes one item. `NotFound` when no row matches.
    fn delete(&self, awid: &str, id: ItemId) -> RepoResult<()>;
    /// Items of one list in one state.
    fn list_by_list_and_state(
        &self,
        awid: &str,
        list_id: ListId,
        state: ItemState,
        page: &PageInfo,
    ) -> RepoResult<ItemPage>;
    /// Items in one state, tenant-wide.
    fn list_by_state(&self, awid: &str, state: ItemState, page: &PageInfo)
        -> RepoResult<ItemPage>;
    /// All items of the tenant.
    fn list_all(&self, awid: &str, page: &PageInfo) -> RepoResult<ItemPage>;
}

/// SQLite-backed item repository.
pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteItemRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn list_where(
        &self,
        where_sql: &str,
        filter_values: Vec<Value>,
        page: &PageInfo,
    ) -> RepoResult<ItemPage> {
        let count_sql = format!("SELECT COUNT(*) FROM item WHERE {where_sql};");
        let total: u64 = self.conn.query_row(
            &count_sql,
            params_from_iter(filter_values.clone()),
            |row| row.get(0),
        )?;

        let select_sql = format!(
            "{ITEM_SELECT_SQL} WHERE {where_sql}
             ORDER BY created_at ASC, id ASC
             LIMIT ? OFFSET ?;"
        );
        let mut values = filter_values;
        values.push(Value::Integer(i64::from(page.page_size)));
        values.push(Value::Integer(
            i64::from(page.page_index) * i64::from(page.page_size),
        ));

        let mut stmt = self.conn.prepare(&select_sql)?;
        let mut rows = stmt.query(params_from_iter(values))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }

        Ok(ItemPage {
            items,
            page_info: *page,
            total,
        })
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn create(&self, awid: &str, item: &NewItem) -> RepoResult<()> {
        let data = serde_json::Value::Object(item.data.clone()).to_string();
        self.conn.execute(
            "INSERT INTO item (awid, id, list_id, state, data)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                awid,
                item.id.to_string(),
                item.list_id.to_string(),
                item.state.as_str(),
                data,
            ],
        )?;
        Ok(())
    }

    fn get(&self, awid: &str, id: ItemId) -> RepoResult<Option<ItemRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ITEM_SELECT_SQL} WHERE awid = ?1 AND id = ?2;"))?;
        let mut rows = stmt.query(params![awid, id.to_string()])?;

        if let Some(row) = rows.next()? {
            return Ok(Some(parse_item_row(row)?));
        }
        Ok(None)
    }

    fn update_data(&self, awid: &str, id: ItemId, patch: &JsonMap) -> RepoResult<()> {
        let current = self.get(awid, id)?.ok_or(RepoError::NotFound(id))?;
        let mut merged = current.data;
        for (key, value) in patch {
            merged.insert(key.clone(), value.clone());
        }

        let changed = self.conn.execute(
            "UPDATE item
             SET data = ?1, updated_at = (strftime('%s', 'now') * 1000)
             WHERE awid = ?2 AND id = ?3;",
            params![
                serde_json::Value::Object(merged).to_string(),
                awid,
                id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn set_final_state(&self, awid: &str, id: ItemId, state: ItemState) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE item
             SET state = ?1, updated_at = (strftime('%s', 'now') * 1000)
             WHERE awid = ?2 AND id = ?3;",
            params![state.as_str(), awid, id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn delete(&self, awid: &str, id: ItemId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM item WHERE awid = ?1 AND id = ?2;",
            params![awid, id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn list_by_list_and_state(
        &self,
        awid: &str,
        list_id: ListId,
        state: ItemState,
        page: &PageInfo,
    ) -> RepoResult<ItemPage> {
        self.list_where(
            "awid = ? AND list_id = ? AND state = ?",
            vec![
                Value::Text(awid.to_string()),
                Value::Text(list_id.to_string()),
                Value::Text(state.as_str().to_string()),
            ],
            page,
        )
    }

    fn list_by_state(
        &self,
        awid: &str,
        state: ItemState,
        page: &PageInfo,
    ) -> RepoResult<ItemPage> {
        self.list_where(
            "awid = ? AND state = ?",
            vec![
                Value::Text(awid.to_string()),
                Value::Text(state.as_str().to_string()),
            ],
            page,
        )
    }

    fn list_all(&self, awid: &str, page: &PageInfo) -> RepoResult<ItemPage> {
        self.list_where("awid = ?", vec![Value::Text(awid.to_string())], page)
    }
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<ItemRecord> {
    let id_text: String = row.get("id")?;
    let list_id_text: String = row.get("list_id")?;
    let state_text: String = row.get("state")?;
    let data_text: String = row.get("data")?;

    let state = ItemState::parse(&state_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid item state `{state_text}` in item.state"))
    })?;

    Ok(ItemRecord {
        awid: row.get("awid")?,
        id: parse_uuid_column(&id_text, "item.id")?,
        list_id: parse_uuid_column(&list_id_text, "item.list_id")?,
        state,
        data: parse_data_column(&data_text, "item")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
