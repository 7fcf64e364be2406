//! List domain record.

use crate::model::JsonMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a list, unique within one tenant.
pub type ListId = Uuid;

/// Named collection of items with an optional deadline.
///
/// Fields outside the structural ones live in `data`, preserving whatever
/// the caller supplied at create/update time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRecord {
    /// Tenant / workspace identifier.
    pub awid: String,
    /// Stable list id.
    pub id: ListId,
    /// Display name.
    pub name: String,
    /// Optional deadline in epoch milliseconds. Must not be in the past at
    /// the moment it is written.
    pub deadline: Option<i64>,
    /// Free-form remainder of the create/update payload.
    #[serde(flatten)]
    pub data: JsonMap,
    /// Creation timestamp in epoch milliseconds.
    pub created_at: i64,
    /// Last-write timestamp in epoch milliseconds.
    pub updated_at: i64,
}
