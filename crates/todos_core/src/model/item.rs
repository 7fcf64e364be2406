//! Item domain record and lifecycle state machine.
//!
//! # Responsibility
//! - Define the item record and its explicit active/completed/cancelled
//!   lifecycle.
//! - Keep transition legality (`can_update`, `can_finalize`, `can_delete`)
//!   in one place so every workflow agrees on it.
//!
//! # Invariants
//! - `active` is the only initial state; items are never created terminal.
//! - `completed` and `cancelled` are terminal; no transition leaves them.

use crate::model::list::ListId;
use crate::model::JsonMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of an item, unique within one tenant.
pub type ItemId = Uuid;

/// Item lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
    /// Initial state; the only state accepting updates and finalization.
    Active,
    /// Terminal. Completed items can never be deleted.
    Completed,
    /// Terminal, but still deletable.
    Cancelled,
}

impl ItemState {
    /// Stable lowercase string form used in storage, payloads and errors.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses the stable string form.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns whether this state ends the item lifecycle.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Update is legal only while active.
    pub fn can_update(self) -> bool {
        self == Self::Active
    }

    /// `setFinalState` is legal only from active.
    pub fn can_finalize(self) -> bool {
        self == Self::Active
    }

    /// Delete is legal from active or cancelled, never from completed.
    pub fn can_delete(self) -> bool {
        self != Self::Completed
    }
}

/// Task belonging to exactly one list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    /// Tenant / workspace identifier.
    pub awid: String,
    /// Stable item id.
    pub id: ItemId,
    /// Owning list, referenced by key within the same tenant.
    pub list_id: ListId,
    /// Lifecycle state; always `active` at creation.
    pub state: ItemState,
    /// Free-form remainder of the create/update payload.
    #[serde(flatten)]
    pub data: JsonMap,
    /// Creation timestamp in epoch milliseconds.
    pub created_at: i64,
    /// Last-write timestamp in epoch milliseconds.
    pub updated_at: i64,
}

#[cfg(test)]
mod tests {
    use super::ItemState;

    #[test]
    fn state_string_forms_round_trip() {
        for state in [ItemState::Active, ItemState::Completed, ItemState::Cancelled] {
            assert_eq!(ItemState::parse(state.as_str()), Some(state));
        }
        assert_eq!(ItemState::parse("done"), None);
    }

    #[test]
    fn update_and_finalize_require_active() {
        assert!(ItemState::Active.can_update());
        assert!(ItemState::Active.can_finalize());
        for terminal in [ItemState::Completed, ItemState::Cancelled] {
            assert!(!terminal.can_update());
            assert!(!terminal.can_finalize());
            assert!(terminal.is_terminal());
        }
    }

    #[test]
    fn completed_items_are_never_deletable() {
        assert!(ItemState::Active.can_delete());
        assert!(ItemState::Cancelled.can_delete());
        assert!(!ItemState::Completed.can_delete());
    }
}
