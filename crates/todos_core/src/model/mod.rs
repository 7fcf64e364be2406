//! Domain model for the multi-tenant ToDo core.
//!
//! # Responsibility
//! - Define the canonical records gated by the todo instance lifecycle.
//! - Keep lifecycle-state legality checks next to the state types.
//!
//! # Invariants
//! - Every List/Item is scoped to exactly one tenant (`awid`).
//! - Item lifecycle transitions are only those allowed by `ItemState`.

pub mod instance;
pub mod item;
pub mod list;

/// Free-form JSON field bag carried by dtoIn payloads and persisted records.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;
