//! Todo instance root resource.
//!
//! # Responsibility
//! - Define the per-tenant root record whose state gates every workflow.
//!
//! # Invariants
//! - One instance per `awid`; never deleted by this core.
//! - All List/Item operations require `state == active`.

use serde::{Deserialize, Serialize};

/// Lifecycle state of the per-tenant todo instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceState {
    /// Fully operational; the only state in which workflows may run.
    Active,
    /// Temporarily disabled by the platform.
    Suspended,
    /// Permanently retired.
    Closed,
}

impl InstanceState {
    /// Stable lowercase string form used in storage and error context.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Closed => "closed",
        }
    }

    /// Parses the stable string form.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "suspended" => Some(Self::Suspended),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

/// Per-tenant root resource gating all List/Item workflows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoInstance {
    /// Tenant / workspace identifier.
    pub awid: String,
    /// Lifecycle state; workflows require `Active`.
    pub state: InstanceState,
}

impl TodoInstance {
    /// Creates an instance in the given state.
    pub fn new(awid: impl Into<String>, state: InstanceState) -> Self {
        Self {
            awid: awid.into(),
            state,
        }
    }

    /// Returns whether workflows may operate under this instance.
    pub fn is_active(&self) -> bool {
        self.state == InstanceState::Active
    }
}

#[cfg(test)]
mod tests {
    use super::{InstanceState, TodoInstance};

    #[test]
    fn state_string_forms_round_trip() {
        for state in [
            InstanceState::Active,
            InstanceState::Suspended,
            InstanceState::Closed,
        ] {
            assert_eq!(InstanceState::parse(state.as_str()), Some(state));
        }
        assert_eq!(InstanceState::parse("frozen"), None);
    }

    #[test]
    fn only_active_instances_accept_workflows() {
        assert!(TodoInstance::new("awid-1", InstanceState::Active).is_active());
        assert!(!TodoInstance::new("awid-1", InstanceState::Suspended).is_active());
        assert!(!TodoInstance::new("awid-1", InstanceState::Closed).is_active());
    }
}
