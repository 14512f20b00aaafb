use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::capability::Capability;
use super::navigation::NavigationEntry;
use crate::types::WorkspaceId;

/// Stable, machine-readable reason attached to a denial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeniedReason {
    MissingCapability,
    InsufficientRole,
    WorkspaceNotPermitted,
    ConfigUnavailable,
}

impl DeniedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeniedReason::MissingCapability => "missing_capability",
            DeniedReason::InsufficientRole => "insufficient_role",
            DeniedReason::WorkspaceNotPermitted => "workspace_not_permitted",
            DeniedReason::ConfigUnavailable => "config_unavailable",
        }
    }
}

/// Capability map for one workspace, total over the keys that were requested
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessDecision {
    pub workspace_id: WorkspaceId,
    pub capabilities: BTreeMap<Capability, bool>,
    pub denied_reason: Option<DeniedReason>,
}

impl AccessDecision {
    pub(crate) fn from_map(workspace_id: WorkspaceId, capabilities: BTreeMap<Capability, bool>) -> Self {
        let denied_reason = if capabilities.values().all(|enabled| *enabled) {
            None
        } else {
            Some(DeniedReason::MissingCapability)
        };
        Self {
            workspace_id,
            capabilities,
            denied_reason,
        }
    }

    /// Every requested key false, used when the config store cannot be read
    pub(crate) fn fail_closed<'a>(
        workspace_id: WorkspaceId,
        keys: impl IntoIterator<Item = &'a Capability>,
    ) -> Self {
        Self {
            workspace_id,
            capabilities: keys.into_iter().map(|key| (key.clone(), false)).collect(),
            denied_reason: Some(DeniedReason::ConfigUnavailable),
        }
    }

    /// Missing keys read as disabled
    pub fn is_enabled(&self, capability: &str) -> bool {
        self.capabilities.get(capability).copied().unwrap_or(false)
    }

    pub fn is_fail_closed(&self) -> bool {
        self.denied_reason == Some(DeniedReason::ConfigUnavailable)
    }

    pub fn enabled(&self) -> impl Iterator<Item = &Capability> {
        self.capabilities
            .iter()
            .filter(|(_, enabled)| **enabled)
            .map(|(capability, _)| capability)
    }

    /// Targets of the route table entries this decision leaves enabled
    pub fn allowed_routes(&self, entries: &[NavigationEntry]) -> BTreeSet<String> {
        entries
            .iter()
            .filter(|entry| entry.is_enabled_by(self))
            .map(|entry| entry.target.clone())
            .collect()
    }
}
