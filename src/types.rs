/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::gate::GateError;

/// Tenant boundary; all configuration and membership is scoped to one workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceId(Uuid);

impl WorkspaceId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl FromStr for WorkspaceId {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(GateError::InvalidWorkspaceId(s.to_string()));
        }
        Uuid::parse_str(trimmed)
            .map(Self)
            .map_err(|_| GateError::InvalidWorkspaceId(s.to_string()))
    }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Uuid> for WorkspaceId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// Membership role inside a workspace, ordered by privilege
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkspaceRole {
    Member,
    Admin,
    Owner,
}

impl WorkspaceRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkspaceRole::Member => "MEMBER",
            WorkspaceRole::Admin => "ADMIN",
            WorkspaceRole::Owner => "OWNER",
        }
    }

    /// True when this role is ranked at or above `required`
    pub fn satisfies(&self, required: WorkspaceRole) -> bool {
        *self >= required
    }
}

impl FromStr for WorkspaceRole {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MEMBER" => Ok(WorkspaceRole::Member),
            "ADMIN" => Ok(WorkspaceRole::Admin),
            "OWNER" => Ok(WorkspaceRole::Owner),
            _ => Err(GateError::UnknownRole(s.to_string())),
        }
    }
}

impl fmt::Display for WorkspaceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Explicit per-request context handed to the gate instead of ambient request state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceContext {
    pub workspace_id: WorkspaceId,
    pub user_id: Option<Uuid>,
    pub role: Option<WorkspaceRole>,
    pub is_root_workspace: bool,
}

impl WorkspaceContext {
    pub fn new(workspace_id: WorkspaceId, user_id: Uuid, role: WorkspaceRole, root: WorkspaceId) -> Self {
        Self {
            workspace_id,
            user_id: Some(user_id),
            role: Some(role),
            is_root_workspace: workspace_id == root,
        }
    }

    /// Context carrying only a workspace, for checks with no role constraint
    pub fn workspace_only(workspace_id: WorkspaceId, root: WorkspaceId) -> Self {
        Self {
            workspace_id,
            user_id: None,
            role: None,
            is_root_workspace: workspace_id == root,
        }
    }

    pub fn has_role(&self, required: WorkspaceRole) -> bool {
        self.role.map(|role| role.satisfies(required)).unwrap_or(false)
    }
}
