// Configuration and membership stores consumed by the gate.
//
// The gate only reads through these traits; writes happen through the
// workspace settings surface of the hosting application.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

use crate::database::DatabaseError;
use crate::gate::Capability;
use crate::types::{WorkspaceId, WorkspaceRole};

pub use memory::{MemorySeed, MemoryStore};
pub use postgres::PgStore;

/// Key/value secret row scoped to one workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct WorkspaceConfigEntry {
    #[sqlx(rename = "name")]
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

impl WorkspaceConfigEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Configuration store unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid stored value: {0}")]
    InvalidData(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Read side of the workspace secrets table.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Every entry of `workspace` whose key is in `keys`, in one round trip.
    /// Entries for the same key come most recent write first.
    async fn get(
        &self,
        workspace: &WorkspaceId,
        keys: &[Capability],
    ) -> Result<Vec<WorkspaceConfigEntry>, StoreError>;
}

/// Read side of the workspace members table
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Role of `user` in `workspace`, `None` when not a member
    async fn role(&self, workspace: &WorkspaceId, user: &Uuid) -> Result<Option<WorkspaceRole>, StoreError>;
}
