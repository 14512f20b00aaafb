use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::{ConfigStore, MembershipStore, StoreError, WorkspaceConfigEntry};
use crate::database::DatabaseManager;
use crate::gate::Capability;
use crate::types::{WorkspaceId, WorkspaceRole};

/// Postgres-backed stores over `workspace_secrets` and `workspace_members`
#[derive(Clone)]
pub struct PgStore {
    db: Arc<DatabaseManager>,
}

impl PgStore {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ConfigStore for PgStore {
    async fn get(
        &self,
        workspace: &WorkspaceId,
        keys: &[Capability],
    ) -> Result<Vec<WorkspaceConfigEntry>, StoreError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let pool = self.db.pool().await?;
        let names: Vec<&str> = keys.iter().map(Capability::as_str).collect();

        // Single batched lookup for all keys; newest write first per key
        let entries = sqlx::query_as::<_, WorkspaceConfigEntry>(
            r#"
            SELECT name, value, COALESCE(updated_at, created_at) AS updated_at
            FROM workspace_secrets
            WHERE ws_id = $1
            AND name = ANY($2)
            ORDER BY name, COALESCE(updated_at, created_at) DESC, id
            "#,
        )
        .bind(workspace.as_uuid())
        .bind(&names)
        .fetch_all(&pool)
        .await?;

        Ok(entries)
    }
}

#[async_trait]
impl MembershipStore for PgStore {
    async fn role(&self, workspace: &WorkspaceId, user: &Uuid) -> Result<Option<WorkspaceRole>, StoreError> {
        let pool = self.db.pool().await?;

        let role: Option<(String,)> = sqlx::query_as(
            "SELECT role FROM workspace_members WHERE ws_id = $1 AND user_id = $2",
        )
        .bind(workspace.as_uuid())
        .bind(user)
        .fetch_optional(&pool)
        .await?;

        role.map(|(raw,)| {
            raw.parse::<WorkspaceRole>()
                .map_err(|e| StoreError::InvalidData(e.to_string()))
        })
        .transpose()
    }
}
