use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ConfigStore, MembershipStore, StoreError, WorkspaceConfigEntry};
use crate::gate::Capability;
use crate::types::{WorkspaceId, WorkspaceRole};

/// Seed document for [`MemoryStore::seed`]:
/// `{"<ws uuid>": {"secrets": {"ENABLE_CHAT": "true"}, "members": {"<user uuid>": "OWNER"}}}`
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct MemorySeed {
    workspaces: BTreeMap<WorkspaceId, SeedWorkspace>,
}

#[derive(Debug, Default, Deserialize)]
struct SeedWorkspace {
    #[serde(default)]
    secrets: BTreeMap<String, String>,
    #[serde(default)]
    members: BTreeMap<Uuid, WorkspaceRole>,
}

impl MemorySeed {
    pub fn from_json(raw: &str) -> Result<Self, StoreError> {
        serde_json::from_str(raw).map_err(|e| StoreError::InvalidData(format!("seed: {}", e)))
    }
}

/// In-process store used by development mode and tests
#[derive(Default)]
pub struct MemoryStore {
    secrets: RwLock<HashMap<WorkspaceId, Vec<WorkspaceConfigEntry>>>,
    members: RwLock<HashMap<(WorkspaceId, Uuid), WorkspaceRole>>,
    lookups: AtomicUsize,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry; an existing entry for the same key is kept, newest first
    pub async fn put(&self, workspace: WorkspaceId, key: &str, value: &str) {
        let mut secrets = self.secrets.write().await;
        secrets
            .entry(workspace)
            .or_default()
            .insert(0, WorkspaceConfigEntry::new(key, value));
    }

    pub async fn add_member(&self, workspace: WorkspaceId, user: Uuid, role: WorkspaceRole) {
        self.members.write().await.insert((workspace, user), role);
    }

    /// Load a seed document; returns the number of workspaces seeded
    pub async fn seed(&self, seed: MemorySeed) -> usize {
        let count = seed.workspaces.len();
        for (workspace, data) in seed.workspaces {
            for (key, value) in &data.secrets {
                self.put(workspace, key, value).await;
            }
            for (user, role) in data.members {
                self.add_member(workspace, user, role).await;
            }
        }
        count
    }

    /// Number of `get` calls served so far
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Simulate an unreachable backend
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn get(
        &self,
        workspace: &WorkspaceId,
        keys: &[Capability],
    ) -> Result<Vec<WorkspaceConfigEntry>, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;

        let secrets = self.secrets.read().await;
        let entries = secrets
            .get(workspace)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|entry| keys.iter().any(|key| key.as_str() == entry.key))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(entries)
    }
}

#[async_trait]
impl MembershipStore for MemoryStore {
    async fn role(&self, workspace: &WorkspaceId, user: &Uuid) -> Result<Option<WorkspaceRole>, StoreError> {
        self.check_online()?;
        Ok(self.members.read().await.get(&(*workspace, *user)).copied())
    }
}
