use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use super::capability::{is_flag_enabled, Capability};
use super::decision::{AccessDecision, DeniedReason};
use crate::store::ConfigStore;
use crate::types::{WorkspaceContext, WorkspaceId, WorkspaceRole};

const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Which workspaces a requirement applies to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkspaceScope {
    #[default]
    Any,
    /// Platform administration that only exists in the root workspace
    RootOnly,
    /// Actions the root workspace is exempt from (deletion, profile edits)
    ExcludeRoot,
}

impl WorkspaceScope {
    fn admits(&self, ctx: &WorkspaceContext) -> bool {
        match self {
            WorkspaceScope::Any => true,
            WorkspaceScope::RootOnly => ctx.is_root_workspace,
            WorkspaceScope::ExcludeRoot => !ctx.is_root_workspace,
        }
    }
}

/// Composable access requirement; omitted parts are no constraint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    #[serde(default)]
    pub capability: Option<Capability>,
    #[serde(default, rename = "role")]
    pub min_role: Option<WorkspaceRole>,
    #[serde(default)]
    pub scope: WorkspaceScope,
}

impl Requirement {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn capability(capability: impl Into<Capability>) -> Self {
        Self {
            capability: Some(capability.into()),
            ..Self::default()
        }
    }

    pub fn role(role: WorkspaceRole) -> Self {
        Self {
            min_role: Some(role),
            ..Self::default()
        }
    }

    pub fn with_capability(mut self, capability: impl Into<Capability>) -> Self {
        self.capability = Some(capability.into());
        self
    }

    pub fn with_role(mut self, role: WorkspaceRole) -> Self {
        self.min_role = Some(role);
        self
    }

    pub fn with_scope(mut self, scope: WorkspaceScope) -> Self {
        self.scope = scope;
        self
    }

    /// Root workspace administrators only
    pub fn root_admin() -> Self {
        Self::role(WorkspaceRole::Admin).with_scope(WorkspaceScope::RootOnly)
    }
}

/// Outcome of [`AccessGate::authorize`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Authorization {
    pub allowed: bool,
    pub reason: Option<DeniedReason>,
}

impl Authorization {
    fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    fn deny(reason: DeniedReason) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
        }
    }
}

/// Resolves workspace feature flags into access decisions.
///
/// Holds no per-request state; one instance is shared by every request.
#[derive(Clone)]
pub struct AccessGate {
    store: Arc<dyn ConfigStore>,
    root_workspace: WorkspaceId,
    lookup_timeout: Duration,
}

impl AccessGate {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self {
            store,
            root_workspace: WorkspaceId::new(uuid::Uuid::nil()),
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    pub fn with_root_workspace(mut self, root: WorkspaceId) -> Self {
        self.root_workspace = root;
        self
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    pub fn root_workspace(&self) -> WorkspaceId {
        self.root_workspace
    }

    /// Resolve `keys` for `workspace` with a single store lookup.
    ///
    /// The result has an entry for every requested key. Anything other than a
    /// stored value normalizing to "true" resolves false, and a store failure
    /// or timeout resolves every key false with `config_unavailable`.
    pub async fn resolve_capabilities(&self, workspace: &WorkspaceId, keys: &[Capability]) -> AccessDecision {
        let mut requested: Vec<Capability> = Vec::with_capacity(keys.len());
        for key in keys {
            if !requested.contains(key) {
                requested.push(key.clone());
            }
        }

        if requested.is_empty() {
            return AccessDecision::from_map(*workspace, BTreeMap::new());
        }

        for key in requested.iter().filter(|key| !key.is_known()) {
            debug!("Resolving unknown capability '{}' for workspace {}", key, workspace);
        }

        let entries = match tokio::time::timeout(self.lookup_timeout, self.store.get(workspace, &requested)).await {
            Ok(Ok(entries)) => entries,
            Ok(Err(e)) => {
                error!("Config lookup failed for workspace {}, failing closed: {}", workspace, e);
                return AccessDecision::fail_closed(*workspace, &requested);
            }
            Err(_) => {
                error!(
                    "Config lookup for workspace {} timed out after {:?}, failing closed",
                    workspace, self.lookup_timeout
                );
                return AccessDecision::fail_closed(*workspace, &requested);
            }
        };

        let capabilities = requested
            .into_iter()
            .map(|key| {
                let mut matching = entries.iter().filter(|entry| entry.key == key.as_str());
                let enabled = match matching.next() {
                    Some(first) => {
                        let duplicates = matching.count();
                        if duplicates > 0 {
                            warn!(
                                "Duplicate config entry: workspace {} has {} entries for '{}', using the most recent",
                                workspace,
                                duplicates + 1,
                                key
                            );
                        }
                        is_flag_enabled(&first.value)
                    }
                    None => false,
                };
                (key, enabled)
            })
            .collect();

        AccessDecision::from_map(*workspace, capabilities)
    }

    /// Check a composed requirement. Scope and role are checked before the
    /// capability so a denial on those never costs a store round trip.
    pub async fn authorize(&self, ctx: &WorkspaceContext, requirement: &Requirement) -> Authorization {
        if !requirement.scope.admits(ctx) {
            debug!("Workspace {} outside scope {:?}", ctx.workspace_id, requirement.scope);
            return Authorization::deny(DeniedReason::WorkspaceNotPermitted);
        }

        if let Some(role) = requirement.min_role {
            if !ctx.has_role(role) {
                debug!(
                    "Role {:?} does not satisfy {} in workspace {}",
                    ctx.role, role, ctx.workspace_id
                );
                return Authorization::deny(DeniedReason::InsufficientRole);
            }
        }

        if let Some(capability) = &requirement.capability {
            let decision = self
                .resolve_capabilities(&ctx.workspace_id, std::slice::from_ref(capability))
                .await;
            if !decision.is_enabled(capability.as_str()) {
                return Authorization::deny(decision.denied_reason.unwrap_or(DeniedReason::MissingCapability));
            }
        }

        Authorization::allow()
    }

    /// Server-side gate for a single capability; same predicate as
    /// [`Self::resolve_capabilities`].
    pub async fn authorize_route(&self, workspace: &WorkspaceId, capability: &Capability) -> bool {
        let ctx = WorkspaceContext::workspace_only(*workspace, self.root_workspace);
        self.authorize(&ctx, &Requirement::capability(capability.clone()))
            .await
            .allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreError, WorkspaceConfigEntry};
    use async_trait::async_trait;
    use uuid::Uuid;

    struct BrokenStore;

    #[async_trait]
    impl ConfigStore for BrokenStore {
        async fn get(&self, _: &WorkspaceId, _: &[Capability]) -> Result<Vec<WorkspaceConfigEntry>, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
    }

    struct HangingStore;

    #[async_trait]
    impl ConfigStore for HangingStore {
        async fn get(&self, _: &WorkspaceId, _: &[Capability]) -> Result<Vec<WorkspaceConfigEntry>, StoreError> {
            futures::future::pending().await
        }
    }

    fn caps(names: &[&str]) -> Vec<Capability> {
        names.iter().map(|n| Capability::named(n)).collect()
    }

    async fn seeded() -> (Arc<MemoryStore>, AccessGate, WorkspaceId) {
        let store = Arc::new(MemoryStore::new());
        let ws = WorkspaceId::new(Uuid::new_v4());
        store.put(ws, "ENABLE_CHAT", "true").await;
        store.put(ws, "ENABLE_CALENDAR", "FALSE").await;
        let gate = AccessGate::new(store.clone());
        (store, gate, ws)
    }

    #[tokio::test]
    async fn resolves_example_workspace() {
        let (_, gate, ws) = seeded().await;
        let decision = gate
            .resolve_capabilities(&ws, &caps(&["ENABLE_CHAT", "ENABLE_CALENDAR", "ENABLE_DRIVE"]))
            .await;

        assert_eq!(decision.capabilities.len(), 3);
        assert!(decision.is_enabled("ENABLE_CHAT"));
        assert!(!decision.is_enabled("ENABLE_CALENDAR"));
        assert_eq!(decision.capabilities.get("ENABLE_DRIVE"), Some(&false));
        assert_eq!(decision.denied_reason, Some(DeniedReason::MissingCapability));
    }

    #[tokio::test]
    async fn uses_one_lookup_per_resolution() {
        let (store, gate, ws) = seeded().await;
        gate.resolve_capabilities(&ws, &caps(Capability::KNOWN)).await;
        assert_eq!(store.lookups(), 1);
    }

    #[tokio::test]
    async fn empty_keys_skip_the_store() {
        let (store, gate, ws) = seeded().await;
        let decision = gate.resolve_capabilities(&ws, &[]).await;
        assert!(decision.capabilities.is_empty());
        assert_eq!(decision.denied_reason, None);
        assert_eq!(store.lookups(), 0);
    }

    #[tokio::test]
    async fn value_normalization() {
        let store = Arc::new(MemoryStore::new());
        let ws = WorkspaceId::new(Uuid::new_v4());
        for (key, value) in [
            ("A", "true"),
            ("B", " TRUE "),
            ("C", "True"),
            ("D", "false"),
            ("E", "1"),
            ("F", ""),
            ("G", "yes"),
        ] {
            store.put(ws, key, value).await;
        }
        let gate = AccessGate::new(store);
        let decision = gate.resolve_capabilities(&ws, &caps(&["A", "B", "C", "D", "E", "F", "G"])).await;

        let enabled: Vec<&str> = decision.enabled().map(Capability::as_str).collect();
        assert_eq!(enabled, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn duplicates_resolve_to_most_recent() {
        let store = Arc::new(MemoryStore::new());
        let ws = WorkspaceId::new(Uuid::new_v4());
        store.put(ws, "ENABLE_USERS", "true").await;
        store.put(ws, "ENABLE_USERS", "false").await;
        let gate = AccessGate::new(store);

        let decision = gate.resolve_capabilities(&ws, &caps(&["ENABLE_USERS"])).await;
        assert!(!decision.is_enabled("ENABLE_USERS"));
    }

    #[tokio::test]
    async fn idempotent_without_config_changes() {
        let (_, gate, ws) = seeded().await;
        let keys = caps(&["ENABLE_CHAT", "ENABLE_CALENDAR", "ENABLE_AI"]);
        let first = gate.resolve_capabilities(&ws, &keys).await;
        let second = gate.resolve_capabilities(&ws, &keys).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn fails_closed_on_store_error() {
        let gate = AccessGate::new(Arc::new(BrokenStore));
        let ws = WorkspaceId::new(Uuid::new_v4());
        let decision = gate.resolve_capabilities(&ws, &caps(&["ENABLE_CHAT", "ENABLE_USERS"])).await;

        assert_eq!(decision.capabilities.len(), 2);
        assert!(decision.capabilities.values().all(|enabled| !enabled));
        assert_eq!(decision.denied_reason, Some(DeniedReason::ConfigUnavailable));
        assert!(!gate.authorize_route(&ws, &Capability::named("ENABLE_CHAT")).await);
    }

    #[tokio::test]
    async fn fails_closed_on_timeout() {
        let gate = AccessGate::new(Arc::new(HangingStore)).with_lookup_timeout(Duration::from_millis(20));
        let ws = WorkspaceId::new(Uuid::new_v4());
        let decision = gate.resolve_capabilities(&ws, &caps(&["ENABLE_CHAT"])).await;
        assert!(decision.is_fail_closed());
        assert!(!decision.is_enabled("ENABLE_CHAT"));
    }

    #[tokio::test]
    async fn route_check_agrees_with_resolution() {
        let (_, gate, ws) = seeded().await;
        for name in ["ENABLE_CHAT", "ENABLE_CALENDAR", "ENABLE_DRIVE", "SOMETHING_NEW"] {
            let capability = Capability::named(name);
            let resolved = gate
                .resolve_capabilities(&ws, std::slice::from_ref(&capability))
                .await
                .is_enabled(name);
            assert_eq!(gate.authorize_route(&ws, &capability).await, resolved, "{name}");
        }
    }

    #[tokio::test]
    async fn composes_role_and_capability() {
        let (store, gate, ws) = seeded().await;
        let root = gate.root_workspace();
        let owner = WorkspaceContext::new(ws, Uuid::new_v4(), WorkspaceRole::Owner, root);
        let member = WorkspaceContext::new(ws, Uuid::new_v4(), WorkspaceRole::Member, root);

        let requirement = Requirement::capability("ENABLE_CHAT").with_role(WorkspaceRole::Owner);
        assert!(gate.authorize(&owner, &requirement).await.allowed);

        let denied = gate.authorize(&member, &requirement).await;
        assert!(!denied.allowed);
        assert_eq!(denied.reason, Some(DeniedReason::InsufficientRole));

        let lookups = store.lookups();
        let denied = gate
            .authorize(&owner, &Requirement::capability("ENABLE_CALENDAR"))
            .await;
        assert_eq!(denied.reason, Some(DeniedReason::MissingCapability));
        assert_eq!(store.lookups(), lookups + 1);

        assert!(gate.authorize(&member, &Requirement::none()).await.allowed);
    }

    #[tokio::test]
    async fn root_scope_rules() {
        let (_, gate, ws) = seeded().await;
        let root = gate.root_workspace();
        let admin_here = WorkspaceContext::new(ws, Uuid::new_v4(), WorkspaceRole::Admin, root);
        let admin_root = WorkspaceContext::new(root, Uuid::new_v4(), WorkspaceRole::Admin, root);
        let member_root = WorkspaceContext::new(root, Uuid::new_v4(), WorkspaceRole::Member, root);

        let infra = Requirement::root_admin();
        assert!(gate.authorize(&admin_root, &infra).await.allowed);
        assert_eq!(
            gate.authorize(&admin_here, &infra).await.reason,
            Some(DeniedReason::WorkspaceNotPermitted)
        );
        assert_eq!(
            gate.authorize(&member_root, &infra).await.reason,
            Some(DeniedReason::InsufficientRole)
        );

        let delete = Requirement::role(WorkspaceRole::Owner).with_scope(WorkspaceScope::ExcludeRoot);
        let owner_root = WorkspaceContext::new(root, Uuid::new_v4(), WorkspaceRole::Owner, root);
        assert_eq!(
            gate.authorize(&owner_root, &delete).await.reason,
            Some(DeniedReason::WorkspaceNotPermitted)
        );
    }

    #[test]
    fn requirement_deserializes_with_defaults() {
        let req: Requirement = serde_json::from_str(r#"{"capability": "ENABLE_CHAT", "role": "OWNER"}"#).unwrap();
        assert_eq!(req.capability, Some(Capability::named("ENABLE_CHAT")));
        assert_eq!(req.min_role, Some(WorkspaceRole::Owner));
        assert_eq!(req.scope, WorkspaceScope::Any);

        let empty: Requirement = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, Requirement::none());
    }
}
