#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{header::AUTHORIZATION, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use workspace_gate::app::{app, AppState};
use workspace_gate::auth::{generate_jwt, Claims};
use workspace_gate::gate::{AccessGate, RouteTable};
use workspace_gate::store::MemoryStore;
use workspace_gate::types::{WorkspaceId, WorkspaceRole};

pub const SECRET: &str = "test-secret";

/// In-process app over [`MemoryStore`]s
pub struct TestApp {
    /// Backs the gate's flag lookups
    pub configs: Arc<MemoryStore>,
    /// Backs workspace membership
    pub members: Arc<MemoryStore>,
    pub gate: AccessGate,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::with_stores(store.clone(), store)
    }

    /// Flags and membership in separate stores so one can go offline alone
    pub fn split() -> Self {
        Self::with_stores(Arc::new(MemoryStore::new()), Arc::new(MemoryStore::new()))
    }

    fn with_stores(configs: Arc<MemoryStore>, members: Arc<MemoryStore>) -> Self {
        let gate = AccessGate::new(configs.clone());
        let state = AppState::new(gate.clone(), members.clone(), RouteTable::dashboard(), SECRET);
        Self {
            configs,
            members,
            gate,
            state,
        }
    }

    pub fn router(&self) -> Router {
        app(self.state.clone())
    }

    /// New workspace with `user` as a member
    pub async fn workspace(&self, user: Uuid, role: WorkspaceRole) -> WorkspaceId {
        let ws = WorkspaceId::new(Uuid::new_v4());
        self.members.add_member(ws, user, role).await;
        ws
    }

    pub async fn flags(&self, ws: WorkspaceId, flags: &[(&str, &str)]) {
        for (key, value) in flags {
            self.configs.put(ws, key, value).await;
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        send(self.router(), Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        send(self.router(), Method::POST, uri, token, Some(body)).await
    }
}

pub fn token_for(user: Uuid) -> String {
    generate_jwt(&Claims::new(user, 1), SECRET).expect("token")
}

pub async fn send(
    router: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = router.oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, json))
}
