use axum::{
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::database::DatabaseManager;
use crate::gate::{AccessGate, RouteTable};
use crate::handlers::{protected, public};
use crate::middleware::{jwt_auth_middleware, workspace_context_middleware};
use crate::store::MembershipStore;

/// Shared state handed to every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub gate: AccessGate,
    pub members: Arc<dyn MembershipStore>,
    pub routes: Arc<RouteTable>,
    pub jwt_secret: Arc<str>,
    /// Present when backed by Postgres; reported by `/health`
    pub db: Option<Arc<DatabaseManager>>,
}

impl AppState {
    pub fn new(gate: AccessGate, members: Arc<dyn MembershipStore>, routes: RouteTable, jwt_secret: &str) -> Self {
        Self {
            gate,
            members,
            routes: Arc::new(routes),
            jwt_secret: Arc::from(jwt_secret),
            db: None,
        }
    }

    pub fn with_database(mut self, db: Arc<DatabaseManager>) -> Self {
        self.db = Some(db);
        self
    }
}

/// Full router without CORS; see [`app_with_security`]
pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        // Workspace-scoped API
        .merge(workspace_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub fn app_with_security(state: AppState, security: &SecurityConfig) -> Router {
    let router = app(state);
    if security.enable_cors {
        router.layer(cors_layer(security))
    } else {
        router
    }
}

fn workspace_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/workspaces/:ws_id/capabilities", get(protected::capabilities_get))
        .route("/api/v1/workspaces/:ws_id/navigation", get(protected::navigation_get))
        .route("/api/v1/workspaces/:ws_id/navigation/:name", get(protected::navigation_entry_get))
        .route("/api/v1/workspaces/:ws_id/settings/panels", get(protected::settings_panels_get))
        .route("/api/v1/workspaces/:ws_id/authorize", post(protected::authorize_post))
        // Layers run bottom-up: JWT first, then workspace membership
        .route_layer(from_fn_with_state(state.clone(), workspace_context_middleware))
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.is_empty() || security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    CorsLayer::permissive().allow_origin(AllowOrigin::list(origins))
}
