use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::app::AppState;

pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Workspace Gate",
            "version": version,
            "description": "Feature-flag gated navigation and access control for workspace dashboards",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "capabilities": "/api/v1/workspaces/:ws_id/capabilities?keys=A,B (protected)",
                "navigation": "/api/v1/workspaces/:ws_id/navigation?path=/... (protected)",
                "navigation_entry": "/api/v1/workspaces/:ws_id/navigation/:name (protected)",
                "settings": "/api/v1/workspaces/:ws_id/settings/panels (protected)",
                "authorize": "/api/v1/workspaces/:ws_id/authorize (protected)",
            }
        }
    }))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    let Some(db) = &state.db else {
        return (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "store": "memory"
                }
            })),
        );
    };

    match db.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "store": "postgres",
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "store": "postgres",
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
