use axum::extract::{Extension, Path, Query, State};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::app::AppState;
use crate::error::ApiError;
use crate::gate::{
    filter_navigation, workspace_relative_path, Capability, DeniedReason, NavigationItem, Requirement,
};
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::WorkspaceContext;

#[derive(Debug, Deserialize)]
pub struct NavigationQuery {
    /// Current dashboard path, absolute (`/{ws}/chat`) or workspace-relative
    pub path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NavigationLink<'a> {
    #[serde(flatten)]
    pub item: NavigationItem<'a>,
    pub href: String,
}

#[derive(Debug, Serialize)]
pub struct NavigationView<'a> {
    pub items: Vec<NavigationLink<'a>>,
    pub allowed_routes: BTreeSet<String>,
    pub denied_reason: Option<DeniedReason>,
}

/// GET /api/v1/workspaces/:ws_id/navigation - Annotated dashboard tabs
pub async fn navigation_get(
    State(state): State<AppState>,
    Query(query): Query<NavigationQuery>,
    Extension(ctx): Extension<WorkspaceContext>,
) -> ApiResult<serde_json::Value> {
    let workspace = ctx.workspace_id.to_string();
    let current = workspace_relative_path(query.path.as_deref().unwrap_or("/"), &ctx.workspace_id);

    let entries = state.routes.entries();
    let decision = state
        .gate
        .resolve_capabilities(&ctx.workspace_id, &state.routes.capabilities())
        .await;

    let items = filter_navigation(entries, &decision, current)
        .into_iter()
        .map(|item| NavigationLink {
            href: workspace_href(&workspace, &item.entry.target),
            item,
        })
        .collect();

    let view = NavigationView {
        items,
        allowed_routes: decision.allowed_routes(entries),
        denied_reason: decision.denied_reason,
    };

    // Borrowed view cannot outlive `state`, so serialize before returning
    let data = serde_json::to_value(&view)
        .map_err(|e| ApiError::internal_server_error(format!("Failed to serialize navigation: {}", e)))?;
    Ok(ApiResponse::success(data))
}

/// GET /api/v1/workspaces/:ws_id/navigation/:name - Server-side check for one tab
pub async fn navigation_entry_get(
    State(state): State<AppState>,
    Path((_, name)): Path<(String, String)>,
    Extension(ctx): Extension<WorkspaceContext>,
) -> ApiResult<serde_json::Value> {
    let entry = state
        .routes
        .entries()
        .iter()
        .find(|entry| entry.name == name)
        .ok_or_else(|| ApiError::not_found(format!("Unknown navigation entry '{}'", name)))?;

    if entry.disabled {
        return Err(ApiError::denied(DeniedReason::WorkspaceNotPermitted));
    }

    if let Some(capability) = &entry.required_capability {
        let authorization = state
            .gate
            .authorize(&ctx, &Requirement::capability(capability.clone()))
            .await;
        if let Some(reason) = authorization.reason {
            return Err(ApiError::denied(reason));
        }
    }

    let workspace = ctx.workspace_id.to_string();
    Ok(ApiResponse::success(serde_json::json!({
        "name": entry.name,
        "href": workspace_href(&workspace, &entry.target),
        "required_capability": entry.required_capability.as_ref().map(Capability::as_str),
        "allowed": true,
    })))
}

fn workspace_href(workspace: &str, target: &str) -> String {
    if target == "/" {
        format!("/{}", workspace)
    } else {
        format!("/{}{}", workspace, target)
    }
}
