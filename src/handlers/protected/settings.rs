use axum::extract::{Extension, State};
use serde::Serialize;

use crate::app::AppState;
use crate::gate::{settings_capabilities, settings_panels, DeniedReason, SettingsPanel};
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::{WorkspaceContext, WorkspaceRole};

#[derive(Debug, Serialize)]
pub struct SettingsView {
    pub role: Option<WorkspaceRole>,
    pub is_root_workspace: bool,
    pub panels: Vec<SettingsPanel>,
    pub denied_reason: Option<DeniedReason>,
}

/// GET /api/v1/workspaces/:ws_id/settings/panels - Settings page sections
pub async fn settings_panels_get(
    State(state): State<AppState>,
    Extension(ctx): Extension<WorkspaceContext>,
) -> ApiResult<SettingsView> {
    let decision = state
        .gate
        .resolve_capabilities(&ctx.workspace_id, &settings_capabilities())
        .await;

    Ok(ApiResponse::success(SettingsView {
        role: ctx.role,
        is_root_workspace: ctx.is_root_workspace,
        panels: settings_panels(&ctx, &decision),
        denied_reason: decision.denied_reason,
    }))
}
