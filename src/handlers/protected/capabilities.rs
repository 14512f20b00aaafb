use axum::extract::{Extension, Query, State};
use serde::Deserialize;

use crate::app::AppState;
use crate::gate::{parse_capability_list, AccessDecision};
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::WorkspaceContext;

#[derive(Debug, Deserialize)]
pub struct CapabilitiesQuery {
    /// Comma-separated capability names. Defaults to every capability the
    /// route table depends on.
    pub keys: Option<String>,
}

/// GET /api/v1/workspaces/:ws_id/capabilities - Resolve feature flags
pub async fn capabilities_get(
    State(state): State<AppState>,
    Query(query): Query<CapabilitiesQuery>,
    Extension(ctx): Extension<WorkspaceContext>,
) -> ApiResult<AccessDecision> {
    let keys = match query.keys.as_deref() {
        Some(raw) => parse_capability_list(raw)?,
        None => state.routes.capabilities(),
    };

    let decision = state.gate.resolve_capabilities(&ctx.workspace_id, &keys).await;
    Ok(ApiResponse::success(decision))
}
