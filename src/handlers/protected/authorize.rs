use axum::extract::{rejection::JsonRejection, Extension, Json, State};

use crate::app::AppState;
use crate::gate::{Authorization, Requirement};
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::WorkspaceContext;

/// POST /api/v1/workspaces/:ws_id/authorize - Evaluate a requirement for the caller
///
/// Answers 200 either way; the body carries `allowed` and `reason`. A body
/// that does not describe a requirement is a 400.
pub async fn authorize_post(
    State(state): State<AppState>,
    Extension(ctx): Extension<WorkspaceContext>,
    payload: Result<Json<Requirement>, JsonRejection>,
) -> ApiResult<Authorization> {
    let Json(requirement) = payload?;
    let authorization = state.gate.authorize(&ctx, &requirement).await;
    tracing::debug!(
        "Authorize {:?} for {:?} in {}: {:?}",
        requirement,
        ctx.user_id,
        ctx.workspace_id,
        authorization
    );
    Ok(ApiResponse::success(authorization))
}
