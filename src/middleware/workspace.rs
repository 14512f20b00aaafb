use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;

use super::auth::AuthUser;
use crate::app::AppState;
use crate::error::ApiError;
use crate::types::{WorkspaceContext, WorkspaceId};

/// Middleware that validates `:ws_id`, checks the caller is a member of that
/// workspace and injects the resulting [`WorkspaceContext`].
pub async fn workspace_context_middleware(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let raw = params
        .get("ws_id")
        .ok_or_else(|| ApiError::internal_server_error("Route is missing the :ws_id parameter"))?;
    let workspace: WorkspaceId = raw.parse()?;

    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("JWT authentication required before workspace validation"))?;

    let role = state.members.role(&workspace, &auth_user.user_id).await?;

    let Some(role) = role else {
        tracing::warn!(
            "Workspace validation failed: user {} is not a member of {}",
            auth_user.user_id,
            workspace
        );
        return Err(ApiError::forbidden(format!("Not a member of workspace '{}'", workspace)));
    };

    let ctx = WorkspaceContext::new(workspace, auth_user.user_id, role, state.gate.root_workspace());
    tracing::debug!(
        "Workspace context: user {} is {} in {}{}",
        auth_user.user_id,
        role,
        workspace,
        if ctx.is_root_workspace { " (root)" } else { "" }
    );

    request.extensions_mut().insert(ctx);
    Ok(next.run(request).await)
}
