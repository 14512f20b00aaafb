use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    Extension,
};
use std::sync::Arc;

use crate::error::ApiError;
use crate::gate::{AccessGate, Requirement};
use crate::types::WorkspaceContext;

/// State for [`require_middleware`]: the gate plus the requirement of the
/// routes it guards.
#[derive(Clone)]
pub struct RouteGuard {
    gate: AccessGate,
    requirement: Arc<Requirement>,
}

impl RouteGuard {
    pub fn new(gate: AccessGate, requirement: Requirement) -> Self {
        Self {
            gate,
            requirement: Arc::new(requirement),
        }
    }

    /// Check the guard for one request context
    pub async fn check(&self, ctx: &WorkspaceContext) -> Result<(), ApiError> {
        let authorization = self.gate.authorize(ctx, &self.requirement).await;
        if let Some(reason) = authorization.reason {
            tracing::warn!(
                "Denied {:?} in workspace {}: {}",
                self.requirement,
                ctx.workspace_id,
                reason.as_str()
            );
            return Err(ApiError::denied(reason));
        }
        Ok(())
    }
}

/// Server-side enforcement for mutating routes. Mount with
/// `route_layer(from_fn_with_state(RouteGuard::new(..), require_middleware))`
/// inside the workspace context layer.
pub async fn require_middleware(
    State(guard): State<RouteGuard>,
    Extension(ctx): Extension<WorkspaceContext>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    guard.check(&ctx).await?;
    Ok(next.run(request).await)
}
