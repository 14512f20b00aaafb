pub mod auth;
pub mod gate;
pub mod response;
pub mod workspace;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use gate::{require_middleware, RouteGuard};
pub use response::{ApiResponse, ApiResult};
pub use workspace::workspace_context_middleware;
