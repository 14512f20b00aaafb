// handlers/protected/mod.rs - Workspace handlers
//
// Route Prefix: /api/v1/workspaces/:ws_id
// Middleware: JWT validation, then workspace membership (WorkspaceContext)
mod authorize;
mod capabilities;
mod navigation;
mod settings;

pub use authorize::authorize_post;
pub use capabilities::capabilities_get;
pub use navigation::{navigation_entry_get, navigation_get};
pub use settings::settings_panels_get;
