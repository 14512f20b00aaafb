// Access gate: workspace feature flags -> access decisions, navigation state,
// settings panels and route authorization.

pub mod capability;
pub mod decision;
pub mod error;
pub mod navigation;
pub mod resolver;
pub mod settings;

pub use capability::{is_flag_enabled, parse_capability_list, Capability};
pub use decision::{AccessDecision, DeniedReason};
pub use error::GateError;
pub use navigation::{filter_navigation, workspace_relative_path, NavigationEntry, NavigationItem, RouteTable};
pub use resolver::{AccessGate, Authorization, Requirement, WorkspaceScope};
pub use settings::{settings_capabilities, settings_panels, SettingsPanel, SettingsSection};
