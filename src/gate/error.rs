use thiserror::Error;

/// Hard failures of the gate layer. Store problems never show up here:
/// they collapse into a denied decision instead.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("Invalid workspace identifier: '{0}'")]
    InvalidWorkspaceId(String),

    #[error("Unknown workspace role: '{0}'")]
    UnknownRole(String),

    #[error("Invalid capability name: '{0}'")]
    InvalidCapability(String),

    #[error("Failed to read route table {path}: {source}")]
    RouteTableIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse route table {path}: {source}")]
    RouteTableParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
