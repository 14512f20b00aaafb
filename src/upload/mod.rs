// Upload status tracking for workspace file uploads.
//
// Files move idle -> uploading -> uploaded | error. Each tracked file gets a
// generated id; the file name is display metadata only, so two files sharing
// a name never share a status.

pub mod http;
pub mod tracker;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::types::WorkspaceId;

pub use http::HttpObjectSink;
pub use tracker::{PendingUpload, UploadEntry, UploadId, UploadLimits, UploadStatus, UploadTracker};

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Too many files: {count} (max {max})")]
    TooManyFiles { count: usize, max: usize },

    #[error("File '{name}' is {size} bytes (max {max})")]
    TooLarge { name: String, size: u64, max: u64 },

    #[error("Unknown upload: {0}")]
    UnknownUpload(UploadId),

    #[error("Upload {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: UploadId,
        from: &'static str,
        to: &'static str,
    },

    #[error("Upload rejected with status {status}")]
    Rejected { status: u16 },

    #[error("Upload transport error: {0}")]
    Transport(String),

    #[error("Invalid upload endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Upload timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Upload cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for UploadError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UploadError::Transport(format!("request timed out: {}", err))
        } else {
            UploadError::Transport(err.to_string())
        }
    }
}

/// Object storage collaborator receiving file bodies
#[async_trait]
pub trait ObjectSink: Send + Sync {
    async fn put(&self, workspace: &WorkspaceId, file_name: &str, body: Vec<u8>) -> Result<(), UploadError>;
}
