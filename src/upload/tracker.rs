use futures::future::join_all;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{ObjectSink, UploadError};
use crate::config::UploadConfig;
use crate::types::WorkspaceId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UploadId(Uuid);

impl UploadId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for UploadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UploadStatus {
    Idle,
    Uploading,
    Uploaded,
    Error { message: String },
}

impl UploadStatus {
    pub fn name(&self) -> &'static str {
        match self {
            UploadStatus::Idle => "idle",
            UploadStatus::Uploading => "uploading",
            UploadStatus::Uploaded => "uploaded",
            UploadStatus::Error { .. } => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadEntry {
    pub id: UploadId,
    pub file_name: String,
    pub size: u64,
    #[serde(flatten)]
    pub status: UploadStatus,
    #[serde(skip)]
    seq: u64,
}

/// Body of a tracked file handed to [`UploadTracker::upload_all`]
#[derive(Debug, Clone)]
pub struct PendingUpload {
    pub id: UploadId,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_file_count: usize,
    pub max_file_size_bytes: u64,
    pub timeout: Duration,
}

impl From<&UploadConfig> for UploadLimits {
    fn from(config: &UploadConfig) -> Self {
        Self {
            max_file_count: config.max_file_count,
            max_file_size_bytes: config.max_file_size_bytes,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self::from(&UploadConfig::default())
    }
}

#[derive(Default)]
struct Entries {
    by_id: HashMap<UploadId, UploadEntry>,
    next_seq: u64,
}

/// Per-file upload status, updated one key at a time so concurrent
/// completions never overwrite each other.
#[derive(Default)]
pub struct UploadTracker {
    entries: RwLock<Entries>,
    limits: UploadLimits,
}

impl UploadTracker {
    pub fn new(limits: UploadLimits) -> Self {
        Self {
            entries: RwLock::new(Entries::default()),
            limits,
        }
    }

    pub fn limits(&self) -> &UploadLimits {
        &self.limits
    }

    /// Register a file in `idle` state
    pub async fn track(&self, file_name: impl Into<String>, size: u64) -> Result<UploadId, UploadError> {
        let file_name = file_name.into();
        if size > self.limits.max_file_size_bytes {
            return Err(UploadError::TooLarge {
                name: file_name,
                size,
                max: self.limits.max_file_size_bytes,
            });
        }

        let id = UploadId::generate();
        let mut entries = self.entries.write().await;
        let seq = entries.next_seq;
        entries.next_seq += 1;
        entries.by_id.insert(
            id,
            UploadEntry {
                id,
                file_name,
                size,
                status: UploadStatus::Idle,
                seq,
            },
        );
        Ok(id)
    }

    pub async fn status(&self, id: UploadId) -> Option<UploadStatus> {
        self.entries.read().await.by_id.get(&id).map(|entry| entry.status.clone())
    }

    /// All tracked files in the order they were tracked
    pub async fn snapshot(&self) -> Vec<UploadEntry> {
        let entries = self.entries.read().await;
        let mut all: Vec<UploadEntry> = entries.by_id.values().cloned().collect();
        all.sort_by_key(|entry| entry.seq);
        all
    }

    /// Move `id` to `uploading`. Returns false without changing anything when
    /// the file is already uploaded or in flight.
    pub async fn begin(&self, id: UploadId) -> Result<bool, UploadError> {
        let mut entries = self.entries.write().await;
        let entry = entries.by_id.get_mut(&id).ok_or(UploadError::UnknownUpload(id))?;
        match entry.status {
            UploadStatus::Idle | UploadStatus::Error { .. } => {
                entry.status = UploadStatus::Uploading;
                Ok(true)
            }
            UploadStatus::Uploading | UploadStatus::Uploaded => Ok(false),
        }
    }

    /// Record the outcome of an in-flight upload
    pub async fn finish(&self, id: UploadId, outcome: Result<(), UploadError>) -> Result<UploadStatus, UploadError> {
        let mut entries = self.entries.write().await;
        let entry = entries.by_id.get_mut(&id).ok_or(UploadError::UnknownUpload(id))?;
        if entry.status != UploadStatus::Uploading {
            return Err(UploadError::InvalidTransition {
                id,
                from: entry.status.name(),
                to: if outcome.is_ok() { "uploaded" } else { "error" },
            });
        }

        entry.status = match outcome {
            Ok(()) => UploadStatus::Uploaded,
            Err(e) => UploadStatus::Error { message: e.to_string() },
        };
        Ok(entry.status.clone())
    }

    async fn file_name(&self, id: UploadId) -> Option<String> {
        self.entries.read().await.by_id.get(&id).map(|entry| entry.file_name.clone())
    }

    /// Upload every file in `batch` concurrently, one future per file.
    ///
    /// Files already uploaded are skipped. Each upload is bounded by the
    /// configured timeout and aborted when `cancel` flips to true; both end
    /// in `error` so the file can be resubmitted. Returns the entries of this
    /// batch in batch order.
    pub async fn upload_all(
        &self,
        workspace: &WorkspaceId,
        batch: Vec<PendingUpload>,
        sink: &dyn ObjectSink,
        cancel: watch::Receiver<bool>,
    ) -> Result<Vec<UploadEntry>, UploadError> {
        if batch.len() > self.limits.max_file_count {
            return Err(UploadError::TooManyFiles {
                count: batch.len(),
                max: self.limits.max_file_count,
            });
        }

        let ids: Vec<UploadId> = batch.iter().map(|pending| pending.id).collect();
        let jobs = batch.into_iter().map(move |pending| {
            let mut cancel = cancel.clone();
            async move {
                match self.begin(pending.id).await {
                    Ok(true) => {}
                    Ok(false) => {
                        debug!("Skipping upload {}: already uploaded or in flight", pending.id);
                        return;
                    }
                    Err(e) => {
                        warn!("Cannot start upload {}: {}", pending.id, e);
                        return;
                    }
                }

                let file_name = self.file_name(pending.id).await.unwrap_or_default();
                let outcome = tokio::select! {
                    result = tokio::time::timeout(self.limits.timeout, sink.put(workspace, &file_name, pending.body)) => {
                        result.unwrap_or(Err(UploadError::TimedOut(self.limits.timeout)))
                    }
                    _ = cancelled(&mut cancel) => Err(UploadError::Cancelled),
                };

                if let Err(e) = &outcome {
                    warn!("Upload of '{}' ({}) failed: {}", file_name, pending.id, e);
                }
                if let Err(e) = self.finish(pending.id, outcome).await {
                    warn!("Could not record upload {}: {}", pending.id, e);
                }
            }
        });
        join_all(jobs).await;

        let results = self.entries_for(&ids).await;
        let uploaded = results.iter().filter(|e| e.status == UploadStatus::Uploaded).count();
        info!("Upload batch finished: {}/{} files uploaded", uploaded, results.len());
        Ok(results)
    }

    /// Entries for `ids` in the given order; unknown ids are skipped
    async fn entries_for(&self, ids: &[UploadId]) -> Vec<UploadEntry> {
        let entries = self.entries.read().await;
        ids.iter().filter_map(|id| entries.by_id.get(id).cloned()).collect()
    }

    /// Stop tracking `id`. Files still uploading are kept.
    pub async fn forget(&self, id: UploadId) -> Result<Option<UploadEntry>, UploadError> {
        let mut entries = self.entries.write().await;
        let in_flight = match entries.by_id.get(&id) {
            None => return Ok(None),
            Some(entry) => entry.status == UploadStatus::Uploading,
        };
        if in_flight {
            return Err(UploadError::InvalidTransition {
                id,
                from: "uploading",
                to: "forgotten",
            });
        }
        Ok(entries.by_id.remove(&id))
    }

    /// Drop every finished (`uploaded`) entry; returns how many were removed
    pub async fn clear_uploaded(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.by_id.len();
        entries.by_id.retain(|_, entry| entry.status != UploadStatus::Uploaded);
        before - entries.by_id.len()
    }
}

/// Resolves once the flag is set; never resolves if the sender goes away first
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            futures::future::pending::<()>().await;
        }
    }
}
