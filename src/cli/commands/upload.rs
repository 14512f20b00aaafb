use anyhow::Context;
use clap::Args;
use serde_json::json;
use std::path::PathBuf;
use tokio::sync::watch;

use crate::cli::utils::{output_error, output_success};
use crate::cli::{OutputFormat, Remote};
use crate::config::config;
use crate::types::WorkspaceId;
use crate::upload::{HttpObjectSink, PendingUpload, UploadLimits, UploadStatus, UploadTracker};

#[derive(Args)]
pub struct UploadArgs {
    #[arg(help = "Workspace id")]
    pub workspace: String,

    #[arg(required = true, help = "Files to upload")]
    pub files: Vec<PathBuf>,

    #[arg(long, env = "WSGATE_UPLOAD_ENDPOINT", help = "Dashboard base URL (defaults to --server)")]
    pub endpoint: Option<String>,
}

pub async fn handle(args: UploadArgs, remote: &Remote, output_format: OutputFormat) -> anyhow::Result<()> {
    let workspace: WorkspaceId = args.workspace.parse()?;
    let limits = UploadLimits::from(&config().upload);
    let tracker = UploadTracker::new(limits);

    let mut batch = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let metadata = tokio::fs::metadata(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        // Size is checked before the body is read
        let id = tracker.track(file_name, metadata.len()).await?;
        let body = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        batch.push(PendingUpload { id, body });
    }

    let endpoint = args.endpoint.as_deref().unwrap_or(&remote.server);
    let sink = HttpObjectSink::new(endpoint, limits.timeout)?.with_token(remote.token.clone());

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Cancelling uploads");
            let _ = cancel_tx.send(true);
        }
    });

    let entries = tracker.upload_all(&workspace, batch, &sink, cancel_rx).await?;
    let failed = entries
        .iter()
        .filter(|entry| matches!(entry.status, UploadStatus::Error { .. }))
        .count();

    match output_format {
        OutputFormat::Json => {
            output_success(
                &output_format,
                &format!("{} of {} files uploaded", entries.len() - failed, entries.len()),
                Some(json!({ "uploads": entries })),
            )?;
        }
        OutputFormat::Text => {
            for entry in &entries {
                match &entry.status {
                    UploadStatus::Error { message } => {
                        output_error(&output_format, &format!("{}: {}", entry.file_name, message), None)?
                    }
                    status => println!("✓ {} ({} bytes) {}", entry.file_name, entry.size, status.name()),
                }
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} upload(s) failed", failed);
    }
    Ok(())
}
