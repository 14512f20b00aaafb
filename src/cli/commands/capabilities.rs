use clap::Args;

use crate::cli::utils::{api_get, mark, output_success, workspace_url};
use crate::cli::{OutputFormat, Remote};

#[derive(Args)]
pub struct CapabilitiesArgs {
    #[arg(help = "Workspace id")]
    pub workspace: String,

    #[arg(long, help = "Comma-separated capability names (defaults to the navigation set)")]
    pub keys: Option<String>,
}

pub async fn handle(args: CapabilitiesArgs, remote: &Remote, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut url = workspace_url(remote, &args.workspace, "capabilities")?;
    if let Some(keys) = &args.keys {
        url.query_pairs_mut().append_pair("keys", keys);
    }

    let data = api_get(remote, url).await?;

    match output_format {
        OutputFormat::Json => output_success(&output_format, "Capabilities resolved", Some(data)),
        OutputFormat::Text => {
            println!("Workspace {}", args.workspace);
            if let Some(capabilities) = data["capabilities"].as_object() {
                for (name, enabled) in capabilities {
                    println!("  {} {}", mark(enabled.as_bool().unwrap_or(false)), name);
                }
            }
            if let Some(reason) = data["denied_reason"].as_str() {
                println!("Denied reason: {}", reason);
            }
            Ok(())
        }
    }
}
