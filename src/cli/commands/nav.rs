use clap::Args;

use crate::cli::utils::{api_get, mark, output_success, workspace_url};
use crate::cli::{OutputFormat, Remote};

#[derive(Args)]
pub struct NavArgs {
    #[arg(help = "Workspace id")]
    pub workspace: String,

    #[arg(long, help = "Current dashboard path used to mark the active tab")]
    pub path: Option<String>,
}

pub async fn handle(args: NavArgs, remote: &Remote, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut url = workspace_url(remote, &args.workspace, "navigation")?;
    if let Some(path) = &args.path {
        url.query_pairs_mut().append_pair("path", path);
    }

    let data = api_get(remote, url).await?;

    match output_format {
        OutputFormat::Json => output_success(&output_format, "Navigation resolved", Some(data)),
        OutputFormat::Text => {
            for item in data["items"].as_array().into_iter().flatten() {
                let active = if item["active"].as_bool().unwrap_or(false) { "*" } else { " " };
                println!(
                    "{} {} {:<12} {}",
                    active,
                    mark(item["enabled"].as_bool().unwrap_or(false)),
                    item["name"].as_str().unwrap_or_default(),
                    item["href"].as_str().unwrap_or_default()
                );
            }
            if let Some(reason) = data["denied_reason"].as_str() {
                println!("Denied reason: {}", reason);
            }
            Ok(())
        }
    }
}
