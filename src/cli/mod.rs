pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "wsgate")]
#[command(about = "Workspace Gate CLI - inspect workspace capabilities and upload files")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, conflicts_with = "json", help = "Output in human-readable text format (default)")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(
        long,
        global = true,
        env = "WSGATE_SERVER",
        default_value = "http://localhost:3000",
        help = "Workspace Gate server URL"
    )]
    pub server: String,

    #[arg(long, global = true, env = "WSGATE_TOKEN", hide_env_values = true, help = "Bearer token")]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Resolve feature flags for a workspace")]
    Capabilities(commands::capabilities::CapabilitiesArgs),

    #[command(about = "Show dashboard navigation for a workspace")]
    Nav(commands::nav::NavArgs),

    #[command(about = "Upload files to a workspace")]
    Upload(commands::upload::UploadArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        match (cli.text, cli.json) {
            (false, true) => OutputFormat::Json,
            _ => OutputFormat::Text,
        }
    }
}

/// Connection settings shared by every subcommand
#[derive(Debug, Clone)]
pub struct Remote {
    pub server: String,
    pub token: Option<String>,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let remote = Remote {
        server: cli.server,
        token: cli.token,
    };

    match cli.command {
        Commands::Capabilities(args) => commands::capabilities::handle(args, &remote, output_format).await,
        Commands::Nav(args) => commands::nav::handle(args, &remote, output_format).await,
        Commands::Upload(args) => commands::upload::handle(args, &remote, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format_of(args: &[&str]) -> OutputFormat {
        OutputFormat::from_cli(&Cli::try_parse_from(args).unwrap())
    }

    #[test]
    fn output_format_flags() {
        assert_eq!(format_of(&["wsgate", "nav", "w1"]), OutputFormat::Text);
        assert_eq!(format_of(&["wsgate", "--text", "nav", "w1"]), OutputFormat::Text);
        assert_eq!(format_of(&["wsgate", "--json", "nav", "w1"]), OutputFormat::Json);
        // Global flags are accepted after the subcommand too
        assert_eq!(format_of(&["wsgate", "nav", "w1", "--json"]), OutputFormat::Json);
    }

    #[test]
    fn text_and_json_conflict() {
        assert!(Cli::try_parse_from(["wsgate", "--text", "--json", "nav", "w1"]).is_err());
    }
}
