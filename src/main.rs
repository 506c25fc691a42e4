use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;

#[derive(Parser)]
#[command(name = "agent-dashboard")]
#[command(version, about = "Launch coding agents against GitHub issues and track their progress")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to dashboard.toml
    #[arg(long, global = true, default_value_os_t = agent_dashboard::config::default_config_path())]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the dashboard HTTP server
    Serve {
        /// Port to serve on (overrides [server] port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory holding agent workspaces (overrides [workspace] root)
        #[arg(long)]
        workspace_root: Option<PathBuf>,

        /// Enable dev mode (CORS permissive for a separately served frontend)
        #[arg(long)]
        dev: bool,

        /// Open the dashboard in a browser once the server is up
        #[arg(long)]
        open: bool,
    },
    /// View, create or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Write a default dashboard.toml
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Serve {
            port,
            workspace_root,
            dev,
            open,
        } => {
            cmd::cmd_serve(
                &cli.config,
                cli.verbose,
                *port,
                workspace_root.clone(),
                *dev,
                *open,
            )
            .await?;
        }
        Commands::Config { command } => cmd::cmd_config(&cli.config, command.clone())?,
    }

    Ok(())
}
