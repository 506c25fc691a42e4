//! Dashboard server command: `agent-dashboard serve`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use agent_dashboard::config::DashboardToml;
use agent_dashboard::dashboard::api::AppState;
use agent_dashboard::dashboard::server::{ServerConfig, start_server};

pub async fn cmd_serve(
    config_path: &Path,
    verbose: bool,
    port: Option<u16>,
    workspace_root: Option<PathBuf>,
    dev: bool,
    open: bool,
) -> Result<()> {
    let mut config = DashboardToml::load_or_default(config_path)?;
    agent_dashboard::logging::init(verbose, &config.logging);

    for warning in config.validate() {
        tracing::warn!(config = %config_path.display(), "{}", warning);
    }

    // CLI flags win over both the file and the environment.
    if let Some(port) = port {
        config.server.port = port;
    }
    let workspace_root = workspace_root.unwrap_or_else(|| config.workspace_root());

    let state = AppState::with_workspace_root(&config, workspace_root)
        .context("Failed to set up dashboard")?;

    // Spawn browser open before starting the server (which blocks)
    if open {
        let url = format!("http://localhost:{}", config.server.port);
        tokio::spawn(async move {
            // Small delay to let the server start binding
            tokio::time::sleep(tokio::time::Duration::from_millis(500)).await;
            if let Err(e) = open::that(&url) {
                tracing::warn!(url = %url, error = %e, "failed to open browser");
            }
        });
    }

    start_server(
        ServerConfig {
            host: config.server.host.clone(),
            port: config.server.port,
            dev_mode: dev,
        },
        state,
    )
    .await
}
