//! Configuration view and validation commands: `agent-dashboard config`.

use std::path::Path;

use anyhow::{Context, Result};

use super::super::ConfigCommands;
use agent_dashboard::config::DashboardToml;

pub fn cmd_config(config_path: &Path, command: Option<ConfigCommands>) -> Result<()> {
    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Agent Dashboard Configuration");
            println!("=============================");
            println!();

            let toml = if config_path.exists() {
                println!("Config file: {}", config_path.display());
                DashboardToml::load(config_path)?
            } else {
                println!("No dashboard.toml found at {}", config_path.display());
                println!("Using default configuration.");
                DashboardToml::default()
            };
            println!();

            let rendered =
                toml::to_string_pretty(&toml).context("Failed to render configuration")?;
            println!("{}", rendered.trim_end());
            println!();

            // Effective values include environment overrides
            println!("Effective values (with env overrides):");
            println!("  claude_cmd = \"{}\"", toml.claude_cmd());
            println!("  gh_cmd = \"{}\"", toml.gh_cmd());
            println!("  skip_permissions = {}", toml.skip_permissions());
            println!("  workspace_root = \"{}\"", toml.workspace_root().display());
            println!();

            if !config_path.exists() {
                println!("Run 'agent-dashboard config init' to create a dashboard.toml file.");
                println!();
            }
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            if !config_path.exists() {
                println!("No dashboard.toml found. Using defaults (valid).");
                return Ok(());
            }

            let toml = DashboardToml::load(config_path)?;
            let warnings = toml.validate();

            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("dashboard.toml already exists at {}", config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            if let Some(parent) = config_path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create config directory: {}", parent.display())
                })?;
            }

            DashboardToml::default().save(config_path)?;

            println!("Created dashboard.toml at {}", config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [server] port, host");
            println!("  - [workspace] root");
            println!("  - [agent] claude_cmd, gh_cmd, skip_permissions, extra_args");
            println!("  - [markers] pull_request, roadblock, auth_failures");
            println!();
        }
    }

    Ok(())
}
