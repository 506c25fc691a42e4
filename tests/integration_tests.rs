//! Integration tests for the agent-dashboard binary.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to create an agent-dashboard Command
fn dashboard() -> Command {
    let mut cmd = cargo_bin_cmd!("agent-dashboard");
    cmd.env_remove("CLAUDE_CMD")
        .env_remove("GH_CMD")
        .env_remove("SKIP_PERMISSIONS")
        .env_remove("AGENT_DASHBOARD_WORKSPACE_ROOT");
    cmd
}

// =============================================================================
// Basic CLI Tests
// =============================================================================

mod cli_basics {
    use super::*;

    #[test]
    fn test_help_lists_commands() {
        dashboard()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("serve"))
            .stdout(predicate::str::contains("config"));
    }

    #[test]
    fn test_version() {
        dashboard()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("agent-dashboard"));
    }

    #[test]
    fn test_serve_help_lists_flags() {
        dashboard()
            .args(["serve", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--port"))
            .stdout(predicate::str::contains("--workspace-root"))
            .stdout(predicate::str::contains("--dev"));
    }

    #[test]
    fn test_unknown_command_fails() {
        dashboard().arg("frobnicate").assert().failure();
    }
}

// =============================================================================
// Config Command Tests
// =============================================================================

mod config_command {
    use super::*;

    #[test]
    fn test_config_show_defaults() {
        let dir = TempDir::new().unwrap();

        dashboard()
            .current_dir(dir.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No dashboard.toml found"))
            .stdout(predicate::str::contains("port = 3000"))
            .stdout(predicate::str::contains("claude_cmd = \"claude\""));
    }

    #[test]
    fn test_config_show_reflects_env_override() {
        let dir = TempDir::new().unwrap();

        dashboard()
            .current_dir(dir.path())
            .env("CLAUDE_CMD", "/opt/bin/claude")
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("claude_cmd = \"/opt/bin/claude\""));
    }

    #[test]
    fn test_config_init_creates_file() {
        let dir = TempDir::new().unwrap();

        dashboard()
            .current_dir(dir.path())
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Created dashboard.toml"));

        let path = dir.path().join(".agent-dashboard/dashboard.toml");
        let content = fs::read_to_string(path).unwrap();
        assert!(content.contains("[server]"));
        assert!(content.contains("[markers]"));
    }

    #[test]
    fn test_config_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[server]\nport = 4000\n").unwrap();

        dashboard()
            .current_dir(dir.path())
            .args(["--config", "custom.toml", "config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("already exists"));

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "[server]\nport = 4000\n"
        );
    }

    #[test]
    fn test_config_show_reads_custom_path() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("custom.toml"), "[server]\nport = 4000\n").unwrap();

        dashboard()
            .current_dir(dir.path())
            .args(["--config", "custom.toml", "config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("port = 4000"));
    }

    #[test]
    fn test_config_validate_without_file() {
        let dir = TempDir::new().unwrap();

        dashboard()
            .current_dir(dir.path())
            .args(["config", "validate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Using defaults (valid)"));
    }

    #[test]
    fn test_config_validate_reports_warnings() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("custom.toml"),
            "[markers]\nroadblock = 'ROADBLOCK:'\nauth_failures = []\n",
        )
        .unwrap();

        dashboard()
            .current_dir(dir.path())
            .args(["--config", "custom.toml", "config", "validate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration warnings:"))
            .stdout(predicate::str::contains("markers.roadblock"))
            .stdout(predicate::str::contains("markers.auth_failures is empty"));
    }

    #[test]
    fn test_config_validate_clean_file() {
        let dir = TempDir::new().unwrap();

        dashboard()
            .current_dir(dir.path())
            .args(["config", "init"])
            .assert()
            .success();

        dashboard()
            .current_dir(dir.path())
            .args(["config", "validate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration is valid."));
    }

    #[test]
    fn test_config_show_rejects_malformed_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("custom.toml"), "[server\nport = ").unwrap();

        dashboard()
            .current_dir(dir.path())
            .args(["--config", "custom.toml", "config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to parse dashboard.toml"));
    }
}
