//! Configuration for the agent dashboard.
//!
//! Settings are read from `.agent-dashboard/dashboard.toml` and layered:
//! file → environment → CLI.
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! port = 3000
//! host = "127.0.0.1"
//!
//! [workspace]
//! root = ".agent-dashboard/workspaces"
//!
//! [agent]
//! claude_cmd = "claude"
//! gh_cmd = "gh"
//! skip_permissions = true
//! extra_args = ["--verbose"]
//! repo_list_limit = 100
//!
//! [markers]
//! pull_request = 'Pull request created:[ \t]*(https://github\.com/[^\s/]+/[^\s/]+/pull/\d+)'
//! roadblock = 'ROADBLOCK:[ \t]*(.*)'
//! auth_failures = ["Invalid API key", "Please run /login"]
//!
//! [logging]
//! json = false
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory holding the config file and, by default, the workspaces.
pub const DASHBOARD_DIR: &str = ".agent-dashboard";

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    3000
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

/// Where per-agent workspaces are created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceSection {
    #[serde(default = "default_workspace_root")]
    pub root: PathBuf,
}

fn default_workspace_root() -> PathBuf {
    Path::new(DASHBOARD_DIR).join("workspaces")
}

impl Default for WorkspaceSection {
    fn default() -> Self {
        Self {
            root: default_workspace_root(),
        }
    }
}

/// External tool settings for the agent pipeline and issue browsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSection {
    /// Coding-agent CLI (default: "claude")
    #[serde(default)]
    pub claude_cmd: Option<String>,
    /// GitHub CLI (default: "gh")
    #[serde(default)]
    pub gh_cmd: Option<String>,
    /// Pass `--dangerously-skip-permissions` to the agent CLI
    #[serde(default = "default_skip_permissions")]
    pub skip_permissions: bool,
    /// Extra arguments appended to the agent CLI invocation
    #[serde(default)]
    pub extra_args: Vec<String>,
    /// Maximum repositories returned by `GET /api/repos`
    #[serde(default = "default_repo_list_limit")]
    pub repo_list_limit: u32,
}

fn default_skip_permissions() -> bool {
    true
}

fn default_repo_list_limit() -> u32 {
    100
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            claude_cmd: None,
            gh_cmd: None,
            skip_permissions: default_skip_permissions(),
            extra_args: Vec::new(),
            repo_list_limit: default_repo_list_limit(),
        }
    }
}

/// Transcript markers used to classify a finished agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkersSection {
    /// Regex whose first capture group is the pull request URL
    #[serde(default = "default_pull_request_marker")]
    pub pull_request: String,
    /// Regex whose first capture group is the roadblock reason
    #[serde(default = "default_roadblock_marker")]
    pub roadblock: String,
    /// Literal phrases that indicate the agent CLI could not authenticate
    #[serde(default = "default_auth_failures")]
    pub auth_failures: Vec<String>,
}

pub fn default_pull_request_marker() -> String {
    r"Pull request created:[ \t]*(https://github\.com/[^\s/]+/[^\s/]+/pull/\d+)".to_string()
}

pub fn default_roadblock_marker() -> String {
    r"ROADBLOCK:[ \t]*(.*)".to_string()
}

pub fn default_auth_failures() -> Vec<String> {
    vec!["Invalid API key".to_string(), "Please run /login".to_string()]
}

impl Default for MarkersSection {
    fn default() -> Self {
        Self {
            pull_request: default_pull_request_marker(),
            roadblock: default_roadblock_marker(),
            auth_failures: default_auth_failures(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSection {
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
    /// Default filter when `RUST_LOG` is unset (e.g. "info", "agent_dashboard=debug")
    #[serde(default)]
    pub level: Option<String>,
}

/// The complete dashboard.toml configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardToml {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub workspace: WorkspaceSection,
    #[serde(default)]
    pub agent: AgentSection,
    #[serde(default)]
    pub markers: MarkersSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

impl DashboardToml {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse dashboard.toml")
    }

    /// Load configuration from `path`, or the defaults if it doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize dashboard.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Get the agent CLI command, with fallback to environment variable.
    pub fn claude_cmd(&self) -> String {
        self.claude_cmd_with(|key| std::env::var(key).ok())
    }

    fn claude_cmd_with(&self, env: impl Fn(&str) -> Option<String>) -> String {
        self.agent
            .claude_cmd
            .clone()
            .or_else(|| env("CLAUDE_CMD"))
            .unwrap_or_else(|| "claude".to_string())
    }

    /// Get the GitHub CLI command, with fallback to environment variable.
    pub fn gh_cmd(&self) -> String {
        self.gh_cmd_with(|key| std::env::var(key).ok())
    }

    fn gh_cmd_with(&self, env: impl Fn(&str) -> Option<String>) -> String {
        self.agent
            .gh_cmd
            .clone()
            .or_else(|| env("GH_CMD"))
            .unwrap_or_else(|| "gh".to_string())
    }

    /// Get skip_permissions, with fallback to environment variable.
    pub fn skip_permissions(&self) -> bool {
        self.skip_permissions_with(|key| std::env::var(key).ok())
    }

    fn skip_permissions_with(&self, env: impl Fn(&str) -> Option<String>) -> bool {
        // Environment variable can override file setting
        if let Some(env_val) = env("SKIP_PERMISSIONS") {
            return env_val != "false";
        }
        self.agent.skip_permissions
    }

    /// Get the workspace root; the environment variable wins over the file.
    pub fn workspace_root(&self) -> PathBuf {
        self.workspace_root_with(|key| std::env::var(key).ok())
    }

    fn workspace_root_with(&self, env: impl Fn(&str) -> Option<String>) -> PathBuf {
        env("AGENT_DASHBOARD_WORKSPACE_ROOT")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| self.workspace.root.clone())
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        for (name, pattern) in [
            ("pull_request", &self.markers.pull_request),
            ("roadblock", &self.markers.roadblock),
        ] {
            match regex::Regex::new(pattern) {
                Ok(re) if re.captures_len() < 2 => warnings.push(format!(
                    "markers.{} '{}' has no capture group",
                    name, pattern
                )),
                Ok(_) => {}
                Err(e) => warnings.push(format!(
                    "markers.{} '{}' is not a valid regex: {}",
                    name, pattern, e
                )),
            }
        }

        if self.markers.auth_failures.is_empty() {
            warnings.push(
                "markers.auth_failures is empty; authentication failures will be reported as completed"
                    .to_string(),
            );
        }
        if self.markers.auth_failures.iter().any(|p| p.trim().is_empty()) {
            warnings.push("markers.auth_failures contains an empty phrase".to_string());
        }

        if self.server.port == 0 {
            warnings.push("server.port is 0; an ephemeral port will be chosen".to_string());
        }
        if self.agent.repo_list_limit == 0 {
            warnings.push("agent.repo_list_limit is 0; no repositories will be listed".to_string());
        }

        warnings
    }
}

/// Default location of the config file relative to the working directory.
pub fn default_config_path() -> PathBuf {
    Path::new(DASHBOARD_DIR).join("dashboard.toml")
}
