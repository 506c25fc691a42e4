use std::fs::File;
use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

use super::github::normalize_repo;
use super::models::{AgentKind, AgentRecord, AgentStatus, ERROR_LOG, OUTPUT_LOG};
use super::process::kill_process_group;
use super::registry::AgentRegistry;
use super::workspace::{Provisioner, WorkspaceGuard};
use crate::config::DashboardToml;
use crate::errors::DashboardError;

/// Shell pipeline run inside the workspace for each launch.
///
/// Positional parameters: `$1` repo, `$2` branch, `$3` gh command,
/// `$4` agent command, then the agent's flags. Nothing user-supplied is
/// interpolated into the script text itself.
const PIPELINE_SCRIPT: &str = r#"
ws="$PWD"
repo="$1"; branch="$2"; gh_cmd="$3"; agent_cmd="$4"
shift 4
stamp() { date -u +%Y-%m-%dT%H:%M:%SZ; }
log() { printf '[%s] %s\n' "$(stamp)" "$*" | tee -a "$ws/agent.log"; }
{
  echo "started=$(stamp)"
  echo "user=$(id -un 2>/dev/null)"
  echo "path=$PATH"
  echo "gh=$(command -v "$gh_cmd" 2>/dev/null)"
  echo "agent=$(command -v "$agent_cmd" 2>/dev/null)"
  echo "git=$(git --version 2>/dev/null)"
} > "$ws/env.txt"
log "Cloning $repo"
if ! "$gh_cmd" repo clone "$repo" repo; then
  log "Clone failed"
  exit 1
fi
cd repo || exit 1
log "Creating branch $branch"
if ! git checkout -b "$branch"; then
  log "Branch creation failed"
  exit 1
fi
log "Starting agent"
"$agent_cmd" -p "$(cat "$ws/prompt.txt")" "$@" > "$ws/claude-output.json"
code=$?
log "Agent exited with status $code"
exit $code
"#;

/// External commands and flags used by the launch pipeline.
#[derive(Debug, Clone)]
pub struct LauncherConfig {
    pub claude_cmd: String,
    pub gh_cmd: String,
    pub skip_permissions: bool,
    pub extra_args: Vec<String>,
}

impl LauncherConfig {
    pub fn from_toml(toml: &DashboardToml) -> Self {
        Self {
            claude_cmd: toml.claude_cmd(),
            gh_cmd: toml.gh_cmd(),
            skip_permissions: toml.skip_permissions(),
            extra_args: toml.agent.extra_args.clone(),
        }
    }

    /// Flags passed to the agent CLI after `-p <prompt>`.
    pub fn agent_flags(&self) -> Vec<String> {
        let mut flags = vec!["--output-format".to_string(), "json".to_string()];
        if self.skip_permissions {
            flags.push("--dangerously-skip-permissions".to_string());
        }
        flags.extend(self.extra_args.iter().cloned());
        flags
    }
}

/// A launch request exactly as received; every field may be missing.
#[derive(Debug, Clone, Default)]
pub struct LaunchRequest {
    pub repo: Option<String>,
    pub issue: Option<serde_json::Value>,
    pub prompt: Option<String>,
    pub agent_type: Option<String>,
}

/// A launch request that passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedLaunch {
    pub repo: String,
    pub issue: serde_json::Value,
    pub issue_number: i64,
    pub prompt: String,
    pub kind: AgentKind,
}

impl LaunchRequest {
    /// Check every field before anything touches the filesystem.
    pub fn validate(self) -> Result<ValidatedLaunch, DashboardError> {
        let missing = |what: &str| DashboardError::Validation(format!("{} is required", what));

        let repo = self
            .repo
            .filter(|r| !r.trim().is_empty())
            .ok_or_else(|| missing("Repository"))?;
        let issue = self
            .issue
            .filter(|i| !i.is_null())
            .ok_or_else(|| missing("Issue"))?;
        let prompt = self
            .prompt
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| missing("Prompt"))?;
        let agent_type = self
            .agent_type
            .filter(|a| !a.trim().is_empty())
            .ok_or_else(|| missing("Agent type"))?;

        let repo = normalize_repo(&repo)
            .ok_or_else(|| DashboardError::Validation(format!("Invalid repository: {}", repo)))?;
        let issue_number = issue_number_of(&issue).ok_or_else(|| {
            DashboardError::Validation("Issue must have a positive integer number".to_string())
        })?;
        let kind = agent_type
            .parse::<AgentKind>()
            .map_err(DashboardError::Validation)?;

        Ok(ValidatedLaunch {
            repo,
            issue,
            issue_number,
            prompt,
            kind,
        })
    }
}

/// Accept `{"number": 42}`, `{"number": "42"}` or a bare `42`.
fn issue_number_of(issue: &serde_json::Value) -> Option<i64> {
    let number = match issue {
        serde_json::Value::Object(map) => map.get("number")?,
        other => other,
    };
    let n = match number {
        serde_json::Value::Number(n) => n.as_i64()?,
        serde_json::Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    (n > 0).then_some(n)
}

/// Branch the agent works on for an issue.
pub fn branch_name(issue_number: i64) -> String {
    format!("fix-issue-{}", issue_number)
}

/// Provisions workspaces and starts detached agent pipelines.
pub struct AgentLauncher {
    provisioner: Provisioner,
    config: LauncherConfig,
}

impl AgentLauncher {
    pub fn new(provisioner: Provisioner, config: LauncherConfig) -> Self {
        Self {
            provisioner,
            config,
        }
    }

    pub fn workspace_root(&self) -> &Path {
        self.provisioner.root()
    }

    /// Launch an agent and record it as running.
    ///
    /// Returns as soon as the pipeline is spawned; the outcome of the fix
    /// attempt is only learned later through the resolver. Must be called
    /// from within a Tokio runtime.
    pub fn launch(
        &self,
        registry: &AgentRegistry,
        request: LaunchRequest,
    ) -> Result<AgentRecord, DashboardError> {
        let launch = request.validate()?;
        // Fail before touching the filesystem if the registry is unusable.
        registry.len()?;

        let workspace =
            self.provisioner
                .provision(launch.issue_number, &launch.issue, &launch.prompt)?;
        let guard = WorkspaceGuard::new(&workspace.path);

        let stdout = create_log(&workspace.path.join(OUTPUT_LOG))?;
        let stderr = create_log(&workspace.path.join(ERROR_LOG))?;

        let mut child = Command::new("bash")
            .arg("-c")
            .arg(PIPELINE_SCRIPT)
            .arg("agent-dashboard")
            .arg(&launch.repo)
            .arg(branch_name(launch.issue_number))
            .arg(&self.config.gh_cmd)
            .arg(&self.config.claude_cmd)
            .args(self.config.agent_flags())
            .current_dir(&workspace.path)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .process_group(0)
            .kill_on_drop(false)
            .spawn()
            .map_err(|e| DashboardError::Launch(format!("Failed to spawn agent pipeline: {}", e)))?;

        let pid = child
            .id()
            .ok_or_else(|| DashboardError::Launch("Agent pipeline exited before it was tracked".into()))?;

        // Reap the child when it exits so the liveness check never sees a zombie.
        let agent_id = workspace.id.clone();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => tracing::debug!(agent = %agent_id, %status, "agent pipeline exited"),
                Err(e) => tracing::warn!(agent = %agent_id, error = %e, "failed to reap agent pipeline"),
            }
        });

        let record = AgentRecord {
            id: workspace.id,
            pid,
            repo: launch.repo,
            issue_number: launch.issue_number,
            agent_type: launch.kind,
            started_at: workspace.created_at,
            status: AgentStatus::Running,
            workspace_path: workspace.path,
            pull_request_url: None,
            roadblock_reason: None,
            error_details: None,
            finished_at: None,
            debug_artifacts: Default::default(),
        };
        if let Err(e) = registry.insert(record.clone()) {
            tracing::warn!(agent = %record.id, pid, error = %e, "killing untracked agent pipeline");
            kill_process_group(pid);
            return Err(e);
        }
        guard.keep();

        tracing::info!(
            agent = %record.id,
            pid = record.pid,
            repo = %record.repo,
            issue = record.issue_number,
            "agent launched"
        );
        Ok(record)
    }

    /// Ask the agent CLI to draft an agent configuration for an issue.
    pub async fn generate_config(
        &self,
        issue: &serde_json::Value,
        config_type: &str,
    ) -> Result<String, DashboardError> {
        let prompt = config_prompt(issue, config_type);
        let output = Command::new(&self.config.claude_cmd)
            .arg("-p")
            .arg(&prompt)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                DashboardError::ExternalTool(format!(
                    "Failed to run {}: {}",
                    self.config.claude_cmd, e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(DashboardError::ExternalTool(if stderr.is_empty() {
                format!("{} exited with {}", self.config.claude_cmd, output.status)
            } else {
                stderr
            }));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Prompt used to draft an agent configuration for an issue.
pub fn config_prompt(issue: &serde_json::Value, config_type: &str) -> String {
    let field = |name: &str| {
        issue
            .get(name)
            .map(|v| match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_default()
    };
    format!(
        "Generate a {} configuration for GitHub issue #{}: {}\n\
         Issue description: {}\n\
         Please create a configuration that would help an AI agent understand and fix this issue.",
        config_type,
        field("number"),
        field("title"),
        field("body"),
    )
}

fn create_log(path: &Path) -> Result<File, DashboardError> {
    File::create(path).map_err(|e| {
        DashboardError::Launch(format!("Failed to create {}: {}", path.display(), e))
    })
}
