//! Repository and issue browsing through the GitHub CLI.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::process::Command;

use super::models::{IssueDetail, IssueSummary, RepoSummary};
use crate::errors::DashboardError;

const REPO_FIELDS: &str = "nameWithOwner,description,isPrivate,stargazerCount";
const ISSUE_LIST_FIELDS: &str = "number,title,state,labels";
const ISSUE_VIEW_FIELDS: &str = "number,title,body,labels,assignees,state";

/// Abstraction over the repository/issue source for testability.
/// Real implementation: `GhCli`.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    async fn list_repos(&self) -> Result<Vec<RepoSummary>, DashboardError>;

    async fn list_issues(&self, repo: &str) -> Result<Vec<IssueSummary>, DashboardError>;

    async fn get_issue(&self, repo: &str, number: i64) -> Result<IssueDetail, DashboardError>;
}

/// Normalize a repository reference to `owner/name`.
///
/// Accepts:
/// - `owner/name`
/// - `https://github.com/owner/name`
/// - `https://github.com/owner/name.git`
pub fn normalize_repo(input: &str) -> Option<String> {
    let input = input.trim().trim_end_matches('/');
    let path = match input.strip_prefix("https://github.com/") {
        Some(rest) => rest.strip_suffix(".git").unwrap_or(rest),
        None => input,
    };

    let parts: Vec<&str> = path.split('/').collect();
    if parts.len() == 2 && parts.iter().all(|p| is_valid_segment(p)) {
        Some(format!("{}/{}", parts[0], parts[1]))
    } else {
        None
    }
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && !segment.starts_with('-')
        && segment != "."
        && segment != ".."
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// `IssueTracker` backed by the `gh` command-line tool.
pub struct GhCli {
    gh_cmd: String,
    repo_limit: u32,
}

impl GhCli {
    pub fn new(gh_cmd: impl Into<String>, repo_limit: u32) -> Self {
        Self {
            gh_cmd: gh_cmd.into(),
            repo_limit,
        }
    }

    /// Run `gh` with `args` and decode its JSON stdout.
    async fn run_json<T: DeserializeOwned>(&self, args: &[&str]) -> Result<T, DashboardError> {
        let output = Command::new(&self.gh_cmd)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                DashboardError::ExternalTool(format!("Failed to run {}: {}", self.gh_cmd, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("{} exited with {}", self.gh_cmd, output.status)
            } else {
                stderr
            };
            tracing::warn!(command = %self.gh_cmd, args = ?args, error = %message, "gh call failed");
            return Err(DashboardError::ExternalTool(message));
        }

        serde_json::from_slice(&output.stdout).map_err(|e| {
            DashboardError::ExternalTool(format!("Failed to parse {} output: {}", self.gh_cmd, e))
        })
    }
}

fn require_repo(repo: &str) -> Result<String, DashboardError> {
    normalize_repo(repo)
        .ok_or_else(|| DashboardError::Validation(format!("Invalid repository: {}", repo)))
}

#[async_trait]
impl IssueTracker for GhCli {
    async fn list_repos(&self) -> Result<Vec<RepoSummary>, DashboardError> {
        let limit = self.repo_limit.to_string();
        self.run_json(&["repo", "list", "--json", REPO_FIELDS, "--limit", &limit])
            .await
    }

    async fn list_issues(&self, repo: &str) -> Result<Vec<IssueSummary>, DashboardError> {
        let repo = require_repo(repo)?;
        self.run_json(&["issue", "list", "--repo", &repo, "--json", ISSUE_LIST_FIELDS])
            .await
    }

    async fn get_issue(&self, repo: &str, number: i64) -> Result<IssueDetail, DashboardError> {
        let repo = require_repo(repo)?;
        let number = number.to_string();
        self.run_json(&[
            "issue",
            "view",
            &number,
            "--repo",
            &repo,
            "--json",
            ISSUE_VIEW_FIELDS,
        ])
        .await
    }
}
