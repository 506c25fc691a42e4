use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a launched agent. Only `Running` is non-terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Running,
    Completed,
    Roadblock,
    AuthError,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Roadblock => "roadblock",
            Self::AuthError => "auth_error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

impl FromStr for AgentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(Self::Running),
            "completed" => Ok(Self::Completed),
            "roadblock" => Ok(Self::Roadblock),
            "auth_error" => Ok(Self::AuthError),
            _ => Err(format!("Invalid agent status: {}", s)),
        }
    }
}

/// Which coding-agent CLI a launch drives.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AgentKind {
    ClaudeCode,
}

impl AgentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClaudeCode => "claude-code",
        }
    }
}

impl FromStr for AgentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "claude-code" | "claude" => Ok(Self::ClaudeCode),
            _ => Err(format!("Unsupported agent type: {}", s)),
        }
    }
}

/// A log artifact that can be read back through the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Output,
    Error,
    Structured,
}

impl LogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Output => "output",
            Self::Error => "error",
            Self::Structured => "structured",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Output => OUTPUT_LOG,
            Self::Error => ERROR_LOG,
            Self::Structured => CLAUDE_OUTPUT,
        }
    }
}

impl FromStr for LogKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "output" => Ok(Self::Output),
            "error" => Ok(Self::Error),
            "claude" | "structured" => Ok(Self::Structured),
            _ => Err(format!(
                "Invalid log type '{}'. Valid values: output, error, claude",
                s
            )),
        }
    }
}

// Fixed file names inside a workspace.
pub const PROMPT_FILE: &str = "prompt.txt";
pub const ISSUE_FILE: &str = "issue.json";
pub const OUTPUT_LOG: &str = "output.log";
pub const ERROR_LOG: &str = "error.log";
pub const CLAUDE_OUTPUT: &str = "claude-output.json";
pub const TRANSCRIPT_LOG: &str = "agent.log";
pub const ENV_DUMP: &str = "env.txt";

/// Auxiliary files loaded into `debug_artifacts` once an agent finishes.
pub const DEBUG_ARTIFACTS: &[&str] = &[ENV_DUMP, CLAUDE_OUTPUT, TRANSCRIPT_LOG];

/// One launched agent, keyed in the registry by `id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentRecord {
    pub id: String,
    pub pid: u32,
    pub repo: String,
    pub issue_number: i64,
    pub agent_type: AgentKind,
    pub started_at: DateTime<Utc>,
    pub status: AgentStatus,
    pub workspace_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roadblock_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub debug_artifacts: BTreeMap<String, String>,
}

/// Repository summary as listed by `gh repo list`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RepoSummary {
    pub name_with_owner: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub stargazer_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Label {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Assignee {
    pub login: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Issue row as listed by `gh issue list`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IssueSummary {
    pub number: i64,
    pub title: String,
    pub state: String,
    #[serde(default)]
    pub labels: Vec<Label>,
}

/// Full issue as returned by `gh issue view`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IssueDetail {
    pub number: i64,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub assignees: Vec<Assignee>,
}
