//! On-demand status resolution for launched agents.
//!
//! A running agent is re-examined whenever its status is queried. Once the
//! recorded process has exited, the transcript is classified by the marker
//! rules exactly once and the debug artifacts are loaded; the record then
//! stays terminal and later queries are plain reads.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::Utc;

use super::markers::MarkerRules;
use super::models::{AgentRecord, CLAUDE_OUTPUT, DEBUG_ARTIFACTS, OUTPUT_LOG};
use super::process::is_process_alive;
use super::registry::AgentRegistry;
use crate::errors::DashboardError;

/// Converts raw process/log state into a classified `AgentRecord`.
pub struct StatusResolver {
    rules: MarkerRules,
    is_alive: fn(u32) -> bool,
}

impl StatusResolver {
    pub fn new(rules: MarkerRules) -> Self {
        Self {
            rules,
            is_alive: is_process_alive,
        }
    }

    /// Use a custom liveness check instead of the null-signal check.
    pub fn with_liveness_check(rules: MarkerRules, is_alive: fn(u32) -> bool) -> Self {
        Self { rules, is_alive }
    }

    pub fn resolve(
        &self,
        registry: &AgentRegistry,
        id: &str,
    ) -> Result<AgentRecord, DashboardError> {
        let record = registry
            .get(id)?
            .ok_or_else(|| DashboardError::AgentNotFound { id: id.to_string() })?;

        if record.status.is_terminal() || (self.is_alive)(record.pid) {
            return Ok(record);
        }

        let transcript = read_transcript(&record.workspace_path);
        let classification = self.rules.classify(&transcript);
        let artifacts = load_debug_artifacts(&record.workspace_path);

        registry.finish_if_running(id, |r| {
            r.status = classification.status;
            r.pull_request_url = classification.pull_request_url;
            r.roadblock_reason = classification.roadblock_reason;
            r.error_details = classification.error_details;
            r.finished_at = Some(Utc::now());
            r.debug_artifacts = artifacts;
            tracing::info!(
                agent = %r.id,
                status = r.status.as_str(),
                pull_request = r.pull_request_url.as_deref().unwrap_or(""),
                "agent finished"
            );
        })
    }
}

/// Text the marker rules run against: the pipeline's stdout followed by the
/// agent's result text. Missing files contribute nothing.
pub fn read_transcript(workspace: &Path) -> String {
    let mut transcript = read_lossy(&workspace.join(OUTPUT_LOG)).unwrap_or_default();

    if let Some(raw) = read_lossy(&workspace.join(CLAUDE_OUTPUT)) {
        let result = serde_json::from_str::<serde_json::Value>(&raw)
            .ok()
            .and_then(|v| v.get("result").and_then(|r| r.as_str()).map(str::to_string));
        if !transcript.is_empty() && !transcript.ends_with('\n') {
            transcript.push('\n');
        }
        transcript.push_str(result.as_deref().unwrap_or(&raw));
    }

    transcript
}

/// Load whichever well-known auxiliary files exist, keyed by file name.
/// A file that fails to read is logged and skipped.
pub fn load_debug_artifacts(workspace: &Path) -> BTreeMap<String, String> {
    let mut artifacts = BTreeMap::new();
    for name in DEBUG_ARTIFACTS {
        let path = workspace.join(name);
        if !path.exists() {
            continue;
        }
        match std::fs::read(&path) {
            Ok(bytes) => {
                artifacts.insert(name.to_string(), String::from_utf8_lossy(&bytes).into_owned());
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable debug artifact");
            }
        }
    }
    artifacts
}

fn read_lossy(path: &Path) -> Option<String> {
    std::fs::read(path)
        .ok()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}
