//! Reading agent log artifacts back out of a workspace.
//!
//! Files are read in full on every call; the pipeline may still be writing
//! them, so a truncated trailing line is normal.

use std::io::ErrorKind;
use std::path::Path;

use super::models::LogKind;
use super::registry::AgentRegistry;
use crate::errors::DashboardError;

/// Read the `kind` log of agent `id`.
pub fn read_log(
    registry: &AgentRegistry,
    id: &str,
    kind: LogKind,
) -> Result<String, DashboardError> {
    let record = registry
        .get(id)?
        .ok_or_else(|| DashboardError::AgentNotFound { id: id.to_string() })?;

    read_workspace_log(&record.workspace_path, kind).map_err(|e| match e {
        DashboardError::LogNotFound { kind, .. } => DashboardError::LogNotFound {
            id: id.to_string(),
            kind,
        },
        other => other,
    })
}

/// Read a log file from a workspace directory. Structured output is
/// pretty-printed when it parses as JSON and returned unchanged otherwise.
pub fn read_workspace_log(workspace: &Path, kind: LogKind) -> Result<String, DashboardError> {
    let path = workspace.join(kind.file_name());
    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(DashboardError::LogNotFound {
                id: workspace
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                kind: kind.as_str().to_string(),
            });
        }
        Err(source) => return Err(DashboardError::ReadFailed { path, source }),
    };

    let text = String::from_utf8_lossy(&bytes).into_owned();
    if kind == LogKind::Structured
        && let Ok(value) = serde_json::from_str::<serde_json::Value>(&text)
        && let Ok(pretty) = serde_json::to_string_pretty(&value)
    {
        return Ok(pretty);
    }
    Ok(text)
}
