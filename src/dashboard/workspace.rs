//! Per-agent workspace directories.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use super::models::{ISSUE_FILE, PROMPT_FILE};
use crate::errors::ProvisionError;

/// A provisioned workspace: its id (also the registry key) and location.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub id: String,
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
}

/// Creates uniquely named workspace directories under a fixed root.
#[derive(Debug, Clone)]
pub struct Provisioner {
    root: PathBuf,
}

/// Workspace id for an issue at a given instant, e.g. `issue-42-1718000000123456`.
pub fn workspace_id(issue_number: i64, at: DateTime<Utc>) -> String {
    format!("issue-{}-{}", issue_number, at.timestamp_micros())
}

impl Provisioner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the workspace directory and seed it with the instruction text and
    /// a pretty-printed snapshot of the issue.
    pub fn provision(
        &self,
        issue_number: i64,
        issue_payload: &serde_json::Value,
        instruction: &str,
    ) -> Result<Workspace, ProvisionError> {
        let created_at = Utc::now();
        let id = workspace_id(issue_number, created_at);
        let path = self.root.join(&id);

        std::fs::create_dir_all(&self.root).map_err(|source| ProvisionError::Io {
            path: self.root.clone(),
            source,
        })?;

        // The leaf is created exclusively so a duplicate id surfaces as a collision.
        match std::fs::create_dir(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(ProvisionError::Collision { path });
            }
            Err(source) => return Err(ProvisionError::Io { path, source }),
        }

        write_file(&path.join(PROMPT_FILE), instruction.as_bytes())?;

        let snapshot = serde_json::to_string_pretty(issue_payload)
            .unwrap_or_else(|_| issue_payload.to_string());
        write_file(&path.join(ISSUE_FILE), snapshot.as_bytes())?;

        Ok(Workspace {
            id,
            path,
            created_at,
        })
    }
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), ProvisionError> {
    std::fs::write(path, contents).map_err(|source| ProvisionError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Removes a freshly provisioned workspace on drop unless `keep` is called,
/// so a launch that fails part-way leaves nothing behind.
pub struct WorkspaceGuard {
    path: PathBuf,
    armed: bool,
}

impl WorkspaceGuard {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            armed: true,
        }
    }

    pub fn keep(mut self) {
        self.armed = false;
    }
}

impl Drop for WorkspaceGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to remove abandoned workspace");
        }
    }
}
