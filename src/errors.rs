//! Typed error hierarchy for the agent dashboard.
//!
//! Two enums cover the lifecycle core:
//! - `ProvisionError`: workspace directory creation and seeding failures
//! - `DashboardError`: everything the HTTP surface can report

use std::path::PathBuf;

use thiserror::Error;

/// Errors from creating and seeding an agent workspace.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("Workspace {path} already exists")]
    Collision { path: PathBuf },

    #[error("Failed to write workspace file at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from the dashboard API and the agent lifecycle manager.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("{0}")]
    Validation(String),

    #[error("Agent {id} not found")]
    AgentNotFound { id: String },

    #[error("No {kind} log for agent {id}")]
    LogNotFound { id: String, kind: String },

    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("External tool error: {0}")]
    ExternalTool(String),

    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error("Failed to launch agent: {0}")]
    Launch(String),

    #[error("Agent registry lock poisoned")]
    LockPoisoned,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provision_collision_carries_path() {
        let err = ProvisionError::Collision {
            path: PathBuf::from("/data/workspaces/issue-1-1"),
        };
        match &err {
            ProvisionError::Collision { path } => {
                assert_eq!(path, &PathBuf::from("/data/workspaces/issue-1-1"));
            }
            _ => panic!("Expected Collision"),
        }
        assert!(err.to_string().contains("issue-1-1"));
    }

    #[test]
    fn provision_error_converts_into_dashboard_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: DashboardError = ProvisionError::Io {
            path: PathBuf::from("/ro/prompt.txt"),
            source: io_err,
        }
        .into();
        assert!(matches!(
            err,
            DashboardError::Provision(ProvisionError::Io { .. })
        ));
        assert!(err.to_string().contains("/ro/prompt.txt"));
    }

    #[test]
    fn log_not_found_names_kind_and_agent() {
        let err = DashboardError::LogNotFound {
            id: "issue-7-1".into(),
            kind: "error".into(),
        };
        assert_eq!(err.to_string(), "No error log for agent issue-7-1");
    }

    #[test]
    fn validation_message_is_passed_through() {
        let err = DashboardError::Validation("Repository is required".into());
        assert_eq!(err.to_string(), "Repository is required");
    }

    #[test]
    fn all_error_types_implement_std_error_trait() {
        fn assert_std_error<E: std::error::Error>(_: &E) {}
        assert_std_error(&DashboardError::LockPoisoned);
        assert_std_error(&ProvisionError::Collision {
            path: PathBuf::from("x"),
        });
    }
}
