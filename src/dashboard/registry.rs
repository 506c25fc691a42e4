use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::models::AgentRecord;
use crate::errors::DashboardError;

/// In-memory map of every agent launched by this process, keyed by workspace id.
///
/// Entries are never evicted and are lost on restart. The lock is only held
/// for map operations, never across file I/O or an `.await`.
#[derive(Debug, Default)]
pub struct AgentRegistry {
    agents: Mutex<BTreeMap<String, AgentRecord>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, AgentRecord>>, DashboardError> {
        self.agents.lock().map_err(|_| DashboardError::LockPoisoned)
    }

    pub fn insert(&self, record: AgentRecord) -> Result<(), DashboardError> {
        self.lock()?.insert(record.id.clone(), record);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<Option<AgentRecord>, DashboardError> {
        Ok(self.lock()?.get(id).cloned())
    }

    /// Copy of every record, without resolving any of them.
    pub fn snapshot(&self) -> Result<BTreeMap<String, AgentRecord>, DashboardError> {
        Ok(self.lock()?.clone())
    }

    pub fn len(&self) -> Result<usize, DashboardError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, DashboardError> {
        Ok(self.lock()?.is_empty())
    }

    /// Apply `transition` to the record only while it is still running, and
    /// return the record as it stands afterwards. A record that another caller
    /// already moved to a terminal status is returned untouched.
    pub fn finish_if_running(
        &self,
        id: &str,
        transition: impl FnOnce(&mut AgentRecord),
    ) -> Result<AgentRecord, DashboardError> {
        let mut agents = self.lock()?;
        let record = agents
            .get_mut(id)
            .ok_or_else(|| DashboardError::AgentNotFound { id: id.to_string() })?;
        if !record.status.is_terminal() {
            transition(record);
        }
        Ok(record.clone())
    }

    /// Poison the lock by panicking while holding it.
    #[cfg(test)]
    pub(crate) fn poison(&self) {
        std::thread::scope(|s| {
            let _ = s
                .spawn(|| {
                    let _guard = self.agents.lock();
                    panic!("poisoning agent registry");
                })
                .join();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::models::{AgentKind, AgentStatus};
    use chrono::Utc;
    use std::path::PathBuf;

    fn record(id: &str) -> AgentRecord {
        AgentRecord {
            id: id.to_string(),
            pid: 4242,
            repo: "o/r".into(),
            issue_number: 1,
            agent_type: AgentKind::ClaudeCode,
            started_at: Utc::now(),
            status: AgentStatus::Running,
            workspace_path: PathBuf::from("/tmp/none"),
            pull_request_url: None,
            roadblock_reason: None,
            error_details: None,
            finished_at: None,
            debug_artifacts: BTreeMap::new(),
        }
    }

    #[test]
    fn test_empty_registry() {
        let registry = AgentRegistry::new();
        assert!(registry.is_empty().unwrap());
        assert!(registry.snapshot().unwrap().is_empty());
        assert!(registry.get("missing").unwrap().is_none());
    }

    #[test]
    fn test_insert_and_get() {
        let registry = AgentRegistry::new();
        registry.insert(record("issue-1-1")).unwrap();
        registry.insert(record("issue-2-1")).unwrap();

        assert_eq!(registry.len().unwrap(), 2);
        assert_eq!(registry.get("issue-1-1").unwrap().unwrap().id, "issue-1-1");
        let ids: Vec<_> = registry.snapshot().unwrap().into_keys().collect();
        assert_eq!(ids, vec!["issue-1-1", "issue-2-1"]);
    }

    #[test]
    fn test_finish_if_running_applies_once() {
        let registry = AgentRegistry::new();
        registry.insert(record("issue-1-1")).unwrap();

        let first = registry
            .finish_if_running("issue-1-1", |r| {
                r.status = AgentStatus::Roadblock;
                r.roadblock_reason = Some("first".into());
            })
            .unwrap();
        assert_eq!(first.status, AgentStatus::Roadblock);

        let second = registry
            .finish_if_running("issue-1-1", |r| {
                r.status = AgentStatus::Completed;
                r.roadblock_reason = Some("second".into());
            })
            .unwrap();
        assert_eq!(second, first);
    }

    #[test]
    fn test_finish_if_running_unknown_id() {
        let registry = AgentRegistry::new();
        let err = registry.finish_if_running("nope", |_| {}).unwrap_err();
        assert!(matches!(err, DashboardError::AgentNotFound { .. }));
    }
}
