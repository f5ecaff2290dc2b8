//! In-memory issue repository (ephemeral mode and tests)

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use shared::models::{Issue, IssueFilter};
use std::sync::atomic::{AtomicBool, Ordering};

use super::repository::{IssueRepository, StorageError, StorageResult};

#[derive(Debug, Default)]
pub struct MemoryIssueRepository {
    issues: DashMap<String, Issue>,
    offline: AtomicBool,
}

impl MemoryIssueRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage: every call fails with [`StorageError::Offline`]
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> StorageResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StorageError::Offline);
        }
        Ok(())
    }
}

#[async_trait]
impl IssueRepository for MemoryIssueRepository {
    async fn load(&self, id: &str) -> StorageResult<Option<Issue>> {
        self.check_online()?;
        Ok(self.issues.get(id).map(|entry| entry.value().clone()))
    }

    async fn insert(&self, issue: &Issue) -> StorageResult<()> {
        self.check_online()?;
        match self.issues.entry(issue.id.clone()) {
            Entry::Occupied(_) => Err(StorageError::Duplicate(issue.id.clone())),
            Entry::Vacant(slot) => {
                slot.insert(issue.clone());
                Ok(())
            }
        }
    }

    async fn replace(&self, issue: &Issue, expected_version: u64) -> StorageResult<()> {
        self.check_online()?;
        let mut stored = self
            .issues
            .get_mut(&issue.id)
            .ok_or_else(|| StorageError::IssueNotFound(issue.id.clone()))?;
        if stored.version != expected_version {
            return Err(StorageError::VersionConflict {
                id: issue.id.clone(),
                expected: expected_version,
                found: stored.version,
            });
        }
        *stored = issue.clone();
        Ok(())
    }

    async fn query(&self, filter: &IssueFilter) -> StorageResult<Vec<Issue>> {
        self.check_online()?;
        Ok(self
            .issues
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect())
    }
}
