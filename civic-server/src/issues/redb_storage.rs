//! redb-backed issue repository
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `issues` | `issue_id` | `Issue` (JSON) | Current record |
//!
//! redb transactions are blocking; every call runs on
//! `tokio::task::spawn_blocking`.

use async_trait::async_trait;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use shared::models::{Issue, IssueFilter};
use std::path::Path;
use std::sync::Arc;

use super::repository::{IssueRepository, StorageError, StorageResult};

/// Table for issue records: key = issue_id, value = JSON-serialized Issue
const ISSUES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("issues");

/// Issue repository backed by an embedded redb file
#[derive(Clone)]
pub struct RedbIssueRepository {
    db: Arc<Database>,
}

impl std::fmt::Debug for RedbIssueRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbIssueRepository").finish_non_exhaustive()
    }
}

impl RedbIssueRepository {
    /// Open or create the database at the given path
    ///
    /// Commits are durable as soon as `commit()` returns.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ISSUES_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    async fn blocking<T, F>(&self, f: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> StorageResult<T> + Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| StorageError::Task(e.to_string()))?
    }

    fn load_sync(db: &Database, id: &str) -> StorageResult<Option<Issue>> {
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(ISSUES_TABLE)?;
        match table.get(id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    fn insert_sync(db: &Database, issue: &Issue) -> StorageResult<()> {
        let bytes = serde_json::to_vec(issue)?;
        let txn = db.begin_write()?;
        {
            let mut table = txn.open_table(ISSUES_TABLE)?;
            if table.get(issue.id.as_str())?.is_some() {
                return Err(StorageError::Duplicate(issue.id.clone()));
            }
            table.insert(issue.id.as_str(), bytes.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    fn replace_sync(db: &Database, issue: &Issue, expected_version: u64) -> StorageResult<()> {
        let bytes = serde_json::to_vec(issue)?;
        let txn = db.begin_write()?;
        {
            let mut table = txn.open_table(ISSUES_TABLE)?;
            let stored: Issue = match table.get(issue.id.as_str())? {
                Some(guard) => serde_json::from_slice(guard.value())?,
                None => return Err(StorageError::IssueNotFound(issue.id.clone())),
            };
            if stored.version != expected_version {
                return Err(StorageError::VersionConflict {
                    id: issue.id.clone(),
                    expected: expected_version,
                    found: stored.version,
                });
            }
            table.insert(issue.id.as_str(), bytes.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    fn query_sync(db: &Database, filter: &IssueFilter) -> StorageResult<Vec<Issue>> {
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(ISSUES_TABLE)?;

        let mut issues = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let issue: Issue = serde_json::from_slice(value.value())?;
            if filter.matches(&issue) {
                issues.push(issue);
            }
        }
        Ok(issues)
    }
}

#[async_trait]
impl IssueRepository for RedbIssueRepository {
    async fn load(&self, id: &str) -> StorageResult<Option<Issue>> {
        let id = id.to_string();
        self.blocking(move |db| Self::load_sync(db, &id)).await
    }

    async fn insert(&self, issue: &Issue) -> StorageResult<()> {
        let issue = issue.clone();
        self.blocking(move |db| Self::insert_sync(db, &issue)).await
    }

    async fn replace(&self, issue: &Issue, expected_version: u64) -> StorageResult<()> {
        let issue = issue.clone();
        self.blocking(move |db| Self::replace_sync(db, &issue, expected_version))
            .await
    }

    async fn query(&self, filter: &IssueFilter) -> StorageResult<Vec<Issue>> {
        let filter = filter.clone();
        self.blocking(move |db| Self::query_sync(db, &filter)).await
    }
}
