//! Persistence collaborator
//!
//! The store only needs four primitives. `replace` is a compare-and-swap on
//! [`Issue::version`], so two writers sharing one database cannot lose an
//! update.

use async_trait::async_trait;
use shared::models::{Issue, IssueFilter};
use thiserror::Error;

use crate::engine::IssueError;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Issue not found: {0}")]
    IssueNotFound(String),

    #[error("Issue already exists: {0}")]
    Duplicate(String),

    #[error("Version conflict on {id}: expected {expected}, found {found}")]
    VersionConflict {
        id: String,
        expected: u64,
        found: u64,
    },

    #[error("Storage task failed: {0}")]
    Task(String),

    #[error("Storage offline")]
    Offline,
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for IssueError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::IssueNotFound(id) => IssueError::NotFound(id),
            StorageError::VersionConflict { id, .. } => IssueError::Contended(id),
            other => IssueError::StorageUnavailable(other.to_string()),
        }
    }
}

/// Issue persistence
#[async_trait]
pub trait IssueRepository: Send + Sync {
    /// Load one record, `None` if absent
    async fn load(&self, id: &str) -> StorageResult<Option<Issue>>;

    /// Insert a new record; fails with [`StorageError::Duplicate`] if the id exists
    async fn insert(&self, issue: &Issue) -> StorageResult<()>;

    /// Overwrite a record only if the stored version equals `expected_version`
    async fn replace(&self, issue: &Issue, expected_version: u64) -> StorageResult<()>;

    /// All records matching `filter`, in no particular order
    async fn query(&self, filter: &IssueFilter) -> StorageResult<Vec<Issue>>;
}
