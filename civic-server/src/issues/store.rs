//! Issue record store
//!
//! 在持久化之上提供：
//! - 创建校验 (validator)
//! - 按 id 串行化的 read-modify-write (`mutate`)
//! - 排序后的查询结果 (newest first)

use dashmap::DashMap;
use shared::models::{Issue, IssueDraft, IssueFilter, IssueStatus, Principal, VoteLedger};
use shared::models::sort_newest_first;
use shared::util::new_id;
use std::sync::Arc;
use tokio::sync::Mutex;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use super::repository::{IssueRepository, StorageError};
use crate::engine::{IssueError, IssueResult};

/// CAS retries when another process wrote the same record
const MAX_CAS_ATTEMPTS: usize = 3;

pub struct IssueStore {
    repo: Arc<dyn IssueRepository>,
    /// One FIFO mutex per issue id, present only while a call holds or waits on it
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl std::fmt::Debug for IssueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssueStore")
            .field("locks", &self.tracked_locks())
            .finish_non_exhaustive()
    }
}

fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<String> = errors
        .errors()
        .iter()
        .map(|(field, kind)| match kind {
            ValidationErrorsKind::Field(errs) => {
                let reason = errs
                    .iter()
                    .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| "is invalid".to_string());
                format!("{field} {reason}")
            }
            ValidationErrorsKind::Struct(inner) => format!("{field}: {}", describe(inner)),
            ValidationErrorsKind::List(_) => format!("{field} is invalid"),
        })
        .collect();
    fields.sort();
    fields.join("; ")
}

impl IssueStore {
    pub fn new(repo: Arc<dyn IssueRepository>) -> Self {
        Self {
            repo,
            locks: DashMap::new(),
        }
    }

    /// Validate the draft and persist a new `PENDING` issue
    pub async fn create(&self, draft: IssueDraft, author: &Principal, now: i64) -> IssueResult<Issue> {
        draft
            .validate()
            .map_err(|e| IssueError::Validation(describe(&e)))?;

        let issue = Issue {
            id: new_id(),
            category: draft.resolved_category(),
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            status: IssueStatus::Pending,
            address: draft.address.trim().to_string(),
            coordinates: draft.coordinates,
            evidence_images: draft.evidence_images,
            resolution_evidence: None,
            resolution_timestamp: None,
            rejection_reason: None,
            rating: None,
            rating_comment: None,
            votes: VoteLedger::default(),
            author_id: author.id.clone(),
            author_name: author.name.clone(),
            city_district: draft.city_district.trim().to_string(),
            created_at: now,
            updated_at: now,
            version: 0,
        };

        self.repo.insert(&issue).await?;
        Ok(issue)
    }

    pub async fn get(&self, id: &str) -> IssueResult<Issue> {
        self.repo
            .load(id)
            .await?
            .ok_or_else(|| IssueError::NotFound(id.to_string()))
    }

    /// Matching issues, newest first
    pub async fn query(&self, filter: &IssueFilter) -> IssueResult<Vec<Issue>> {
        let mut issues = self.repo.query(filter).await?;
        sort_newest_first(&mut issues);
        Ok(issues)
    }

    pub async fn query_by_author(&self, author_id: &str) -> IssueResult<Vec<Issue>> {
        self.query(&IssueFilter::by_author(author_id)).await
    }

    /// Case-insensitive exact match on the district name
    pub async fn query_by_city(&self, district: &str) -> IssueResult<Vec<Issue>> {
        self.query(&IssueFilter::by_city(district)).await
    }

    /// Atomic read-modify-write of one issue
    ///
    /// Same-id calls run one at a time in arrival order; different ids do
    /// not block each other. `f` may run more than once if another process
    /// commits the same record in between, so it must be pure.
    pub async fn mutate<T, F>(&self, id: &str, f: F) -> IssueResult<(Issue, T)>
    where
        F: Fn(&Issue) -> IssueResult<(Issue, T)>,
    {
        self.mutate_then(id, f, |_, _| {}).await
    }

    /// [`mutate`](Self::mutate) plus a hook that runs after the commit and
    /// before the next same-id call is admitted
    ///
    /// Anything observed through `on_commit` is therefore seen in commit
    /// order for that id.
    pub async fn mutate_then<T, F, C>(
        &self,
        id: &str,
        f: F,
        on_commit: C,
    ) -> IssueResult<(Issue, T)>
    where
        F: Fn(&Issue) -> IssueResult<(Issue, T)>,
        C: FnOnce(&Issue, &T),
    {
        let lease = LockLease::acquire(&self.locks, id);
        let _guard = lease.lock.lock().await;

        let (next, extra) = self.commit(id, &f).await?;
        on_commit(&next, &extra);
        Ok((next, extra))
    }

    /// Number of per-id locks currently tracked
    pub fn tracked_locks(&self) -> usize {
        self.locks.len()
    }

    async fn commit<T, F>(&self, id: &str, f: &F) -> IssueResult<(Issue, T)>
    where
        F: Fn(&Issue) -> IssueResult<(Issue, T)>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let current = self.get(id).await?;
            let (mut next, extra) = f(&current)?;
            next.id = current.id.clone();
            next.version = current.version + 1;

            match self.repo.replace(&next, current.version).await {
                Ok(()) => return Ok((next, extra)),
                Err(StorageError::VersionConflict { found, .. }) if attempt < MAX_CAS_ATTEMPTS => {
                    tracing::warn!(
                        issue_id = %id,
                        expected = current.version,
                        found,
                        attempt,
                        "Concurrent write detected, retrying"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Handle on one per-id mutex
///
/// Dropping the last handle removes the map entry, so ids that were only
/// touched once (including unknown ids) do not accumulate.
struct LockLease<'a> {
    locks: &'a DashMap<String, Arc<Mutex<()>>>,
    id: &'a str,
    lock: Arc<Mutex<()>>,
}

impl<'a> LockLease<'a> {
    fn acquire(locks: &'a DashMap<String, Arc<Mutex<()>>>, id: &'a str) -> Self {
        let lock = locks.entry(id.to_string()).or_default().clone();
        Self { locks, id, lock }
    }
}

impl Drop for LockLease<'_> {
    fn drop(&mut self) {
        // map + this lease; entry() and remove_if() share the shard lock
        self.locks
            .remove_if(self.id, |_, entry| Arc::strong_count(entry) == 2);
    }
}
