//! Issue service - single operation surface for admin and citizen clients
//!
//! Every mutation returns the complete post-mutation [`Issue`] and publishes
//! it as an [`IssueChanged`] event. Publishing happens inside the per-id
//! critical section, so events for one issue arrive in commit order.

use serde::{Deserialize, Serialize};
use shared::models::{
    CityStats, DistrictCount, Issue, IssueDraft, IssueFilter, IssueStatus, Principal,
    RejectionReason, UserRole, VoteDirection, VoteOutcome,
};
use shared::util::now_millis;
use std::sync::Arc;
use tokio::sync::broadcast;

use super::repository::IssueRepository;
use super::store::IssueStore;
use crate::engine::{self, IssueError, IssueResult};

/// Default capacity of the change broadcast channel
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 1024;

/// What happened to the issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeKind {
    Created,
    Voted { outcome: VoteOutcome },
    StatusChanged { from: IssueStatus, to: IssueStatus },
    Rated,
}

/// Post-commit notification carrying the full record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueChanged {
    pub change: ChangeKind,
    pub issue: Issue,
}

pub struct IssueService {
    store: IssueStore,
    event_tx: broadcast::Sender<IssueChanged>,
}

impl std::fmt::Debug for IssueService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssueService")
            .field("store", &self.store)
            .field("event_tx", &"<broadcast::Sender>")
            .finish()
    }
}

impl IssueService {
    pub fn new(repo: Arc<dyn IssueRepository>, event_capacity: usize) -> Self {
        let (event_tx, _) = broadcast::channel(event_capacity.max(1));
        Self {
            store: IssueStore::new(repo),
            event_tx,
        }
    }

    /// Subscribe to post-commit change events
    pub fn subscribe(&self) -> broadcast::Receiver<IssueChanged> {
        self.event_tx.subscribe()
    }

    fn publish(&self, change: ChangeKind, issue: &Issue) {
        let event = IssueChanged {
            change,
            issue: issue.clone(),
        };
        // 无订阅者时发送失败是正常情况
        if self.event_tx.send(event).is_err() {
            tracing::trace!(issue_id = %issue.id, "No change subscribers");
        }
    }

    // ========== Mutations ==========

    pub async fn create_issue(&self, author: &Principal, draft: IssueDraft) -> IssueResult<Issue> {
        let issue = self.store.create(draft, author, now_millis()).await?;
        tracing::info!(
            issue_id = %issue.id,
            author_id = %author.id,
            city = %issue.city_district,
            category = %issue.category,
            "Issue reported"
        );
        self.publish(ChangeKind::Created, &issue);
        Ok(issue)
    }

    pub async fn vote(
        &self,
        actor: &Principal,
        issue_id: &str,
        direction: VoteDirection,
    ) -> IssueResult<Issue> {
        let (issue, outcome) = self
            .store
            .mutate_then(
                issue_id,
                |current| engine::cast_vote(current, &actor.id, direction, now_millis()),
                |issue, outcome| self.publish(ChangeKind::Voted { outcome: *outcome }, issue),
            )
            .await
            .inspect_err(|e| log_rejection("vote", issue_id, actor, e))?;

        tracing::info!(
            issue_id = %issue_id,
            user_id = %actor.id,
            direction = direction.as_str(),
            outcome = ?outcome,
            up = issue.votes.up_count(),
            down = issue.votes.down_count(),
            "Vote recorded"
        );
        Ok(issue)
    }

    /// `PENDING` / `IN_PROGRESS` only; terminal states use [`resolve`](Self::resolve) / [`reject`](Self::reject)
    pub async fn set_status(
        &self,
        actor: &Principal,
        issue_id: &str,
        status: IssueStatus,
    ) -> IssueResult<Issue> {
        self.transition(actor, issue_id, "set_status", |current| {
            engine::set_status(current, actor, status, now_millis())
        })
        .await
    }

    pub async fn resolve(
        &self,
        actor: &Principal,
        issue_id: &str,
        evidence: &str,
    ) -> IssueResult<Issue> {
        self.transition(actor, issue_id, "resolve", |current| {
            engine::resolve(current, actor, evidence, now_millis())
        })
        .await
    }

    pub async fn reject(
        &self,
        actor: &Principal,
        issue_id: &str,
        reason: RejectionReason,
    ) -> IssueResult<Issue> {
        self.transition(actor, issue_id, "reject", |current| {
            engine::reject(current, actor, reason, now_millis())
        })
        .await
    }

    async fn transition<F>(
        &self,
        actor: &Principal,
        issue_id: &str,
        operation: &'static str,
        f: F,
    ) -> IssueResult<Issue>
    where
        F: Fn(&Issue) -> IssueResult<Issue>,
    {
        let (issue, from) = self
            .store
            .mutate_then(
                issue_id,
                |current| f(current).map(|next| (next, current.status)),
                |issue, from| {
                    self.publish(
                        ChangeKind::StatusChanged {
                            from: *from,
                            to: issue.status,
                        },
                        issue,
                    )
                },
            )
            .await
            .inspect_err(|e| log_rejection(operation, issue_id, actor, e))?;

        tracing::info!(
            issue_id = %issue_id,
            admin_id = %actor.id,
            from = %from,
            to = %issue.status,
            "Issue status changed"
        );
        Ok(issue)
    }

    pub async fn rate(
        &self,
        actor: &Principal,
        issue_id: &str,
        stars: u8,
        comment: Option<&str>,
    ) -> IssueResult<Issue> {
        let (issue, ()) = self
            .store
            .mutate_then(
                issue_id,
                |current| {
                    engine::rate(current, actor, stars, comment, now_millis())
                        .map(|next| (next, ()))
                },
                |issue, _| self.publish(ChangeKind::Rated, issue),
            )
            .await
            .inspect_err(|e| log_rejection("rate", issue_id, actor, e))?;

        tracing::info!(issue_id = %issue_id, stars, "Issue rated");
        Ok(issue)
    }

    // ========== Queries ==========

    pub async fn get(&self, issue_id: &str) -> IssueResult<Issue> {
        self.store.get(issue_id).await
    }

    pub async fn query(&self, filter: &IssueFilter) -> IssueResult<Vec<Issue>> {
        self.store.query(filter).await
    }

    pub async fn query_by_author(&self, author_id: &str) -> IssueResult<Vec<Issue>> {
        self.store.query_by_author(author_id).await
    }

    pub async fn query_by_city(&self, district: &str) -> IssueResult<Vec<Issue>> {
        self.store.query_by_city(district).await
    }

    pub async fn city_stats(&self, district: &str) -> IssueResult<CityStats> {
        let issues = self.store.query_by_city(district).await?;
        Ok(CityStats::from_issues(&issues))
    }

    /// Per-district totals; super admin overview only
    pub async fn district_counts(&self, actor: &Principal) -> IssueResult<Vec<DistrictCount>> {
        if actor.role != UserRole::SuperAdmin {
            return Err(IssueError::Unauthorized(
                "District overview is limited to super administrators".to_string(),
            ));
        }
        let issues = self.store.query(&IssueFilter::default()).await?;
        Ok(DistrictCount::tally(&issues))
    }
}

fn log_rejection(operation: &str, issue_id: &str, actor: &Principal, err: &IssueError) {
    match err {
        IssueError::StorageUnavailable(msg) => tracing::error!(
            operation,
            issue_id = %issue_id,
            user_id = %actor.id,
            error = %msg,
            "Storage failure"
        ),
        other => tracing::debug!(
            operation,
            issue_id = %issue_id,
            user_id = %actor.id,
            error = %other,
            "Operation rejected"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issues::memory::MemoryIssueRepository;

    fn create_test_service() -> IssueService {
        IssueService::new(
            Arc::new(MemoryIssueRepository::new()),
            DEFAULT_EVENT_CHANNEL_CAPACITY,
        )
    }

    fn draft(city: &str) -> IssueDraft {
        IssueDraft {
            title: "Water leak".to_string(),
            description: "Main pipe leaking".to_string(),
            category: "Utilities (Water, Power, Gas)".to_string(),
            address: "Adyar".to_string(),
            city_district: city.to_string(),
            coordinates: None,
            evidence_images: vec![],
        }
    }

    #[tokio::test]
    async fn test_every_mutation_is_broadcast() {
        let service = create_test_service();
        let mut rx = service.subscribe();
        let author = Principal::citizen("a", "A");
        let voter = Principal::citizen("b", "B");
        let admin = Principal::city_admin("adm", "Adm", "Chennai");

        let issue = service.create_issue(&author, draft("Chennai")).await.unwrap();
        let voted = service
            .vote(&voter, &issue.id, VoteDirection::Up)
            .await
            .unwrap();
        let working = service
            .set_status(&admin, &issue.id, IssueStatus::InProgress)
            .await
            .unwrap();

        let created = rx.recv().await.unwrap();
        assert_eq!(created.change, ChangeKind::Created);
        assert_eq!(created.issue, issue);

        let vote_event = rx.recv().await.unwrap();
        assert_eq!(
            vote_event.change,
            ChangeKind::Voted {
                outcome: VoteOutcome::Cast
            }
        );
        assert_eq!(vote_event.issue, voted);

        let status_event = rx.recv().await.unwrap();
        assert_eq!(
            status_event.change,
            ChangeKind::StatusChanged {
                from: IssueStatus::Pending,
                to: IssueStatus::InProgress
            }
        );
        assert_eq!(status_event.issue, working);
    }

    #[tokio::test]
    async fn test_failed_mutation_is_not_broadcast() {
        let service = create_test_service();
        let author = Principal::citizen("a", "A");
        let issue = service.create_issue(&author, draft("Chennai")).await.unwrap();

        let mut rx = service.subscribe();
        let err = service
            .vote(&author, &issue.id, VoteDirection::Up)
            .await
            .unwrap_err();
        assert_eq!(err, IssueError::SelfVoteForbidden);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unknown_issue() {
        let service = create_test_service();
        let voter = Principal::citizen("b", "B");
        assert_eq!(
            service
                .vote(&voter, "missing", VoteDirection::Down)
                .await
                .unwrap_err(),
            IssueError::NotFound("missing".to_string())
        );
    }

    #[tokio::test]
    async fn test_city_stats_and_district_counts() {
        let service = create_test_service();
        let author = Principal::citizen("a", "A");
        let admin = Principal::city_admin("adm", "Adm", "Chennai");
        let root = Principal::super_admin("root", "Root");

        let first = service.create_issue(&author, draft("Chennai")).await.unwrap();
        let second = service.create_issue(&author, draft("chennai")).await.unwrap();
        service.create_issue(&author, draft("Pune")).await.unwrap();

        service.resolve(&admin, &first.id, "done.jpg").await.unwrap();
        service
            .reject(&admin, &second.id, RejectionReason::Duplicate)
            .await
            .unwrap();

        let stats = service.city_stats("CHENNAI").await.unwrap();
        assert_eq!(
            stats,
            CityStats {
                total: 2,
                pending: 0,
                in_progress: 0,
                resolved: 1,
                rejected: 1,
            }
        );

        let counts = service.district_counts(&root).await.unwrap();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].issues, 2);

        assert!(matches!(
            service.district_counts(&admin).await,
            Err(IssueError::Unauthorized(_))
        ));
    }
}
