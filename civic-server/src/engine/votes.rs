//! Vote aggregator
//!
//! 投票前置条件检查 + 账本计算。纯函数，不做持久化。

use shared::models::{Issue, VoteDirection, VoteLedger, VoteOutcome};

use super::error::{IssueError, IssueResult};

/// Compute the ledger after `user_id` votes `direction` on `issue`
///
/// Self-vote is checked before the lock, so an author voting on their own
/// resolved report still gets [`IssueError::SelfVoteForbidden`].
pub fn apply_vote(
    issue: &Issue,
    user_id: &str,
    direction: VoteDirection,
) -> IssueResult<(VoteLedger, VoteOutcome)> {
    // 1. Authors never vote on their own report
    if user_id == issue.author_id {
        return Err(IssueError::SelfVoteForbidden);
    }

    // 2. Terminal states are closed for voting
    if issue.is_locked() {
        return Err(IssueError::VotingClosed);
    }

    Ok(issue.votes.tally(user_id, direction))
}

/// Full-record form of [`apply_vote`]: returns the next issue value
pub fn cast_vote(
    issue: &Issue,
    user_id: &str,
    direction: VoteDirection,
    now: i64,
) -> IssueResult<(Issue, VoteOutcome)> {
    let (votes, outcome) = apply_vote(issue, user_id, direction)?;
    let mut next = issue.clone();
    next.votes = votes;
    next.updated_at = now.max(issue.updated_at);
    Ok((next, outcome))
}
