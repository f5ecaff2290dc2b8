//! Status transition engine
//!
//! ```text
//! PENDING ⇄ IN_PROGRESS
//!    │           │
//!    └──► RESOLVED | REJECTED   (terminal, locked)
//! ```
//!
//! Every function is pure: it takes the current record plus `now` and
//! returns the next record. Persistence and broadcasting happen in the
//! service layer.

use shared::models::{Issue, IssueStatus, Principal, RejectionReason};

use super::error::{IssueError, IssueResult};

/// Administrator scoped to the issue's district
fn authorize(actor: &Principal, issue: &Issue) -> IssueResult<()> {
    if !actor.role.is_admin() {
        return Err(IssueError::Unauthorized(
            "Only city administrators can change an issue's status".to_string(),
        ));
    }
    if !actor.administers(&issue.city_district) {
        return Err(IssueError::Unauthorized(format!(
            "Issue belongs to district {}",
            issue.city_district
        )));
    }
    Ok(())
}

fn ensure_open(issue: &Issue) -> IssueResult<()> {
    if issue.is_locked() {
        return Err(IssueError::IssueLocked);
    }
    Ok(())
}

fn touched(issue: &Issue, now: i64) -> (Issue, i64) {
    let stamp = now.max(issue.updated_at);
    let mut next = issue.clone();
    next.updated_at = stamp;
    (next, stamp)
}

/// Move an open issue back to `PENDING`
pub fn set_pending(issue: &Issue, actor: &Principal, now: i64) -> IssueResult<Issue> {
    set_open_status(issue, actor, IssueStatus::Pending, now)
}

/// Move an open issue to `IN_PROGRESS`
pub fn set_in_progress(issue: &Issue, actor: &Principal, now: i64) -> IssueResult<Issue> {
    set_open_status(issue, actor, IssueStatus::InProgress, now)
}

/// Dispatch for the non-terminal targets
///
/// Terminal targets must go through [`resolve`] or [`reject`], which carry
/// their own payloads.
pub fn set_status(
    issue: &Issue,
    actor: &Principal,
    target: IssueStatus,
    now: i64,
) -> IssueResult<Issue> {
    match target {
        IssueStatus::Pending => set_pending(issue, actor, now),
        IssueStatus::InProgress => set_in_progress(issue, actor, now),
        IssueStatus::Resolved | IssueStatus::Rejected => Err(IssueError::Validation(format!(
            "Status {target} requires the resolve or reject operation"
        ))),
    }
}

fn set_open_status(
    issue: &Issue,
    actor: &Principal,
    target: IssueStatus,
    now: i64,
) -> IssueResult<Issue> {
    // 1. Admin of this district
    authorize(actor, issue)?;

    // 2. Not terminal
    ensure_open(issue)?;

    let (mut next, _) = touched(issue, now);
    next.status = target;
    Ok(next)
}

/// Resolve with evidence of the fix
///
/// Evidence is validated before the lock, so a blank evidence string
/// always yields [`IssueError::EvidenceRequired`].
pub fn resolve(
    issue: &Issue,
    actor: &Principal,
    evidence: &str,
    now: i64,
) -> IssueResult<Issue> {
    // 1. Admin of this district
    authorize(actor, issue)?;

    // 2. Evidence present
    let evidence = evidence.trim();
    if evidence.is_empty() {
        return Err(IssueError::EvidenceRequired);
    }

    // 3. Not terminal
    ensure_open(issue)?;

    let (mut next, stamp) = touched(issue, now);
    next.status = IssueStatus::Resolved;
    next.resolution_evidence = Some(evidence.to_string());
    next.resolution_timestamp = Some(stamp);
    Ok(next)
}

/// Reject with one of the fixed reasons
pub fn reject(
    issue: &Issue,
    actor: &Principal,
    reason: RejectionReason,
    now: i64,
) -> IssueResult<Issue> {
    // 1. Admin of this district
    authorize(actor, issue)?;

    // 2. Not terminal
    ensure_open(issue)?;

    let (mut next, _) = touched(issue, now);
    next.status = IssueStatus::Rejected;
    next.rejection_reason = Some(reason);
    Ok(next)
}

/// Author feedback on a resolved issue; overwrites any previous rating
pub fn rate(
    issue: &Issue,
    actor: &Principal,
    stars: u8,
    comment: Option<&str>,
    now: i64,
) -> IssueResult<Issue> {
    // 1. Only resolved issues can be rated
    if issue.status != IssueStatus::Resolved {
        return Err(IssueError::NotResolvedYet);
    }

    // 2. Only the author
    if actor.id != issue.author_id {
        return Err(IssueError::NotAuthor);
    }

    // 3. 1..=5 stars
    if !(1..=5).contains(&stars) {
        return Err(IssueError::InvalidRating(stars));
    }

    let (mut next, _) = touched(issue, now);
    next.rating = Some(stars);
    next.rating_comment = comment
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string);
    Ok(next)
}
