use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Lifecycle and vote errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IssueError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Issue not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Authors cannot vote on their own report")]
    SelfVoteForbidden,

    #[error("Voting is closed for this issue")]
    VotingClosed,

    #[error("Issue is resolved or rejected")]
    IssueLocked,

    #[error("Resolution evidence is required")]
    EvidenceRequired,

    #[error("Issue is not resolved yet")]
    NotResolvedYet,

    #[error("Only the author can rate this issue")]
    NotAuthor,

    #[error("Invalid rating: {0}")]
    InvalidRating(u8),

    /// Record kept changing under concurrent writers
    #[error("Issue is busy: {0}")]
    Contended(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

pub type IssueResult<T> = Result<T, IssueError>;

impl IssueError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::ValidationFailed,
            Self::NotFound(_) => ErrorCode::IssueNotFound,
            Self::Unauthorized(_) => ErrorCode::PermissionDenied,
            Self::SelfVoteForbidden => ErrorCode::SelfVoteForbidden,
            Self::VotingClosed => ErrorCode::VotingClosed,
            Self::IssueLocked => ErrorCode::IssueLocked,
            Self::EvidenceRequired => ErrorCode::EvidenceRequired,
            Self::NotResolvedYet => ErrorCode::NotResolvedYet,
            Self::NotAuthor => ErrorCode::NotAuthor,
            Self::InvalidRating(_) => ErrorCode::InvalidRating,
            Self::Contended(_) => ErrorCode::SystemBusy,
            Self::StorageUnavailable(_) => ErrorCode::StorageUnavailable,
        }
    }
}

impl From<IssueError> for AppError {
    fn from(err: IssueError) -> Self {
        let code = err.code();
        match err {
            IssueError::Validation(msg) | IssueError::Unauthorized(msg) => {
                AppError::with_message(code, msg)
            }
            IssueError::NotFound(id) => AppError::issue_not_found(id),
            IssueError::InvalidRating(stars) => {
                AppError::new(code).with_detail("stars", stars)
            }
            IssueError::Contended(id) => AppError::new(code).with_detail("issueId", id),
            IssueError::StorageUnavailable(msg) => {
                // 技术细节只进日志，不返回给客户端
                tracing::error!(error = %msg, "Storage unavailable");
                AppError::new(code)
            }
            _ => AppError::new(code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_error_kinds_map_to_status() {
        let cases = [
            (IssueError::Validation("title".into()), StatusCode::BAD_REQUEST),
            (IssueError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (IssueError::Unauthorized("no".into()), StatusCode::FORBIDDEN),
            (IssueError::SelfVoteForbidden, StatusCode::FORBIDDEN),
            (IssueError::NotAuthor, StatusCode::FORBIDDEN),
            (IssueError::VotingClosed, StatusCode::CONFLICT),
            (IssueError::IssueLocked, StatusCode::CONFLICT),
            (IssueError::EvidenceRequired, StatusCode::UNPROCESSABLE_ENTITY),
            (IssueError::NotResolvedYet, StatusCode::UNPROCESSABLE_ENTITY),
            (IssueError::InvalidRating(9), StatusCode::UNPROCESSABLE_ENTITY),
            (
                IssueError::StorageUnavailable("disk".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];

        for (err, status) in cases {
            let app: AppError = err.clone().into();
            assert_eq!(app.http_status(), status, "{err:?}");
        }
    }

    #[test]
    fn test_storage_detail_is_not_exposed() {
        let app: AppError = IssueError::StorageUnavailable("/var/lib/civic/issues.redb".into()).into();
        assert!(!app.message.contains("redb"));
    }

    #[test]
    fn test_self_vote_message() {
        let app: AppError = IssueError::SelfVoteForbidden.into();
        assert_eq!(app.message, "You cannot confirm your own report");
    }
}
