//! Unified error codes for the civic issue platform
//!
//! This module defines all error codes shared by the server and its clients.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Issue lifecycle errors
//! - 5xxx: Community vote errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Only the report's author may perform this action
    NotAuthor = 2007,

    // ==================== 4xxx: Issue ====================
    /// Issue not found
    IssueNotFound = 4001,
    /// Issue is resolved or rejected and can no longer change status
    IssueLocked = 4002,
    /// Resolution requires an evidence image
    EvidenceRequired = 4003,
    /// Rejection reason is not one of the allowed values
    InvalidRejectionReason = 4004,
    /// Issue has not been resolved yet
    NotResolvedYet = 4005,
    /// Rating must be between 1 and 5
    InvalidRating = 4006,

    // ==================== 5xxx: Vote ====================
    /// Authors cannot vote on their own report
    SelfVoteForbidden = 5001,
    /// Voting is closed for resolved or rejected issues
    VotingClosed = 5002,
    /// Vote direction is not "up" or "down"
    InvalidVoteDirection = 5003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Persistence collaborator unavailable
    StorageUnavailable = 9002,
    /// Operation timed out
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// Record changed concurrently, retry later
    SystemBusy = 9404,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the default, user-facing message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "Please sign in to continue",
            ErrorCode::TokenExpired => "Your session has expired, please sign in again",
            ErrorCode::TokenInvalid => "Authentication token is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::NotAuthor => "Only the person who reported this issue can rate it",

            // Issue
            ErrorCode::IssueNotFound => "Issue not found",
            ErrorCode::IssueLocked => "This issue is already resolved or rejected",
            ErrorCode::EvidenceRequired => "Upload a photo of the fix before resolving",
            ErrorCode::InvalidRejectionReason => "Choose one of the listed rejection reasons",
            ErrorCode::NotResolvedYet => "You can rate an issue once it has been resolved",
            ErrorCode::InvalidRating => "Rating must be between 1 and 5 stars",

            // Vote
            ErrorCode::SelfVoteForbidden => "You cannot confirm your own report",
            ErrorCode::VotingClosed => "Voting is closed for resolved or rejected issues",
            ErrorCode::InvalidVoteDirection => "Vote must be \"up\" or \"down\"",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::StorageUnavailable => "Storage is unavailable, please retry later",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::SystemBusy => "System busy, please retry later",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            5 => Ok(ErrorCode::InvalidRequest),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2007 => Ok(ErrorCode::NotAuthor),

            // Issue
            4001 => Ok(ErrorCode::IssueNotFound),
            4002 => Ok(ErrorCode::IssueLocked),
            4003 => Ok(ErrorCode::EvidenceRequired),
            4004 => Ok(ErrorCode::InvalidRejectionReason),
            4005 => Ok(ErrorCode::NotResolvedYet),
            4006 => Ok(ErrorCode::InvalidRating),

            // Vote
            5001 => Ok(ErrorCode::SelfVoteForbidden),
            5002 => Ok(ErrorCode::VotingClosed),
            5003 => Ok(ErrorCode::InvalidVoteDirection),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::StorageUnavailable),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9404 => Ok(ErrorCode::SystemBusy),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::NotAuthor.code(), 2007);
        assert_eq!(ErrorCode::IssueLocked.code(), 4002);
        assert_eq!(ErrorCode::SelfVoteForbidden.code(), 5001);
        assert_eq!(ErrorCode::StorageUnavailable.code(), 9002);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::NotFound.is_success());
        assert!(!ErrorCode::VotingClosed.is_success());
    }

    #[test]
    fn test_try_from_every_variant() {
        let codes = [
            ErrorCode::Success,
            ErrorCode::Unknown,
            ErrorCode::ValidationFailed,
            ErrorCode::NotFound,
            ErrorCode::InvalidRequest,
            ErrorCode::RequiredField,
            ErrorCode::ValueOutOfRange,
            ErrorCode::NotAuthenticated,
            ErrorCode::TokenExpired,
            ErrorCode::TokenInvalid,
            ErrorCode::PermissionDenied,
            ErrorCode::NotAuthor,
            ErrorCode::IssueNotFound,
            ErrorCode::IssueLocked,
            ErrorCode::EvidenceRequired,
            ErrorCode::InvalidRejectionReason,
            ErrorCode::NotResolvedYet,
            ErrorCode::InvalidRating,
            ErrorCode::SelfVoteForbidden,
            ErrorCode::VotingClosed,
            ErrorCode::InvalidVoteDirection,
            ErrorCode::InternalError,
            ErrorCode::StorageUnavailable,
            ErrorCode::TimeoutError,
            ErrorCode::ConfigError,
            ErrorCode::SystemBusy,
        ];

        for code in codes {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(4999), Err(InvalidErrorCode(4999)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::VotingClosed).unwrap();
        assert_eq!(json, "5002");

        let code: ErrorCode = serde_json::from_str("4003").unwrap();
        assert_eq!(code, ErrorCode::EvidenceRequired);

        let result: Result<ErrorCode, _> = serde_json::from_str("10000");
        assert!(result.is_err());
    }

    #[test]
    fn test_message_is_actionable() {
        assert_eq!(
            ErrorCode::SelfVoteForbidden.message(),
            "You cannot confirm your own report"
        );
        assert_eq!(ErrorCode::IssueNotFound.message(), "Issue not found");
    }

    #[test]
    fn test_invalid_error_code_display() {
        let err = InvalidErrorCode(999);
        assert_eq!(format!("{}", err), "invalid error code: 999");
    }
}
