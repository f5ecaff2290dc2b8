//! Issue Model

use super::vote::VoteLedger;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Maximum number of evidence images on a report
pub const MAX_EVIDENCE_IMAGES: usize = 5;

/// Category assigned when the reporter leaves it empty
pub const DEFAULT_CATEGORY: &str = "Other";

/// Categories offered by the reporting form
pub const ISSUE_CATEGORIES: [&str; 6] = [
    "Infrastructure (Potholes, Roads)",
    "Sanitation (Garbage, Debris)",
    "Utilities (Water, Power, Gas)",
    "Public Safety",
    "Parks & Recreation",
    DEFAULT_CATEGORY,
];

/// Issue lifecycle status
///
/// `PENDING ⇄ IN_PROGRESS → RESOLVED | REJECTED`, plus direct
/// `PENDING → RESOLVED | REJECTED`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueStatus {
    #[default]
    Pending,
    InProgress,
    Resolved,
    Rejected,
}

impl IssueStatus {
    /// Terminal states accept no further status change and no votes
    pub fn is_locked(&self) -> bool {
        matches!(self, Self::Resolved | Self::Rejected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Resolved => "RESOLVED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl std::fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IssueStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "RESOLVED" => Ok(Self::Resolved),
            "REJECTED" => Ok(Self::Rejected),
            other => Err(format!("unknown issue status: {other}")),
        }
    }
}

/// Reason an administrator gives when rejecting a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionReason {
    Duplicate,
    WrongLocation,
    NotCivic,
    Spam,
    InsufficientInfo,
}

impl RejectionReason {
    pub const ALL: [RejectionReason; 5] = [
        Self::Duplicate,
        Self::WrongLocation,
        Self::NotCivic,
        Self::Spam,
        Self::InsufficientInfo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Duplicate => "DUPLICATE",
            Self::WrongLocation => "WRONG_LOCATION",
            Self::NotCivic => "NOT_CIVIC",
            Self::Spam => "SPAM",
            Self::InsufficientInfo => "INSUFFICIENT_INFO",
        }
    }

    /// Label shown to citizens
    pub fn label(&self) -> &'static str {
        match self {
            Self::Duplicate => "Duplicate Issue",
            Self::WrongLocation => "Wrong Location",
            Self::NotCivic => "Not a Civic Issue",
            Self::Spam => "Spam / Fake Report",
            Self::InsufficientInfo => "Insufficient Information",
        }
    }
}

impl std::str::FromStr for RejectionReason {
    type Err = String;

    /// Accepts the wire name (`WRONG_LOCATION`) or the label (`Wrong Location`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|r| s == r.as_str() || s.eq_ignore_ascii_case(r.label()))
            .ok_or_else(|| format!("unknown rejection reason: {s}"))
    }
}

/// Geographic position of a report
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct Coordinates {
    #[validate(range(min = -90.0, max = 90.0, message = "latitude must be within ±90"))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "longitude must be within ±180"))]
    pub lng: f64,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("must not be blank".into()));
    }
    Ok(())
}

/// Create issue payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct IssueDraft {
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    #[validate(custom(function = "not_blank"))]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[validate(custom(function = "not_blank"))]
    pub address: String,
    #[validate(custom(function = "not_blank"))]
    pub city_district: String,
    #[serde(default)]
    #[validate(nested)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    #[validate(length(max = 5, message = "at most 5 evidence images"))]
    pub evidence_images: Vec<String>,
}

impl IssueDraft {
    /// Category to store: empty becomes [`DEFAULT_CATEGORY`], anything else verbatim
    pub fn resolved_category(&self) -> String {
        let trimmed = self.category.trim();
        if trimmed.is_empty() {
            DEFAULT_CATEGORY.to_string()
        } else {
            trimmed.to_string()
        }
    }
}

/// Issue record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub status: IssueStatus,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub evidence_images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_evidence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<RejectionReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_comment: Option<String>,
    #[serde(default)]
    pub votes: VoteLedger,
    pub author_id: String,
    pub author_name: String,
    pub city_district: String,
    pub created_at: i64,
    pub updated_at: i64,
    /// Bumped by every committed mutation
    #[serde(default)]
    pub version: u64,
}

impl Issue {
    pub fn is_locked(&self) -> bool {
        self.status.is_locked()
    }

    pub fn in_district(&self, district: &str) -> bool {
        self.city_district
            .trim()
            .eq_ignore_ascii_case(district.trim())
    }
}

/// Conjunctive query filter; `None` fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueFilter {
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default, alias = "city")]
    pub city_district: Option<String>,
    #[serde(default)]
    pub status: Option<IssueStatus>,
    #[serde(default)]
    pub category: Option<String>,
}

impl IssueFilter {
    pub fn by_author(author_id: impl Into<String>) -> Self {
        Self {
            author_id: Some(author_id.into()),
            ..Default::default()
        }
    }

    pub fn by_city(district: impl Into<String>) -> Self {
        Self {
            city_district: Some(district.into()),
            ..Default::default()
        }
    }

    pub fn matches(&self, issue: &Issue) -> bool {
        self.author_id
            .as_deref()
            .is_none_or(|author| issue.author_id == author)
            && self
                .city_district
                .as_deref()
                .is_none_or(|district| issue.in_district(district))
            && self.status.is_none_or(|status| issue.status == status)
            && self
                .category
                .as_deref()
                .is_none_or(|category| issue.category == category)
    }
}

/// Newest first, id as tiebreaker for a stable order
pub fn sort_newest_first(issues: &mut [Issue]) {
    issues.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}
