//! Dashboard statistics

use super::issue::{Issue, IssueStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Status breakdown for one city district
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityStats {
    pub total: u64,
    pub pending: u64,
    pub in_progress: u64,
    pub resolved: u64,
    pub rejected: u64,
}

impl CityStats {
    pub fn from_issues<'a>(issues: impl IntoIterator<Item = &'a Issue>) -> Self {
        let mut stats = Self::default();
        for issue in issues {
            stats.total += 1;
            match issue.status {
                IssueStatus::Pending => stats.pending += 1,
                IssueStatus::InProgress => stats.in_progress += 1,
                IssueStatus::Resolved => stats.resolved += 1,
                IssueStatus::Rejected => stats.rejected += 1,
            }
        }
        stats
    }
}

/// Issue count per district (super admin overview)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistrictCount {
    pub district: String,
    pub issues: u64,
}

impl DistrictCount {
    /// Group by district (case-insensitive, first spelling wins),
    /// sorted by count descending then name
    pub fn tally<'a>(issues: impl IntoIterator<Item = &'a Issue>) -> Vec<DistrictCount> {
        let mut grouped: BTreeMap<String, DistrictCount> = BTreeMap::new();
        for issue in issues {
            let key = issue.city_district.trim().to_lowercase();
            grouped
                .entry(key)
                .or_insert_with(|| DistrictCount {
                    district: issue.city_district.trim().to_string(),
                    issues: 0,
                })
                .issues += 1;
        }
        let mut counts: Vec<_> = grouped.into_values().collect();
        counts.sort_by(|a, b| {
            b.issues
                .cmp(&a.issues)
                .then_with(|| a.district.cmp(&b.district))
        });
        counts
    }
}
