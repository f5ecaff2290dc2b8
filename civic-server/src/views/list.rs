//! Filtered, sorted issue list

use shared::models::{Issue, IssueFilter, sort_newest_first};
use std::collections::HashMap;

/// Highest version seen per issue id
///
/// Outlives membership: once a newer record has pushed an issue out of a
/// projection, an older record for it is still refused.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionFloor(HashMap<String, u64>);

impl VersionFloor {
    /// Record `issue` as seen; `false` if its version is not newer than the floor
    pub fn admit(&mut self, issue: &Issue) -> bool {
        match self.0.get_mut(&issue.id) {
            Some(seen) if *seen >= issue.version => false,
            Some(seen) => {
                *seen = issue.version;
                true
            }
            None => {
                self.0.insert(issue.id.clone(), issue.version);
                true
            }
        }
    }

    /// Restart from a fresh query result
    pub fn reset<'a>(&mut self, issues: impl IntoIterator<Item = &'a Issue>) {
        self.0 = issues
            .into_iter()
            .map(|issue| (issue.id.clone(), issue.version))
            .collect();
    }

    pub fn get(&self, id: &str) -> Option<u64> {
        self.0.get(id).copied()
    }
}

/// One cached list of issues, kept newest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueList {
    filter: IssueFilter,
    items: Vec<Issue>,
    floor: VersionFloor,
}

impl IssueList {
    pub fn new(filter: IssueFilter) -> Self {
        Self {
            filter,
            items: Vec::new(),
            floor: VersionFloor::default(),
        }
    }

    /// Replace the whole content with a fresh query result
    pub fn load(&mut self, issues: Vec<Issue>) {
        self.floor.reset(&issues);
        self.items = issues
            .into_iter()
            .filter(|issue| self.filter.matches(issue))
            .collect();
        sort_newest_first(&mut self.items);
    }

    /// Swap in the authoritative record for its id
    ///
    /// Returns `false` when a record with the same or a higher version was
    /// already seen, even if that record removed the issue from the list.
    /// Membership follows the filter: an issue that stops matching leaves,
    /// one that starts matching joins.
    pub fn apply(&mut self, issue: &Issue) -> bool {
        if !self.floor.admit(issue) {
            return false;
        }

        let position = self.items.iter().position(|cached| cached.id == issue.id);
        match (position, self.filter.matches(issue)) {
            (Some(idx), true) => self.items[idx] = issue.clone(),
            (Some(idx), false) => {
                self.items.remove(idx);
            }
            (None, true) => {
                self.items.push(issue.clone());
                sort_newest_first(&mut self.items);
            }
            (None, false) => {}
        }
        true
    }

    pub fn filter(&self) -> &IssueFilter {
        &self.filter
    }

    pub fn items(&self) -> &[Issue] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&Issue> {
        self.items.iter().find(|issue| issue.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
