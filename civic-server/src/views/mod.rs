//! View synchronization
//!
//! 客户端缓存的各个投影 (作者列表、城市列表、过滤列表、地图标记、详情面板)
//! 在每次变更后整体替换对应 id 的记录，从不合并部分字段。
//!
//! ```text
//! IssueService ──(broadcast IssueChanged)──► follow() ──► IssueViews::apply()
//! ```

mod list;

pub use list::{IssueList, VersionFloor};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use shared::models::{Coordinates, Issue, IssueFilter, IssueStatus};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::issues::IssueChanged;

/// Shared handle used by the change follower
pub type SharedViews = Arc<RwLock<IssueViews>>;

/// Map pin for an issue that carries coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapMarker {
    pub id: String,
    pub title: String,
    pub category: String,
    pub status: IssueStatus,
    pub coordinates: Coordinates,
    pub up_count: u32,
    pub down_count: u32,
    pub version: u64,
}

impl MapMarker {
    pub fn from_issue(issue: &Issue) -> Option<Self> {
        let coordinates = issue.coordinates?;
        Some(Self {
            id: issue.id.clone(),
            title: issue.title.clone(),
            category: issue.category.clone(),
            status: issue.status,
            coordinates,
            up_count: issue.votes.up_count(),
            down_count: issue.votes.down_count(),
            version: issue.version,
        })
    }
}

/// Every projection one client keeps of the issue set
#[derive(Debug, Default)]
pub struct IssueViews {
    author: Option<IssueList>,
    city: Option<IssueList>,
    filtered: Option<IssueList>,
    markers_filter: IssueFilter,
    markers: BTreeMap<String, MapMarker>,
    marker_floor: VersionFloor,
    detail: Option<Issue>,
}

impl IssueViews {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_shared(self) -> SharedViews {
        Arc::new(RwLock::new(self))
    }

    // ========== Seeding ==========

    /// "My reports" list
    pub fn load_author(&mut self, author_id: &str, issues: Vec<Issue>) {
        let mut list = IssueList::new(IssueFilter::by_author(author_id));
        list.load(issues);
        self.author = Some(list);
    }

    /// City feed
    pub fn load_city(&mut self, district: &str, issues: Vec<Issue>) {
        let mut list = IssueList::new(IssueFilter::by_city(district));
        list.load(issues);
        self.city = Some(list);
    }

    /// Dashboard list with arbitrary filter
    pub fn load_filtered(&mut self, filter: IssueFilter, issues: Vec<Issue>) {
        let mut list = IssueList::new(filter);
        list.load(issues);
        self.filtered = Some(list);
    }

    pub fn load_markers(&mut self, filter: IssueFilter, issues: &[Issue]) {
        self.marker_floor.reset(issues);
        self.markers = issues
            .iter()
            .filter(|issue| filter.matches(issue))
            .filter_map(MapMarker::from_issue)
            .map(|marker| (marker.id.clone(), marker))
            .collect();
        self.markers_filter = filter;
    }

    pub fn open_detail(&mut self, issue: Issue) {
        self.detail = Some(issue);
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }

    // ========== Sync ==========

    /// Push one authoritative record into every projection
    pub fn apply(&mut self, issue: &Issue) {
        for list in [&mut self.author, &mut self.city, &mut self.filtered]
            .into_iter()
            .flatten()
        {
            list.apply(issue);
        }

        self.apply_marker(issue);

        if let Some(detail) = self.detail.as_mut()
            && detail.id == issue.id
            && detail.version <= issue.version
        {
            *detail = issue.clone();
        }
    }

    fn apply_marker(&mut self, issue: &Issue) {
        if !self.marker_floor.admit(issue) {
            return;
        }
        match MapMarker::from_issue(issue) {
            Some(marker) if self.markers_filter.matches(issue) => {
                self.markers.insert(marker.id.clone(), marker);
            }
            _ => {
                self.markers.remove(&issue.id);
            }
        }
    }

    // ========== Read ==========

    pub fn author_list(&self) -> Option<&IssueList> {
        self.author.as_ref()
    }

    pub fn city_list(&self) -> Option<&IssueList> {
        self.city.as_ref()
    }

    pub fn filtered_list(&self) -> Option<&IssueList> {
        self.filtered.as_ref()
    }

    pub fn markers(&self) -> impl Iterator<Item = &MapMarker> {
        self.markers.values()
    }

    pub fn marker(&self, id: &str) -> Option<&MapMarker> {
        self.markers.get(id)
    }

    pub fn detail(&self) -> Option<&Issue> {
        self.detail.as_ref()
    }
}

/// Apply change events until the channel closes
///
/// A lagged receiver has missed records; the caller should reload the
/// projections from the service.
pub async fn follow(views: SharedViews, mut rx: broadcast::Receiver<IssueChanged>) {
    loop {
        match rx.recv().await {
            Ok(event) => {
                views.write().apply(&event.issue);
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "View follower lagged, projections may be stale");
            }
            Err(broadcast::error::RecvError::Closed) => {
                tracing::debug!("Change channel closed, view follower stopping");
                break;
            }
        }
    }
}
