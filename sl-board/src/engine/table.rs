//! The published boards and site status, shared with readers.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Local};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::domain::{Board, SiteId};
use crate::fetch::HealthState;

/// A board as last published for one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedBoard {
    pub name: String,
    pub site: SiteId,
    pub board: Board,
    /// `None` until the board is first built.
    pub updated_at: Option<DateTime<Local>>,
}

impl PublishedBoard {
    pub(crate) fn placeholder(name: impl Into<String>, site: SiteId) -> Self {
        Self {
            name: name.into(),
            site,
            board: Board::empty(),
            updated_at: None,
        }
    }
}

/// What the enable gate said on the last tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GateStatus {
    Enabled,
    Disabled,
    Unavailable,
}

/// Snapshot of one site's fetch and health state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteStatus {
    pub site: SiteId,
    pub gate: GateStatus,
    pub health: HealthState,
    pub consecutive_failures: u32,
    pub degraded_since: Option<DateTime<Local>>,
    pub last_fetch_at: Option<DateTime<Local>>,
    pub last_success_at: Option<DateTime<Local>>,
    pub last_error: Option<String>,
    /// Departures in the current payload, before group filtering.
    pub departures: usize,
    pub groups: Vec<String>,
}

#[derive(Debug, Default)]
struct Tables {
    boards: BTreeMap<String, Arc<PublishedBoard>>,
    sites: BTreeMap<SiteId, SiteStatus>,
}

/// Thread-safe view of the latest boards.
///
/// Boards are replaced wholesale; readers get an `Arc` and never observe a
/// partially built board.
#[derive(Debug, Clone, Default)]
pub struct BoardTable {
    inner: Arc<RwLock<Tables>>,
}

impl BoardTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn seeded(
        boards: impl IntoIterator<Item = PublishedBoard>,
        sites: impl IntoIterator<Item = SiteStatus>,
    ) -> Self {
        let tables = Tables {
            boards: boards
                .into_iter()
                .map(|b| (b.name.clone(), Arc::new(b)))
                .collect(),
            sites: sites.into_iter().map(|s| (s.site, s)).collect(),
        };
        Self {
            inner: Arc::new(RwLock::new(tables)),
        }
    }

    /// Look up a board by group name.
    pub async fn board(&self, name: &str) -> Option<Arc<PublishedBoard>> {
        let guard = self.inner.read().await;
        guard.boards.get(name).cloned()
    }

    /// All boards, ordered by name.
    pub async fn boards(&self) -> Vec<Arc<PublishedBoard>> {
        let guard = self.inner.read().await;
        guard.boards.values().cloned().collect()
    }

    pub async fn site(&self, site: SiteId) -> Option<SiteStatus> {
        let guard = self.inner.read().await;
        guard.sites.get(&site).cloned()
    }

    /// All site snapshots, ordered by site id.
    pub async fn sites(&self) -> Vec<SiteStatus> {
        let guard = self.inner.read().await;
        guard.sites.values().cloned().collect()
    }

    /// Replace a site's status and any of its boards in one write.
    pub async fn publish(&self, status: SiteStatus, boards: Vec<PublishedBoard>) {
        let mut guard = self.inner.write().await;
        for board in boards {
            guard.boards.insert(board.name.clone(), Arc::new(board));
        }
        guard.sites.insert(status.site, status);
    }
}
