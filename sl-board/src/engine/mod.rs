//! Tick orchestration across sites.
//!
//! Each tick, every site is refreshed concurrently: gate check, one throttled
//! fetch, health tracking, and a rebuild of that site's boards when a new
//! payload arrived. Results go to a shared [`BoardTable`].

mod run;
mod table;

pub use run::{run, run_until};
pub use table::{BoardTable, GateStatus, PublishedBoard, SiteStatus};

use std::sync::Arc;

use chrono::{DateTime, Local};
use futures::future::join_all;

use crate::board::{GroupConfig, assemble, select};
use crate::domain::SiteId;
use crate::fetch::{FetchOutcome, FetchStatus, HealthEvent, SiteFetchState, fetch};
use crate::gate::EnableGate;
use crate::sl::DepartureFeed;

/// One site, its groups and its optional enable gate.
#[derive(Debug, Clone)]
pub struct SiteSpec {
    pub state: SiteFetchState,
    pub groups: Vec<GroupConfig>,
    pub gate: Option<Arc<dyn EnableGate>>,
}

impl SiteSpec {
    pub fn new(state: SiteFetchState) -> Self {
        Self {
            state,
            groups: Vec::new(),
            gate: None,
        }
    }

    pub fn with_group(mut self, group: GroupConfig) -> Self {
        self.groups.push(group);
        self
    }

    pub fn with_gate(mut self, gate: Arc<dyn EnableGate>) -> Self {
        self.gate = Some(gate);
        self
    }
}

/// What happened to one site during a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteTick {
    /// The gate is off; boards were cleared and nothing was fetched.
    Disabled,
    /// The gate could not be read; nothing changed.
    GateUnavailable,
    Fetched {
        status: FetchStatus,
        event: HealthEvent,
        /// Whether the site's boards were rebuilt from a new payload.
        rebuilt: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteReport {
    pub site: SiteId,
    pub tick: SiteTick,
}

#[derive(Debug)]
struct SiteSlot {
    state: SiteFetchState,
    groups: Vec<GroupConfig>,
    gate: Option<Arc<dyn EnableGate>>,
    /// Payload generation the published boards were built from.
    built_from: Option<u64>,
    gate_warned: bool,
}

impl SiteSlot {
    fn new(spec: SiteSpec) -> Self {
        let site = spec.state.site;
        let mut groups: Vec<_> = spec
            .groups
            .into_iter()
            .filter(|group| {
                let own = group.site == site;
                if !own {
                    tracing::warn!(
                        %site,
                        group = %group.name,
                        "ignoring group configured for site {}",
                        group.site
                    );
                }
                own
            })
            .collect();
        if groups.is_empty() {
            groups.push(GroupConfig::raw(spec.state.site));
        }
        Self {
            state: spec.state,
            groups,
            gate: spec.gate,
            built_from: None,
            gate_warned: false,
        }
    }

    fn site(&self) -> SiteId {
        self.state.site
    }

    fn gate_status(&mut self) -> GateStatus {
        let site = self.state.site;
        let Some(gate) = &self.gate else {
            return GateStatus::Enabled;
        };

        match gate.is_enabled() {
            Ok(enabled) => {
                if self.gate_warned {
                    tracing::info!(%site, "enable gate readable again");
                    self.gate_warned = false;
                }
                if enabled {
                    GateStatus::Enabled
                } else {
                    GateStatus::Disabled
                }
            }
            Err(e) => {
                if self.gate_warned {
                    tracing::debug!(%site, "{e}");
                } else {
                    tracing::warn!(%site, "{e}; skipping site until it resolves");
                    self.gate_warned = true;
                }
                GateStatus::Unavailable
            }
        }
    }

    async fn refresh<F: DepartureFeed>(
        &mut self,
        feed: &F,
        now_token: &str,
        table: &BoardTable,
        now: DateTime<Local>,
    ) -> SiteReport {
        let gate = self.gate_status();

        let (tick, boards) = match gate {
            GateStatus::Unavailable => (SiteTick::GateUnavailable, Vec::new()),
            GateStatus::Disabled => {
                self.built_from = None;
                (SiteTick::Disabled, self.cleared_boards(now))
            }
            GateStatus::Enabled => {
                let FetchOutcome { status, mut state } = fetch(feed, &self.state, now).await;
                let event = state.health.report(self.site(), &status, now);
                self.state = state;

                let boards = self.rebuild(now_token, now);
                let tick = SiteTick::Fetched {
                    status,
                    event,
                    rebuilt: !boards.is_empty(),
                };
                (tick, boards)
            }
        };

        table.publish(self.status(gate), boards).await;

        SiteReport {
            site: self.site(),
            tick,
        }
    }

    /// Boards for every group, if the payload changed since the last build.
    fn rebuild(&mut self, now_token: &str, now: DateTime<Local>) -> Vec<PublishedBoard> {
        let generation = self.state.generation();
        let Some(payload) = self.state.payload() else {
            return Vec::new();
        };
        if self.built_from == Some(generation) {
            return Vec::new();
        }

        let site = self.state.site;
        let clock = now.time();
        let boards: Vec<_> = self
            .groups
            .iter()
            .map(|group| PublishedBoard {
                name: group.name.clone(),
                site,
                board: assemble(&select(payload, group), now_token, clock),
                updated_at: Some(now),
            })
            .collect();

        tracing::debug!(%site, generation, boards = boards.len(), "rebuilt boards");
        self.built_from = Some(generation);
        boards
    }

    fn cleared_boards(&self, now: DateTime<Local>) -> Vec<PublishedBoard> {
        self.groups
            .iter()
            .map(|group| PublishedBoard {
                updated_at: Some(now),
                ..PublishedBoard::placeholder(group.name.clone(), self.site())
            })
            .collect()
    }

    fn status(&self, gate: GateStatus) -> SiteStatus {
        let health = &self.state.health;
        SiteStatus {
            site: self.site(),
            gate,
            health: health.state(),
            consecutive_failures: health.consecutive_failures(),
            degraded_since: health.degraded_since(),
            last_fetch_at: self.state.last_fetch_at(),
            last_success_at: self.state.last_success_at(),
            last_error: self.state.last_error().map(ToString::to_string),
            departures: self.state.payload().map_or(0, |p| p.len()),
            groups: self.groups.iter().map(|g| g.name.clone()).collect(),
        }
    }
}

/// Drives all sites and owns the published [`BoardTable`].
#[derive(Debug)]
pub struct Engine<F> {
    feed: F,
    sites: Vec<SiteSlot>,
    now_token: String,
    table: BoardTable,
}

impl<F: DepartureFeed> Engine<F> {
    /// Build an engine; sites with no groups get the implicit `raw-<site>` group.
    ///
    /// The table starts with an empty board for every group.
    ///
    /// Specs repeating a site are merged into the first one, so each site is
    /// fetched once per tick. The first spec's fetch settings win, as does its
    /// gate if it has one.
    pub fn new(feed: F, sites: Vec<SiteSpec>, now_token: impl Into<String>) -> Self {
        let sites: Vec<_> = merge_repeated_sites(sites)
            .into_iter()
            .map(SiteSlot::new)
            .collect();

        let placeholders = sites.iter().flat_map(|slot| {
            slot.groups
                .iter()
                .map(|g| PublishedBoard::placeholder(g.name.clone(), slot.site()))
        });
        let statuses = sites.iter().map(|slot| slot.status(GateStatus::Enabled));
        let table = BoardTable::seeded(placeholders, statuses);

        Self {
            feed,
            sites,
            now_token: now_token.into(),
            table,
        }
    }

    /// A handle to the published boards.
    pub fn table(&self) -> BoardTable {
        self.table.clone()
    }

    pub fn site_count(&self) -> usize {
        self.sites.len()
    }

    /// Refresh every site once, concurrently.
    pub async fn tick(&mut self, now: DateTime<Local>) -> Vec<SiteReport> {
        let feed = &self.feed;
        let table = &self.table;
        let now_token = self.now_token.as_str();

        let refreshes = self
            .sites
            .iter_mut()
            .map(move |slot| slot.refresh(feed, now_token, table, now));

        join_all(refreshes).await
    }
}

fn merge_repeated_sites(specs: Vec<SiteSpec>) -> Vec<SiteSpec> {
    let mut merged: Vec<SiteSpec> = Vec::with_capacity(specs.len());
    for spec in specs {
        let site = spec.state.site;
        match merged.iter_mut().find(|m| m.state.site == site) {
            Some(first) => {
                tracing::warn!(%site, "site configured more than once; merging its groups");
                for group in spec.groups {
                    if !first.groups.iter().any(|g| g.name == group.name) {
                        first.groups.push(group);
                    }
                }
                if first.gate.is_none() {
                    first.gate = spec.gate;
                }
            }
            None => merged.push(spec),
        }
    }
    merged
}
