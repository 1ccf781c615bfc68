//! Throttled per-site fetching.
//!
//! A site is fetched at most once per `min_interval`. Between fetches, and
//! after failures, the last good payload stays available.

use std::sync::Arc;

use chrono::{DateTime, Duration, Local};

use crate::domain::{RawDeparture, SiteId};
use crate::sl::{DepartureFeed, SlError};

use super::health::SiteHealth;

/// Default minimum time between fetches of one site.
pub fn default_min_interval() -> Duration {
    Duration::seconds(60)
}

/// Result of one fetch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    /// New payload fetched and decoded.
    Fresh,
    /// Too soon since the last attempt; no request was made.
    Throttled,
    /// The request failed; the previous payload is kept.
    Failed(SlError),
}

impl FetchStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, FetchStatus::Failed(_))
    }
}

/// Fetch bookkeeping for one site.
///
/// Cheap to clone: the payload is shared. The engine keeps the current value
/// and replaces it with the state returned by [`fetch`].
#[derive(Debug, Clone)]
pub struct SiteFetchState {
    pub site: SiteId,
    pub min_interval: Duration,
    pub time_window: Option<u16>,
    pub health: SiteHealth,
    last_fetch_at: Option<DateTime<Local>>,
    last_success_at: Option<DateTime<Local>>,
    last_payload: Option<Arc<Vec<RawDeparture>>>,
    last_error: Option<SlError>,
    generation: u64,
}

impl SiteFetchState {
    /// Fresh state for a site that has never been fetched.
    pub fn new(site: SiteId, min_interval: Duration) -> Self {
        Self {
            site,
            min_interval,
            time_window: None,
            health: SiteHealth::default(),
            last_fetch_at: None,
            last_success_at: None,
            last_payload: None,
            last_error: None,
            generation: 0,
        }
    }

    /// Ask the API for `minutes` of departures ahead.
    pub fn with_time_window(mut self, minutes: u16) -> Self {
        self.time_window = Some(minutes);
        self
    }

    /// When a request was last sent, successful or not.
    pub fn last_fetch_at(&self) -> Option<DateTime<Local>> {
        self.last_fetch_at
    }

    /// When a payload was last received.
    pub fn last_success_at(&self) -> Option<DateTime<Local>> {
        self.last_success_at
    }

    /// The most recent good payload, possibly stale.
    pub fn payload(&self) -> Option<&Arc<Vec<RawDeparture>>> {
        self.last_payload.as_ref()
    }

    /// The error from the most recent attempt, if it failed.
    pub fn last_error(&self) -> Option<&SlError> {
        self.last_error.as_ref()
    }

    /// Incremented on every new payload; 0 until the first success.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a request at `now` would be throttled.
    pub fn is_throttled(&self, now: DateTime<Local>) -> bool {
        self.last_fetch_at
            .is_some_and(|last| now.signed_duration_since(last) < self.min_interval)
    }
}

/// A fetch attempt's status and the site's updated state.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub status: FetchStatus,
    pub state: SiteFetchState,
}

/// Fetch a site's departures unless throttled.
///
/// Never fails: errors are returned as [`FetchStatus::Failed`] alongside a
/// state that still holds the previous payload. Every request, successful or
/// not, restarts the throttle window.
pub async fn fetch<F: DepartureFeed>(
    feed: &F,
    state: &SiteFetchState,
    now: DateTime<Local>,
) -> FetchOutcome {
    if state.is_throttled(now) {
        tracing::trace!(site = %state.site, "fetch throttled");
        return FetchOutcome {
            status: FetchStatus::Throttled,
            state: state.clone(),
        };
    }

    let mut next = state.clone();
    next.last_fetch_at = Some(now);

    let status = match feed.fetch_departures(state.site, state.time_window).await {
        Ok(departures) => {
            tracing::debug!(site = %state.site, count = departures.len(), "fetched departures");
            next.last_payload = Some(Arc::new(departures));
            next.last_success_at = Some(now);
            next.last_error = None;
            next.generation += 1;
            FetchStatus::Fresh
        }
        Err(e) => {
            next.last_error = Some(e.clone());
            FetchStatus::Failed(e)
        }
    };

    FetchOutcome {
        status,
        state: next,
    }
}
