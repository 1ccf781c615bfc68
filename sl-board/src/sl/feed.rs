//! The seam between the fetcher and a departure source.

use std::future::Future;

use crate::domain::{RawDeparture, SiteId};

use super::error::SlError;

/// A source of raw departures for a site.
///
/// Implemented by the live [`SlClient`](super::SlClient) and by
/// [`MockSlClient`](super::MockSlClient) for tests and offline runs.
pub trait DepartureFeed: Send + Sync {
    /// Fetch the current departures for `site`, looking `time_window`
    /// minutes ahead when given.
    fn fetch_departures(
        &self,
        site: SiteId,
        time_window: Option<u16>,
    ) -> impl Future<Output = Result<Vec<RawDeparture>, SlError>> + Send;
}
