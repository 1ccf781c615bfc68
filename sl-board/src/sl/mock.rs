//! Mock SL client for testing without API access.
//!
//! Serves canned responses, either loaded from JSON files or set
//! programmatically, through the same conversion as the live client.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::RwLock;

use crate::domain::{RawDeparture, SiteId};

use super::convert::convert_response;
use super::error::SlError;
use super::feed::DepartureFeed;
use super::types::DepartureResponse;

/// Mock SL client that serves canned replies per site.
///
/// Clones share replies and the call counter, so a test can keep a handle
/// while an engine owns another.
#[derive(Clone, Default)]
pub struct MockSlClient {
    replies: Arc<RwLock<HashMap<SiteId, Result<DepartureResponse, SlError>>>>,
    calls: Arc<AtomicUsize>,
}

impl MockSlClient {
    /// Create a mock with no replies; every site answers with a transport error.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock by loading JSON files from a directory.
    ///
    /// Expects files named `{siteid}.json` (e.g. `9192.json`) holding a raw
    /// `realtimedeparturesV4.json` response.
    pub fn from_dir(data_dir: impl AsRef<Path>) -> Result<Self, SlError> {
        let data_dir = data_dir.as_ref();
        let mut replies = HashMap::new();

        let entries = std::fs::read_dir(data_dir).map_err(|e| SlError::Transport {
            message: format!("failed to read mock data directory {data_dir:?}: {e}"),
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| SlError::Transport {
                message: format!("failed to read directory entry: {e}"),
            })?;

            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            // "9192.json" -> 9192
            let site = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| SiteId::parse(s).ok())
                .ok_or_else(|| SlError::Decode {
                    message: format!("mock file name is not a site id: {path:?}"),
                    body: None,
                })?;

            let json = std::fs::read_to_string(&path).map_err(|e| SlError::Transport {
                message: format!("failed to read {path:?}: {e}"),
            })?;

            let response: DepartureResponse =
                serde_json::from_str(&json).map_err(|e| SlError::Decode {
                    message: format!("failed to parse {path:?}: {e}"),
                    body: None,
                })?;

            replies.insert(site, Ok(response));
        }

        if replies.is_empty() {
            return Err(SlError::Decode {
                message: format!("no mock departure files found in {data_dir:?}"),
                body: None,
            });
        }

        Ok(Self {
            replies: Arc::new(RwLock::new(replies)),
            calls: Arc::default(),
        })
    }

    /// Serve `response` for `site` from now on.
    pub async fn set_response(&self, site: SiteId, response: DepartureResponse) {
        self.replies.write().await.insert(site, Ok(response));
    }

    /// Fail every fetch for `site` with `error` from now on.
    pub async fn set_error(&self, site: SiteId, error: SlError) {
        self.replies.write().await.insert(site, Err(error));
    }

    /// Sites with a canned reply.
    pub async fn available_sites(&self) -> Vec<SiteId> {
        let replies = self.replies.read().await;
        let mut sites: Vec<_> = replies.keys().copied().collect();
        sites.sort();
        sites
    }

    /// Number of fetches served so far, across all sites.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DepartureFeed for MockSlClient {
    async fn fetch_departures(
        &self,
        site: SiteId,
        _time_window: Option<u16>,
    ) -> Result<Vec<RawDeparture>, SlError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let reply = self.replies.read().await.get(&site).cloned();
        match reply {
            Some(Ok(response)) => convert_response(response),
            Some(Err(e)) => Err(e),
            None => Err(SlError::Transport {
                message: format!("no mock data for site {site}"),
            }),
        }
    }
}
