//! SL real-time departures HTTP client.
//!
//! One GET per site: `realtimedeparturesV4.json?key=..&siteid=..[&timewindow=..]`.
//! The API key travels in the query string, so URLs are never logged.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::domain::{RawDeparture, SiteId};

use super::convert::convert_response;
use super::error::SlError;
use super::feed::DepartureFeed;
use super::types::DepartureResponse;

/// Default base URL for the SL API.
const DEFAULT_BASE_URL: &str = "https://api.sl.se/api2";

/// Fixed client identifier sent with every request.
pub const CLIENT_USER_AGENT: &str = concat!("sl-board/", env!("CARGO_PKG_VERSION"));

/// Configuration for the SL client.
#[derive(Clone)]
pub struct SlConfig {
    /// Trafiklab API key for the real-time departures API
    pub api_key: String,
    /// Base URL for the API (defaults to production SL)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl SlConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 5,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl std::fmt::Debug for SlConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// SL real-time departures API client.
#[derive(Clone)]
pub struct SlClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SlClient {
    /// Create a new SL client with the given configuration.
    pub fn new(config: SlConfig) -> Result<Self, SlError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        })
    }

    /// Fetch and decode the departure response for a site.
    ///
    /// A 200 response with a non-zero `StatusCode` is returned as-is; use
    /// [`DepartureFeed::fetch_departures`] to get it as an error.
    pub async fn get_departures(
        &self,
        site: SiteId,
        time_window: Option<u16>,
    ) -> Result<DepartureResponse, SlError> {
        let url = format!("{}/realtimedeparturesV4.json", self.base_url);

        let mut query = vec![
            ("key", self.api_key.clone()),
            ("siteid", site.to_string()),
        ];
        if let Some(window) = time_window {
            query.push(("timewindow", window.to_string()));
        }

        tracing::debug!(%site, "fetching SL departures");

        let response = self.http.get(&url).query(&query).send().await?;
        let status = response.status();

        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(SlError::Http {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| SlError::Decode {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }
}

impl std::fmt::Debug for SlClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl DepartureFeed for SlClient {
    async fn fetch_departures(
        &self,
        site: SiteId,
        time_window: Option<u16>,
    ) -> Result<Vec<RawDeparture>, SlError> {
        let response = self.get_departures(site, time_window).await?;
        convert_response(response)
    }
}
