//! SL real-time departures client.
//!
//! This module provides an HTTP client for the SL `realtimedeparturesV4`
//! API, which lists upcoming departures at a stop site.
//!
//! Key characteristics of the API:
//! - One request returns every transport mode at the site, so several
//!   boards can share a single fetch
//! - Failures come in two layers: the HTTP status and an application
//!   `StatusCode` in the body (1006/1007 are quota limits)
//! - Departure times are free text ("Nu", "N min", "HH:MM")

mod client;
mod convert;
mod error;
mod feed;
mod mock;
mod types;

pub use client::{CLIENT_USER_AGENT, SlClient, SlConfig};
pub use convert::{convert_departure, convert_response};
pub use error::SlError;
pub use feed::DepartureFeed;
pub use mock::MockSlClient;
pub use types::{DepartureDto, DepartureResponse, DeviationDto, Deviations, ResponseData};
