//! Throttled fetching and feed health tracking.

mod health;
mod throttle;

pub use health::{HealthEvent, HealthState, SiteHealth};
pub use throttle::{FetchOutcome, FetchStatus, SiteFetchState, default_min_interval, fetch};
