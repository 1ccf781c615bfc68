//! Domain types for the departure board engine.
//!
//! These types are independent of the SL wire format: the `sl` module
//! converts API responses into them, and the `board` module ranks them.

mod departure;
mod site;
mod time;

pub use departure::{Board, BoardEntry, RawDeparture, TransportMode};
pub use site::{InvalidSiteId, SiteId};
pub use time::{DEFAULT_NOW_TOKEN, DisplayTime, TimeError, minutes_until};
