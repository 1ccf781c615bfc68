//! Turning one site's departures into many boards.
//!
//! Each [`GroupConfig`] selects a subset of a site's raw departures
//! ([`select`]), which [`assemble`] then ranks by time until departure.

mod assemble;
mod group;

pub use assemble::assemble;
pub use group::{GroupConfig, select};
