//! SL departure boards.
//!
//! Polls SL's real-time departures API for a set of stops, splits each
//! response into named boards by line and direction, ranks them by time
//! until departure, and serves them as JSON.

pub mod board;
pub mod config;
pub mod domain;
pub mod engine;
pub mod fetch;
pub mod gate;
pub mod logging;
pub mod sl;
pub mod web;
