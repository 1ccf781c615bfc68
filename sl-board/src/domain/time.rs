//! Display-time handling for SL departures.
//!
//! SL reports departure timing as free-form text: `"Nu"` for an imminent
//! departure, `"4 min"` for a relative time, or `"14:32"` for an absolute
//! local clock time. This module turns those strings into minutes until
//! departure, relative to an injected "now".

use chrono::{NaiveTime, Timelike};

/// Token SL uses for a departure that is leaving now.
pub const DEFAULT_NOW_TOKEN: &str = "Nu";

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Error returned when a display time matches none of the known shapes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized display time {input:?}: {reason}")]
pub struct TimeError {
    input: String,
    reason: &'static str,
}

impl TimeError {
    fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }

    /// The string that failed to parse.
    pub fn input(&self) -> &str {
        &self.input
    }
}

/// A parsed display time.
///
/// # Examples
///
/// ```
/// use sl_board::domain::{DisplayTime, DEFAULT_NOW_TOKEN};
/// use chrono::NaiveTime;
///
/// let now = NaiveTime::from_hms_opt(14, 0, 0).unwrap();
///
/// let t = DisplayTime::parse("Nu", DEFAULT_NOW_TOKEN).unwrap();
/// assert_eq!(t.minutes_from(now), 0);
///
/// let t = DisplayTime::parse("7 min", DEFAULT_NOW_TOKEN).unwrap();
/// assert_eq!(t.minutes_from(now), 7);
///
/// // Earlier clock times wrap to the next day
/// let t = DisplayTime::parse("13:55", DEFAULT_NOW_TOKEN).unwrap();
/// assert_eq!(t.minutes_from(now), 1435);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayTime {
    /// The departure is leaving now.
    Now,
    /// Minutes until departure, as given by the feed.
    InMinutes(u32),
    /// Absolute local time of day.
    At(NaiveTime),
}

impl DisplayTime {
    /// Parse a display time.
    ///
    /// Shapes are tried in order: the `now_token` literal, `"<N> min"`,
    /// then `"H:MM"`/`"HH:MM"`. Surrounding whitespace is ignored.
    pub fn parse(s: &str, now_token: &str) -> Result<Self, TimeError> {
        let trimmed = s.trim();

        if trimmed == now_token {
            return Ok(DisplayTime::Now);
        }

        let mut words = trimmed.split_whitespace();
        if let (Some(count), Some("min")) = (words.next(), words.next()) {
            return count
                .parse::<u32>()
                .map(DisplayTime::InMinutes)
                .map_err(|_| TimeError::new(s, "minute count is not a non-negative integer"));
        }

        if trimmed.contains(':') {
            return parse_clock(trimmed)
                .map(DisplayTime::At)
                .ok_or_else(|| TimeError::new(s, "expected a 24-hour H:MM or HH:MM time"));
        }

        Err(TimeError::new(s, "unknown format"))
    }

    /// Minutes from `now` until this departure.
    ///
    /// Clock times earlier than `now` are taken to be tomorrow, so the result
    /// for an `At` time is always below 1440. Seconds are ignored.
    pub fn minutes_from(&self, now: NaiveTime) -> u32 {
        match *self {
            DisplayTime::Now => 0,
            DisplayTime::InMinutes(mins) => mins,
            DisplayTime::At(time) => {
                let target = minutes_of_day(time);
                let current = minutes_of_day(now);
                if target >= current {
                    target - current
                } else {
                    target + MINUTES_PER_DAY - current
                }
            }
        }
    }
}

/// Minutes until departure for a raw display-time string.
///
/// Never fails: an unrecognized string is logged and treated as departing now.
pub fn minutes_until(display_time: &str, now_token: &str, now: NaiveTime) -> u32 {
    match DisplayTime::parse(display_time, now_token) {
        Ok(parsed) => parsed.minutes_from(now),
        Err(e) => {
            tracing::warn!("failed to parse departure time: {e}");
            0
        }
    }
}

fn minutes_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Parse "H:MM" or "HH:MM" into a time of day.
fn parse_clock(s: &str) -> Option<NaiveTime> {
    let (hour, minute) = s.split_once(':')?;

    if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
        return None;
    }

    let hour = parse_digits(hour)?;
    let minute = parse_digits(minute)?;

    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Parse a short run of ASCII digits into a u32.
fn parse_digits(s: &str) -> Option<u32> {
    s.chars()
        .try_fold(0u32, |acc, c| Some(acc * 10 + c.to_digit(10)?))
}
