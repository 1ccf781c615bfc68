//! Departure records and boards.

use std::fmt;

use serde::Serialize;

/// Transport mode of a departure, in the order SL groups them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Metro,
    Bus,
    Train,
    Tram,
    Ship,
}

impl TransportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Metro => "metro",
            TransportMode::Bus => "bus",
            TransportMode::Train => "train",
            TransportMode::Tram => "tram",
            TransportMode::Ship => "ship",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A departure as reported by the feed, with absent fields defaulted.
///
/// Text fields default to the empty string and `direction` to 0 when the
/// feed leaves them out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawDeparture {
    pub mode: TransportMode,
    pub line_number: String,
    pub destination: String,
    pub direction: u8,
    pub display_time: String,
    pub deviations: String,
}

/// A departure ready for display, with its parsed time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardEntry {
    pub mode: TransportMode,
    pub line: String,
    pub destination: String,
    pub direction: u8,
    /// The feed's original display time (e.g. "Nu", "3 min", "14:32").
    pub departure_text: String,
    pub minutes_until: u32,
    pub deviations: String,
}

/// A ranked list of departures for one group.
///
/// Entries are ordered by `minutes_until`, ties in feed order. A board is
/// built once and replaced, never edited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Board {
    entries: Vec<BoardEntry>,
}

impl Board {
    /// An empty board.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a board from entries, sorting them stably by `minutes_until`.
    pub fn from_entries(mut entries: Vec<BoardEntry>) -> Self {
        entries.sort_by_key(|e| e.minutes_until);
        Self { entries }
    }

    pub fn entries(&self) -> &[BoardEntry] {
        &self.entries
    }

    /// The next departure, if any.
    pub fn next(&self) -> Option<&BoardEntry> {
        self.entries.first()
    }

    /// The departure after the next one, if any.
    pub fn upcoming(&self) -> Option<&BoardEntry> {
        self.entries.get(1)
    }

    /// The first `n` entries.
    pub fn top(&self, n: usize) -> &[BoardEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
