//! Response bodies for the board API.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::domain::{BoardEntry, SiteId};
use crate::engine::PublishedBoard;

pub const ATTRIBUTION: &str = "Data from sl.se / trafiklab.se";
pub const UNIT_OF_MEASUREMENT: &str = "min";

/// Query parameters for a single board.
#[derive(Debug, Default, Deserialize)]
pub struct BoardQuery {
    /// Show at most this many departures.
    pub limit: Option<usize>,
}

/// One board, shaped for a display.
#[derive(Debug, Serialize)]
pub struct BoardResponse {
    pub name: String,
    pub site: SiteId,

    /// Minutes until the next departure; `None` on an empty board.
    pub minutes: Option<u32>,

    /// Departures on the board, before any `limit`.
    pub count: usize,

    pub attribution: &'static str,
    pub unit_of_measurement: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_line: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_departure: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub upcoming_line: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upcoming_destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upcoming_departure: Option<String>,

    pub updated_at: Option<DateTime<Local>>,
    pub departures: Vec<BoardEntry>,
}

impl BoardResponse {
    pub fn from_published(published: &PublishedBoard, limit: Option<usize>) -> Self {
        let board = &published.board;
        let next = board.next();
        let upcoming = board.upcoming();
        let shown = limit.unwrap_or(board.len());

        Self {
            name: published.name.clone(),
            site: published.site,
            minutes: next.map(|e| e.minutes_until),
            count: board.len(),
            attribution: ATTRIBUTION,
            unit_of_measurement: UNIT_OF_MEASUREMENT,
            next_line: next.map(|e| e.line.clone()),
            next_destination: next.map(|e| e.destination.clone()),
            next_departure: next.map(|e| e.departure_text.clone()),
            upcoming_line: upcoming.map(|e| e.line.clone()),
            upcoming_destination: upcoming.map(|e| e.destination.clone()),
            upcoming_departure: upcoming.map(|e| e.departure_text.clone()),
            updated_at: published.updated_at,
            departures: board.top(shown).to_vec(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BoardsResponse {
    pub boards: Vec<BoardResponse>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Board, TransportMode};

    fn entry(line: &str, destination: &str, text: &str, minutes: u32) -> BoardEntry {
        BoardEntry {
            mode: TransportMode::Metro,
            line: line.into(),
            destination: destination.into(),
            direction: 1,
            departure_text: text.into(),
            minutes_until: minutes,
            deviations: String::new(),
        }
    }

    fn published(entries: Vec<BoardEntry>) -> PublishedBoard {
        PublishedBoard {
            name: "north".into(),
            site: SiteId::parse("9192").unwrap(),
            board: Board::from_entries(entries),
            updated_at: None,
        }
    }

    #[test]
    fn empty_board_has_only_constants() {
        let response = BoardResponse::from_published(&published(vec![]), None);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["minutes"], serde_json::Value::Null);
        assert_eq!(json["count"], 0);
        assert_eq!(json["attribution"], "Data from sl.se / trafiklab.se");
        assert_eq!(json["unit_of_measurement"], "min");
        assert_eq!(json["site"], "9192");
        assert!(json.get("next_line").is_none());
        assert!(json.get("upcoming_line").is_none());
    }

    #[test]
    fn one_entry_has_next_but_no_upcoming() {
        let response =
            BoardResponse::from_published(&published(vec![entry("14", "Mörby centrum", "Nu", 0)]), None);

        assert_eq!(response.minutes, Some(0));
        assert_eq!(response.next_line.as_deref(), Some("14"));
        assert_eq!(response.next_destination.as_deref(), Some("Mörby centrum"));
        assert_eq!(response.next_departure.as_deref(), Some("Nu"));
        assert!(response.upcoming_line.is_none());
    }

    #[test]
    fn limit_truncates_departures_not_count() {
        let entries = vec![
            entry("13", "Ropsten", "Nu", 0),
            entry("14", "Mörby centrum", "3 min", 3),
            entry("14", "Mörby centrum", "14:12", 12),
        ];
        let response = BoardResponse::from_published(&published(entries), Some(2));

        assert_eq!(response.count, 3);
        assert_eq!(response.departures.len(), 2);
        assert_eq!(response.upcoming_line.as_deref(), Some("14"));
        assert_eq!(response.upcoming_departure.as_deref(), Some("3 min"));
    }
}
