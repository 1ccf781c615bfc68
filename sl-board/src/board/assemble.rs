//! Board assembly: parse display times and rank departures.

use chrono::NaiveTime;

use crate::domain::{Board, BoardEntry, RawDeparture, minutes_until};

/// Build a ranked board from already-filtered departures.
///
/// Entries are sorted by minutes until departure; departures with the same
/// value keep their feed order. The whole board is returned; how many
/// entries to show is up to the consumer.
pub fn assemble(filtered: &[RawDeparture], now_token: &str, now: NaiveTime) -> Board {
    let entries = filtered
        .iter()
        .map(|d| BoardEntry {
            mode: d.mode,
            line: d.line_number.clone(),
            destination: d.destination.clone(),
            direction: d.direction,
            departure_text: d.display_time.clone(),
            minutes_until: minutes_until(&d.display_time, now_token, now),
            deviations: d.deviations.clone(),
        })
        .collect();

    Board::from_entries(entries)
}
