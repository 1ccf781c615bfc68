//! Board groups and departure filtering.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::domain::{RawDeparture, SiteId};

/// A named subset of a site's departures, rendered as its own board.
///
/// Empty `lines` or `directions` match everything. Direction 0 is not a
/// wildcard: it only matches departures the feed reported without a direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupConfig {
    pub name: String,
    pub site: SiteId,
    pub lines: BTreeSet<String>,
    pub directions: BTreeSet<u8>,
}

impl GroupConfig {
    /// A group with no filters.
    pub fn new(name: impl Into<String>, site: SiteId) -> Self {
        Self {
            name: name.into(),
            site,
            lines: BTreeSet::new(),
            directions: BTreeSet::new(),
        }
    }

    /// The implicit group used when a site has none configured.
    pub fn raw(site: SiteId) -> Self {
        Self::new(format!("raw-{site}"), site)
    }

    /// Restrict to the given line numbers.
    pub fn with_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines = lines.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict to the given journey directions.
    pub fn with_directions(mut self, directions: impl IntoIterator<Item = u8>) -> Self {
        self.directions = directions.into_iter().collect();
        self
    }

    /// Whether a departure passes both the line and the direction filter.
    pub fn matches(&self, departure: &RawDeparture) -> bool {
        let line_ok = self.lines.is_empty() || self.lines.contains(&departure.line_number);
        let direction_ok =
            self.directions.is_empty() || self.directions.contains(&departure.direction);
        line_ok && direction_ok
    }
}

/// Select the departures matching `group`, preserving feed order.
pub fn select(raw: &[RawDeparture], group: &GroupConfig) -> Vec<RawDeparture> {
    raw.iter().filter(|d| group.matches(d)).cloned().collect()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::TransportMode;
    use proptest::prelude::*;

    fn departure_strategy() -> impl Strategy<Value = RawDeparture> {
        ("[0-9]{1,2}", 0u8..3, "[a-z]{0,6}").prop_map(|(line, direction, destination)| {
            RawDeparture {
                mode: TransportMode::Bus,
                line_number: line,
                destination,
                direction,
                display_time: "Nu".to_string(),
                deviations: String::new(),
            }
        })
    }

    fn site() -> SiteId {
        SiteId::parse("9192").unwrap()
    }

    proptest! {
        /// No filters: output equals input
        #[test]
        fn unfiltered_is_identity(raw in prop::collection::vec(departure_strategy(), 0..30)) {
            let group = GroupConfig::new("all", site());
            prop_assert_eq!(select(&raw, &group), raw);
        }

        /// Every selected departure passes the group's filters
        #[test]
        fn selected_entries_match(
            raw in prop::collection::vec(departure_strategy(), 0..30),
            lines in prop::collection::btree_set("[0-9]{1,2}", 0..4),
            directions in prop::collection::btree_set(0u8..3, 0..3),
        ) {
            let mut group = GroupConfig::new("g", site());
            group.lines = lines;
            group.directions = directions;

            for d in select(&raw, &group) {
                prop_assert!(group.lines.is_empty() || group.lines.contains(&d.line_number));
                prop_assert!(group.directions.is_empty() || group.directions.contains(&d.direction));
            }
        }

        /// Selection is a subsequence: matching entries keep their relative order
        #[test]
        fn selection_preserves_order(
            raw in prop::collection::vec(departure_strategy(), 0..30),
            direction in 0u8..3,
        ) {
            let group = GroupConfig::new("g", site()).with_directions([direction]);
            let expected: Vec<_> = raw.iter().filter(|d| d.direction == direction).cloned().collect();
            prop_assert_eq!(select(&raw, &group), expected);
        }
    }
}
