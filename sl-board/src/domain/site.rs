//! Stop site identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Error returned when parsing an invalid site id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid site id: {reason}")]
pub struct InvalidSiteId {
    reason: &'static str,
}

/// A provider-assigned SL site id (e.g. `9192` for Slussen).
///
/// Site ids are non-empty strings of ASCII digits that fit in a `u32`.
///
/// # Examples
///
/// ```
/// use sl_board::domain::SiteId;
///
/// let slussen = SiteId::parse("9192").unwrap();
/// assert_eq!(slussen.to_string(), "9192");
///
/// assert!(SiteId::parse("").is_err());
/// assert!(SiteId::parse("91a2").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SiteId(u32);

impl SiteId {
    /// Parse a site id from its decimal string form.
    pub fn parse(s: &str) -> Result<Self, InvalidSiteId> {
        if s.is_empty() {
            return Err(InvalidSiteId {
                reason: "must not be empty",
            });
        }

        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidSiteId {
                reason: "must be ASCII digits 0-9",
            });
        }

        s.parse::<u32>().map(SiteId).map_err(|_| InvalidSiteId {
            reason: "too large",
        })
    }

    /// Returns the numeric id.
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl FromStr for SiteId {
    type Err = InvalidSiteId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SiteId({})", self.0)
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for SiteId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SiteId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        SiteId::parse(&s).map_err(serde::de::Error::custom)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any u32 survives a display/parse roundtrip
        #[test]
        fn roundtrip(n in any::<u32>()) {
            let site = SiteId::parse(&n.to_string()).unwrap();
            prop_assert_eq!(site.get(), n);
            prop_assert_eq!(site.to_string(), n.to_string());
        }

        /// Strings containing a non-digit are always rejected
        #[test]
        fn non_digit_rejected(s in "[0-9]{0,3}[a-zA-Z :-][0-9]{0,3}") {
            prop_assert!(SiteId::parse(&s).is_err());
        }
    }
}
