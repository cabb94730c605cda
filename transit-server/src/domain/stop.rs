//! Stop identifier types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an invalid stop identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid stop id: {reason}")]
pub struct InvalidStopId {
    reason: &'static str,
}

/// An opaque GTFS stop identifier (e.g. `"A36"`, `"G08"`).
///
/// Stop ids are compared and ordered by their raw text. Ordering only
/// matters for deterministic tie-breaking in the search frontier.
///
/// # Examples
///
/// ```
/// use transit_server::domain::StopId;
///
/// let stop = StopId::parse("A36").unwrap();
/// assert_eq!(stop.as_str(), "A36");
///
/// // Blank ids are rejected
/// assert!(StopId::parse("").is_err());
/// assert!(StopId::parse(" A36").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StopId(String);

impl StopId {
    /// Parse a stop id from a string.
    ///
    /// The input must be non-empty and carry no leading or trailing
    /// whitespace.
    pub fn parse(s: &str) -> Result<Self, InvalidStopId> {
        if s.is_empty() {
            return Err(InvalidStopId {
                reason: "must not be empty",
            });
        }

        if s.trim() != s {
            return Err(InvalidStopId {
                reason: "must not have surrounding whitespace",
            });
        }

        Ok(StopId(s.to_string()))
    }

    /// Parse a stop id, trimming surrounding whitespace first.
    ///
    /// Useful for user input from query strings.
    pub fn parse_normalized(s: &str) -> Result<Self, InvalidStopId> {
        Self::parse(s.trim())
    }

    /// Returns the stop id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Strips a trailing direction suffix, if present.
    ///
    /// GTFS feeds often model platforms as child stops named after their
    /// parent plus a direction letter (`"A36N"`, `"A36S"`). Returns `None`
    /// when the id does not end in one of `suffixes` or stripping would
    /// leave nothing behind.
    pub fn parent(&self, suffixes: &[char]) -> Option<StopId> {
        let last = self.0.chars().last()?;
        if !suffixes.contains(&last) {
            return None;
        }
        let stem = &self.0[..self.0.len() - last.len_utf8()];
        StopId::parse(stem).ok()
    }
}

impl TryFrom<String> for StopId {
    type Error = InvalidStopId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<StopId> for String {
    fn from(value: StopId) -> Self {
        value.0
    }
}

impl fmt::Debug for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopId({})", self.0)
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
