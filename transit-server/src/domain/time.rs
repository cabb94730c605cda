//! Schedule time handling for GTFS feeds.
//!
//! GTFS expresses arrival and departure times as "H:MM:SS" offsets from the
//! start of the service day. Trips running past midnight keep counting, so
//! "25:10:00" is a valid time on the same service day.

use std::fmt;

use chrono::Duration;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A time of the service day, in seconds since its midnight.
///
/// # Examples
///
/// ```
/// use transit_server::domain::ServiceTime;
///
/// let t = ServiceTime::parse("25:10:00").unwrap();
/// assert_eq!(t.seconds(), 25 * 3600 + 600);
/// assert_eq!(t.to_string(), "25:10:00");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceTime(u32);

impl ServiceTime {
    /// Create a time from seconds since service-day midnight.
    pub fn from_seconds(seconds: u32) -> Self {
        Self(seconds)
    }

    /// Parse a time in "H:MM:SS" or "HH:MM:SS" format.
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_server::domain::ServiceTime;
    ///
    /// assert!(ServiceTime::parse("7:05:00").is_ok());
    /// assert!(ServiceTime::parse("07:05:00").is_ok());
    /// assert!(ServiceTime::parse(" 07:05:00").is_ok());
    ///
    /// assert!(ServiceTime::parse("07:05").is_err());
    /// assert!(ServiceTime::parse("07:60:00").is_err());
    /// assert!(ServiceTime::parse("07:5:00").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, TimeError> {
        // Some feeds pad single-digit hours with a space
        let s = s.trim();

        let mut parts = s.split(':');
        let (Some(h), Some(m), Some(sec), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TimeError::new("expected H:MM:SS format"));
        };

        if h.is_empty() || h.len() > 3 || !h.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TimeError::new("invalid hour digits"));
        }
        let hour: u32 = h.parse().map_err(|_| TimeError::new("invalid hour digits"))?;

        let minute =
            parse_two_digits(m.as_bytes()).ok_or_else(|| TimeError::new("invalid minute digits"))?;
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }

        let second = parse_two_digits(sec.as_bytes())
            .ok_or_else(|| TimeError::new("invalid second digits"))?;
        if second > 59 {
            return Err(TimeError::new("second must be 0-59"));
        }

        Ok(Self(hour * 3600 + minute * 60 + second))
    }

    /// Seconds since service-day midnight.
    pub fn seconds(&self) -> u32 {
        self.0
    }

    /// Signed duration from `earlier` to `self`.
    ///
    /// Negative when `self` is before `earlier`.
    pub fn signed_duration_since(&self, earlier: ServiceTime) -> Duration {
        Duration::seconds(i64::from(self.0) - i64::from(earlier.0))
    }
}

fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    match bytes {
        [a, b] if a.is_ascii_digit() && b.is_ascii_digit() => {
            Some(u32::from(a - b'0') * 10 + u32::from(b - b'0'))
        }
        _ => None,
    }
}

impl fmt::Debug for ServiceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceTime({self})")
    }
}

impl fmt::Display for ServiceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.0 / 3600,
            (self.0 / 60) % 60,
            self.0 % 60
        )
    }
}
