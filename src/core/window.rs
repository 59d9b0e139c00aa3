//! Fixed-width, epoch-aligned time windows.

use crate::error::{Result, TrendError};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Width of an aggregation window.
///
/// Always a positive whole number of milliseconds. Window boundaries are
/// aligned to the Unix epoch: a timestamp belongs to the window starting at
/// `floor(timestamp / width) * width`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WindowWidth {
    millis: i64,
}

impl WindowWidth {
    pub const TEN_MINUTES: WindowWidth = WindowWidth { millis: 600_000 };
    pub const ONE_HOUR: WindowWidth = WindowWidth { millis: 3_600_000 };

    /// Create a window width from a duration.
    pub fn new(width: Duration) -> Result<Self> {
        let millis = width.num_milliseconds();
        if millis <= 0 {
            return Err(TrendError::InvalidParameter(format!(
                "window width must be positive, got {} ms",
                millis
            )));
        }
        if Duration::milliseconds(millis) != width {
            return Err(TrendError::InvalidParameter(
                "window width must be a whole number of milliseconds".to_string(),
            ));
        }
        Ok(Self { millis })
    }

    pub fn seconds(n: i64) -> Result<Self> {
        Self::from_count(n, "seconds", Duration::try_seconds(n))
    }

    pub fn minutes(n: i64) -> Result<Self> {
        Self::from_count(n, "minutes", Duration::try_minutes(n))
    }

    pub fn hours(n: i64) -> Result<Self> {
        Self::from_count(n, "hours", Duration::try_hours(n))
    }

    pub fn days(n: i64) -> Result<Self> {
        Self::from_count(n, "days", Duration::try_days(n))
    }

    fn from_count(n: i64, unit: &str, width: Option<Duration>) -> Result<Self> {
        let width = width.ok_or_else(|| {
            TrendError::InvalidParameter(format!("window width of {} {} is out of range", n, unit))
        })?;
        Self::new(width)
    }

    /// The width as a chrono duration.
    pub fn duration(&self) -> Duration {
        Duration::milliseconds(self.millis)
    }

    pub fn num_milliseconds(&self) -> i64 {
        self.millis
    }

    /// Start of the window containing `timestamp`.
    pub fn floor(&self, timestamp: DateTime<Utc>) -> DateTime<Utc> {
        let floored = timestamp.timestamp_millis().div_euclid(self.millis) * self.millis;
        DateTime::from_timestamp_millis(floored).unwrap_or(timestamp)
    }
}

/// Units accepted by [`WindowWidth::from_str`], mapped to milliseconds.
const UNITS: &[(&str, i64)] = &[
    ("ms", 1),
    ("s", 1_000),
    ("S", 1_000),
    ("sec", 1_000),
    ("min", 60_000),
    ("T", 60_000),
    ("h", 3_600_000),
    ("H", 3_600_000),
    ("d", 86_400_000),
    ("D", 86_400_000),
];

impl FromStr for WindowWidth {
    type Err = TrendError;

    /// Parse a width such as `"10min"`, `"1h"`, `"30s"` or `"1d"`.
    ///
    /// A missing count means one unit (`"h"` is one hour).
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let split = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| TrendError::InvalidWindow(format!("missing unit in '{}'", s)))?;
        let (count, unit) = trimmed.split_at(split);
        let unit = unit.trim();

        let count: i64 = if count.is_empty() {
            1
        } else {
            count
                .parse()
                .map_err(|_| TrendError::InvalidWindow(format!("bad count in '{}'", s)))?
        };

        let unit_millis = UNITS
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|&(_, ms)| ms)
            .ok_or_else(|| TrendError::InvalidWindow(format!("unknown unit '{}' in '{}'", unit, s)))?;

        let millis = count
            .checked_mul(unit_millis)
            .ok_or_else(|| TrendError::InvalidWindow(format!("'{}' is too large", s)))?;

        Self::new(Duration::milliseconds(millis))
    }
}

impl fmt::Display for WindowWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (unit, ms) in [("d", 86_400_000), ("h", 3_600_000), ("min", 60_000), ("s", 1_000)] {
            if self.millis % ms == 0 {
                return write!(f, "{}{}", self.millis / ms, unit);
            }
        }
        write!(f, "{}ms", self.millis)
    }
}

impl TryFrom<String> for WindowWidth {
    type Error = TrendError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<WindowWidth> for String {
    fn from(width: WindowWidth) -> Self {
        width.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parse_common_widths() {
        assert_eq!("10min".parse::<WindowWidth>().unwrap(), WindowWidth::minutes(10).unwrap());
        assert_eq!("1h".parse::<WindowWidth>().unwrap(), WindowWidth::hours(1).unwrap());
        assert_eq!("6H".parse::<WindowWidth>().unwrap(), WindowWidth::hours(6).unwrap());
        assert_eq!("1d".parse::<WindowWidth>().unwrap(), WindowWidth::days(1).unwrap());
        assert_eq!("30s".parse::<WindowWidth>().unwrap(), WindowWidth::seconds(30).unwrap());
        assert_eq!("15T".parse::<WindowWidth>().unwrap(), WindowWidth::minutes(15).unwrap());
        assert_eq!("h".parse::<WindowWidth>().unwrap(), WindowWidth::hours(1).unwrap());
        assert_eq!(" 5 min ".parse::<WindowWidth>().unwrap(), WindowWidth::minutes(5).unwrap());
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!(matches!("10".parse::<WindowWidth>(), Err(TrendError::InvalidWindow(_))));
        assert!(matches!("10x".parse::<WindowWidth>(), Err(TrendError::InvalidWindow(_))));
        assert!(matches!("1M".parse::<WindowWidth>(), Err(TrendError::InvalidWindow(_))));
        assert!(matches!("".parse::<WindowWidth>(), Err(TrendError::InvalidWindow(_))));
        assert!(matches!(
            "0min".parse::<WindowWidth>(),
            Err(TrendError::InvalidParameter(_))
        ));
    }

    #[test]
    fn non_positive_widths_are_rejected() {
        assert!(WindowWidth::minutes(0).is_err());
        assert!(WindowWidth::minutes(-5).is_err());
        assert!(WindowWidth::new(Duration::microseconds(1500)).is_err());
    }

    #[test]
    fn out_of_range_counts_are_rejected() {
        for width in [
            WindowWidth::seconds(i64::MAX),
            WindowWidth::minutes(i64::MAX),
            WindowWidth::hours(i64::MIN),
            WindowWidth::days(i64::MAX),
        ] {
            assert!(matches!(width, Err(TrendError::InvalidParameter(_))));
        }
        assert!(WindowWidth::days(365).is_ok());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for s in ["10min", "1h", "2d", "45s", "250ms"] {
            let width: WindowWidth = s.parse().unwrap();
            assert_eq!(width.to_string(), s);
        }
        assert_eq!(WindowWidth::minutes(60).unwrap().to_string(), "1h");
    }

    #[test]
    fn floor_aligns_to_epoch_multiples() {
        let width = WindowWidth::minutes(10).unwrap();
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 17, 42).unwrap();
        assert_eq!(width.floor(ts), Utc.with_ymd_and_hms(2024, 3, 1, 12, 10, 0).unwrap());

        let on_boundary = Utc.with_ymd_and_hms(2024, 3, 1, 12, 20, 0).unwrap();
        assert_eq!(width.floor(on_boundary), on_boundary);
    }

    #[test]
    fn floor_handles_pre_epoch_timestamps() {
        let width = WindowWidth::hours(1).unwrap();
        let ts = Utc.with_ymd_and_hms(1969, 12, 31, 23, 30, 0).unwrap();
        assert_eq!(width.floor(ts), Utc.with_ymd_and_hms(1969, 12, 31, 23, 0, 0).unwrap());
    }

    #[test]
    fn deserializes_from_string() {
        #[derive(Deserialize)]
        struct Holder {
            width: WindowWidth,
        }
        let h: Holder = serde_json::from_str(r#"{"width": "10min"}"#).unwrap();
        assert_eq!(h.width, WindowWidth::minutes(10).unwrap());
        assert!(serde_json::from_str::<Holder>(r#"{"width": "0h"}"#).is_err());
    }
}
