//! Bar interval value object.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::domain::market_history::errors::ParseError;

/// Canonical bar interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    /// One-minute bars.
    #[serde(rename = "1m")]
    Minute,
    /// One-hour bars.
    #[serde(rename = "1h")]
    Hour,
    /// Daily bars.
    #[serde(rename = "d")]
    Daily,
    /// Weekly bars.
    #[serde(rename = "w")]
    Weekly,
}

impl Interval {
    /// Every supported interval, shortest first.
    pub const ALL: [Self; 4] = [Self::Minute, Self::Hour, Self::Daily, Self::Weekly];

    /// Short interval code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Minute => "1m",
            Self::Hour => "1h",
            Self::Daily => "d",
            Self::Weekly => "w",
        }
    }

    /// Length of one bar period.
    #[must_use]
    pub fn period(&self) -> Duration {
        match self {
            Self::Minute => Duration::minutes(1),
            Self::Hour => Duration::hours(1),
            Self::Daily => Duration::days(1),
            Self::Weekly => Duration::weeks(1),
        }
    }

    /// Whether bars of this interval are stamped with a time of day.
    #[must_use]
    pub const fn is_intraday(&self) -> bool {
        matches!(self, Self::Minute | Self::Hour)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1m" | "minute" => Ok(Self::Minute),
            "1h" | "hour" => Ok(Self::Hour),
            "d" | "1d" | "daily" => Ok(Self::Daily),
            "w" | "1w" | "weekly" => Ok(Self::Weekly),
            _ => Err(ParseError::UnknownInterval(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_codes_and_names() {
        assert_eq!("1m".parse::<Interval>().unwrap(), Interval::Minute);
        assert_eq!("HOUR".parse::<Interval>().unwrap(), Interval::Hour);
        assert_eq!("d".parse::<Interval>().unwrap(), Interval::Daily);
        assert_eq!("weekly".parse::<Interval>().unwrap(), Interval::Weekly);
        assert!("5m".parse::<Interval>().is_err());
    }

    #[test]
    fn periods() {
        assert_eq!(Interval::Minute.period(), Duration::minutes(1));
        assert_eq!(Interval::Hour.period(), Duration::minutes(60));
        assert_eq!(Interval::Daily.period(), Duration::hours(24));
        assert_eq!(Interval::Weekly.period(), Duration::days(7));
    }

    #[test]
    fn intraday_flags() {
        assert!(Interval::Minute.is_intraday());
        assert!(Interval::Hour.is_intraday());
        assert!(!Interval::Daily.is_intraday());
        assert!(!Interval::Weekly.is_intraday());
    }
}
