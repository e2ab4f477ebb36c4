//! History request value object.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{Exchange, Interval};

/// A canonical request for historical bars.
///
/// Built fresh for every query from the resolved contract. Nothing
/// downstream mutates it; vendor-specific adjustments (such as the
/// extended end boundary) are derived values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRequest {
    /// Canonical instrument symbol (e.g. "000001", "rb2105").
    pub symbol: String,
    /// Canonical exchange.
    pub exchange: Exchange,
    /// Bar interval.
    pub interval: Interval,
    /// First calendar date of the range (inclusive).
    pub start: NaiveDate,
    /// Last calendar date of the range (inclusive).
    pub end: NaiveDate,
}

impl HistoryRequest {
    /// Create a new request.
    #[must_use]
    pub fn new(
        symbol: impl Into<String>,
        exchange: Exchange,
        interval: Interval,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            exchange,
            interval,
            start,
            end,
        }
    }

    /// Instrument identifier in `{symbol}.{EXCHANGE}` form.
    #[must_use]
    pub fn vt_symbol(&self) -> String {
        format!("{}.{}", self.symbol, self.exchange)
    }

    /// End boundary sent to vendors: one calendar day past `end`.
    ///
    /// Night-session bars are attributed by some vendors to the next
    /// calendar date, so the vendor query always runs one day longer.
    #[must_use]
    pub fn extended_end(&self) -> NaiveDate {
        self.end.checked_add_days(Days::new(1)).unwrap_or(self.end)
    }

    /// True when the symbol consists only of ASCII digits (equity-style
    /// ticker). Open interest is requested only for the other symbols.
    #[must_use]
    pub fn has_numeric_symbol(&self) -> bool {
        !self.symbol.is_empty() && self.symbol.chars().all(|c| c.is_ascii_digit())
    }
}
