//! Canonical bar record.

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Exchange, Interval};

/// One OHLCV bar in the canonical format.
///
/// `datetime` marks the bar open and carries the exchange's UTC offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarData {
    /// Canonical symbol, echoed from the request.
    pub symbol: String,
    /// Canonical exchange, echoed from the request.
    pub exchange: Exchange,
    /// Bar interval, echoed from the request.
    pub interval: Interval,
    /// Bar open time, localized to the exchange timezone.
    pub datetime: DateTime<FixedOffset>,
    /// Open price.
    pub open: Decimal,
    /// High price.
    pub high: Decimal,
    /// Low price.
    pub low: Decimal,
    /// Close price.
    pub close: Decimal,
    /// Traded volume.
    pub volume: Decimal,
    /// Open interest (zero when not applicable).
    #[serde(default)]
    pub open_interest: Decimal,
    /// Tag of the vendor or gateway that produced the bar.
    pub source: String,
}

/// Sort bars ascending by datetime and drop repeated datetimes.
///
/// The sort is stable, so among bars sharing a datetime the one the
/// source delivered first is kept.
#[must_use]
pub fn into_series(mut bars: Vec<BarData>) -> Vec<BarData> {
    bars.sort_by_key(|bar| bar.datetime);
    bars.dedup_by_key(|bar| bar.datetime);
    bars
}
