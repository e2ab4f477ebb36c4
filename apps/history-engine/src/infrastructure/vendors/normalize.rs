//! Vendor row normalization.
//!
//! Turns raw vendor rows (bar-close timestamps, exchange wall-clock time)
//! into canonical bars: bar-open timestamps localized to the exchange
//! timezone, bounded by the extended end date, sorted and deduplicated.

use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDateTime, NaiveTime, TimeZone};
use rust_decimal::Decimal;

use super::tables::{EXCHANGE_TZ, bar_open};
use crate::domain::market_history::{BarData, HistoryRequest, into_series};

/// One bar as delivered by a vendor, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorRow {
    /// Vendor timestamp in exchange wall-clock time.
    pub timestamp: NaiveDateTime,
    /// Open price.
    pub open: Decimal,
    /// High price.
    pub high: Decimal,
    /// Low price.
    pub low: Decimal,
    /// Close price.
    pub close: Decimal,
    /// Volume.
    pub volume: Decimal,
    /// Open interest when the vendor supplied one.
    pub open_interest: Option<Decimal>,
}

/// Parse a vendor decimal, accepting scientific notation.
#[must_use]
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return None;
    }
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

/// Localize an exchange wall-clock time to the exchange offset.
///
/// Returns `None` for wall-clock times that do not exist locally.
#[must_use]
pub fn localize(naive: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
    EXCHANGE_TZ
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.fixed_offset())
}

/// Normalize vendor rows into a canonical bar series for `req`.
///
/// Open interest is forced to zero for purely numeric (equity) symbols.
/// Rows after local midnight of the extended end date are dropped.
#[must_use]
pub fn rows_to_bars(req: &HistoryRequest, rows: Vec<VendorRow>, source: &str) -> Vec<BarData> {
    let numeric = req.has_numeric_symbol();
    let boundary = localize(req.extended_end().and_time(NaiveTime::MIN));

    let bars = rows
        .into_iter()
        .filter_map(|row| {
            let Some(datetime) = localize(bar_open(req.interval, row.timestamp)) else {
                tracing::warn!(timestamp = %row.timestamp, "skipping bar with nonexistent local time");
                return None;
            };
            if boundary.is_some_and(|limit| datetime > limit) {
                return None;
            }
            let open_interest = if numeric {
                Decimal::ZERO
            } else {
                row.open_interest.unwrap_or(Decimal::ZERO)
            };
            Some(BarData {
                symbol: req.symbol.clone(),
                exchange: req.exchange,
                interval: req.interval,
                datetime,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume,
                open_interest,
                source: source.to_string(),
            })
        })
        .collect();

    into_series(bars)
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, NaiveDate, Timelike, Weekday};
    use rust_decimal_macros::dec;

    use super::*;
    use crate::domain::market_history::{Exchange, Interval};

    fn request(symbol: &str, interval: Interval) -> HistoryRequest {
        HistoryRequest::new(
            symbol,
            Exchange::Shfe,
            interval,
            NaiveDate::from_ymd_opt(2020, 1, 2).unwrap(),
            NaiveDate::from_ymd_opt(2020, 1, 3).unwrap(),
        )
    }

    fn row(ts: &str, close: Decimal) -> VendorRow {
        VendorRow {
            timestamp: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap(),
            open: dec!(10),
            high: dec!(11),
            low: dec!(9),
            close,
            volume: dec!(100),
            open_interest: Some(dec!(5000)),
        }
    }

    #[test]
    fn minute_bars_shift_to_open_time() {
        let req = request("rb2005", Interval::Minute);
        let bars = rows_to_bars(&req, vec![row("2020-01-02 09:01:00", dec!(10.5))], "JQ");

        assert_eq!(bars.len(), 1);
        let bar = &bars[0];
        assert_eq!(bar.datetime.hour(), 9);
        assert_eq!(bar.datetime.minute(), 0);
        assert_eq!(bar.datetime.offset().local_minus_utc(), 8 * 3600);
        assert_eq!(bar.open_interest, dec!(5000));
        assert_eq!(bar.symbol, "rb2005");
        assert_eq!(bar.source, "JQ");
    }

    #[test]
    fn daily_bars_keep_their_date() {
        let req = request("rb2005", Interval::Daily);
        let bars = rows_to_bars(&req, vec![row("2020-01-02 00:00:00", dec!(10))], "TU");

        assert_eq!(bars[0].datetime.date_naive(), NaiveDate::from_ymd_opt(2020, 1, 2).unwrap());
        assert_eq!(bars[0].datetime.hour(), 0);
    }

    #[test]
    fn numeric_symbols_have_no_open_interest() {
        let req = request("600000", Interval::Daily);
        let bars = rows_to_bars(&req, vec![row("2020-01-02 00:00:00", dec!(10))], "JQ");
        assert_eq!(bars[0].open_interest, Decimal::ZERO);
    }

    #[test]
    fn rows_beyond_extended_end_are_dropped() {
        let req = request("rb2005", Interval::Minute);
        let rows = vec![
            row("2020-01-03 23:00:00", dec!(1)),
            row("2020-01-04 00:00:00", dec!(2)),
            row("2020-01-04 00:01:00", dec!(3)),
            row("2020-01-04 09:01:00", dec!(4)),
        ];
        let bars = rows_to_bars(&req, rows, "JQ");

        let closes: Vec<_> = bars.iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![dec!(1), dec!(2), dec!(3)]);
        let limit = localize(NaiveDate::from_ymd_opt(2020, 1, 4).unwrap().and_time(NaiveTime::MIN))
            .unwrap();
        assert!(bars.iter().all(|b| b.datetime <= limit));
    }

    #[test]
    fn newest_first_rows_come_out_ascending_without_duplicates() {
        let req = request("rb2005", Interval::Daily);
        let rows = vec![
            row("2020-01-03 00:00:00", dec!(3)),
            row("2020-01-02 00:00:00", dec!(2)),
            row("2020-01-02 00:00:00", dec!(99)),
        ];
        let bars = rows_to_bars(&req, rows, "TU");

        let closes: Vec<_> = bars.iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![dec!(2), dec!(3)]);
    }

    #[test]
    fn hour_bars_shift_to_open_time() {
        let req = request("rb2005", Interval::Hour);
        let bars = rows_to_bars(&req, vec![row("2020-01-02 10:30:00", dec!(10))], "JQ");

        assert_eq!(bars[0].datetime.date_naive(), NaiveDate::from_ymd_opt(2020, 1, 2).unwrap());
        assert_eq!((bars[0].datetime.hour(), bars[0].datetime.minute()), (9, 30));
    }

    #[test]
    fn weekly_bars_open_on_monday() {
        let req = HistoryRequest::new(
            "600000",
            Exchange::Sse,
            Interval::Weekly,
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2020, 1, 17).unwrap(),
        );
        let rows = vec![
            row("2020-01-17 00:00:00", dec!(3)),
            row("2020-01-10 00:00:00", dec!(2)),
            row("2020-01-03 00:00:00", dec!(1)),
        ];
        let bars = rows_to_bars(&req, rows, "TU");

        let opens: Vec<_> = bars
            .iter()
            .map(|b| (b.datetime.date_naive().weekday(), b.datetime.date_naive().day()))
            .collect();
        assert_eq!(
            opens,
            vec![(Weekday::Mon, 30), (Weekday::Mon, 6), (Weekday::Mon, 13)]
        );
        assert!(bars.iter().all(|b| b.datetime.hour() == 0));
    }

    #[test]
    fn empty_rows_give_empty_series() {
        let req = request("rb2005", Interval::Daily);
        assert!(rows_to_bars(&req, Vec::new(), "JQ").is_empty());
    }

    #[test]
    fn decimal_parsing() {
        assert_eq!(parse_decimal("3050.5"), Some(dec!(3050.5)));
        assert_eq!(parse_decimal(" 12 "), Some(dec!(12)));
        assert_eq!(parse_decimal("1.5e3"), Some(dec!(1500)));
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("nan"), None);
        assert_eq!(parse_decimal("abc"), None);
    }
}
