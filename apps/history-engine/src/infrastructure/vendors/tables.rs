//! Static per-vendor translation tables.
//!
//! Each vendor has an interval table, an exchange code table with a
//! fallback for unlisted exchanges, and shares the bar-open conversion
//! and exchange timezone below.

use chrono::{Datelike, Days, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;

use crate::domain::market_history::{DataVendor, Exchange, Interval};

/// Timezone of every supported exchange.
pub const EXCHANGE_TZ: Tz = chrono_tz::Asia::Shanghai;

/// Security kinds listed when building the JQData universe.
pub const JQDATA_SECURITY_KINDS: [&str; 6] = ["stock", "fund", "index", "futures", "options", "etf"];

/// Fallback for exchanges missing from a vendor's code table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeFallback {
    /// Use this fixed code.
    Fixed(&'static str),
    /// Use the canonical exchange code.
    Canonical,
}

/// Translation tables for one vendor.
#[derive(Debug, Clone, Copy)]
pub struct VendorTables {
    /// Vendor the tables belong to.
    pub vendor: DataVendor,
    /// Canonical interval to vendor interval code.
    pub intervals: &'static [(Interval, &'static str)],
    /// Canonical exchange to vendor exchange code.
    pub symbol_suffixes: &'static [(Exchange, &'static str)],
    /// Code used for exchanges not in `symbol_suffixes`.
    pub fallback: ExchangeFallback,
}

/// JQData tables.
pub const JQDATA_TABLES: VendorTables = VendorTables {
    vendor: DataVendor::JqData,
    intervals: &[
        (Interval::Minute, "1m"),
        (Interval::Hour, "60m"),
        (Interval::Daily, "1d"),
    ],
    symbol_suffixes: &[
        (Exchange::Sse, "XSHG"),
        (Exchange::Szse, "XSHE"),
        (Exchange::Cffex, "CCFX"),
        (Exchange::Dce, "XDCE"),
        (Exchange::Shfe, "XSGE"),
        (Exchange::Sge, "XSGE"),
        (Exchange::Czce, "XZCE"),
    ],
    fallback: ExchangeFallback::Fixed("XINE"),
};

/// Tushare Pro tables.
pub const TUSHARE_TABLES: VendorTables = VendorTables {
    vendor: DataVendor::Tushare,
    intervals: &[(Interval::Daily, "D"), (Interval::Weekly, "W")],
    symbol_suffixes: &[
        (Exchange::Cffex, "CFX"),
        (Exchange::Shfe, "SHF"),
        (Exchange::Czce, "ZCE"),
        (Exchange::Sse, "SH"),
        (Exchange::Szse, "SZ"),
    ],
    fallback: ExchangeFallback::Canonical,
};

impl VendorTables {
    /// Vendor interval code, `None` when the vendor has no such bars.
    #[must_use]
    pub fn interval_code(&self, interval: Interval) -> Option<&'static str> {
        self.intervals
            .iter()
            .find(|(candidate, _)| *candidate == interval)
            .map(|(_, code)| *code)
    }

    /// Vendor exchange code, falling back for unlisted exchanges.
    #[must_use]
    pub fn exchange_code(&self, exchange: Exchange) -> &'static str {
        self.symbol_suffixes
            .iter()
            .find(|(candidate, _)| *candidate == exchange)
            .map_or_else(
                || match self.fallback {
                    ExchangeFallback::Fixed(code) => code,
                    ExchangeFallback::Canonical => exchange.as_str(),
                },
                |(_, code)| *code,
            )
    }

    /// Vendor-native symbol `"{symbol}.{code}"`.
    #[must_use]
    pub fn translate_symbol(&self, symbol: &str, exchange: Exchange) -> String {
        format!("{symbol}.{}", self.exchange_code(exchange))
    }
}

/// Bar open time for a vendor timestamp.
///
/// Intraday bars are stamped with their close, so they move back one
/// period. Daily bars carry their own date. Weekly bars carry the last
/// trading day of the week and move to the Monday that opens it.
#[must_use]
pub fn bar_open(interval: Interval, stamped: NaiveDateTime) -> NaiveDateTime {
    match interval {
        Interval::Minute | Interval::Hour => stamped - interval.period(),
        Interval::Daily => stamped,
        Interval::Weekly => {
            let date = stamped.date();
            let since_monday = Days::new(u64::from(date.weekday().num_days_from_monday()));
            date.checked_sub_days(since_monday)
                .unwrap_or(date)
                .and_time(NaiveTime::MIN)
        }
    }
}
