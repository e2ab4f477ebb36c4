//! Tushare Pro vendor adapter.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, Utc};
use serde_json::{Value, json};

use super::client::{TushareApi, TushareTable};
use crate::application::ports::{Credentials, VendorAdapter};
use crate::domain::market_history::{
    BarData, DataVendor, Exchange, HistoryError, HistoryRequest, Interval, SessionError,
};
use crate::infrastructure::vendors::VendorError;
use crate::infrastructure::vendors::normalize::{VendorRow, parse_decimal, rows_to_bars};
use crate::infrastructure::vendors::session::VendorSession;
use crate::infrastructure::vendors::tables::{EXCHANGE_TZ, TUSHARE_TABLES};

const DATE_FORMAT: &str = "%Y%m%d";

/// Authenticated Tushare state.
#[derive(Debug, Clone)]
pub struct TushareSession {
    token: String,
}

/// Tushare data call serving a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TushareCall {
    /// Equity daily bars.
    Daily,
    /// Equity weekly bars.
    Weekly,
    /// Futures daily bars.
    FutDaily,
}

impl TushareCall {
    /// Pick the call for an exchange and interval.
    pub fn select(exchange: Exchange, interval: Interval) -> Result<Self, HistoryError> {
        let vendor = DataVendor::Tushare;
        let unsupported_interval = HistoryError::UnsupportedInterval { vendor, interval };
        if TUSHARE_TABLES.interval_code(interval).is_none() {
            return Err(unsupported_interval);
        }
        match (exchange, interval) {
            (Exchange::Sse | Exchange::Szse, Interval::Daily) => Ok(Self::Daily),
            (Exchange::Sse | Exchange::Szse, Interval::Weekly) => Ok(Self::Weekly),
            (
                Exchange::Cffex | Exchange::Shfe | Exchange::Czce | Exchange::Dce | Exchange::Ine,
                Interval::Daily,
            ) => Ok(Self::FutDaily),
            (
                Exchange::Sse
                | Exchange::Szse
                | Exchange::Cffex
                | Exchange::Shfe
                | Exchange::Czce
                | Exchange::Dce
                | Exchange::Ine,
                _,
            ) => Err(unsupported_interval),
            _ => Err(HistoryError::UnsupportedExchange { vendor, exchange }),
        }
    }

    /// Tushare API name.
    #[must_use]
    pub const fn api_name(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::FutDaily => "fut_daily",
        }
    }

    /// Field list, adding open interest for futures when wanted.
    #[must_use]
    pub const fn fields(self, with_open_interest: bool) -> &'static str {
        match (self, with_open_interest) {
            (Self::FutDaily, true) => "ts_code,trade_date,open,high,low,close,vol,oi",
            _ => "ts_code,trade_date,open,high,low,close,vol",
        }
    }
}

/// Adapter serving daily and weekly history from Tushare Pro.
///
/// Tushare authenticates by token only and keeps no symbol universe.
pub struct TushareAdapter {
    api: Arc<dyn TushareApi>,
    session: VendorSession<TushareSession>,
}

impl TushareAdapter {
    /// Create an adapter over `api` with an optional configured token.
    #[must_use]
    pub fn new(api: Arc<dyn TushareApi>, credentials: Option<Credentials>) -> Self {
        Self {
            api,
            session: VendorSession::new(DataVendor::Tushare, credentials),
        }
    }

    async fn authenticate(
        api: &dyn TushareApi,
        credentials: Credentials,
    ) -> Result<TushareSession, SessionError> {
        let today = Utc::now()
            .with_timezone(&EXCHANGE_TZ)
            .format(DATE_FORMAT)
            .to_string();
        api.query(
            "trade_cal",
            credentials.key(),
            json!({"exchange": "SSE", "start_date": today, "end_date": today}),
            "cal_date,is_open",
        )
        .await
        .map_err(|e| e.into_session_error(DataVendor::Tushare))?;

        Ok(TushareSession {
            token: credentials.key().to_string(),
        })
    }
}

impl std::fmt::Debug for TushareAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TushareAdapter")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl VendorAdapter for TushareAdapter {
    fn vendor(&self) -> DataVendor {
        DataVendor::Tushare
    }

    fn is_initialized(&self) -> bool {
        self.session.is_initialized()
    }

    async fn init(&self, credentials: Option<Credentials>) -> Result<(), SessionError> {
        let api = Arc::clone(&self.api);
        self.session
            .get_or_init(credentials, |creds| async move {
                Self::authenticate(api.as_ref(), creds).await
            })
            .await?;
        Ok(())
    }

    fn translate_symbol(&self, symbol: &str, exchange: Exchange) -> String {
        TUSHARE_TABLES.translate_symbol(symbol, exchange)
    }

    #[tracing::instrument(skip_all, fields(vendor = "tushare", symbol = %req.symbol, exchange = %req.exchange, interval = %req.interval))]
    async fn query_history(&self, req: &HistoryRequest) -> Result<Vec<BarData>, HistoryError> {
        let vendor = DataVendor::Tushare;
        let session = self
            .session
            .state()
            .ok_or(HistoryError::NotInitialized { vendor })?;

        let call = TushareCall::select(req.exchange, req.interval)?;
        let with_open_interest = !req.has_numeric_symbol();
        let ts_code = self.translate_symbol(&req.symbol, req.exchange);
        let params = json!({
            "ts_code": ts_code,
            "start_date": req.start.format(DATE_FORMAT).to_string(),
            "end_date": req.extended_end().format(DATE_FORMAT).to_string(),
        });

        let table = self
            .api
            .query(
                call.api_name(),
                &session.token,
                params,
                call.fields(with_open_interest),
            )
            .await
            .map_err(|e| e.into_history_error(vendor))?;

        let rows = table_rows(&table).map_err(|e| e.into_history_error(vendor))?;
        let bars = rows_to_bars(req, rows, vendor.tag());
        tracing::debug!(%ts_code, api = call.api_name(), bars = bars.len(), "Tushare query complete");
        Ok(bars)
    }
}

/// Decode a Tushare bar table.
///
/// Volume comes from `vol`; open interest from `oi` when present.
pub fn table_rows(table: &TushareTable) -> Result<Vec<VendorRow>, VendorError> {
    let column = |name: &str| {
        table
            .column(name)
            .ok_or_else(|| VendorError::Parse(format!("missing column {name}")))
    };
    if table.is_empty() {
        return Ok(Vec::new());
    }
    let date_col = column("trade_date")?;
    let open_col = column("open")?;
    let high_col = column("high")?;
    let low_col = column("low")?;
    let close_col = column("close")?;
    let volume_col = column("vol")?;
    let oi_col = table.column("oi");

    table
        .items
        .iter()
        .map(|item| {
            let field = |idx: usize, name: &str| {
                item.get(idx)
                    .and_then(value_decimal)
                    .ok_or_else(|| VendorError::Parse(format!("bad {name} in row {item:?}")))
            };
            let timestamp = item
                .get(date_col)
                .and_then(Value::as_str)
                .and_then(|raw| NaiveDate::parse_from_str(raw, DATE_FORMAT).ok())
                .map(|date| date.and_time(NaiveTime::MIN))
                .ok_or_else(|| VendorError::Parse(format!("bad trade_date in row {item:?}")))?;

            Ok(VendorRow {
                timestamp,
                open: field(open_col, "open")?,
                high: field(high_col, "high")?,
                low: field(low_col, "low")?,
                close: field(close_col, "close")?,
                volume: field(volume_col, "vol")?,
                open_interest: oi_col.and_then(|idx| item.get(idx)).and_then(value_decimal),
            })
        })
        .collect()
}

fn value_decimal(value: &Value) -> Option<rust_decimal::Decimal> {
    match value {
        Value::Number(number) => parse_decimal(&number.to_string()),
        Value::String(raw) => parse_decimal(raw),
        _ => None,
    }
}
