//! JQData HTTP API client.
//!
//! Every call is a JSON `POST` to a single endpoint with a `method` field.
//! Successful bodies are plain text: the token for `get_token`, CSV for
//! everything else. Failures come back as bodies starting with `error`.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use reqwest::Client;
use serde::Serialize;

use crate::infrastructure::vendors::VendorError;
use crate::infrastructure::vendors::normalize::{VendorRow, parse_decimal};

/// Default JQData API endpoint.
pub const DEFAULT_JQDATA_URL: &str = "https://dataapi.joinquant.com/apis";

/// Arguments of a `get_price_period` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceQuery {
    /// JQData security code (e.g. "000001.XSHG").
    pub code: String,
    /// JQData bar unit (e.g. "1d").
    pub unit: &'static str,
    /// First date.
    pub start: NaiveDate,
    /// Last date (inclusive).
    pub end: NaiveDate,
    /// Whether to read the open interest column.
    pub with_open_interest: bool,
}

/// Remote JQData operations used by the adapter.
#[async_trait]
pub trait JqDataApi: Send + Sync {
    /// Exchange account credentials for an API token.
    async fn get_token(&self, username: &str, password: &str) -> Result<String, VendorError>;

    /// List the codes of every security of one kind.
    async fn get_all_securities(&self, token: &str, kind: &str) -> Result<Vec<String>, VendorError>;

    /// Fetch bars for one security over a date range.
    async fn get_price_period(
        &self,
        token: &str,
        query: &PriceQuery,
    ) -> Result<Vec<VendorRow>, VendorError>;
}

/// Configuration for the JQData HTTP client.
#[derive(Debug, Clone)]
pub struct JqDataClientConfig {
    /// API endpoint.
    pub url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for JqDataClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_JQDATA_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// `reqwest`-backed JQData client.
#[derive(Debug, Clone)]
pub struct JqDataHttpClient {
    client: Client,
    url: String,
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    method: &'static str,
    mob: &'a str,
    pwd: &'a str,
}

#[derive(Serialize)]
struct SecuritiesRequest<'a> {
    method: &'static str,
    token: &'a str,
    code: &'a str,
}

#[derive(Serialize)]
struct PricePeriodRequest<'a> {
    method: &'static str,
    token: &'a str,
    code: &'a str,
    unit: &'a str,
    date: String,
    end_date: String,
}

impl JqDataHttpClient {
    /// Create a client from config.
    pub fn new(config: &JqDataClientConfig) -> Result<Self, VendorError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| VendorError::Network(e.to_string()))?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    async fn call<B: Serialize + Sync>(&self, body: &B) -> Result<String, VendorError> {
        let response = self.client.post(&self.url).json(body).send().await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(VendorError::Network(format!("HTTP {status}: {text}")));
        }
        if let Some(message) = text.strip_prefix("error") {
            return Err(VendorError::Api {
                code: i64::from(status.as_u16()),
                message: message.trim_start_matches(':').trim().to_string(),
            });
        }
        Ok(text)
    }
}

#[async_trait]
impl JqDataApi for JqDataHttpClient {
    async fn get_token(&self, username: &str, password: &str) -> Result<String, VendorError> {
        let body = TokenRequest {
            method: "get_token",
            mob: username,
            pwd: password,
        };
        let token = self.call(&body).await?.trim().to_string();
        if token.is_empty() {
            return Err(VendorError::Parse("empty token".to_string()));
        }
        Ok(token)
    }

    async fn get_all_securities(&self, token: &str, kind: &str) -> Result<Vec<String>, VendorError> {
        let body = SecuritiesRequest {
            method: "get_all_securities",
            token,
            code: kind,
        };
        let text = self.call(&body).await?;
        parse_security_codes(&text)
    }

    async fn get_price_period(
        &self,
        token: &str,
        query: &PriceQuery,
    ) -> Result<Vec<VendorRow>, VendorError> {
        let body = PricePeriodRequest {
            method: "get_price_period",
            token,
            code: &query.code,
            unit: query.unit,
            date: query.start.format("%Y-%m-%d").to_string(),
            end_date: query.end.format("%Y-%m-%d").to_string(),
        };
        let text = self.call(&body).await?;
        parse_price_rows(&text, query.with_open_interest)
    }
}

// =============================================================================
// CSV Decoding
// =============================================================================

/// Read the first column of a securities listing.
pub fn parse_security_codes(text: &str) -> Result<Vec<String>, VendorError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut codes = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(code) = record.get(0).map(str::trim).filter(|c| !c.is_empty()) {
            codes.push(code.to_string());
        }
    }
    Ok(codes)
}

/// Decode a `get_price_period` CSV body.
///
/// Columns are located by header name. Rows with an unreadable timestamp
/// or price are rejected as a parse error.
pub fn parse_price_rows(text: &str, with_open_interest: bool) -> Result<Vec<VendorRow>, VendorError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let columns: HashMap<String, usize> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.trim().to_string(), idx))
        .collect();
    let column = |name: &str| {
        columns
            .get(name)
            .copied()
            .ok_or_else(|| VendorError::Parse(format!("missing column {name}")))
    };
    let date_col = column("date")?;
    let open_col = column("open")?;
    let high_col = column("high")?;
    let low_col = column("low")?;
    let close_col = column("close")?;
    let volume_col = column("volume")?;
    let oi_col = columns.get("open_interest").copied();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let field = |idx: usize, name: &str| {
            record
                .get(idx)
                .and_then(parse_decimal)
                .ok_or_else(|| VendorError::Parse(format!("bad {name} in row {record:?}")))
        };
        let raw_date = record.get(date_col).unwrap_or_default();
        let timestamp = parse_timestamp(raw_date)
            .ok_or_else(|| VendorError::Parse(format!("bad date {raw_date:?}")))?;

        rows.push(VendorRow {
            timestamp,
            open: field(open_col, "open")?,
            high: field(high_col, "high")?,
            low: field(low_col, "low")?,
            close: field(close_col, "close")?,
            volume: field(volume_col, "volume")?,
            open_interest: oi_col
                .filter(|_| with_open_interest)
                .and_then(|idx| record.get(idx))
                .and_then(parse_decimal),
        });
    }
    Ok(rows)
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    const DAILY_CSV: &str = "\
date,open,close,high,low,volume,money
2020-01-02,16.65,16.87,16.95,16.55,153023187,2571196482
2020-01-03,16.94,17.18,17.31,16.92,111619481,1914495474
";

    const MINUTE_CSV: &str = "\
date,open,close,high,low,volume,money,open_interest
2020-01-02 09:01,3550,3552,3555,3549,1200,4.26e7,1523456
2020-01-02 09:02:00,3552,3551,3553,3550,800,2.84e7,1523500
";

    #[test]
    fn parses_daily_rows() {
        let rows = parse_price_rows(DAILY_CSV, false).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].timestamp.to_string(), "2020-01-02 00:00:00");
        assert_eq!(rows[0].open, dec!(16.65));
        assert_eq!(rows[0].high, dec!(16.95));
        assert_eq!(rows[0].close, dec!(16.87));
        assert_eq!(rows[0].volume, dec!(153023187));
        assert_eq!(rows[0].open_interest, None);
    }

    #[test]
    fn parses_minute_rows_with_open_interest() {
        let rows = parse_price_rows(MINUTE_CSV, true).unwrap();
        assert_eq!(rows[0].timestamp.to_string(), "2020-01-02 09:01:00");
        assert_eq!(rows[1].timestamp.to_string(), "2020-01-02 09:02:00");
        assert_eq!(rows[0].open_interest, Some(dec!(1523456)));
    }

    #[test]
    fn open_interest_ignored_when_not_requested() {
        let rows = parse_price_rows(MINUTE_CSV, false).unwrap();
        assert!(rows.iter().all(|r| r.open_interest.is_none()));
    }

    #[test]
    fn header_only_body_has_no_rows() {
        let rows = parse_price_rows("date,open,close,high,low,volume,money\n", false).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn missing_column_is_a_parse_error() {
        let err = parse_price_rows("date,open\n2020-01-02,1\n", false).unwrap_err();
        assert!(matches!(err, VendorError::Parse(_)));
    }

    #[test]
    fn bad_date_is_a_parse_error() {
        let body = "date,open,close,high,low,volume\nyesterday,1,1,1,1,1\n";
        assert!(matches!(
            parse_price_rows(body, false),
            Err(VendorError::Parse(_))
        ));
    }

    #[test]
    fn security_codes_come_from_first_column() {
        let body = "\
code,display_name,name,start_date,end_date,type
000001.XSHE,平安银行,PAYH,1991-04-03,2200-01-01,stock
600000.XSHG,浦发银行,PFYH,1999-11-10,2200-01-01,stock
";
        assert_eq!(
            parse_security_codes(body).unwrap(),
            vec!["000001.XSHE".to_string(), "600000.XSHG".to_string()]
        );
    }
}
