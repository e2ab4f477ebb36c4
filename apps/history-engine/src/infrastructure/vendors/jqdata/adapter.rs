//! JQData vendor adapter.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use super::client::{JqDataApi, PriceQuery};
use crate::application::ports::{Credentials, VendorAdapter};
use crate::domain::market_history::{
    BarData, DataVendor, Exchange, HistoryError, HistoryRequest, SessionError,
};
use crate::infrastructure::vendors::normalize::rows_to_bars;
use crate::infrastructure::vendors::session::VendorSession;
use crate::infrastructure::vendors::tables::{JQDATA_SECURITY_KINDS, JQDATA_TABLES};

/// Authenticated JQData state.
#[derive(Debug, Clone)]
pub struct JqDataSession {
    token: String,
    universe: HashSet<String>,
}

impl JqDataSession {
    /// Whether the vendor lists `code`.
    #[must_use]
    pub fn lists(&self, code: &str) -> bool {
        self.universe.contains(code)
    }

    /// Number of listed securities.
    #[must_use]
    pub fn universe_size(&self) -> usize {
        self.universe.len()
    }
}

/// Adapter serving history from JQData.
///
/// Initialization logs in with username and password, then caches the
/// vendor's security universe; queries for codes outside it are refused
/// without a data call.
pub struct JqDataAdapter {
    api: Arc<dyn JqDataApi>,
    session: VendorSession<JqDataSession>,
}

impl JqDataAdapter {
    /// Create an adapter over `api` with optional configured credentials.
    #[must_use]
    pub fn new(api: Arc<dyn JqDataApi>, credentials: Option<Credentials>) -> Self {
        Self {
            api,
            session: VendorSession::new(DataVendor::JqData, credentials),
        }
    }

    async fn authenticate(
        api: &dyn JqDataApi,
        credentials: Credentials,
    ) -> Result<JqDataSession, SessionError> {
        let vendor = DataVendor::JqData;
        if !credentials.is_pair() {
            return Err(SessionError::MissingCredentials { vendor });
        }

        let token = api
            .get_token(credentials.key(), credentials.secret())
            .await
            .map_err(|e| e.into_session_error(vendor))?;

        let mut universe = HashSet::new();
        for kind in JQDATA_SECURITY_KINDS {
            let codes = api
                .get_all_securities(&token, kind)
                .await
                .map_err(|e| e.into_session_error(vendor))?;
            tracing::debug!(kind, count = codes.len(), "loaded JQData securities");
            universe.extend(codes);
        }

        Ok(JqDataSession { token, universe })
    }
}

impl std::fmt::Debug for JqDataAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JqDataAdapter")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl VendorAdapter for JqDataAdapter {
    fn vendor(&self) -> DataVendor {
        DataVendor::JqData
    }

    fn is_initialized(&self) -> bool {
        self.session.is_initialized()
    }

    async fn init(&self, credentials: Option<Credentials>) -> Result<(), SessionError> {
        let api = Arc::clone(&self.api);
        let state = self
            .session
            .get_or_init(credentials, |creds| async move {
                Self::authenticate(api.as_ref(), creds).await
            })
            .await?;
        tracing::debug!(securities = state.universe_size(), "JQData session ready");
        Ok(())
    }

    fn translate_symbol(&self, symbol: &str, exchange: Exchange) -> String {
        JQDATA_TABLES.translate_symbol(symbol, exchange)
    }

    #[tracing::instrument(skip_all, fields(vendor = "jqdata", symbol = %req.symbol, exchange = %req.exchange, interval = %req.interval))]
    async fn query_history(&self, req: &HistoryRequest) -> Result<Vec<BarData>, HistoryError> {
        let vendor = DataVendor::JqData;
        let session = self
            .session
            .state()
            .ok_or(HistoryError::NotInitialized { vendor })?;

        let code = self.translate_symbol(&req.symbol, req.exchange);
        if !session.lists(&code) {
            return Err(HistoryError::UnknownSymbol {
                vendor,
                vendor_symbol: code,
            });
        }

        let unit = JQDATA_TABLES
            .interval_code(req.interval)
            .ok_or(HistoryError::UnsupportedInterval {
                vendor,
                interval: req.interval,
            })?;

        let query = PriceQuery {
            code,
            unit,
            start: req.start,
            end: req.extended_end(),
            with_open_interest: !req.has_numeric_symbol(),
        };
        let rows = self
            .api
            .get_price_period(&session.token, &query)
            .await
            .map_err(|e| e.into_history_error(vendor))?;

        let bars = rows_to_bars(req, rows, vendor.tag());
        tracing::debug!(code = %query.code, bars = bars.len(), "JQData query complete");
        Ok(bars)
    }
}
