//! Contract metadata as provided by the instrument directory.

use serde::{Deserialize, Serialize};

use super::Exchange;
use crate::domain::market_history::errors::ParseError;

/// Split an instrument id `{symbol}.{EXCHANGE}` at its last dot.
///
/// Symbols may themselves contain dots; the exchange never does.
pub fn split_instrument_id(instrument_id: &str) -> Result<(&str, Exchange), ParseError> {
    let malformed = || ParseError::MalformedInstrumentId(instrument_id.to_string());
    let (symbol, exchange) = instrument_id.rsplit_once('.').ok_or_else(malformed)?;
    if symbol.is_empty() {
        return Err(malformed());
    }
    Ok((symbol, exchange.parse()?))
}

/// Read-only contract metadata.
///
/// Owned by the instrument directory; the history engine only reads it to
/// decide where bars come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractData {
    /// Native symbol on the exchange.
    pub symbol: String,
    /// Listing exchange.
    pub exchange: Exchange,
    /// Gateway the contract was received from.
    pub gateway_name: String,
    /// Whether the gateway can serve historical bars itself.
    pub history_data: bool,
}

impl ContractData {
    /// Create contract metadata.
    #[must_use]
    pub fn new(
        symbol: impl Into<String>,
        exchange: Exchange,
        gateway_name: impl Into<String>,
        history_data: bool,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            exchange,
            gateway_name: gateway_name.into(),
            history_data,
        }
    }

    /// Instrument identifier in `{symbol}.{EXCHANGE}` form.
    #[must_use]
    pub fn vt_symbol(&self) -> String {
        format!("{}.{}", self.symbol, self.exchange)
    }
}
