//! Exchange value object.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::market_history::errors::ParseError;

/// Canonical exchange identifier.
///
/// This is the system-internal naming, independent of how any data vendor
/// spells the venue. The string form is the upper-case exchange code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Exchange {
    /// China Financial Futures Exchange.
    Cffex,
    /// Shanghai Futures Exchange.
    Shfe,
    /// Zhengzhou Commodity Exchange.
    Czce,
    /// Dalian Commodity Exchange.
    Dce,
    /// Shanghai International Energy Exchange.
    Ine,
    /// Shanghai Gold Exchange.
    Sge,
    /// Shanghai Stock Exchange.
    Sse,
    /// Shenzhen Stock Exchange.
    Szse,
    /// Wuxi Steel Exchange.
    Wxe,
    /// Hong Kong Futures Exchange.
    Hkfe,
    /// Stock Exchange of Hong Kong.
    Sehk,
}

impl Exchange {
    /// Every known exchange, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::Cffex,
        Self::Shfe,
        Self::Czce,
        Self::Dce,
        Self::Ine,
        Self::Sge,
        Self::Sse,
        Self::Szse,
        Self::Wxe,
        Self::Hkfe,
        Self::Sehk,
    ];

    /// Upper-case exchange code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cffex => "CFFEX",
            Self::Shfe => "SHFE",
            Self::Czce => "CZCE",
            Self::Dce => "DCE",
            Self::Ine => "INE",
            Self::Sge => "SGE",
            Self::Sse => "SSE",
            Self::Szse => "SZSE",
            Self::Wxe => "WXE",
            Self::Hkfe => "HKFE",
            Self::Sehk => "SEHK",
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Exchange {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|exchange| exchange.as_str() == upper)
            .ok_or_else(|| ParseError::UnknownExchange(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("sse".parse::<Exchange>().unwrap(), Exchange::Sse);
        assert_eq!("SZSE".parse::<Exchange>().unwrap(), Exchange::Szse);
        assert_eq!(" Cffex ".parse::<Exchange>().unwrap(), Exchange::Cffex);
    }

    #[test]
    fn parse_unknown_fails() {
        assert!(matches!(
            "NYMEX".parse::<Exchange>(),
            Err(ParseError::UnknownExchange(s)) if s == "NYMEX"
        ));
    }

    #[test]
    fn display_round_trips_for_every_exchange() {
        for exchange in Exchange::ALL {
            assert_eq!(exchange.to_string().parse::<Exchange>().unwrap(), exchange);
        }
    }

    #[test]
    fn serde_uses_exchange_code() {
        let json = serde_json::to_string(&Exchange::Czce).unwrap();
        assert_eq!(json, "\"CZCE\"");
    }
}
