//! JQData (JoinQuant) vendor: HTTP transport and adapter.

mod adapter;
mod client;

pub use adapter::{JqDataAdapter, JqDataSession};
pub use client::{
    DEFAULT_JQDATA_URL, JqDataApi, JqDataClientConfig, JqDataHttpClient, PriceQuery,
    parse_price_rows, parse_security_codes,
};
