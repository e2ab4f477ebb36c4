//! Tushare Pro vendor: HTTP transport and adapter.

mod adapter;
mod client;

pub use adapter::{TushareAdapter, TushareCall, TushareSession, table_rows};
pub use client::{
    DEFAULT_TUSHARE_URL, TushareApi, TushareClientConfig, TushareHttpClient, TushareTable,
};
