//! External Data Vendor Adapters
//!
//! Implementations of the `VendorAdapter` port for each supported vendor,
//! together with the pieces they share:
//!
//! - `tables`: interval and exchange code tables, timezone
//! - `session`: lazily authenticated session state
//! - `normalize`: vendor rows to canonical bars
//! - `jqdata`, `tushare`: HTTP transports and adapters

mod error;

pub mod jqdata;
pub mod normalize;
pub mod session;
pub mod tables;
pub mod tushare;

pub use error::VendorError;
pub use jqdata::{JqDataAdapter, JqDataClientConfig, JqDataHttpClient};
pub use session::VendorSession;
pub use tushare::{TushareAdapter, TushareClientConfig, TushareHttpClient};
