//! Market history value objects.

mod bar;
mod contract;
mod exchange;
mod interval;
mod request;
mod vendor;

pub use bar::{BarData, into_series};
pub use contract::{ContractData, split_instrument_id};
pub use exchange::Exchange;
pub use interval::Interval;
pub use request::HistoryRequest;
pub use vendor::DataVendor;
