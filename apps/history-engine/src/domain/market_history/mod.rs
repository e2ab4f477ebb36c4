//! Market History Bounded Context
//!
//! Canonical instruments, bar records, history requests and the events
//! and errors produced when querying history.

pub mod errors;
pub mod events;
pub mod value_objects;

pub use errors::{HistoryError, ParseError, SessionError};
pub use events::{HISTORY_RESULT_TOPIC, HistoryEvent, HistoryOutcome, RequestId};
pub use value_objects::{
    BarData, ContractData, DataVendor, Exchange, HistoryRequest, Interval, into_series,
    split_instrument_id,
};
