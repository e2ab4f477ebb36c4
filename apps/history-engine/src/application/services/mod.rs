//! Application Services
//!
//! Services that orchestrate domain logic and coordinate between ports.
//!
//! - `HistoryDispatcher`: non-blocking history queries on a worker pool

mod history_dispatcher;

pub use history_dispatcher::{DispatcherSettings, HistoryDispatcher};
