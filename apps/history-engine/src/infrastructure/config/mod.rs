//! Configuration Module
//!
//! Configuration loading and dependency injection for the history engine.

mod settings;
mod wiring;

pub use settings::{ConfigError, HistoryConfig, ServerSettings, VendorSettings};
pub use wiring::{HistoryEngine, build_vendor_adapter};
