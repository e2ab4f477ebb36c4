//! Domain Layer - Canonical market history types.
//!
//! Pure types with no I/O: instruments, intervals, bars, requests, result
//! events and the typed failure reasons that travel with them.

/// Historical bar requests, records and results.
pub mod market_history;
