#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements,
        clippy::panic
    )
)]

//! History Engine - Historical Bar Query Dispatcher
//!
//! Answers "give me bars for this instrument over this date range" without
//! blocking the caller. Each query is served either by the gateway the
//! contract came from (when it has native history) or by a pluggable
//! external data vendor, and its result is published as one event.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Canonical market history types
//!   - `market_history`: exchanges, intervals, requests, bars, events, errors
//!
//! - **Application**: Use cases and port definitions
//!   - `ports`: contract directory, gateway history, vendor adapter, event bus
//!   - `services`: the history dispatcher and its worker pool
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `vendors`: JQData and Tushare adapters over HTTP
//!   - `broadcast`: result event distribution
//!   - `directory`: in-process contract directory and gateway history
//!   - `config`: configuration and dependency injection
//!   - `metrics`, `telemetry`: observability
//!
//! # Data Flow
//!
//! ```text
//! caller ─► HistoryDispatcher ─► queue ─► worker ─┬─► gateway port
//!              (request id)                       └─► vendor adapter ─► JQData / Tushare
//!                                                           │
//! subscribers ◄── HistoryBroadcastHub ◄── HistoryEvent ◄────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Canonical market history types with no I/O.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::market_history::{
    BarData, ContractData, DataVendor, Exchange, HISTORY_RESULT_TOPIC, HistoryError,
    HistoryEvent, HistoryOutcome, HistoryRequest, Interval, ParseError, RequestId, SessionError,
    split_instrument_id,
};

// Ports and services
pub use application::ports::{
    ContractDirectoryPort, Credentials, EventBusError, EventBusPort, GatewayHistoryError,
    GatewayHistoryPort, NoOpEventBus, VendorAdapter,
};
pub use application::services::{DispatcherSettings, HistoryDispatcher};

// Infrastructure config
pub use infrastructure::config::{
    ConfigError, HistoryConfig, HistoryEngine, ServerSettings, VendorSettings,
    build_vendor_adapter,
};

// Broadcast hub
pub use infrastructure::broadcast::{
    BroadcastConfig, BroadcastStats, HistoryBroadcastHub, SharedBroadcastHub,
};

// In-process adapters
pub use infrastructure::directory::{
    InMemoryContractDirectory, InMemoryGatewayHistory, NoGatewayHistory,
};

// Vendor adapters
pub use infrastructure::vendors::{
    JqDataAdapter, JqDataClientConfig, JqDataHttpClient, TushareAdapter, TushareClientConfig,
    TushareHttpClient, VendorError,
};

// Metrics
pub use infrastructure::metrics::init_metrics;

// Telemetry
pub use infrastructure::telemetry::{TelemetryConfig, TelemetryGuard, init as init_telemetry};
