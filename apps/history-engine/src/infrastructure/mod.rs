//! Infrastructure Layer - Adapters and external integrations.
//!
//! This layer contains the concrete implementations of the port interfaces
//! defined in the application layer.

/// JQData and Tushare vendor adapters.
pub mod vendors;

/// Broadcast channel adapter for result events.
pub mod broadcast;

/// In-process contract directory and gateway history.
pub mod directory;

/// Configuration and dependency injection.
pub mod config;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// OpenTelemetry tracing integration.
pub mod telemetry;
