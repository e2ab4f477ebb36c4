//! Application Layer - Use cases and port definitions.
//!
//! This layer contains the history dispatcher and the port interfaces
//! through which it reaches contracts, gateways, vendors and subscribers.

/// Port interfaces for external systems (directory, gateway, vendors, events).
pub mod ports;

/// Application services for dispatching history queries.
pub mod services;
