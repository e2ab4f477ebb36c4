//! Port Interfaces
//!
//! Defines the interfaces (ports) for external systems following the
//! Hexagonal Architecture pattern. These are the contracts that
//! infrastructure adapters must implement.
//!
//! ## Driven Ports (Outbound)
//!
//! - `ContractDirectoryPort`: contract metadata lookup
//! - `GatewayHistoryPort`: history served natively by a trading gateway
//! - `VendorAdapter`: history served by an external data vendor
//! - `EventBusPort`: publication of result events

mod contract_directory_port;
mod event_bus_port;
mod gateway_history_port;
mod vendor_adapter_port;

pub use contract_directory_port::ContractDirectoryPort;
pub use event_bus_port::{EventBusError, EventBusPort, NoOpEventBus};
pub use gateway_history_port::{GatewayHistoryError, GatewayHistoryPort};
pub use vendor_adapter_port::{Credentials, VendorAdapter};
