//! Dependency wiring: builds the configured vendor adapter and assembles
//! the dispatcher with its event hub.

use std::sync::Arc;

use crate::application::ports::{
    ContractDirectoryPort, EventBusPort, GatewayHistoryPort, VendorAdapter,
};
use crate::application::services::HistoryDispatcher;
use crate::domain::market_history::DataVendor;
use crate::infrastructure::broadcast::{HistoryBroadcastHub, SharedBroadcastHub};
use crate::infrastructure::vendors::{
    JqDataAdapter, JqDataHttpClient, TushareAdapter, TushareHttpClient, VendorError,
};

use super::settings::{HistoryConfig, VendorSettings};

/// Build the adapter for the configured vendor over its HTTP client.
pub fn build_vendor_adapter(settings: &VendorSettings) -> Result<Arc<dyn VendorAdapter>, VendorError> {
    let adapter: Arc<dyn VendorAdapter> = match settings.vendor {
        DataVendor::JqData => {
            let client = JqDataHttpClient::new(&settings.jqdata_client())?;
            Arc::new(JqDataAdapter::new(Arc::new(client), settings.credentials()))
        }
        DataVendor::Tushare => {
            let client = TushareHttpClient::new(&settings.tushare_client())?;
            Arc::new(TushareAdapter::new(Arc::new(client), settings.credentials()))
        }
    };
    tracing::info!(vendor = %settings.vendor, "vendor adapter configured");
    Ok(adapter)
}

/// A running history engine.
#[derive(Debug)]
pub struct HistoryEngine {
    /// Query entry point.
    pub dispatcher: HistoryDispatcher,
    /// Hub on which results are published.
    pub events: SharedBroadcastHub,
}

impl HistoryEngine {
    /// Assemble an engine using the vendor selected by `config`.
    ///
    /// Must be called inside a tokio runtime.
    pub fn build(
        config: &HistoryConfig,
        contracts: Arc<dyn ContractDirectoryPort>,
        gateway: Arc<dyn GatewayHistoryPort>,
    ) -> Result<Self, VendorError> {
        let adapter = build_vendor_adapter(&config.vendor)?;
        Ok(Self::with_adapter(config, contracts, gateway, adapter))
    }

    /// Assemble an engine around an existing adapter.
    #[must_use]
    pub fn with_adapter(
        config: &HistoryConfig,
        contracts: Arc<dyn ContractDirectoryPort>,
        gateway: Arc<dyn GatewayHistoryPort>,
        adapter: Arc<dyn VendorAdapter>,
    ) -> Self {
        let events = Arc::new(HistoryBroadcastHub::new(config.broadcast));
        let bus: Arc<dyn EventBusPort> = events.clone();
        let dispatcher =
            HistoryDispatcher::new(contracts, gateway, adapter, bus, config.dispatcher);
        Self { dispatcher, events }
    }
}
