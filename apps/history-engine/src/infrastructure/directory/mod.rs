//! In-Process Contract Directory and Gateway Adapters
//!
//! Implementations of the contract directory and gateway history ports for
//! hosts that keep contracts in memory, for the CLI and for tests.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::application::ports::{ContractDirectoryPort, GatewayHistoryError, GatewayHistoryPort};
use crate::domain::market_history::{BarData, ContractData, HistoryRequest};

// =============================================================================
// Contract Directory
// =============================================================================

/// In-memory implementation of `ContractDirectoryPort`.
#[derive(Debug, Default)]
pub struct InMemoryContractDirectory {
    contracts: RwLock<HashMap<String, ContractData>>,
}

impl InMemoryContractDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory holding `contracts`.
    #[must_use]
    pub fn with_contracts(contracts: impl IntoIterator<Item = ContractData>) -> Self {
        let directory = Self::new();
        for contract in contracts {
            directory.add(contract);
        }
        directory
    }

    /// Add or replace a contract, keyed by its instrument id.
    pub fn add(&self, contract: ContractData) {
        self.contracts.write().insert(contract.vt_symbol(), contract);
    }

    /// Number of contracts held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contracts.read().len()
    }

    /// Whether the directory is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contracts.read().is_empty()
    }
}

impl ContractDirectoryPort for InMemoryContractDirectory {
    fn get_contract(&self, instrument_id: &str) -> Option<ContractData> {
        self.contracts.read().get(instrument_id).cloned()
    }
}

// =============================================================================
// Gateway History
// =============================================================================

/// In-memory implementation of `GatewayHistoryPort`.
///
/// Serves preloaded bars per gateway and instrument, filtered to the
/// requested date range.
#[derive(Debug, Default)]
pub struct InMemoryGatewayHistory {
    bars: RwLock<HashMap<(String, String), Vec<BarData>>>,
}

impl InMemoryGatewayHistory {
    /// Create a gateway store with no gateways.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load bars for an instrument on a gateway.
    pub fn add_bars(&self, gateway_name: &str, instrument_id: &str, bars: Vec<BarData>) {
        self.bars
            .write()
            .insert((gateway_name.to_string(), instrument_id.to_string()), bars);
    }

    fn knows_gateway(&self, gateway_name: &str) -> bool {
        self.bars.read().keys().any(|(gateway, _)| gateway == gateway_name)
    }
}

#[async_trait]
impl GatewayHistoryPort for InMemoryGatewayHistory {
    async fn query_history(
        &self,
        req: &HistoryRequest,
        gateway_name: &str,
    ) -> Result<Vec<BarData>, GatewayHistoryError> {
        if !self.knows_gateway(gateway_name) {
            return Err(GatewayHistoryError::UnknownGateway {
                gateway: gateway_name.to_string(),
            });
        }

        let key = (gateway_name.to_string(), req.vt_symbol());
        let bars = self.bars.read();
        Ok(bars
            .get(&key)
            .map(|bars| {
                bars.iter()
                    .filter(|bar| {
                        let day = bar.datetime.date_naive();
                        day >= req.start && day <= req.end && bar.interval == req.interval
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Gateway port for hosts without any connected gateway.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGatewayHistory;

#[async_trait]
impl GatewayHistoryPort for NoGatewayHistory {
    async fn query_history(
        &self,
        _req: &HistoryRequest,
        gateway_name: &str,
    ) -> Result<Vec<BarData>, GatewayHistoryError> {
        Err(GatewayHistoryError::UnknownGateway {
            gateway: gateway_name.to_string(),
        })
    }
}
