//! Contract Directory Port (Driven Port)
//!
//! Lookup of contract metadata by instrument id.

use crate::domain::market_history::ContractData;

/// Port for resolving instrument ids to contract metadata.
///
/// Implementations are in-process lookups and must not block.
pub trait ContractDirectoryPort: Send + Sync {
    /// Get the contract for an instrument id (`{symbol}.{EXCHANGE}`).
    ///
    /// Returns `None` when the instrument is unknown.
    fn get_contract(&self, instrument_id: &str) -> Option<ContractData>;
}
