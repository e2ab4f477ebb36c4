//! Gateway History Port (Driven Port)
//!
//! History query served natively by the gateway a contract came from.

use async_trait::async_trait;

use crate::domain::market_history::{BarData, HistoryRequest};

/// Gateway history error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayHistoryError {
    /// No gateway is registered under the name.
    #[error("gateway not found: {gateway}")]
    UnknownGateway {
        /// Gateway name that was looked up.
        gateway: String,
    },

    /// The gateway failed to serve the request.
    #[error("gateway query failed: {message}")]
    QueryFailed {
        /// Error details.
        message: String,
    },
}

/// Port for querying history from a trading gateway.
///
/// Bars returned here are already canonical. Before publication the engine
/// sorts them ascending by datetime and drops repeated datetimes, keeping
/// the first, so the published series can differ from the gateway's raw
/// response in order and length.
#[async_trait]
pub trait GatewayHistoryPort: Send + Sync {
    /// Query bars for `req` from the gateway named `gateway_name`.
    async fn query_history(
        &self,
        req: &HistoryRequest,
        gateway_name: &str,
    ) -> Result<Vec<BarData>, GatewayHistoryError>;
}
