//! Market history errors.

use thiserror::Error;

use super::value_objects::{DataVendor, Exchange, Interval};

/// Failure to parse a canonical identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Exchange code not recognised.
    #[error("unknown exchange: {0}")]
    UnknownExchange(String),

    /// Interval code not recognised.
    #[error("unknown interval: {0}")]
    UnknownInterval(String),

    /// Instrument id not in `{symbol}.{EXCHANGE}` form.
    #[error("malformed instrument id: {0}")]
    MalformedInstrumentId(String),
}

/// Why a vendor session could not be initialized.
///
/// The session stays uninitialized after any of these, so a later call may
/// try again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// No usable credentials were configured or supplied.
    #[error("{vendor}: credentials not configured")]
    MissingCredentials {
        /// Vendor whose credentials are missing.
        vendor: DataVendor,
    },

    /// The vendor refused the credentials.
    #[error("{vendor}: authentication rejected: {message}")]
    Rejected {
        /// Vendor that rejected the login.
        vendor: DataVendor,
        /// Vendor-supplied reason.
        message: String,
    },

    /// The vendor could not be reached.
    #[error("{vendor}: network error during authentication: {message}")]
    Network {
        /// Vendor being contacted.
        vendor: DataVendor,
        /// Transport error details.
        message: String,
    },

    /// The vendor answered with something unreadable.
    #[error("{vendor}: invalid response during authentication: {message}")]
    InvalidResponse {
        /// Vendor being contacted.
        vendor: DataVendor,
        /// Parse error details.
        message: String,
    },
}

impl SessionError {
    /// Stable label for metrics and logs.
    #[must_use]
    pub const fn reason_code(&self) -> &'static str {
        match self {
            Self::MissingCredentials { .. } => "missing_credentials",
            Self::Rejected { .. } => "rejected",
            Self::Network { .. } => "network",
            Self::InvalidResponse { .. } => "invalid_response",
        }
    }
}

/// Why a history query produced no bars.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// The instrument directory has no contract for the id.
    #[error("unknown instrument: {instrument_id}")]
    UnknownInstrument {
        /// Requested instrument id.
        instrument_id: String,
    },

    /// Lazy session initialization failed.
    #[error("vendor session unavailable: {0}")]
    Session(#[from] SessionError),

    /// The adapter was queried before its session was initialized.
    #[error("{vendor}: session not initialized")]
    NotInitialized {
        /// Vendor queried.
        vendor: DataVendor,
    },

    /// The vendor does not list the translated symbol.
    #[error("{vendor}: symbol {vendor_symbol} not in vendor universe")]
    UnknownSymbol {
        /// Vendor queried.
        vendor: DataVendor,
        /// Vendor-native symbol that was looked up.
        vendor_symbol: String,
    },

    /// The vendor has no code for the interval.
    #[error("{vendor}: interval {interval} not supported")]
    UnsupportedInterval {
        /// Vendor queried.
        vendor: DataVendor,
        /// Requested interval.
        interval: Interval,
    },

    /// The vendor has no data call for the exchange.
    #[error("{vendor}: exchange {exchange} not supported")]
    UnsupportedExchange {
        /// Vendor queried.
        vendor: DataVendor,
        /// Requested exchange.
        exchange: Exchange,
    },

    /// Transient vendor or network failure while fetching bars.
    #[error("{vendor}: data request failed: {message}")]
    Vendor {
        /// Vendor queried.
        vendor: DataVendor,
        /// Error details.
        message: String,
    },

    /// The native gateway history call failed.
    #[error("gateway {gateway} history query failed: {message}")]
    Gateway {
        /// Gateway name.
        gateway: String,
        /// Error details.
        message: String,
    },

    /// The dispatcher queue was full when the request arrived.
    #[error("history queue full, request rejected")]
    QueueFull,

    /// The query task terminated abnormally.
    #[error("history query aborted: {message}")]
    Internal {
        /// Error details.
        message: String,
    },
}

impl HistoryError {
    /// Stable label for metrics and logs.
    #[must_use]
    pub const fn reason_code(&self) -> &'static str {
        match self {
            Self::UnknownInstrument { .. } => "unknown_instrument",
            Self::Session(_) => "session_unavailable",
            Self::NotInitialized { .. } => "not_initialized",
            Self::UnknownSymbol { .. } => "unknown_symbol",
            Self::UnsupportedInterval { .. } => "unsupported_interval",
            Self::UnsupportedExchange { .. } => "unsupported_exchange",
            Self::Vendor { .. } => "vendor_error",
            Self::Gateway { .. } => "gateway_error",
            Self::QueueFull => "queue_full",
            Self::Internal { .. } => "internal",
        }
    }

    /// Whether repeating the same request later may succeed.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(
            self,
            Self::Session(_)
                | Self::NotInitialized { .. }
                | Self::Vendor { .. }
                | Self::Gateway { .. }
                | Self::QueueFull
        )
    }
}
