//! Vendor transport errors.
//!
//! These stay inside the vendor adapters and are converted to the domain's
//! `SessionError` or `HistoryError` at the adapter boundary.

use thiserror::Error;

use crate::domain::market_history::{DataVendor, HistoryError, SessionError};

/// Failure talking to a vendor API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VendorError {
    /// Connection, timeout or non-success HTTP status.
    #[error("network error: {0}")]
    Network(String),

    /// The vendor answered with an application-level error.
    #[error("vendor error {code}: {message}")]
    Api {
        /// Vendor error code (HTTP status when the vendor gives none).
        code: i64,
        /// Vendor-supplied message.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),
}

impl VendorError {
    /// Convert a failure during authentication.
    #[must_use]
    pub fn into_session_error(self, vendor: DataVendor) -> SessionError {
        match self {
            Self::Network(message) => SessionError::Network { vendor, message },
            Self::Api { message, .. } => SessionError::Rejected { vendor, message },
            Self::Parse(message) => SessionError::InvalidResponse { vendor, message },
        }
    }

    /// Convert a failure while fetching bars.
    #[must_use]
    pub fn into_history_error(self, vendor: DataVendor) -> HistoryError {
        HistoryError::Vendor {
            vendor,
            message: self.to_string(),
        }
    }
}

impl From<reqwest::Error> for VendorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<csv::Error> for VendorError {
    fn from(err: csv::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for VendorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
