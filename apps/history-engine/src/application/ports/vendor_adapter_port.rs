//! Vendor Adapter Port (Driven Port)
//!
//! Interface every external data vendor implements: lazy session setup,
//! symbol translation and the history query itself.

use async_trait::async_trait;

use crate::domain::market_history::{
    BarData, DataVendor, Exchange, HistoryError, HistoryRequest, SessionError,
};

/// Vendor API credentials.
///
/// `key` is the account name or API token; `secret` is the password where
/// the vendor needs one. The `Debug` implementation redacts both.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    key: String,
    secret: String,
}

impl Credentials {
    /// Create credentials from a key and secret.
    #[must_use]
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }

    /// Create token-only credentials.
    #[must_use]
    pub fn token(token: impl Into<String>) -> Self {
        Self::new(token, String::new())
    }

    /// Get the key (account name or token).
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get the secret.
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Whether both key and secret are present.
    #[must_use]
    pub fn is_pair(&self) -> bool {
        !self.key.is_empty() && !self.secret.is_empty()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &"[REDACTED]")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Port for fetching historical bars from an external vendor.
///
/// Implementations absorb every transport failure: nothing below this
/// boundary panics or leaks a transport error type.
#[async_trait]
pub trait VendorAdapter: Send + Sync {
    /// Vendor served by this adapter.
    fn vendor(&self) -> DataVendor;

    /// Whether the vendor session has been initialized.
    fn is_initialized(&self) -> bool;

    /// Initialize the vendor session.
    ///
    /// Idempotent: once initialized, returns `Ok(())` without contacting
    /// the vendor. `credentials` replace the configured ones while the
    /// session is still uninitialized. On failure the session stays
    /// uninitialized and a later call may retry.
    async fn init(&self, credentials: Option<Credentials>) -> Result<(), SessionError>;

    /// Translate a canonical symbol into the vendor's naming scheme.
    ///
    /// Pure: identical inputs always give identical output, and exchanges
    /// missing from the vendor table map through its default.
    fn translate_symbol(&self, symbol: &str, exchange: Exchange) -> String;

    /// Fetch bars for a canonical request.
    ///
    /// Returns an empty series when the vendor has no rows for the range.
    async fn query_history(&self, req: &HistoryRequest) -> Result<Vec<BarData>, HistoryError>;
}
