//! Lazily authenticated vendor session.
//!
//! A session starts uninitialized and moves to initialized at most once,
//! on the first successful authentication. A failed attempt leaves it
//! uninitialized so a later caller can retry. Concurrent first callers
//! wait on the same attempt.

use std::future::Future;

use parking_lot::RwLock;
use tokio::sync::OnceCell;

use crate::application::ports::Credentials;
use crate::domain::market_history::{DataVendor, SessionError};
use crate::infrastructure::metrics;

/// Per-vendor session holding credentials and the authenticated state `S`.
pub struct VendorSession<S> {
    vendor: DataVendor,
    credentials: RwLock<Option<Credentials>>,
    state: OnceCell<S>,
}

impl<S> VendorSession<S> {
    /// Create an uninitialized session.
    #[must_use]
    pub fn new(vendor: DataVendor, credentials: Option<Credentials>) -> Self {
        Self {
            vendor,
            credentials: RwLock::new(credentials),
            state: OnceCell::new(),
        }
    }

    /// Vendor the session belongs to.
    #[must_use]
    pub const fn vendor(&self) -> DataVendor {
        self.vendor
    }

    /// Whether authentication has completed.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state.initialized()
    }

    /// Authenticated state, if initialized.
    #[must_use]
    pub fn state(&self) -> Option<&S> {
        self.state.get()
    }

    /// Initialize the session if needed and return its state.
    ///
    /// `supplied` replaces the stored credentials only while the session is
    /// uninitialized. `authenticate` runs at most once per successful
    /// transition and receives the credentials to use.
    pub async fn get_or_init<F, Fut>(
        &self,
        supplied: Option<Credentials>,
        authenticate: F,
    ) -> Result<&S, SessionError>
    where
        F: FnOnce(Credentials) -> Fut,
        Fut: Future<Output = Result<S, SessionError>>,
    {
        if let Some(state) = self.state.get() {
            return Ok(state);
        }

        if let Some(credentials) = supplied {
            *self.credentials.write() = Some(credentials);
        }

        let vendor = self.vendor;
        self.state
            .get_or_try_init(|| async move {
                let credentials = self
                    .credentials
                    .read()
                    .clone()
                    .filter(|c| !c.key().is_empty());
                let attempt = match credentials {
                    Some(credentials) => authenticate(credentials).await,
                    None => Err(SessionError::MissingCredentials { vendor }),
                };
                record_attempt(vendor, attempt.as_ref().err());
                attempt
            })
            .await
    }
}

/// Count and log one completed authentication attempt.
fn record_attempt(vendor: DataVendor, failure: Option<&SessionError>) {
    match failure {
        None => {
            metrics::record_session_init(vendor.as_str(), "ok");
            tracing::info!(vendor = %vendor, "vendor session initialized");
        }
        Some(err) => {
            metrics::record_session_init(vendor.as_str(), err.reason_code());
            tracing::warn!(vendor = %vendor, error = %err, "vendor session initialization failed");
        }
    }
}

impl<S> std::fmt::Debug for VendorSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VendorSession")
            .field("vendor", &self.vendor)
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}
