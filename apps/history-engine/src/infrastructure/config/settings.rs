//! History Engine Configuration Settings
//!
//! Configuration types for the history engine, loaded from environment
//! variables.

use std::time::Duration;

use crate::application::ports::Credentials;
use crate::application::services::DispatcherSettings;
use crate::domain::market_history::DataVendor;
use crate::infrastructure::broadcast::BroadcastConfig;
use crate::infrastructure::vendors::jqdata::DEFAULT_JQDATA_URL;
use crate::infrastructure::vendors::tushare::DEFAULT_TUSHARE_URL;
use crate::infrastructure::vendors::{JqDataClientConfig, TushareClientConfig};

/// Vendor connection settings.
#[derive(Debug, Clone)]
pub struct VendorSettings {
    /// Vendor serving queries for contracts without native history.
    pub vendor: DataVendor,
    /// JQData account (username, password), if configured.
    pub jqdata_credentials: Option<Credentials>,
    /// JQData API endpoint.
    pub jqdata_url: String,
    /// Tushare token, if configured.
    pub tushare_credentials: Option<Credentials>,
    /// Tushare API endpoint.
    pub tushare_url: String,
    /// HTTP timeout for vendor calls.
    pub timeout: Duration,
}

impl Default for VendorSettings {
    fn default() -> Self {
        Self {
            vendor: DataVendor::default(),
            jqdata_credentials: None,
            jqdata_url: DEFAULT_JQDATA_URL.to_string(),
            tushare_credentials: None,
            tushare_url: DEFAULT_TUSHARE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl VendorSettings {
    /// JQData HTTP client configuration.
    #[must_use]
    pub fn jqdata_client(&self) -> JqDataClientConfig {
        JqDataClientConfig {
            url: self.jqdata_url.clone(),
            timeout: self.timeout,
        }
    }

    /// Tushare HTTP client configuration.
    #[must_use]
    pub fn tushare_client(&self) -> TushareClientConfig {
        TushareClientConfig {
            url: self.tushare_url.clone(),
            timeout: self.timeout,
        }
    }

    /// Credentials of the selected vendor.
    #[must_use]
    pub fn credentials(&self) -> Option<Credentials> {
        match self.vendor {
            DataVendor::JqData => self.jqdata_credentials.clone(),
            DataVendor::Tushare => self.tushare_credentials.clone(),
        }
    }
}

/// Server port settings.
#[derive(Debug, Clone, Default)]
pub struct ServerSettings {
    /// Prometheus metrics port (0 = disabled).
    pub metrics_port: u16,
}

impl ServerSettings {
    /// Metrics port, `None` when disabled.
    #[must_use]
    pub const fn metrics_port(&self) -> Option<u16> {
        match self.metrics_port {
            0 => None,
            port => Some(port),
        }
    }
}

/// Complete history engine configuration.
#[derive(Debug, Clone, Default)]
pub struct HistoryConfig {
    /// Vendor connection settings.
    pub vendor: VendorSettings,
    /// Worker pool settings.
    pub dispatcher: DispatcherSettings,
    /// Result channel settings.
    pub broadcast: BroadcastConfig,
    /// Server port settings.
    pub server: ServerSettings,
}

impl HistoryConfig {
    /// Create configuration from environment variables.
    ///
    /// Missing credentials are not an error; the vendor session reports
    /// them on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker count or a capacity is zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker count or a capacity is zero.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env: &dyn Fn(&str) -> Option<String> = &lookup;
        let defaults = Self::default();

        let vendor = VendorSettings {
            vendor: parse_env_string(env, "HISTORY_VENDOR")
                .map(|s| DataVendor::from_str_case_insensitive(&s))
                .unwrap_or_default(),
            jqdata_credentials: match (
                parse_env_string(env, "JQDATA_USERNAME"),
                parse_env_string(env, "JQDATA_PASSWORD"),
            ) {
                (Some(username), Some(password)) => Some(Credentials::new(username, password)),
                _ => None,
            },
            jqdata_url: parse_env_string(env, "JQDATA_URL").unwrap_or(defaults.vendor.jqdata_url),
            tushare_credentials: parse_env_string(env, "TUSHARE_TOKEN").map(Credentials::token),
            tushare_url: parse_env_string(env, "TUSHARE_URL")
                .unwrap_or(defaults.vendor.tushare_url),
            timeout: parse_env_duration_secs(
                env,
                "HISTORY_VENDOR_TIMEOUT_SECS",
                defaults.vendor.timeout,
            ),
        };

        let dispatcher = DispatcherSettings {
            workers: parse_env_non_zero_usize(env, "HISTORY_WORKERS", defaults.dispatcher.workers)?,
            queue_capacity: parse_env_non_zero_usize(
                env,
                "HISTORY_QUEUE_CAPACITY",
                defaults.dispatcher.queue_capacity,
            )?,
        };

        let broadcast = BroadcastConfig {
            history_results_capacity: parse_env_non_zero_usize(
                env,
                "HISTORY_EVENTS_CAPACITY",
                defaults.broadcast.history_results_capacity,
            )?,
        };

        let server = ServerSettings {
            metrics_port: parse_env_u16(env, "HISTORY_METRICS_PORT", defaults.server.metrics_port),
        };

        Ok(Self {
            vendor,
            dispatcher,
            broadcast,
            server,
        })
    }
}

/// Configuration error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Environment variable must be greater than zero.
    #[error("environment variable {0} must be greater than zero")]
    ZeroValue(String),
}

/// Variable lookup: the process environment or a test map.
type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Read a variable; blank values count as unset.
fn parse_env_string(lookup: Lookup<'_>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env_u16(lookup: Lookup<'_>, key: &str, default: u16) -> u16 {
    parse_env_string(lookup, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_env_usize(lookup: Lookup<'_>, key: &str, default: usize) -> usize {
    parse_env_string(lookup, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_env_non_zero_usize(
    lookup: Lookup<'_>,
    key: &str,
    default: usize,
) -> Result<usize, ConfigError> {
    match parse_env_usize(lookup, key, default) {
        0 => Err(ConfigError::ZeroValue(key.to_string())),
        value => Ok(value),
    }
}

fn parse_env_duration_secs(lookup: Lookup<'_>, key: &str, default: Duration) -> Duration {
    parse_env_string(lookup, key)
        .and_then(|v| v.parse::<u64>().ok())
        .map_or(default, Duration::from_secs)
}
