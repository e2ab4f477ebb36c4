//! Tushare Pro HTTP API client.
//!
//! All calls `POST` `{api_name, token, params, fields}` to one endpoint and
//! receive `{code, msg, data: {fields, items}}`; a non-zero `code` is a
//! vendor error.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::infrastructure::vendors::VendorError;

/// Default Tushare Pro endpoint.
pub const DEFAULT_TUSHARE_URL: &str = "http://api.tushare.pro";

/// Tabular result of a Tushare call.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TushareTable {
    /// Column names.
    pub fields: Vec<String>,
    /// Rows, one value per column.
    #[serde(default)]
    pub items: Vec<Vec<Value>>,
}

impl TushareTable {
    /// Index of a named column.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field == name)
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Remote Tushare operations used by the adapter.
#[async_trait]
pub trait TushareApi: Send + Sync {
    /// Call `api_name` with `params`, selecting `fields`.
    async fn query(
        &self,
        api_name: &str,
        token: &str,
        params: Value,
        fields: &str,
    ) -> Result<TushareTable, VendorError>;
}

/// Configuration for the Tushare HTTP client.
#[derive(Debug, Clone)]
pub struct TushareClientConfig {
    /// API endpoint.
    pub url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for TushareClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_TUSHARE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// `reqwest`-backed Tushare client.
#[derive(Debug, Clone)]
pub struct TushareHttpClient {
    client: Client,
    url: String,
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    api_name: &'a str,
    token: &'a str,
    params: Value,
    fields: &'a str,
}

#[derive(Deserialize)]
struct QueryResponse {
    code: i64,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    data: Option<TushareTable>,
}

impl TushareHttpClient {
    /// Create a client from config.
    pub fn new(config: &TushareClientConfig) -> Result<Self, VendorError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| VendorError::Network(e.to_string()))?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl TushareApi for TushareHttpClient {
    async fn query(
        &self,
        api_name: &str,
        token: &str,
        params: Value,
        fields: &str,
    ) -> Result<TushareTable, VendorError> {
        let body = QueryRequest {
            api_name,
            token,
            params,
            fields,
        };
        let response = self.client.post(&self.url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(VendorError::Network(format!("HTTP {status}: {text}")));
        }

        let text = response.text().await?;
        let decoded: QueryResponse = serde_json::from_str(&text)?;
        if decoded.code != 0 {
            return Err(VendorError::Api {
                code: decoded.code,
                message: decoded.msg.unwrap_or_default(),
            });
        }
        Ok(decoded.data.unwrap_or_default())
    }
}
