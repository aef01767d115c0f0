//! Pool scale client trait and implementations
//!
//! The HTTP implementation POSTs a node request to the render hub's pool
//! endpoint; the log-only implementation is used for dry runs.

use reqwest::blocking::Client;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{ConfigSource, ENVIRONMENT_KEY, ENVIRONMENT_URL};

#[derive(Error, Debug)]
pub enum ScaleError {
    #[error("Plugin config entry {key} is not set")]
    MissingConfig { key: &'static str },

    #[error("Invalid authorization header: {message}")]
    InvalidHeader { message: String },

    #[error("Failed to build HTTP client: {message}")]
    ClientBuild { message: String },

    #[error("Scale request to {url} failed: {message}")]
    RequestFailed { url: String, message: String },
}

/// Node request for a single pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScaleRequest {
    #[serde(skip)]
    pub pool: String,
    #[serde(rename = "requestedNodes")]
    pub requested_nodes: u32,
}

impl ScaleRequest {
    pub fn new(pool: impl Into<String>, requested_nodes: u32) -> Self {
        Self {
            pool: pool.into(),
            requested_nodes,
        }
    }
}

/// What came back from the scale endpoint. Never inspected for success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleResponse {
    Http { status: u16 },
    Logged,
}

impl fmt::Display for ScaleResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleResponse::Http { status } => write!(f, "HTTP {}", status),
            ScaleResponse::Logged => f.write_str("dry-run (no request sent)"),
        }
    }
}

/// Pool scale client trait - implement this to target a different scaling service
pub trait PoolScaleClient: Send + Sync {
    fn scale_pool(&self, request: &ScaleRequest) -> Result<ScaleResponse, ScaleError>;
}

/// Log-only pool scale client (dry-run)
pub struct LogOnlyPoolScaleClient;

impl PoolScaleClient for LogOnlyPoolScaleClient {
    fn scale_pool(&self, request: &ScaleRequest) -> Result<ScaleResponse, ScaleError> {
        info!(
            pool = %request.pool,
            requested_nodes = request.requested_nodes,
            "Scale request (log-only mode)"
        );
        Ok(ScaleResponse::Logged)
    }
}

/// HTTP pool scale client - POSTs `{"requestedNodes": N}` to `{base_url}/pools/{pool}`
///
/// The call is made once. Non-2xx responses are returned, not treated as errors.
pub struct HttpPoolScaleClient {
    client: Client,
    base_url: Option<String>,
    key: Option<String>,
}

impl HttpPoolScaleClient {
    pub fn new(base_url: Option<String>, key: Option<String>) -> Result<Self, ScaleError> {
        let client = Client::builder()
            .build()
            .map_err(|e| ScaleError::ClientBuild {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url,
            key,
        })
    }

    /// Read `EnvironmentUrl` and `EnvironmentKey` from plugin configuration
    pub fn from_config(config: &dyn ConfigSource) -> Result<Self, ScaleError> {
        Self::new(
            config.config_entry(ENVIRONMENT_URL),
            config.config_entry(ENVIRONMENT_KEY),
        )
    }

    pub fn pool_url(&self, pool: &str) -> Result<String, ScaleError> {
        let base_url = self.base_url.as_deref().ok_or(ScaleError::MissingConfig {
            key: ENVIRONMENT_URL,
        })?;
        let base_url = base_url.strip_suffix('/').unwrap_or(base_url);
        Ok(format!("{}/pools/{}", base_url, pool))
    }

    fn authorization(&self) -> Result<HeaderValue, ScaleError> {
        let key = self.key.as_deref().ok_or(ScaleError::MissingConfig {
            key: ENVIRONMENT_KEY,
        })?;
        // The key is already the Basic credential; it is not re-encoded.
        let mut value = HeaderValue::from_str(&format!("Basic {}", key)).map_err(|e| {
            ScaleError::InvalidHeader {
                message: e.to_string(),
            }
        })?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl PoolScaleClient for HttpPoolScaleClient {
    fn scale_pool(&self, request: &ScaleRequest) -> Result<ScaleResponse, ScaleError> {
        let url = self.pool_url(&request.pool)?;
        let authorization = self.authorization()?;

        debug!(
            url = %url,
            requested_nodes = request.requested_nodes,
            "Posting scale request"
        );

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, authorization)
            .json(request)
            .send()
            .map_err(|e| ScaleError::RequestFailed {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        debug!(url = %url, status = %status, "Scale endpoint responded");
        Ok(ScaleResponse::Http {
            status: status.as_u16(),
        })
    }
}
