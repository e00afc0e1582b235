//! Client configuration
//!
//! Configuration can be loaded from a TOML file and/or environment variables.
//!
//! ```toml
//! [server]
//! base_uri = "http://are-host:8081/rest/"
//!
//! [http]
//! timeout_seconds = 30
//!
//! [stream]
//! reconnect_delay_ms = 3000
//! max_reconnect_attempts = 10
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Base URI used when none is configured
pub const DEFAULT_BASE_URI: &str = "http://localhost:8081/rest/";

/// Top-level client configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Where the runtime environment listens
    #[serde(default)]
    pub server: ServerConfig,

    /// REST request settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Event stream settings
    #[serde(default)]
    pub stream: StreamConfig,
}

/// Server location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URI every resource path is appended to
    #[serde(default = "default_base_uri")]
    pub base_uri: String,
}

fn default_base_uri() -> String {
    DEFAULT_BASE_URI.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_uri: default_base_uri(),
        }
    }
}

/// REST request settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Event stream settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Delay before reconnecting a dropped stream, unless the server sent `retry:`
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,

    /// Give up (and report the stream closed) after this many consecutive
    /// failed reconnects. `None` retries forever.
    #[serde(default)]
    pub max_reconnect_attempts: Option<u32>,

    /// Handshake timeout in seconds
    #[serde(default = "default_connect_timeout_seconds")]
    pub connect_timeout_seconds: u64,
}

fn default_reconnect_delay_ms() -> u64 {
    3000
}

fn default_connect_timeout_seconds() -> u64 {
    10
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            reconnect_delay_ms: default_reconnect_delay_ms(),
            max_reconnect_attempts: None,
            connect_timeout_seconds: default_connect_timeout_seconds(),
        }
    }
}

impl StreamConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

impl ClientConfig {
    /// Configuration pointing at `base_uri` with every other setting defaulted
    pub fn with_base_uri(base_uri: impl Into<String>) -> Self {
        Self {
            server: ServerConfig {
                base_uri: base_uri.into(),
            },
            ..Default::default()
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: ClientConfig =
            toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let mut config = ClientConfig::default();

        if let Ok(uri) = std::env::var("ARE_BASE_URI") {
            config.server.base_uri = uri;
        }
        if let Ok(timeout) = std::env::var("ARE_HTTP_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                config.http.timeout_seconds = t;
            }
        }
        if let Ok(delay) = std::env::var("ARE_RECONNECT_DELAY_MS") {
            if let Ok(d) = delay.parse() {
                config.stream.reconnect_delay_ms = d;
            }
        }
        if let Ok(max) = std::env::var("ARE_MAX_RECONNECT_ATTEMPTS") {
            if let Ok(m) = max.parse() {
                config.stream.max_reconnect_attempts = Some(m);
            }
        }

        config
    }

    /// Load configuration from file if it exists, otherwise from environment
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        if let Some(p) = path {
            if p.as_ref().exists() {
                return Self::from_file(p);
            }
        }
        let config = Self::from_env();
        config.validate()?;
        Ok(config)
    }

    /// Check the base URI is usable
    pub fn validate(&self) -> Result<()> {
        validate_base_uri(&self.server.base_uri)
    }
}

/// Reject base URIs no request could be built from
pub fn validate_base_uri(base_uri: &str) -> Result<()> {
    if base_uri.is_empty() {
        return Err(Error::Config("base_uri cannot be empty".to_string()));
    }

    if !base_uri.starts_with("http://") && !base_uri.starts_with("https://") {
        return Err(Error::Config(format!(
            "base_uri must start with http:// or https://, got: {}",
            base_uri
        )));
    }

    Ok(())
}
