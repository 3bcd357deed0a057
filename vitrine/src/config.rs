//! Application configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;
use vitrine_window::WindowOptions;

use crate::format::CurrencyFormat;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:3333/products";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid endpoint {endpoint:?}: {source}")]
    InvalidEndpoint {
        endpoint: String,
        source: url::ParseError,
    },

    #[error("Unsupported endpoint scheme {0:?} (expected http or https)")]
    UnsupportedScheme(String),

    #[error("Unknown locale {0:?}")]
    UnknownLocale(String),

    #[error("Row height must be at least 1")]
    ZeroRowHeight,
}

/// Geometry of the results list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub height: u32,
    pub row_height: u32,
    pub overscan: usize,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            height: 300,
            row_height: 30,
            overscan: 5,
        }
    }
}

impl ViewportConfig {
    pub fn window_options(&self, row_count: usize) -> WindowOptions {
        WindowOptions::new(row_count, self.row_height)
            .with_viewport_height(self.height)
            .with_overscan(self.overscan)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VitrineConfig {
    /// Search endpoint; the query is sent as `?q=<text>`.
    pub endpoint: String,
    pub currency: CurrencyFormat,
    pub viewport: ViewportConfig,
    pub request_timeout_ms: Option<u64>,
}

impl Default for VitrineConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            currency: CurrencyFormat::default(),
            viewport: ViewportConfig::default(),
            request_timeout_ms: Some(10_000),
        }
    }
}

impl VitrineConfig {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_currency(mut self, currency: CurrencyFormat) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_viewport(mut self, viewport: ViewportConfig) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout_ms = timeout.map(|t| t.as_millis() as u64);
        self
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    /// Parses and checks the endpoint URL.
    pub fn endpoint_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.endpoint).map_err(|source| ConfigError::InvalidEndpoint {
            endpoint: self.endpoint.clone(),
            source,
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::UnsupportedScheme(other.to_string())),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.endpoint_url()?;
        if self.viewport.row_height == 0 {
            return Err(ConfigError::ZeroRowHeight);
        }
        Ok(())
    }
}
