use std::time::Duration;

use super::{ConfigError, StorefrontConfig};

/// A strongly-typed slice of the configuration, read from keys under
/// [`ConfigSection::prefix`].
pub trait ConfigSection: Sized {
    fn prefix() -> &'static str;

    fn from_config(config: &StorefrontConfig) -> Result<Self, ConfigError>;
}

fn key(prefix: &str, rest: &str) -> String {
    format!("{prefix}.{rest}")
}

/// Where the catalog/cart/auth service lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub endpoint: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub const DEFAULT_ENDPOINT: &'static str = "http://localhost:8082/api/v1";

    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ENDPOINT)
    }
}

impl ConfigSection for ClientConfig {
    fn prefix() -> &'static str {
        "storefront"
    }

    fn from_config(config: &StorefrontConfig) -> Result<Self, ConfigError> {
        let p = Self::prefix();
        Ok(Self {
            endpoint: config.get_or(&key(p, "endpoint"), Self::DEFAULT_ENDPOINT.to_string())?,
            timeout: Duration::from_millis(config.get_or(&key(p, "timeout.ms"), 10_000u64)?),
        })
    }
}

/// Search box behaviour.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before a search is sent.
    pub debounce: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
        }
    }
}

impl ConfigSection for SearchConfig {
    fn prefix() -> &'static str {
        "storefront.search"
    }

    fn from_config(config: &StorefrontConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            debounce: Duration::from_millis(
                config.get_or(&key(Self::prefix(), "debounce.ms"), 500u64)?,
            ),
        })
    }
}

/// The user session the engine acts for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionConfig {
    /// Bearer token; absent means "not logged in".
    pub token: Option<String>,
}

impl ConfigSection for SessionConfig {
    fn prefix() -> &'static str {
        "storefront"
    }

    fn from_config(config: &StorefrontConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            token: config.get_or(&key(Self::prefix(), "token"), None)?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogConfig {
    pub json: bool,
}

impl ConfigSection for LogConfig {
    fn prefix() -> &'static str {
        "storefront.log"
    }

    fn from_config(config: &StorefrontConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            json: config.get_or(&key(Self::prefix(), "json"), false)?,
        })
    }
}
