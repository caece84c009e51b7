//! Client configuration and vault loading

use crate::classifier::{never_fixable, FixablePolicyArc};
use crate::types::Vault;
use crate::{FoxtrotError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable holding the merchant id
pub const ENV_MERCHANT_ID: &str = "FOXTROT_MERCHANT_ID";
/// Environment variable holding the MD5 signing key
pub const ENV_MD5_KEY: &str = "FOXTROT_MD5_KEY";
/// Environment variable holding the gateway base URL
pub const ENV_API_URL: &str = "FOXTROT_API_URL";
/// Environment variable holding the gateway identifier
pub const ENV_PAYMENT_GATEWAY: &str = "FOXTROT_PAYMENT_GATEWAY";
/// Environment variable holding the terminal number
pub const ENV_TERMINAL_NO: &str = "FOXTROT_TERMINAL_NO";

/// HTTP and classification settings of a [`crate::FoxtrotClient`]
#[derive(Clone)]
pub struct ClientConfig {
    /// Request timeout
    pub timeout: Option<Duration>,
    /// Headers attached to every gateway request
    pub headers: HashMap<String, String>,
    /// Decides whether a rejected response code is fixable by the merchant
    pub fixable_policy: FixablePolicyArc,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("timeout", &self.timeout)
            .field("headers", &self.headers)
            .field("fixable_policy", &"<function>")
            .finish()
    }
}

impl ClientConfig {
    /// Create a config with the default timeout and no headers
    pub fn new() -> Self {
        Self {
            timeout: Some(DEFAULT_TIMEOUT),
            headers: HashMap::new(),
            fixable_policy: Arc::new(never_fixable),
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Add a header sent with every request
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Replace all custom headers
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// Set the "fixable via merchant" policy
    pub fn with_fixable_policy<F>(mut self, policy: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.fixable_policy = Arc::new(policy);
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Vault {
    /// Load a vault from a JSON file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| FoxtrotError::config(format!("Failed to read vault file: {}", e)))?;

        let vault: Vault = serde_json::from_str(&content)
            .map_err(|e| FoxtrotError::config(format!("Failed to parse vault file: {}", e)))?;

        vault.validate()?;
        Ok(vault)
    }

    /// Load a vault from `FOXTROT_*` environment variables
    pub fn from_env() -> Result<Self> {
        let var = |name: &str| {
            std::env::var(name)
                .map_err(|_| FoxtrotError::config(format!("Missing environment variable {}", name)))
        };

        let mut vault = Vault::new(
            var(ENV_MERCHANT_ID)?,
            var(ENV_MD5_KEY)?,
            var(ENV_API_URL)?,
            var(ENV_PAYMENT_GATEWAY)?,
        );

        vault.terminal_no = std::env::var(ENV_TERMINAL_NO)
            .ok()
            .filter(|t| !t.trim().is_empty());

        vault.validate()?;
        Ok(vault)
    }
}
