//! Anthropic adapter configuration

use std::env;

use crate::core::types::{GatewayError, GatewayResult};

pub(crate) const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub(crate) const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key; read once at construction, never logged
    pub api_key: String,
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl AnthropicConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 120,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Read the credential from the process environment; fails if absent
    pub fn from_env() -> GatewayResult<Self> {
        let api_key = env::var("ANTHROPIC_API_KEY").map_err(|_| {
            GatewayError::configuration("ANTHROPIC_API_KEY environment variable is required")
        })?;

        let mut config = Self::new(api_key);
        if let Ok(base_url) = env::var("ANTHROPIC_BASE_URL") {
            config.base_url = base_url;
        }
        Ok(config)
    }
}
