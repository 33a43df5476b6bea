//! OpenAI adapter configuration

use std::env;

use crate::core::types::{GatewayError, GatewayResult};

pub(crate) const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key; read once at construction, never logged
    pub api_key: String,
    pub base_url: String,
    /// Upper bound for any single call to the backend
    pub request_timeout_secs: u64,
}

impl OpenAiConfig {
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
        let api_key = env::var("OPENAI_API_KEY").map_err(|_| {
            GatewayError::configuration("OPENAI_API_KEY environment variable is required")
        })?;

        let mut config = Self::new(api_key);
        if let Ok(base_url) = env::var("OPENAI_BASE_URL") {
            config.base_url = base_url;
        }
        Ok(config)
    }
}
