//! Groq provider adapter
//!
//! Groq speaks the OpenAI chat-completions wire format, so this adapter
//! reuses the shared codec with its own base URL and credential.

use std::env;
use std::sync::Arc;

use async_trait::async_trait;

use super::openai::client::ChatCompletionsClient;
use crate::config::GatewayConfig;
use crate::core::providers::{ChunkStream, LlmProvider};
use crate::core::types::{ChatRequest, ChatResponse, GatewayError, GatewayResult};

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

#[derive(Debug, Clone)]
pub struct GroqConfig {
    pub api_key: String,
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl GroqConfig {
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

    pub fn from_env() -> GatewayResult<Self> {
        let api_key = env::var("GROQ_API_KEY").map_err(|_| {
            GatewayError::configuration("GROQ_API_KEY environment variable is required")
        })?;

        let mut config = Self::new(api_key);
        if let Ok(base_url) = env::var("GROQ_BASE_URL") {
            config.base_url = base_url;
        }
        Ok(config)
    }
}

pub struct GroqProvider {
    client: ChatCompletionsClient,
}

impl GroqProvider {
    pub fn new(config: GroqConfig) -> GatewayResult<Self> {
        let client = ChatCompletionsClient::new(
            "groq",
            config.base_url,
            config.api_key,
            config.request_timeout_secs,
        )?;
        Ok(Self { client })
    }
}

#[async_trait]
impl LlmProvider for GroqProvider {
    fn name(&self) -> &'static str {
        "groq"
    }

    async fn invoke(&self, model: &str, request: &ChatRequest) -> GatewayResult<ChatResponse> {
        self.client.invoke(model, request).await
    }

    async fn invoke_stream(
        &self,
        model: &str,
        request: &ChatRequest,
    ) -> GatewayResult<ChunkStream> {
        self.client.invoke_stream(model, request).await
    }
}

/// Factory entry for the provider registry
pub fn factory(config: &GatewayConfig) -> GatewayResult<Arc<dyn LlmProvider>> {
    let provider_config = match &config.groq {
        Some(explicit) => explicit.clone(),
        None => GroqConfig::from_env()?,
    };
    Ok(Arc::new(GroqProvider::new(provider_config)?))
}
