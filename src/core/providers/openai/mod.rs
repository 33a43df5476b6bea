//! OpenAI provider adapter

pub(crate) mod client;
mod config;

use std::sync::Arc;

use async_trait::async_trait;

use self::client::ChatCompletionsClient;
use crate::config::GatewayConfig;
use crate::core::providers::{ChunkStream, LlmProvider};
use crate::core::types::{ChatRequest, ChatResponse, GatewayResult};

pub use self::config::OpenAiConfig;

pub struct OpenAiProvider {
    client: ChatCompletionsClient,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiConfig) -> GatewayResult<Self> {
        let client = ChatCompletionsClient::new(
            "openai",
            config.base_url,
            config.api_key,
            config.request_timeout_secs,
        )?;
        Ok(Self { client })
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
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
    let provider_config = match &config.openai {
        Some(explicit) => explicit.clone(),
        None => OpenAiConfig::from_env()?,
    };
    Ok(Arc::new(OpenAiProvider::new(provider_config)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_builds_from_explicit_config() {
        let provider = OpenAiProvider::new(OpenAiConfig::new("test-key"));
        assert!(provider.is_ok());
        assert_eq!(provider.unwrap().name(), "openai");
    }
}
