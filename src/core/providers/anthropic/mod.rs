//! Anthropic provider adapter
//!
//! Speaks the messages API. System turns are lifted into the top-level
//! `system` field, which the messages endpoint requires.

mod config;
mod streaming;

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures_util::StreamExt;
use serde_json::{Value, json};
use tracing::debug;

use self::streaming::{StreamEvent, parse_event};
use crate::config::GatewayConfig;
use crate::core::cost;
use crate::core::providers::sse::{SseLineBuffer, data_payload};
use crate::core::providers::{ChunkStream, LlmProvider};
use crate::core::registry;
use crate::core::types::{
    ChatRequest, ChatResponse, GatewayError, GatewayResult, MessageRole, StreamChunk, Usage,
};

pub use self::config::AnthropicConfig;

/// Completion cap sent when the caller did not set one; the messages
/// API rejects requests without `max_tokens`.
const DEFAULT_MAX_TOKENS: u32 = 1024;

pub struct AnthropicProvider {
    config: AnthropicConfig,
    http: reqwest::Client,
}

impl AnthropicProvider {
    pub fn new(config: AnthropicConfig) -> GatewayResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| GatewayError::configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'))
    }

    fn request_body(&self, model: &str, request: &ChatRequest, stream: bool) -> Value {
        let system: Vec<&str> = request
            .messages
            .iter()
            .filter(|m| m.role == MessageRole::System)
            .map(|m| m.content.as_str())
            .collect();
        let turns: Vec<Value> = request
            .messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .map(|m| json!({ "role": m.role.as_str(), "content": m.content }))
            .collect();

        let mut body = json!({
            "model": model,
            "max_tokens": request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            "messages": turns,
        });
        if !system.is_empty() {
            body["system"] = json!(system.join("\n"));
        }
        if let Some(temperature) = request.temperature {
            body["temperature"] = json!(temperature);
        }
        if stream {
            body["stream"] = json!(true);
        }
        body
    }

    async fn send(
        &self,
        model: &str,
        request: &ChatRequest,
        stream: bool,
    ) -> GatewayResult<reqwest::Response> {
        let response = self
            .http
            .post(self.endpoint())
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", config::API_VERSION)
            .json(&self.request_body(model, request, stream))
            .send()
            .await
            .map_err(|e| {
                GatewayError::upstream("anthropic", model, None, format!("request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::upstream(
                "anthropic",
                model,
                Some(status.as_u16()),
                body,
            ));
        }
        Ok(response)
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    async fn invoke(&self, model: &str, request: &ChatRequest) -> GatewayResult<ChatResponse> {
        let started = Instant::now();
        let response = self.send(model, request, false).await?;

        let payload: Value = response.json().await.map_err(|e| {
            GatewayError::upstream("anthropic", model, None, format!("invalid response body: {e}"))
        })?;

        let content = payload["content"][0]["text"]
            .as_str()
            .ok_or_else(|| {
                GatewayError::parsing("anthropic: response missing content[0].text".to_string())
            })?
            .to_string();

        let prompt_tokens = payload["usage"]["input_tokens"].as_u64().unwrap_or(0) as u32;
        let completion_tokens = payload["usage"]["output_tokens"].as_u64().unwrap_or(0) as u32;
        let billed_cost = registry::static_descriptor(model)
            .map(|m| cost::calculate_cost(m, prompt_tokens, completion_tokens))
            .unwrap_or(0.0);

        debug!(model, prompt_tokens, completion_tokens, "anthropic completion finished");

        Ok(ChatResponse {
            content,
            provider: "anthropic".to_string(),
            model: model.to_string(),
            usage: Usage {
                prompt_tokens,
                completion_tokens,
                cost: billed_cost,
            },
            latency_ms: started.elapsed().as_millis() as u64,
        })
    }

    async fn invoke_stream(
        &self,
        model: &str,
        request: &ChatRequest,
    ) -> GatewayResult<ChunkStream> {
        let response = self.send(model, request, true).await?;

        let model = model.to_string();
        let stream = async_stream::stream! {
            let mut body_stream = response.bytes_stream();
            let mut buffer = SseLineBuffer::new();

            while let Some(read) = body_stream.next().await {
                let bytes = match read {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        yield Err(GatewayError::stream_interrupted(
                            &model,
                            format!("transport error mid-stream: {e}"),
                        ));
                        return;
                    }
                };

                for line in buffer.push(&bytes) {
                    let Some(payload) = data_payload(&line) else {
                        continue;
                    };
                    match parse_event(payload) {
                        Ok(StreamEvent::Delta(text)) => yield Ok(StreamChunk::content(text)),
                        Ok(StreamEvent::Stop) => {
                            yield Ok(StreamChunk::done());
                            return;
                        }
                        Ok(StreamEvent::Error(message)) => {
                            yield Err(GatewayError::stream_interrupted(&model, message));
                            return;
                        }
                        Ok(StreamEvent::Ignored) => {}
                        Err(e) => {
                            yield Err(GatewayError::stream_interrupted(
                                &model,
                                format!("undecodable stream event: {e}"),
                            ));
                            return;
                        }
                    }
                }
            }

            // Transport closed without message_stop
            yield Err(GatewayError::stream_interrupted(
                &model,
                "stream ended before message_stop",
            ));
        };

        Ok(Box::pin(stream))
    }
}

/// Factory entry for the provider registry
pub fn factory(config: &GatewayConfig) -> GatewayResult<Arc<dyn LlmProvider>> {
    let provider_config = match &config.anthropic {
        Some(explicit) => explicit.clone(),
        None => AnthropicConfig::from_env()?,
    };
    Ok(Arc::new(AnthropicProvider::new(provider_config)?))
}
