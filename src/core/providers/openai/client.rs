//! OpenAI-compatible chat-completions client
//!
//! Shared wire codec for every backend speaking the OpenAI chat format
//! (OpenAI itself and Groq). Streaming responses terminate with the
//! `data: [DONE]` sentinel; a transport close before the sentinel is an
//! interruption, not a completed stream.

use std::time::{Duration, Instant};

use futures_util::StreamExt;
use serde_json::{Value, json};
use tracing::debug;

use crate::core::cost;
use crate::core::providers::sse::{SseLineBuffer, data_payload};
use crate::core::providers::ChunkStream;
use crate::core::registry;
use crate::core::types::{
    ChatRequest, ChatResponse, GatewayError, GatewayResult, StreamChunk, Usage,
};

pub(crate) struct ChatCompletionsClient {
    provider: &'static str,
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl ChatCompletionsClient {
    pub(crate) fn new(
        provider: &'static str,
        base_url: String,
        api_key: String,
        request_timeout_secs: u64,
    ) -> GatewayResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(request_timeout_secs))
            .build()
            .map_err(|e| GatewayError::configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            provider,
            base_url,
            api_key,
            http,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    fn request_body(&self, model: &str, request: &ChatRequest, stream: bool) -> Value {
        let mut body = json!({
            "model": model,
            "messages": request.messages,
        });
        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        if let Some(temperature) = request.temperature {
            body["temperature"] = json!(temperature);
        }
        if stream {
            body["stream"] = json!(true);
        }
        body
    }

    pub(crate) async fn invoke(
        &self,
        model: &str,
        request: &ChatRequest,
    ) -> GatewayResult<ChatResponse> {
        let started = Instant::now();
        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&self.request_body(model, request, false))
            .send()
            .await
            .map_err(|e| {
                GatewayError::upstream(self.provider, model, None, format!("request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::upstream(
                self.provider,
                model,
                Some(status.as_u16()),
                body,
            ));
        }

        let payload: Value = response.json().await.map_err(|e| {
            GatewayError::upstream(self.provider, model, None, format!("invalid response body: {e}"))
        })?;

        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                GatewayError::parsing(format!(
                    "{}: response missing choices[0].message.content",
                    self.provider
                ))
            })?
            .to_string();

        let prompt_tokens = payload["usage"]["prompt_tokens"].as_u64().unwrap_or(0) as u32;
        let completion_tokens = payload["usage"]["completion_tokens"].as_u64().unwrap_or(0) as u32;
        let billed_cost = registry::static_descriptor(model)
            .map(|m| cost::calculate_cost(m, prompt_tokens, completion_tokens))
            .unwrap_or(0.0);

        debug!(
            provider = self.provider,
            model, prompt_tokens, completion_tokens, "chat completion finished"
        );

        Ok(ChatResponse {
            content,
            provider: self.provider.to_string(),
            model: model.to_string(),
            usage: Usage {
                prompt_tokens,
                completion_tokens,
                cost: billed_cost,
            },
            latency_ms: started.elapsed().as_millis() as u64,
        })
    }

    pub(crate) async fn invoke_stream(
        &self,
        model: &str,
        request: &ChatRequest,
    ) -> GatewayResult<ChunkStream> {
        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&self.request_body(model, request, true))
            .send()
            .await
            .map_err(|e| {
                GatewayError::upstream(self.provider, model, None, format!("request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::upstream(
                self.provider,
                model,
                Some(status.as_u16()),
                body,
            ));
        }

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
                    if payload == "[DONE]" {
                        yield Ok(StreamChunk::done());
                        return;
                    }
                    match serde_json::from_str::<Value>(payload) {
                        Ok(event) => {
                            if let Some(content) = event["choices"][0]["delta"]["content"].as_str()
                            {
                                if !content.is_empty() {
                                    yield Ok(StreamChunk::content(content));
                                }
                            }
                        }
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

            // Transport closed without the [DONE] sentinel
            yield Err(GatewayError::stream_interrupted(
                &model,
                "stream ended before [DONE] sentinel",
            ));
        };

        Ok(Box::pin(stream))
    }
}
