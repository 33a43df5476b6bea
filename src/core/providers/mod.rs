//! Provider adapters
//!
//! One adapter per upstream backend behind the `LlmProvider` trait.
//! Enabling a backend is a registration in `provider_factories`, not an
//! edited conditional.

pub mod anthropic;
pub mod groq;
pub mod openai;
pub mod sse;

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures::Stream;

use crate::config::GatewayConfig;
use crate::core::types::{ChatRequest, ChatResponse, GatewayResult, StreamChunk};

/// Finite, non-restartable lazy chunk sequence; ends exactly once with
/// a `done` chunk. Dropping it releases the underlying connection.
pub type ChunkStream = Pin<Box<dyn Stream<Item = GatewayResult<StreamChunk>> + Send>>;

/// Capability surface of one upstream backend
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// One round trip against the backend
    async fn invoke(&self, model: &str, request: &ChatRequest) -> GatewayResult<ChatResponse>;

    /// Incrementally decoded streaming call
    async fn invoke_stream(&self, model: &str, request: &ChatRequest)
    -> GatewayResult<ChunkStream>;
}

/// Constructor signature for one backend
pub type ProviderFactory = fn(&GatewayConfig) -> GatewayResult<Arc<dyn LlmProvider>>;

/// Declarative backend registry, in stable order
pub fn provider_factories() -> &'static [(&'static str, ProviderFactory)] {
    &[
        ("openai", openai::factory),
        ("anthropic", anthropic::factory),
        ("groq", groq::factory),
    ]
}
