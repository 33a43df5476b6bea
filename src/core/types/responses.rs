//! Response and streaming types returned to callers

use serde::{Deserialize, Serialize};

/// Token counts and billed cost for one completed request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    /// USD cost derived from the model's static rates
    pub cost: f64,
}

impl Usage {
    pub fn total_tokens(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// A completed (non-streaming) chat response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: String,
    /// Provider that actually served the request
    pub provider: String,
    /// Model that actually served the request
    pub model: String,
    pub usage: Usage,
    pub latency_ms: u64,
}

/// One fragment of a streamed response
///
/// A stream yields `done = true` exactly once, as its final item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamChunk {
    pub content: String,
    pub done: bool,
}

impl StreamChunk {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            done: false,
        }
    }

    pub fn done() -> Self {
        Self {
            content: String::new(),
            done: true,
        }
    }
}

/// Pre-flight cost projection; produced without calling any backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub provider: String,
    pub model: String,
    pub prompt_tokens: u32,
    pub estimated_completion_tokens: u32,
    pub estimated_cost: f64,
}
