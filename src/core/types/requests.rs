//! Inbound request type consumed by the orchestrator
//!
//! Streaming vs. non-streaming is selected by which orchestrator method
//! is called, not by a flag inside the request.

use serde::{Deserialize, Serialize};

use super::message::{ChatMessage, MessageRole, user_message};

/// A chat/completion request routed across the configured providers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Ordered conversation turns
    pub messages: Vec<ChatMessage>,
    /// Maximum completion tokens requested from the backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Explicit provider preference (e.g. "anthropic"); falls through
    /// to normal routing when none of its models are healthy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_provider: Option<String>,
    /// Routing hint: task type (e.g. "complaints", "report")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,
    /// Routing hint: language; auto-detected from the latest user turn
    /// when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_preferred_provider(mut self, provider: impl Into<String>) -> Self {
        self.preferred_provider = Some(provider.into());
        self
    }

    pub fn with_task_type(mut self, task_type: impl Into<String>) -> Self {
        self.task_type = Some(task_type.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Content of the most recent user turn, used for language detection
    pub fn latest_user_content(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
    }

    /// Minimal low-cost request used by the health prober
    pub fn ping() -> Self {
        Self::new(vec![user_message("ping")]).with_max_tokens(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::message::assistant_message;

    #[test]
    fn latest_user_content_skips_assistant_turns() {
        let request = ChatRequest::new(vec![
            user_message("first"),
            assistant_message("reply"),
            user_message("second"),
            assistant_message("reply again"),
        ]);
        assert_eq!(request.latest_user_content(), Some("second"));
    }

    #[test]
    fn ping_is_minimal() {
        let ping = ChatRequest::ping();
        assert_eq!(ping.max_tokens, Some(1));
        assert_eq!(ping.messages.len(), 1);
    }
}
