//! Gateway error types
//!
//! Transient per-backend failures are absorbed by the orchestrator's
//! retry loop and surfaced only once the candidate pool is exhausted;
//! configuration-time failures are never absorbed.

/// Top-level error type for the gateway core
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Fatal at startup: missing credential, zero viable providers,
    /// unknown model id
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A single backend call failed
    #[error("Upstream error ({provider}/{model}): {message}")]
    Upstream {
        provider: String,
        model: String,
        /// HTTP status when the backend answered at all
        status: Option<u16>,
        message: String,
    },

    /// Every registered model is currently unhealthy; terminal, no retry
    #[error("No healthy providers available")]
    NoHealthyProviders,

    /// A stream failed before its end-of-stream sentinel
    #[error("Stream interrupted ({model}): {message}")]
    StreamInterrupted { model: String, message: String },

    /// Backend response could not be decoded
    #[error("Parsing error: {0}")]
    Parsing(String),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GatewayError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn upstream(
        provider: impl Into<String>,
        model: impl Into<String>,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self::Upstream {
            provider: provider.into(),
            model: model.into(),
            status,
            message: message.into(),
        }
    }

    pub fn stream_interrupted(model: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StreamInterrupted {
            model: model.into(),
            message: message.into(),
        }
    }

    pub fn parsing(message: impl Into<String>) -> Self {
        Self::Parsing(message.into())
    }

    /// Whether the orchestrator may try another model after this error
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Upstream { .. } | Self::StreamInterrupted { .. } | Self::Parsing(_)
        )
    }
}

/// Result type alias used throughout the crate
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_errors_are_retryable() {
        let err = GatewayError::upstream("openai", "gpt-4o", Some(500), "boom");
        assert!(err.is_retryable());
    }

    #[test]
    fn configuration_errors_are_not_retryable() {
        assert!(!GatewayError::configuration("missing key").is_retryable());
        assert!(!GatewayError::NoHealthyProviders.is_retryable());
    }
}
