//! Gateway configuration
//!
//! Typed configuration assembled at the composition root. Provider
//! sections left as `None` are resolved from the process environment by
//! each adapter's `from_env` at construction time.

use std::env;

use crate::core::health::HealthConfig;
use crate::core::providers::anthropic::AnthropicConfig;
use crate::core::providers::groq::GroqConfig;
use crate::core::providers::openai::OpenAiConfig;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Provider enablement allowlist; `None` enables every known
    /// provider
    pub enabled_providers: Option<Vec<String>>,
    pub openai: Option<OpenAiConfig>,
    pub anthropic: Option<AnthropicConfig>,
    pub groq: Option<GroqConfig>,
    pub health: HealthConfig,
    /// Distinct models tried by one `invoke` before the last error is
    /// surfaced
    pub max_attempts: u32,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            enabled_providers: None,
            openai: None,
            anthropic: None,
            groq: None,
            health: HealthConfig::default(),
            max_attempts: 3,
        }
    }
}

impl GatewayConfig {
    /// Read the enablement allowlist from `MODELGATE_PROVIDERS`
    /// (comma-separated); credentials remain an adapter concern
    pub fn from_env() -> Self {
        let enabled_providers = env::var("MODELGATE_PROVIDERS").ok().map(|raw| {
            raw.split(',')
                .map(|p| p.trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect()
        });

        Self {
            enabled_providers,
            ..Self::default()
        }
    }

    pub fn provider_enabled(&self, provider: &str) -> bool {
        match &self.enabled_providers {
            Some(allowlist) => allowlist.iter().any(|p| p == provider),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_providers_enabled_by_default() {
        let config = GatewayConfig::default();
        assert!(config.provider_enabled("openai"));
        assert!(config.provider_enabled("anthropic"));
    }

    #[test]
    fn allowlist_filters_providers() {
        let config = GatewayConfig {
            enabled_providers: Some(vec!["openai".to_string()]),
            ..GatewayConfig::default()
        };
        assert!(config.provider_enabled("openai"));
        assert!(!config.provider_enabled("anthropic"));
    }
}
