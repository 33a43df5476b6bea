//! Model registry
//!
//! Static per-model metadata plus provider-enablement filtering. The
//! table is immutable after load; a registry instance only exposes the
//! models of the providers it was constructed with, which keeps the
//! registry and the health table 1:1.

use once_cell::sync::Lazy;

use crate::core::types::ModelDescriptor;

/// Providers this crate ships adapters for, in stable order
pub const KNOWN_PROVIDERS: &[&str] = &["openai", "anthropic", "groq"];

/// Environment variable holding the credential for a provider
pub fn credential_env_var(provider: &str) -> Option<&'static str> {
    match provider {
        "openai" => Some("OPENAI_API_KEY"),
        "anthropic" => Some("ANTHROPIC_API_KEY"),
        "groq" => Some("GROQ_API_KEY"),
        _ => None,
    }
}

fn descriptor(
    provider: &str,
    id: &str,
    display_name: &str,
    max_output_tokens: u32,
    context_window: u32,
    input_cost_per_1k: f64,
    output_cost_per_1k: f64,
    supports_tools: bool,
    baseline_latency_ms: u64,
) -> ModelDescriptor {
    ModelDescriptor {
        provider: provider.to_string(),
        id: id.to_string(),
        display_name: display_name.to_string(),
        max_output_tokens,
        context_window,
        input_cost_per_1k,
        output_cost_per_1k,
        supports_streaming: true,
        supports_tools,
        baseline_latency_ms,
    }
}

/// The full static model table, in stable registry order
static MODELS: Lazy<Vec<ModelDescriptor>> = Lazy::new(|| {
    vec![
        descriptor(
            "openai",
            "gpt-4o",
            "GPT-4o",
            16_384,
            128_000,
            0.0025,
            0.01,
            true,
            1_200,
        ),
        descriptor(
            "openai",
            "gpt-4o-mini",
            "GPT-4o mini",
            16_384,
            128_000,
            0.000_15,
            0.0006,
            true,
            700,
        ),
        descriptor(
            "anthropic",
            "claude-3-5-sonnet-20241022",
            "Claude 3.5 Sonnet",
            8_192,
            200_000,
            0.003,
            0.015,
            true,
            1_400,
        ),
        descriptor(
            "anthropic",
            "claude-3-haiku-20240307",
            "Claude 3 Haiku",
            4_096,
            200_000,
            0.000_25,
            0.001_25,
            true,
            600,
        ),
        descriptor(
            "groq",
            "llama-3.3-70b-versatile",
            "Llama 3.3 70B (Groq)",
            32_768,
            128_000,
            0.000_59,
            0.000_79,
            true,
            400,
        ),
    ]
});

/// Look up a descriptor in the full static table, regardless of which
/// providers are enabled. Used by pure cost calculation.
pub fn static_descriptor(model_id: &str) -> Option<&'static ModelDescriptor> {
    MODELS.iter().find(|m| m.id == model_id)
}

/// Registry exposing the models of a fixed set of providers
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: Vec<ModelDescriptor>,
}

impl ModelRegistry {
    /// Build a registry from the providers that actually got adapters
    pub fn new<S: AsRef<str>>(providers: &[S]) -> Self {
        let models = MODELS
            .iter()
            .filter(|m| providers.iter().any(|p| p.as_ref() == m.provider))
            .cloned()
            .collect();
        Self { models }
    }

    pub fn get_model_config(&self, model_id: &str) -> Option<&ModelDescriptor> {
        self.models.iter().find(|m| m.id == model_id)
    }

    /// Models of one provider, in registry order
    pub fn list_models_for_provider(&self, provider: &str) -> Vec<&ModelDescriptor> {
        self.models
            .iter()
            .filter(|m| m.provider == provider)
            .collect()
    }

    /// Whether a credential is present for the provider. Only presence
    /// is checked; the value is never exposed.
    pub fn is_provider_configured(&self, provider: &str) -> bool {
        credential_env_var(provider)
            .map(|var| std::env::var(var).is_ok_and(|v| !v.is_empty()))
            .unwrap_or(false)
    }

    /// All registered models in stable order
    pub fn models(&self) -> &[ModelDescriptor] {
        &self.models
    }

    /// Provider names with at least one registered model, in stable order
    pub fn providers(&self) -> Vec<String> {
        let mut providers: Vec<String> = Vec::new();
        for model in &self.models {
            if !providers.contains(&model.provider) {
                providers.push(model.provider.clone());
            }
        }
        providers
    }
}
