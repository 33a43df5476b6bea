//! Static per-model metadata

use serde::{Deserialize, Serialize};

/// Immutable descriptor for one model variant, loaded at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Owning provider name ("openai", "anthropic", ...)
    pub provider: String,
    /// Wire-level model identifier
    pub id: String,
    /// Human-readable name for operational surfaces
    pub display_name: String,
    /// Maximum completion tokens accepted by the backend
    pub max_output_tokens: u32,
    /// Context window in tokens
    pub context_window: u32,
    /// USD per 1K prompt tokens
    pub input_cost_per_1k: f64,
    /// USD per 1K completion tokens
    pub output_cost_per_1k: f64,
    pub supports_streaming: bool,
    pub supports_tools: bool,
    /// Typical round-trip latency under normal load, milliseconds
    pub baseline_latency_ms: u64,
}
