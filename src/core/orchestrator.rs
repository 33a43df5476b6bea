//! Orchestrator facade
//!
//! Public entry point: drives selection, bounded retry for
//! non-streaming calls, a single fallback hop for streaming calls, and
//! pre-flight cost estimation. An instance owns its registry, health
//! table, adapters and usage store, so independently configured
//! instances can coexist; share one `Arc<Orchestrator>` at the
//! composition root.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use futures_util::StreamExt;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::GatewayConfig;
use crate::core::cost;
use crate::core::health::{HealthMonitor, ModelHealth};
use crate::core::providers::{ChunkStream, LlmProvider, provider_factories};
use crate::core::registry::ModelRegistry;
use crate::core::router::Router;
use crate::core::types::{
    ChatRequest, ChatResponse, CostEstimate, GatewayError, GatewayResult, ModelDescriptor,
};
use crate::core::usage::{InMemoryUsageStore, UsageRecord, UsageStore};

/// Estimated completion size when the request carries no `max_tokens`
const DEFAULT_ESTIMATED_COMPLETION_TOKENS: u32 = 256;

pub struct Orchestrator {
    config: GatewayConfig,
    registry: Arc<ModelRegistry>,
    router: Arc<Router>,
    health: Arc<HealthMonitor>,
    adapters: Arc<HashMap<String, Arc<dyn LlmProvider>>>,
    usage: Arc<dyn UsageStore>,
}

impl Orchestrator {
    /// Construct adapters for every enabled, credentialed provider.
    ///
    /// Fails fast when zero adapters initialize rather than starting in
    /// a silently non-functional state. Requires a tokio runtime when
    /// health probing is enabled.
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        Self::with_parts(config, Router::with_default_routes(), Arc::new(InMemoryUsageStore::new()))
    }

    /// Construction with an explicit route table and usage store
    pub fn with_parts(
        config: GatewayConfig,
        router: Router,
        usage: Arc<dyn UsageStore>,
    ) -> GatewayResult<Self> {
        let mut adapters: HashMap<String, Arc<dyn LlmProvider>> = HashMap::new();
        let mut constructed: Vec<&'static str> = Vec::new();

        for &(name, factory) in provider_factories() {
            if !config.provider_enabled(name) {
                continue;
            }
            match factory(&config) {
                Ok(adapter) => {
                    info!(provider = name, "provider adapter initialized");
                    adapters.insert(name.to_string(), adapter);
                    constructed.push(name);
                }
                Err(err) => {
                    warn!(provider = name, error = %err, "skipping provider");
                }
            }
        }

        if adapters.is_empty() {
            return Err(GatewayError::configuration(
                "no provider adapters could be initialized; check enablement and credentials",
            ));
        }

        let registry = ModelRegistry::new(&constructed);
        let health = HealthMonitor::new(config.health.clone());
        for model in registry.models() {
            health.register(&model.id);
        }

        if config.health.probing_enabled {
            let targets = registry
                .models()
                .iter()
                .filter_map(|model| {
                    adapters
                        .get(&model.provider)
                        .map(|adapter| (model.id.clone(), Arc::clone(adapter)))
                })
                .collect();
            health.start_probes(targets);
        }

        Ok(Self {
            config,
            registry: Arc::new(registry),
            router: Arc::new(router),
            health: Arc::new(health),
            adapters: Arc::new(adapters),
            usage,
        })
    }

    /// Composition-root constructor reading everything from the
    /// environment
    pub fn from_env() -> GatewayResult<Self> {
        Self::new(GatewayConfig::from_env())
    }

    fn adapter_for(&self, model: &ModelDescriptor) -> GatewayResult<Arc<dyn LlmProvider>> {
        self.adapters.get(&model.provider).cloned().ok_or_else(|| {
            GatewayError::configuration(format!("no adapter for provider {}", model.provider))
        })
    }

    /// One chat completion with bounded retry across distinct models.
    ///
    /// Attempt 1 uses the initial selection; each further attempt
    /// re-runs selection excluding every previously tried id. Only
    /// retryable errors move the loop on; the last error is propagated
    /// once the bound is exhausted, never swallowed.
    pub async fn invoke(&self, request: &ChatRequest) -> GatewayResult<ChatResponse> {
        let request_id = Uuid::new_v4();
        let mut tried: HashSet<String> = HashSet::new();
        let mut last_error: Option<GatewayError> = None;

        for attempt in 1..=self.config.max_attempts {
            let model = match self
                .router
                .select_excluding(&self.registry, &self.health, request, &tried)
            {
                Ok(model) => model,
                Err(select_err) => return Err(last_error.unwrap_or(select_err)),
            };
            let adapter = self.adapter_for(&model)?;

            info!(%request_id, attempt, model = %model.id, provider = %model.provider, "dispatching");
            match adapter.invoke(&model.id, request).await {
                Ok(response) => {
                    self.health.record_success(&model.id, response.latency_ms);
                    self.usage.record(&model.id, &response.usage);
                    return Ok(response);
                }
                Err(err) => {
                    warn!(%request_id, model = %model.id, error = %err, "attempt failed");
                    self.health.record_failure(&model.id, &err.to_string());
                    if !err.is_retryable() {
                        return Err(err);
                    }
                    tried.insert(model.id.clone());
                    last_error = Some(err);
                }
            }
        }

        Err(last_error.unwrap_or(GatewayError::NoHealthyProviders))
    }

    /// One streaming chat completion with at most one fallback hop.
    ///
    /// Partial output already delivered cannot be retracted; after a
    /// mid-stream failure the fallback model restarts its answer inside
    /// the caller's logical stream. That switch is a documented
    /// correctness caveat, not a seamless continuation.
    pub async fn invoke_stream(&self, request: &ChatRequest) -> GatewayResult<ChunkStream> {
        let request_id = Uuid::new_v4();
        let primary = self.router.select(&self.registry, &self.health, request)?;
        let adapter = self.adapter_for(&primary)?;

        info!(%request_id, model = %primary.id, "opening stream");
        match adapter.invoke_stream(&primary.id, request).await {
            Ok(stream) => Ok(self.stream_with_fallback(stream, primary, request.clone(), request_id)),
            Err(open_err) => {
                // Nothing was delivered yet, so the hop happens here
                warn!(%request_id, model = %primary.id, error = %open_err, "stream open failed");
                self.health.record_failure(&primary.id, &open_err.to_string());
                let fallback = self.select_fallback(request, &primary.id, open_err)?;
                let adapter = self.adapter_for(&fallback)?;
                info!(%request_id, model = %fallback.id, "opening fallback stream");
                match adapter.invoke_stream(&fallback.id, request).await {
                    Ok(stream) => Ok(self.stream_without_fallback(stream, fallback, request_id)),
                    Err(err) => {
                        self.health.record_failure(&fallback.id, &err.to_string());
                        Err(err)
                    }
                }
            }
        }
    }

    fn select_fallback(
        &self,
        request: &ChatRequest,
        failed_model: &str,
        original: GatewayError,
    ) -> GatewayResult<ModelDescriptor> {
        let exclude: HashSet<String> = [failed_model.to_string()].into();
        self.router
            .select_excluding(&self.registry, &self.health, request, &exclude)
            .map_err(|_| original)
    }

    /// Wrap a primary stream, hopping to one fallback on failure
    fn stream_with_fallback(
        &self,
        mut primary_stream: ChunkStream,
        primary: ModelDescriptor,
        request: ChatRequest,
        request_id: Uuid,
    ) -> ChunkStream {
        let registry = Arc::clone(&self.registry);
        let router = Arc::clone(&self.router);
        let health = Arc::clone(&self.health);
        let adapters = Arc::clone(&self.adapters);

        let stream = async_stream::stream! {
            let started = Instant::now();
            let mut failure: Option<GatewayError> = None;

            while let Some(item) = primary_stream.next().await {
                match item {
                    Ok(chunk) => {
                        let done = chunk.done;
                        yield Ok(chunk);
                        if done {
                            health.record_success(&primary.id, started.elapsed().as_millis() as u64);
                            return;
                        }
                    }
                    Err(err) => {
                        failure = Some(err);
                        break;
                    }
                }
            }
            // Adapters surface close-without-sentinel as an error, so a
            // clean exit here only happens after `done`
            let failure = failure.unwrap_or_else(|| {
                GatewayError::stream_interrupted(&primary.id, "stream ended unexpectedly")
            });
            warn!(%request_id, model = %primary.id, error = %failure, "stream failed, attempting fallback");
            health.record_failure(&primary.id, &failure.to_string());

            let exclude: HashSet<String> = [primary.id.clone()].into();
            let fallback = match router.select_excluding(&registry, &health, &request, &exclude) {
                Ok(model) => model,
                Err(_) => {
                    yield Err(failure);
                    return;
                }
            };
            let Some(adapter) = adapters.get(&fallback.provider).cloned() else {
                yield Err(failure);
                return;
            };

            info!(%request_id, model = %fallback.id, "resuming stream from fallback");
            let fallback_started = Instant::now();
            let mut fallback_stream = match adapter.invoke_stream(&fallback.id, &request).await {
                Ok(stream) => stream,
                Err(err) => {
                    health.record_failure(&fallback.id, &err.to_string());
                    yield Err(GatewayError::stream_interrupted(&fallback.id, err.to_string()));
                    return;
                }
            };

            while let Some(item) = fallback_stream.next().await {
                match item {
                    Ok(chunk) => {
                        let done = chunk.done;
                        yield Ok(chunk);
                        if done {
                            health.record_success(
                                &fallback.id,
                                fallback_started.elapsed().as_millis() as u64,
                            );
                            return;
                        }
                    }
                    Err(err) => {
                        // Only one hop for streams
                        health.record_failure(&fallback.id, &err.to_string());
                        yield Err(err);
                        return;
                    }
                }
            }

            // Clean exhaustion without `done` is an interruption too
            let failure =
                GatewayError::stream_interrupted(&fallback.id, "stream ended unexpectedly");
            health.record_failure(&fallback.id, &failure.to_string());
            yield Err(failure);
        };

        Box::pin(stream)
    }

    /// Wrap a stream whose single fallback hop is already spent
    fn stream_without_fallback(
        &self,
        mut inner: ChunkStream,
        model: ModelDescriptor,
        request_id: Uuid,
    ) -> ChunkStream {
        let health = Arc::clone(&self.health);

        let stream = async_stream::stream! {
            let started = Instant::now();
            while let Some(item) = inner.next().await {
                match item {
                    Ok(chunk) => {
                        let done = chunk.done;
                        yield Ok(chunk);
                        if done {
                            health.record_success(&model.id, started.elapsed().as_millis() as u64);
                            return;
                        }
                    }
                    Err(err) => {
                        warn!(%request_id, model = %model.id, error = %err, "fallback stream failed");
                        health.record_failure(&model.id, &err.to_string());
                        yield Err(err);
                        return;
                    }
                }
            }

            // Clean exhaustion without `done` is an interruption too
            let failure = GatewayError::stream_interrupted(&model.id, "stream ended unexpectedly");
            warn!(%request_id, model = %model.id, "fallback stream ended without done");
            health.record_failure(&model.id, &failure.to_string());
            yield Err(failure);
        };

        Box::pin(stream)
    }

    /// Pre-flight cost projection; calls no backend and writes no usage
    pub fn estimate_cost(
        &self,
        request: &ChatRequest,
        model_id: Option<&str>,
    ) -> GatewayResult<CostEstimate> {
        let model = match model_id {
            Some(id) => self
                .registry
                .get_model_config(id)
                .cloned()
                .ok_or_else(|| GatewayError::configuration(format!("unknown model id: {id}")))?,
            None => self.router.select(&self.registry, &self.health, request)?,
        };

        let prompt_tokens =
            cost::estimate_message_tokens(request.messages.iter().map(|m| m.content.as_str()));
        let estimated_completion_tokens = request
            .max_tokens
            .unwrap_or(DEFAULT_ESTIMATED_COMPLETION_TOKENS)
            .min(model.max_output_tokens);
        let estimated_cost =
            cost::calculate_cost(&model, prompt_tokens, estimated_completion_tokens);

        Ok(CostEstimate {
            provider: model.provider,
            model: model.id,
            prompt_tokens,
            estimated_completion_tokens,
            estimated_cost,
        })
    }

    /// Providers that actually got adapters, in stable order
    pub fn get_available_providers(&self) -> Vec<String> {
        self.registry.providers()
    }

    /// Health snapshot for operational visibility
    pub fn get_provider_health(&self) -> HashMap<String, ModelHealth> {
        self.health.snapshot()
    }

    /// Per-day, per-model usage over the trailing window
    pub fn get_usage_stats(&self, days: u32) -> Vec<UsageRecord> {
        self.usage.stats(days)
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Stop background health probing
    pub fn shutdown(&self) {
        self.health.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::health::HealthConfig;
    use crate::core::providers::openai::OpenAiConfig;
    use crate::core::types::StreamChunk;

    fn gateway() -> Orchestrator {
        let config = GatewayConfig {
            enabled_providers: Some(vec!["openai".to_string()]),
            openai: Some(OpenAiConfig::new("test-key")),
            health: HealthConfig {
                probing_enabled: false,
                ..HealthConfig::default()
            },
            ..GatewayConfig::default()
        };
        Orchestrator::new(config).unwrap()
    }

    #[tokio::test]
    async fn exhausted_stream_without_done_becomes_interruption() {
        let gateway = gateway();
        let model = gateway
            .registry()
            .get_model_config("gpt-4o")
            .cloned()
            .unwrap();
        // An inner stream that ends cleanly without ever yielding `done`
        let inner: ChunkStream =
            Box::pin(futures::stream::iter(vec![Ok(StreamChunk::content("partial"))]));

        let mut wrapped = gateway.stream_without_fallback(inner, model, Uuid::new_v4());
        assert_eq!(wrapped.next().await.unwrap().unwrap().content, "partial");
        assert!(matches!(
            wrapped.next().await.unwrap(),
            Err(GatewayError::StreamInterrupted { .. })
        ));
        assert!(wrapped.next().await.is_none());
        assert_eq!(gateway.get_provider_health()["gpt-4o"].failure_count, 1);
    }
}
