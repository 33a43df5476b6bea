//! Router / selector
//!
//! Maps (task type, language) to a prioritized candidate list and picks
//! the best currently-healthy registered model. Never returns a model
//! id absent from the registry.

mod routes;

use std::collections::HashSet;

use tracing::{debug, warn};

pub use self::routes::{RouteEntry, default_priority, default_routes, detect_language};

use crate::core::health::HealthMonitor;
use crate::core::registry::ModelRegistry;
use crate::core::types::{ChatRequest, GatewayError, GatewayResult, ModelDescriptor};

pub struct Router {
    routes: Vec<RouteEntry>,
    default_priority: Vec<String>,
}

impl Router {
    pub fn new(routes: Vec<RouteEntry>, default_priority: Vec<String>) -> Self {
        Self {
            routes,
            default_priority,
        }
    }

    pub fn with_default_routes() -> Self {
        Self::new(default_routes(), default_priority())
    }

    fn candidates(&self, task_type: &str, language: &str) -> &[String] {
        self.routes
            .iter()
            .find(|entry| entry.task_type == task_type && entry.language == language)
            .map(|entry| entry.models.as_slice())
            .unwrap_or(&self.default_priority)
    }

    /// Resolve the routing language: explicit tag wins, otherwise the
    /// latest user turn is script-scanned
    fn route_language(request: &ChatRequest) -> String {
        if let Some(language) = &request.language {
            return language.to_lowercase();
        }
        detect_language(request.latest_user_content().unwrap_or_default()).to_string()
    }

    /// Select the best healthy candidate for a request
    pub fn select(
        &self,
        registry: &ModelRegistry,
        health: &HealthMonitor,
        request: &ChatRequest,
    ) -> GatewayResult<ModelDescriptor> {
        self.select_excluding(registry, health, request, &HashSet::new())
    }

    /// Selection variant that skips already-attempted model ids
    pub fn select_excluding(
        &self,
        registry: &ModelRegistry,
        health: &HealthMonitor,
        request: &ChatRequest,
        exclude: &HashSet<String>,
    ) -> GatewayResult<ModelDescriptor> {
        let usable = |model: &ModelDescriptor| {
            !exclude.contains(&model.id) && health.is_healthy(&model.id)
        };

        // 1. Explicit provider preference, first healthy model in
        //    registry order; falls through when none qualify
        if let Some(provider) = &request.preferred_provider {
            for model in registry.list_models_for_provider(provider) {
                if usable(model) {
                    debug!(model = %model.id, provider = %provider, "selected preferred provider");
                    return Ok(model.clone());
                }
            }
        }

        // 2-3. Keyed priority list
        let language = Self::route_language(request);
        let task_type = request.task_type.as_deref().unwrap_or("chat");
        for model_id in self.candidates(task_type, &language) {
            if let Some(model) = registry.get_model_config(model_id) {
                if usable(model) {
                    debug!(model = %model.id, task_type, language = %language, "selected routed model");
                    return Ok(model.clone());
                }
            }
        }

        // 4. Degraded fallback: any healthy model in stable registry order
        for model in registry.models() {
            if usable(model) {
                warn!(model = %model.id, "degraded fallback selection, priority list exhausted");
                return Ok(model.clone());
            }
        }

        // 5. Nothing left to try
        Err(GatewayError::NoHealthyProviders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::health::HealthConfig;
    use crate::core::types::user_message;

    const SONNET: &str = "claude-3-5-sonnet-20241022";

    fn fixture() -> (ModelRegistry, HealthMonitor, Router) {
        let registry = ModelRegistry::new(&["openai", "anthropic"]);
        let health = HealthMonitor::new(HealthConfig {
            probing_enabled: false,
            ..HealthConfig::default()
        });
        for model in registry.models() {
            health.register(&model.id);
        }
        // Scenario table: complaints/arabic prefers Sonnet over GPT-4o
        let router = Router::new(
            vec![RouteEntry::new("complaints", "arabic", vec![SONNET, "gpt-4o"])],
            vec!["gpt-4o".to_string(), SONNET.to_string()],
        );
        (registry, health, router)
    }

    fn complaint_request() -> ChatRequest {
        ChatRequest::new(vec![user_message("شكوى بخصوص التأخير في الخدمة")])
            .with_task_type("complaints")
    }

    fn mark_unhealthy(health: &HealthMonitor, model: &str) {
        for _ in 0..3 {
            health.record_failure(model, "forced failure");
        }
    }

    #[test]
    fn routed_key_returns_first_healthy_candidate() {
        // Scenario A
        let (registry, health, router) = fixture();
        let selected = router.select(&registry, &health, &complaint_request()).unwrap();
        assert_eq!(selected.id, SONNET);
    }

    #[test]
    fn unhealthy_candidate_falls_to_next_in_list() {
        // Scenario B
        let (registry, health, router) = fixture();
        mark_unhealthy(&health, SONNET);
        let selected = router.select(&registry, &health, &complaint_request()).unwrap();
        assert_eq!(selected.id, "gpt-4o");
    }

    #[test]
    fn no_healthy_models_is_terminal() {
        // Scenario C, router-level
        let (registry, health, router) = fixture();
        for model in registry.models() {
            mark_unhealthy(&health, &model.id);
        }
        let result = router.select(&registry, &health, &complaint_request());
        assert!(matches!(result, Err(GatewayError::NoHealthyProviders)));
    }

    #[test]
    fn preferred_provider_wins_when_healthy() {
        let (registry, health, router) = fixture();
        let request = complaint_request().with_preferred_provider("openai");
        let selected = router.select(&registry, &health, &request).unwrap();
        assert_eq!(selected.id, "gpt-4o");
    }

    #[test]
    fn unhealthy_preferred_provider_falls_through_to_routes() {
        let (registry, health, router) = fixture();
        mark_unhealthy(&health, "gpt-4o");
        mark_unhealthy(&health, "gpt-4o-mini");
        let request = complaint_request().with_preferred_provider("openai");
        let selected = router.select(&registry, &health, &request).unwrap();
        assert_eq!(selected.id, SONNET);
    }

    #[test]
    fn exclusions_are_never_selected() {
        let (registry, health, router) = fixture();
        let exclude: HashSet<String> = [SONNET.to_string()].into();
        let selected = router
            .select_excluding(&registry, &health, &complaint_request(), &exclude)
            .unwrap();
        assert_eq!(selected.id, "gpt-4o");
    }

    #[test]
    fn unknown_key_uses_default_priority() {
        let (registry, health, router) = fixture();
        let request = ChatRequest::new(vec![user_message("hello there")])
            .with_task_type("unknown-task");
        let selected = router.select(&registry, &health, &request).unwrap();
        assert_eq!(selected.id, "gpt-4o");
    }

    #[test]
    fn degraded_fallback_scans_whole_registry() {
        let (registry, health, router) = fixture();
        // Exhaust the priority lists but leave one registered model healthy
        mark_unhealthy(&health, "gpt-4o");
        mark_unhealthy(&health, SONNET);
        let selected = router.select(&registry, &health, &complaint_request()).unwrap();
        // First healthy model in stable registry order
        assert_eq!(selected.id, "gpt-4o-mini");
    }

    #[test]
    fn selection_only_returns_registered_models() {
        let registry = ModelRegistry::new(&["openai"]);
        let health = HealthMonitor::new(HealthConfig {
            probing_enabled: false,
            ..HealthConfig::default()
        });
        for model in registry.models() {
            health.register(&model.id);
        }
        // Route list names an unregistered model first
        let router = Router::new(
            vec![RouteEntry::new("complaints", "arabic", vec![SONNET, "gpt-4o"])],
            vec![SONNET.to_string()],
        );
        let selected = router.select(&registry, &health, &complaint_request()).unwrap();
        assert!(registry.get_model_config(&selected.id).is_some());
        assert_eq!(selected.id, "gpt-4o");
    }
}
