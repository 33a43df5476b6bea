//! Health monitor
//!
//! Tracks per-model liveness, fed by background probes and by live
//! request outcomes. The health table is the one hot shared mutable
//! structure in the gateway: read-heavy on every selection, write-light
//! on outcomes.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::types::{HealthConfig, ModelHealth};
use crate::core::providers::LlmProvider;
use crate::core::types::ChatRequest;

/// Shared per-model health table plus the probe tasks that feed it
pub struct HealthMonitor {
    config: HealthConfig,
    table: Arc<RwLock<HashMap<String, ModelHealth>>>,
    probe_tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl HealthMonitor {
    pub fn new(config: HealthConfig) -> Self {
        Self {
            config,
            table: Arc::new(RwLock::new(HashMap::new())),
            probe_tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &HealthConfig {
        &self.config
    }

    /// Register a model; initial state is healthy
    pub fn register(&self, model_id: &str) {
        let mut table = self.table.write();
        table
            .entry(model_id.to_string())
            .or_insert_with(ModelHealth::new);
    }

    /// Whether the model may currently receive traffic
    ///
    /// A model unhealthy for longer than the cooldown with no newer
    /// check is optimistically flipped back to healthy here, without a
    /// confirming probe.
    pub fn is_healthy(&self, model_id: &str) -> bool {
        {
            let table = self.table.read();
            match table.get(model_id) {
                Some(health) if health.healthy => return true,
                Some(health) => {
                    let since_check = Utc::now() - health.last_checked;
                    if since_check.to_std().unwrap_or_default() < self.config.cooldown {
                        return false;
                    }
                }
                None => return false,
            }
        }

        // Cooldown elapsed: flip back under the write lock
        let mut table = self.table.write();
        if let Some(health) = table.get_mut(model_id) {
            if !health.healthy {
                let since_check = Utc::now() - health.last_checked;
                if since_check.to_std().unwrap_or_default() >= self.config.cooldown {
                    info!(model = model_id, "cooldown elapsed, optimistically marking healthy");
                    health.healthy = true;
                }
            }
            health.healthy
        } else {
            false
        }
    }

    /// Record a successful call (probe or live traffic)
    pub fn record_success(&self, model_id: &str, latency_ms: u64) {
        let mut table = self.table.write();
        if let Some(health) = table.get_mut(model_id) {
            health.record_success(latency_ms);
        }
    }

    /// Record a failed call (probe or live traffic)
    pub fn record_failure(&self, model_id: &str, error: &str) {
        let mut table = self.table.write();
        if let Some(health) = table.get_mut(model_id) {
            let was_healthy = health.healthy;
            health.record_failure(error, self.config.failure_threshold);
            if was_healthy && !health.healthy {
                warn!(
                    model = model_id,
                    failures = health.failure_count,
                    "model marked unhealthy"
                );
            }
        }
    }

    /// Snapshot of the whole table for operational visibility
    pub fn snapshot(&self) -> HashMap<String, ModelHealth> {
        self.table.read().clone()
    }

    /// Start one recurring probe task per (model, adapter) pair
    ///
    /// Probes for different models run concurrently; probe latency does
    /// not scale with registry size and never blocks request handling.
    pub fn start_probes(&self, targets: Vec<(String, Arc<dyn LlmProvider>)>) {
        let mut tasks = self.probe_tasks.lock();
        for (model_id, adapter) in targets {
            let table = Arc::clone(&self.table);
            let interval = self.config.probe_interval;
            let timeout = self.config.probe_timeout;
            let threshold = self.config.failure_threshold;

            let task = tokio::spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                // The immediate first tick would race startup traffic
                ticker.tick().await;
                loop {
                    ticker.tick().await;
                    debug!(model = %model_id, "running health probe");

                    let started = Instant::now();
                    let outcome =
                        tokio::time::timeout(timeout, adapter.invoke(&model_id, &ChatRequest::ping()))
                            .await;
                    let latency_ms = started.elapsed().as_millis() as u64;

                    let mut table = table.write();
                    let Some(health) = table.get_mut(&model_id) else {
                        continue;
                    };
                    match outcome {
                        Ok(Ok(_)) => health.record_success(latency_ms),
                        Ok(Err(err)) => health.record_failure(&err.to_string(), threshold),
                        Err(_) => health.record_failure("health probe timed out", threshold),
                    }
                }
            });
            tasks.push(task);
        }
    }

    /// Abort all probe tasks; called from the orchestrator's shutdown
    pub fn shutdown(&self) {
        let mut tasks = self.probe_tasks.lock();
        for task in tasks.drain(..) {
            task.abort();
        }
        info!("health probing stopped");
    }

    /// Rewind a model's last check, for cooldown tests
    #[cfg(test)]
    pub(crate) fn backdate_check(&self, model_id: &str, seconds: i64) {
        let mut table = self.table.write();
        if let Some(health) = table.get_mut(model_id) {
            health.last_checked = Utc::now() - chrono::Duration::seconds(seconds);
        }
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        for task in self.probe_tasks.lock().drain(..) {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn monitor() -> HealthMonitor {
        HealthMonitor::new(HealthConfig {
            probing_enabled: false,
            ..HealthConfig::default()
        })
    }

    #[test]
    fn registered_models_start_healthy() {
        let monitor = monitor();
        monitor.register("gpt-4o");
        assert!(monitor.is_healthy("gpt-4o"));
        assert!(!monitor.is_healthy("unregistered"));
    }

    #[test]
    fn threshold_failures_mark_unhealthy() {
        let monitor = monitor();
        monitor.register("gpt-4o");
        for _ in 0..3 {
            monitor.record_failure("gpt-4o", "500 from upstream");
        }
        assert!(!monitor.is_healthy("gpt-4o"));
        let snapshot = monitor.snapshot();
        assert_eq!(snapshot["gpt-4o"].failure_count, 3);
        assert_eq!(
            snapshot["gpt-4o"].last_error.as_deref(),
            Some("500 from upstream")
        );
    }

    #[test]
    fn success_recovers_unhealthy_model() {
        let monitor = monitor();
        monitor.register("gpt-4o");
        for _ in 0..3 {
            monitor.record_failure("gpt-4o", "boom");
        }
        monitor.record_success("gpt-4o", 120);
        assert!(monitor.is_healthy("gpt-4o"));
        assert_eq!(monitor.snapshot()["gpt-4o"].failure_count, 0);
    }

    #[test]
    fn cooldown_flips_healthy_without_probe() {
        let monitor = HealthMonitor::new(HealthConfig {
            cooldown: Duration::from_secs(60),
            probing_enabled: false,
            ..HealthConfig::default()
        });
        monitor.register("gpt-4o");
        for _ in 0..3 {
            monitor.record_failure("gpt-4o", "boom");
        }
        assert!(!monitor.is_healthy("gpt-4o"));

        monitor.backdate_check("gpt-4o", 61);
        assert!(monitor.is_healthy("gpt-4o"));
        assert!(monitor.snapshot()["gpt-4o"].healthy);
    }

    #[test]
    fn cooldown_does_not_flip_early() {
        let monitor = monitor();
        monitor.register("gpt-4o");
        for _ in 0..3 {
            monitor.record_failure("gpt-4o", "boom");
        }
        monitor.backdate_check("gpt-4o", 10);
        assert!(!monitor.is_healthy("gpt-4o"));
    }
}
