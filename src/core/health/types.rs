//! Per-model health state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tuning for the health monitor and its background prober
#[derive(Debug, Clone)]
pub struct HealthConfig {
    /// Interval between background probes per model
    pub probe_interval: Duration,
    /// Timeout for one probe call
    pub probe_timeout: Duration,
    /// Consecutive failures before a model is marked unhealthy
    pub failure_threshold: u32,
    /// How long a model stays unhealthy before it is optimistically
    /// flipped back to healthy without a confirming probe. Trade-off:
    /// live traffic can reach a still-broken backend before the next
    /// probe runs.
    pub cooldown: Duration,
    /// Disable to run without background probe tasks (tests)
    pub probing_enabled: bool,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            probe_interval: Duration::from_secs(30),
            probe_timeout: Duration::from_secs(10),
            failure_threshold: 3,
            cooldown: Duration::from_secs(60),
            probing_enabled: true,
        }
    }
}

/// Liveness record for one registered model
///
/// Created at orchestrator construction, mutated for the life of the
/// process, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelHealth {
    pub healthy: bool,
    pub failure_count: u32,
    pub last_checked: DateTime<Utc>,
    pub last_error: Option<String>,
    /// Exponential moving average, 0.7 old + 0.3 new
    pub avg_latency_ms: f64,
}

impl ModelHealth {
    pub fn new() -> Self {
        Self {
            healthy: true,
            failure_count: 0,
            last_checked: Utc::now(),
            last_error: None,
            avg_latency_ms: 0.0,
        }
    }

    pub(crate) fn record_success(&mut self, latency_ms: u64) {
        self.healthy = true;
        self.failure_count = 0;
        self.last_checked = Utc::now();
        self.last_error = None;
        self.avg_latency_ms = if self.avg_latency_ms == 0.0 {
            latency_ms as f64
        } else {
            0.7 * self.avg_latency_ms + 0.3 * latency_ms as f64
        };
    }

    pub(crate) fn record_failure(&mut self, error: &str, failure_threshold: u32) {
        self.failure_count += 1;
        self.last_checked = Utc::now();
        self.last_error = Some(error.to_string());
        if self.failure_count >= failure_threshold {
            self.healthy = false;
        }
    }
}

impl Default for ModelHealth {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_threshold_flips_unhealthy() {
        let mut health = ModelHealth::new();
        health.record_failure("timeout", 3);
        health.record_failure("timeout", 3);
        assert!(health.healthy);
        health.record_failure("timeout", 3);
        assert!(!health.healthy);
        assert_eq!(health.failure_count, 3);
    }

    #[test]
    fn success_resets_failures() {
        let mut health = ModelHealth::new();
        health.record_failure("boom", 3);
        health.record_success(100);
        assert!(health.healthy);
        assert_eq!(health.failure_count, 0);
        assert!(health.last_error.is_none());
    }

    #[test]
    fn latency_uses_moving_average() {
        let mut health = ModelHealth::new();
        health.record_success(100);
        assert_eq!(health.avg_latency_ms, 100.0);
        health.record_success(200);
        assert!((health.avg_latency_ms - 130.0).abs() < 1e-9);
    }
}
