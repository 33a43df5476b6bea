//! Per-day, per-model usage tracking
//!
//! The backing store is pluggable; callers cannot observe which one is
//! wired in. The default in-process store keeps daily counters in a
//! concurrent map with entry-level updates.

use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::Usage;

/// Aggregated counters for one model on one day; monotonically
/// increasing within the day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub date: NaiveDate,
    pub model: String,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_cost: f64,
    pub request_count: u64,
}

/// Counter store contract: increment plus trailing-window range read
pub trait UsageStore: Send + Sync {
    fn record(&self, model: &str, usage: &Usage);

    /// One record per active (date, model) over the trailing window;
    /// inactive days are omitted, not zero-filled
    fn stats(&self, days: u32) -> Vec<UsageRecord>;
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Counters {
    prompt_tokens: u64,
    completion_tokens: u64,
    total_cost: f64,
    request_count: u64,
}

/// In-process store; the graceful degradation path when no durable
/// counter backend is configured
#[derive(Default)]
pub struct InMemoryUsageStore {
    counters: DashMap<(NaiveDate, String), Counters>,
}

impl InMemoryUsageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UsageStore for InMemoryUsageStore {
    fn record(&self, model: &str, usage: &Usage) {
        let key = (Utc::now().date_naive(), model.to_string());
        let mut entry = self.counters.entry(key).or_default();
        entry.prompt_tokens += u64::from(usage.prompt_tokens);
        entry.completion_tokens += u64::from(usage.completion_tokens);
        entry.total_cost += usage.cost;
        entry.request_count += 1;
    }

    fn stats(&self, days: u32) -> Vec<UsageRecord> {
        let cutoff = Utc::now().date_naive() - chrono::Days::new(u64::from(days.saturating_sub(1)));

        let mut records: Vec<UsageRecord> = self
            .counters
            .iter()
            .filter(|entry| entry.key().0 >= cutoff)
            .map(|entry| {
                let (date, model) = entry.key().clone();
                let counters = entry.value();
                UsageRecord {
                    date,
                    model,
                    prompt_tokens: counters.prompt_tokens,
                    completion_tokens: counters.completion_tokens,
                    total_cost: counters.total_cost,
                    request_count: counters.request_count,
                }
            })
            .collect();

        records.sort_by(|a, b| (a.date, &a.model).cmp(&(b.date, &b.model)));
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage(prompt: u32, completion: u32, cost: f64) -> Usage {
        Usage {
            prompt_tokens: prompt,
            completion_tokens: completion,
            cost,
        }
    }

    #[test]
    fn tracking_is_additive() {
        let store = InMemoryUsageStore::new();
        store.record("gpt-4o", &usage(100, 50, 0.001));
        store.record("gpt-4o", &usage(200, 25, 0.002));

        let stats = store.stats(1);
        assert_eq!(stats.len(), 1);
        let record = &stats[0];
        assert_eq!(record.prompt_tokens, 300);
        assert_eq!(record.completion_tokens, 75);
        assert!((record.total_cost - 0.003).abs() < 1e-9);
        assert_eq!(record.request_count, 2);
    }

    #[test]
    fn models_are_tracked_separately() {
        let store = InMemoryUsageStore::new();
        store.record("gpt-4o", &usage(10, 10, 0.1));
        store.record("claude-3-haiku-20240307", &usage(20, 20, 0.2));

        let stats = store.stats(7);
        assert_eq!(stats.len(), 2);
        assert!(stats.iter().any(|r| r.model == "gpt-4o" && r.request_count == 1));
    }

    #[test]
    fn empty_store_reports_no_records() {
        let store = InMemoryUsageStore::new();
        assert!(store.stats(30).is_empty());
    }
}
