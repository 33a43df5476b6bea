//! Per-model liveness tracking and background probing

mod monitor;
mod types;

pub use self::monitor::HealthMonitor;
pub use self::types::{HealthConfig, ModelHealth};
