//! Gateway core: registry, adapters, health, routing, orchestration

pub mod cost;
pub mod health;
pub mod orchestrator;
pub mod providers;
pub mod registry;
pub mod router;
pub mod types;
pub mod usage;

pub use self::orchestrator::Orchestrator;
