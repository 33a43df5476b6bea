//! # modelgate
//!
//! Health-aware LLM gateway core. Routes chat/completion requests
//! across interchangeable upstream backends, retries failed calls
//! against alternates, streams partial output with a single fallback
//! hop, and tracks per-backend cost and usage.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use modelgate::{ChatRequest, Orchestrator, user_message};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     modelgate::utils::logging::init();
//!
//!     // Adapters are built for every enabled provider with a
//!     // credential in the environment; zero adapters is a startup error.
//!     let gateway = Orchestrator::from_env()?;
//!
//!     let request = ChatRequest::new(vec![user_message("Summarize this complaint...")])
//!         .with_task_type("complaints");
//!     let response = gateway.invoke(&request).await?;
//!     println!("{} answered: {}", response.model, response.content);
//!
//!     gateway.shutdown();
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod utils;

pub use crate::config::GatewayConfig;
pub use crate::core::Orchestrator;
pub use crate::core::health::{HealthConfig, ModelHealth};
pub use crate::core::providers::ChunkStream;
pub use crate::core::registry::ModelRegistry;
pub use crate::core::router::{RouteEntry, Router};
pub use crate::core::types::{
    ChatMessage, ChatRequest, ChatResponse, CostEstimate, GatewayError, GatewayResult,
    MessageRole, ModelDescriptor, StreamChunk, Usage, assistant_message, system_message,
    user_message,
};
pub use crate::core::usage::{InMemoryUsageStore, UsageRecord, UsageStore};
