//! Core data types shared across the gateway

pub mod errors;
pub mod message;
pub mod model;
pub mod requests;
pub mod responses;

pub use self::errors::{GatewayError, GatewayResult};
pub use self::message::{ChatMessage, MessageRole, assistant_message, system_message, user_message};
pub use self::model::ModelDescriptor;
pub use self::requests::ChatRequest;
pub use self::responses::{ChatResponse, CostEstimate, StreamChunk, Usage};
