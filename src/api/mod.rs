//! Backend transport layer.

pub mod client;
pub mod types;

pub use client::{ApiClient, ApiError, ChatBackend};
pub use types::{ChatReply, HealthStatus, SaveRecipeAck};
