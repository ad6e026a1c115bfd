//! HTTP transport for the cooking-assistant backend.
//!
//! One attempt per call, fixed timeout, no retry; retry is the session
//! manager's job. Every failure collapses into one of three `ApiError`
//! classes; all of them are retryable by resubmitting the original text.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};

use super::types::{
    ChatReply, ChatRequestBody, ChatResponseBody, ErrorBody, HealthStatus, SaveRecipeAck,
    SaveRecipeBody,
};
use crate::core::message::Recipe;

/// Fallback banner text when the failure carries no usable message.
const GENERIC_FAILURE: &str = "Something went wrong talking to the kitchen. Please try again.";

/// Errors from one transport call.
#[derive(Debug)]
pub enum ApiError {
    /// No response reached us (DNS, refused connection, timeout).
    Network(String),
    /// The server answered with a non-success status and (maybe) a message.
    Server { status: u16, message: String },
    /// Success status, but the payload is missing required fields.
    Malformed(String),
}

impl ApiError {
    /// Human-readable banner text for the error.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) => {
                "Could not reach the cooking assistant. Check your connection and try again."
                    .to_string()
            }
            ApiError::Server { message, .. } if !message.is_empty() => message.clone(),
            ApiError::Server { .. } | ApiError::Malformed(_) => GENERIC_FAILURE.to_string(),
        }
    }

    /// Every failure class is recoverable by resending the original text.
    pub fn retryable(&self) -> bool {
        true
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(msg) => write!(f, "network error: {msg}"),
            ApiError::Server { status, message } => {
                write!(f, "server error (HTTP {status}): {message}")
            }
            ApiError::Malformed(msg) => write!(f, "malformed response: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// The transport seam the session manager talks through.
/// Tests swap in a scripted implementation.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Single-shot chat turn. `session_id` may be empty (server treats it
    /// as "no session").
    async fn send_chat(&self, message: &str, session_id: &str) -> Result<ChatReply, ApiError>;

    /// Persist a recipe server-side for this session.
    async fn save_recipe(
        &self,
        session_id: &str,
        recipe: &Recipe,
    ) -> Result<SaveRecipeAck, ApiError>;
}

/// reqwest-backed client. The timeout is baked into the inner client so a
/// hung request surfaces as `ApiError::Network` like any other transport
/// failure.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Extracts the server's `{"error": ...}` message from a non-2xx
    /// response, falling back to the status code.
    async fn server_error(response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();
        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.error)
            .unwrap_or_default();
        ApiError::Server { status, message }
    }

    /// Startup probe. Not part of `ChatBackend`; only `main` cares.
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        let response = self
            .http
            .get(format!("{}/api/health", self.base_url))
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::server_error(response).await);
        }
        response
            .json::<HealthStatus>()
            .await
            .map_err(|e| ApiError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl ChatBackend for ApiClient {
    async fn send_chat(&self, message: &str, session_id: &str) -> Result<ChatReply, ApiError> {
        let body = ChatRequestBody {
            message: message.to_string(),
            session_id: session_id.to_string(),
        };
        debug!("POST /api/chat ({} chars)", message.len());

        let response = self
            .http
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!("chat request failed before a response arrived: {}", e);
                ApiError::Network(e.to_string())
            })?;

        if !response.status().is_success() {
            return Err(Self::server_error(response).await);
        }

        let body: ChatResponseBody = response
            .json()
            .await
            .map_err(|e| ApiError::Malformed(e.to_string()))?;

        let reply_text = body
            .response
            .ok_or_else(|| ApiError::Malformed("missing `response` field".to_string()))?;

        // A recipe flag without a payload is downgraded to plain text rather
        // than failing the whole turn.
        let recipe: Option<Recipe> = body.recipe_data.map(Into::into);
        let is_recipe = body.is_recipe && recipe.is_some();

        Ok(ChatReply {
            reply_text,
            is_recipe,
            recipe,
        })
    }

    async fn save_recipe(
        &self,
        session_id: &str,
        recipe: &Recipe,
    ) -> Result<SaveRecipeAck, ApiError> {
        let body = SaveRecipeBody {
            session_id,
            recipe_data: recipe,
        };
        debug!("POST /api/save_recipe ({})", recipe.title);

        let response = self
            .http
            .post(format!("{}/api/save_recipe", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::server_error(response).await);
        }
        response
            .json::<SaveRecipeAck>()
            .await
            .map_err(|e| ApiError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_error_class_is_retryable() {
        let errors = [
            ApiError::Network("timed out".to_string()),
            ApiError::Server {
                status: 500,
                message: "boom".to_string(),
            },
            ApiError::Malformed("missing field".to_string()),
        ];
        for err in errors {
            assert!(err.retryable(), "{err} should be retryable");
        }
    }

    #[test]
    fn test_server_message_surfaces_to_user() {
        let err = ApiError::Server {
            status: 500,
            message: "Message cannot be empty".to_string(),
        };
        assert_eq!(err.user_message(), "Message cannot be empty");
    }

    #[test]
    fn test_empty_server_message_falls_back_to_generic() {
        let err = ApiError::Server {
            status: 502,
            message: String::new(),
        };
        assert_eq!(err.user_message(), GENERIC_FAILURE);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client =
            ApiClient::new("http://localhost:5000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url, "http://localhost:5000");
    }
}
