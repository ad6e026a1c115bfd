//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::api::types::SaveRecipeAck;
use crate::api::{ApiError, ChatBackend, ChatReply};
use crate::core::message::Recipe;
use crate::core::session::KvStore;
use crate::core::state::App;

/// In-memory `KvStore` fake.
pub struct MemoryStore {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            map: Mutex::new(HashMap::new()),
        }
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.map
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }
}

/// A `ChatBackend` that replays scripted results and records every call.
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<ChatReply, ApiError>>>,
    /// `(message, session_id)` pairs in call order.
    pub calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, result: Result<ChatReply, ApiError>) {
        self.replies.lock().unwrap().push_back(result);
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn send_chat(&self, message: &str, session_id: &str) -> Result<ChatReply, ApiError> {
        self.calls
            .lock()
            .unwrap()
            .push((message.to_string(), session_id.to_string()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Network("no scripted reply".to_string())))
    }

    async fn save_recipe(
        &self,
        _session_id: &str,
        recipe: &Recipe,
    ) -> Result<SaveRecipeAck, ApiError> {
        Ok(SaveRecipeAck {
            success: true,
            recipe_id: Some("test-recipe-id".to_string()),
            message: Some(format!("Saved {}", recipe.title)),
        })
    }
}

/// The "Basic Pasta" reply used throughout the session-manager tests.
pub fn pasta_reply() -> ChatReply {
    ChatReply {
        reply_text: "Boil water, add pasta...".to_string(),
        is_recipe: true,
        recipe: Some(Recipe {
            title: "Basic Pasta".to_string(),
            description: None,
            ingredients: vec![
                "1 lb pasta".to_string(),
                "Salt".to_string(),
                "Water".to_string(),
            ],
            instructions: vec!["Boil water...".to_string(), "Add pasta...".to_string()],
            prep_time: None,
            cook_time: None,
            servings: None,
        }),
    }
}

/// Creates a test App with a scripted backend and in-memory store.
pub fn test_app() -> App {
    App::new(
        Arc::new(ScriptedBackend::new()),
        Arc::new(MemoryStore::new()),
        "test-session".to_string(),
        Vec::new(),
    )
}
