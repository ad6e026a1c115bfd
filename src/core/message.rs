//! # Messages
//!
//! Domain types for the conversation: one `Message` per user or assistant
//! turn, with an optional structured `Recipe` attached to assistant turns.
//!
//! A placeholder assistant message (empty content) exists only while a
//! request is in flight. It is replaced by a terminal message with a fresh
//! id on success, or removed on failure; the placeholder never survives
//! into persisted history.

use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
}

/// A structured recipe returned by the backend alongside an assistant reply.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Recipe {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    #[serde(default)]
    pub prep_time: Option<String>,
    #[serde(default)]
    pub cook_time: Option<String>,
    #[serde(default)]
    pub servings: Option<String>,
}

/// A single conversation turn.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    /// Unix seconds.
    pub created_at: i64,
    #[serde(default)]
    pub is_recipe: bool,
    #[serde(default)]
    pub recipe: Option<Recipe>,
}

impl Message {
    fn new(role: Role, content: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content,
            created_at: Utc::now().timestamp(),
            is_recipe: false,
            recipe: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content.into())
    }

    /// Provisional assistant message shown while a response is pending.
    pub fn placeholder() -> Self {
        Self::new(Role::Assistant, String::new())
    }

    /// Terminal assistant message committed once the reveal finishes.
    pub fn assistant(content: impl Into<String>, is_recipe: bool, recipe: Option<Recipe>) -> Self {
        Self {
            is_recipe,
            recipe,
            ..Self::new(Role::Assistant, content.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_defaults() {
        let msg = Message::user("How do I make pasta?");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "How do I make pasta?");
        assert!(!msg.is_recipe);
        assert!(msg.recipe.is_none());
        assert!(!msg.id.is_empty());
    }

    #[test]
    fn test_placeholder_is_empty_assistant() {
        let msg = Message::placeholder();
        assert_eq!(msg.role, Role::Assistant);
        assert!(msg.content.is_empty());
    }

    #[test]
    fn test_distinct_ids() {
        let a = Message::user("a");
        let b = Message::user("a");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_assistant_carries_recipe() {
        let recipe = Recipe {
            title: "Basic Pasta".to_string(),
            description: None,
            ingredients: vec!["1 lb pasta".to_string()],
            instructions: vec!["Boil water...".to_string()],
            prep_time: None,
            cook_time: None,
            servings: Some("4".to_string()),
        };
        let msg = Message::assistant("Boil water, add pasta...", true, Some(recipe));
        assert!(msg.is_recipe);
        assert_eq!(msg.recipe.as_ref().map(|r| r.title.as_str()), Some("Basic Pasta"));
    }

    #[test]
    fn test_serde_round_trip() {
        let msg = Message::assistant("hi", false, None);
        let json = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn test_serde_tolerates_missing_recipe_fields() {
        // Older stored history has no is_recipe/recipe fields.
        let json = r#"{"id":"1","role":"assistant","content":"hi","created_at":0}"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert!(!msg.is_recipe);
        assert!(msg.recipe.is_none());
    }
}
