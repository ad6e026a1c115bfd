//! Wire types for the cooking-assistant backend.
//!
//! The backend speaks plain JSON over three endpoints: `/api/chat`,
//! `/api/save_recipe`, and `/api/health`. Response parsing is deliberately
//! tolerant: the recipe payload is produced by an LLM upstream, so fields
//! like `servings` arrive as a number in one reply and a string in the next.

use serde::{Deserialize, Serialize};

use crate::core::message::Recipe;

// ============================================================================
// /api/chat
// ============================================================================

#[derive(Serialize, Debug, Clone)]
pub struct ChatRequestBody {
    pub message: String,
    pub session_id: String,
}

/// Raw `/api/chat` response. `response` is required for a well-formed
/// success; everything else is optional.
#[derive(Deserialize, Debug)]
pub struct ChatResponseBody {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub is_recipe: bool,
    #[serde(default)]
    pub recipe_data: Option<RecipeData>,
}

/// Error body the backend sends with non-2xx statuses: `{"error": "..."}`.
#[derive(Deserialize, Debug)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// Recipe payload as it appears on the wire. The upstream model is prompted
/// to emit `{"type":"recipe", ...}`; the tag is ignored here.
#[derive(Deserialize, Debug, Clone)]
pub struct RecipeData {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub prep_time: Option<NumberOrString>,
    #[serde(default)]
    pub cook_time: Option<NumberOrString>,
    #[serde(default)]
    pub servings: Option<NumberOrString>,
}

/// LLM-emitted scalars come back as `4` or `"4 servings"` depending on the
/// model's mood. Accept both, normalize to `String`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum NumberOrString {
    Number(f64),
    Text(String),
}

impl NumberOrString {
    pub fn into_string(self) -> String {
        match self {
            NumberOrString::Number(n) => {
                if n.fract() == 0.0 {
                    format!("{}", n as i64)
                } else {
                    format!("{}", n)
                }
            }
            NumberOrString::Text(s) => s,
        }
    }
}

impl From<RecipeData> for Recipe {
    fn from(data: RecipeData) -> Self {
        Recipe {
            title: data.title,
            description: data.description,
            ingredients: data.ingredients,
            instructions: data.instructions,
            prep_time: data.prep_time.map(NumberOrString::into_string),
            cook_time: data.cook_time.map(NumberOrString::into_string),
            servings: data.servings.map(NumberOrString::into_string),
        }
    }
}

/// Normalized result of one chat turn, handed to the session manager.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub reply_text: String,
    pub is_recipe: bool,
    pub recipe: Option<Recipe>,
}

// ============================================================================
// /api/save_recipe
// ============================================================================

#[derive(Serialize, Debug)]
pub struct SaveRecipeBody<'a> {
    pub session_id: &'a str,
    pub recipe_data: &'a Recipe,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SaveRecipeAck {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub recipe_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

// ============================================================================
// /api/health
// ============================================================================

#[derive(Deserialize, Debug, Clone)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_response_full_recipe() {
        let json = r#"{
            "response": "Here is a recipe.",
            "session_id": "abc",
            "is_recipe": true,
            "recipe_data": {
                "type": "recipe",
                "title": "Basic Pasta",
                "description": "Simple weeknight pasta",
                "ingredients": ["1 lb pasta", "Salt", "Water"],
                "instructions": ["Boil water...", "Add pasta..."],
                "prep_time": "5 min",
                "cook_time": 10,
                "servings": 4
            }
        }"#;
        let body: ChatResponseBody = serde_json::from_str(json).unwrap();
        assert_eq!(body.response.as_deref(), Some("Here is a recipe."));
        assert!(body.is_recipe);

        let recipe: Recipe = body.recipe_data.unwrap().into();
        assert_eq!(recipe.title, "Basic Pasta");
        assert_eq!(recipe.ingredients.len(), 3);
        assert_eq!(recipe.cook_time.as_deref(), Some("10"));
        assert_eq!(recipe.servings.as_deref(), Some("4"));
    }

    #[test]
    fn test_chat_response_text_only() {
        let json = r#"{"response": "Hello!", "session_id": "abc", "is_recipe": false}"#;
        let body: ChatResponseBody = serde_json::from_str(json).unwrap();
        assert_eq!(body.response.as_deref(), Some("Hello!"));
        assert!(!body.is_recipe);
        assert!(body.recipe_data.is_none());
    }

    #[test]
    fn test_chat_response_missing_response_field_parses() {
        // The transport layer decides this is malformed; parsing must not fail.
        let body: ChatResponseBody = serde_json::from_str(r#"{"session_id": "abc"}"#).unwrap();
        assert!(body.response.is_none());
    }

    #[test]
    fn test_number_or_string_normalization() {
        assert_eq!(NumberOrString::Number(4.0).into_string(), "4");
        assert_eq!(NumberOrString::Number(2.5).into_string(), "2.5");
        assert_eq!(
            NumberOrString::Text("about 4".to_string()).into_string(),
            "about 4"
        );
    }

    #[test]
    fn test_error_body_without_message() {
        let body: ErrorBody = serde_json::from_str("{}").unwrap();
        assert!(body.error.is_none());
    }

    #[test]
    fn test_save_recipe_ack_defaults() {
        let ack: SaveRecipeAck = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(ack.success);
        assert!(ack.recipe_id.is_none());
        assert!(ack.message.is_none());
    }
}
