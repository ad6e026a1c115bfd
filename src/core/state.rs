//! # Application State
//!
//! Core business state for cookbot. This module contains domain logic only -
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── backend: Arc<dyn ChatBackend>   // transport seam
//! ├── store: Arc<dyn KvStore>         // persistence mirror
//! ├── session_id: String              // active conversation id
//! ├── messages: Vec<Message>          // conversation history
//! ├── phase: Idle | AwaitingResponse  // one outstanding request max
//! ├── error: Option<String>           // retryable error banner
//! ├── last_sent_id: Option<String>    // user message to resend on retry
//! ├── placeholder_id: Option<String>  // pending assistant message
//! ├── pending_reply: Option<ChatReply>// reply being revealed
//! └── dirty: bool                     // history changed since last persist
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::sync::Arc;

use crate::api::{ChatBackend, ChatReply};
use crate::core::message::{Message, Recipe, Role};
use crate::core::session::KvStore;

/// Request lifecycle per session view. `submit` is a no-op transition while
/// `AwaitingResponse`; there is no queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    AwaitingResponse,
}

pub struct App {
    pub backend: Arc<dyn ChatBackend>,
    pub store: Arc<dyn KvStore>,
    pub session_id: String,
    pub messages: Vec<Message>,
    pub phase: Phase,
    pub error: Option<String>,
    pub status_message: String,
    pub last_sent_id: Option<String>,
    pub placeholder_id: Option<String>,
    pub pending_reply: Option<ChatReply>,
    pub dirty: bool,
}

impl App {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        store: Arc<dyn KvStore>,
        session_id: String,
        messages: Vec<Message>,
    ) -> Self {
        Self {
            backend,
            store,
            session_id,
            messages,
            phase: Phase::Idle,
            error: None,
            status_message: String::from("Ask me anything about cooking!"),
            last_sent_id: None,
            placeholder_id: None,
            pending_reply: None,
            dirty: false,
        }
    }

    pub fn is_awaiting(&self) -> bool {
        self.phase == Phase::AwaitingResponse
    }

    /// History as persisted: the in-flight placeholder is a UI artifact and
    /// never written to the store.
    pub fn persistable_messages(&self) -> Vec<Message> {
        self.messages
            .iter()
            .filter(|m| Some(&m.id) != self.placeholder_id.as_ref())
            .cloned()
            .collect()
    }

    /// The most recent assistant message carrying a recipe, if any.
    pub fn latest_recipe(&self) -> Option<&Recipe> {
        self.messages
            .iter()
            .rev()
            .filter(|m| m.role == Role::Assistant)
            .find_map(|m| m.recipe.as_ref())
    }

    pub fn message_mut(&mut self, id: &str) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| m.id == id)
    }
}

#[cfg(test)]
mod tests {
    use crate::core::message::Message;
    use crate::core::state::Phase;
    use crate::test_support::test_app;

    #[test]
    fn test_app_new_defaults() {
        let app = test_app();
        assert_eq!(app.phase, Phase::Idle);
        assert!(app.messages.is_empty());
        assert!(app.error.is_none());
        assert!(!app.dirty);
    }

    #[test]
    fn test_persistable_messages_filters_placeholder() {
        let mut app = test_app();
        app.messages.push(Message::user("hello"));
        let placeholder = Message::placeholder();
        app.placeholder_id = Some(placeholder.id.clone());
        app.messages.push(placeholder);

        let persisted = app.persistable_messages();
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0].content, "hello");
    }

    #[test]
    fn test_latest_recipe_finds_most_recent() {
        use crate::core::message::Recipe;

        let recipe = |title: &str| Recipe {
            title: title.to_string(),
            description: None,
            ingredients: vec![],
            instructions: vec![],
            prep_time: None,
            cook_time: None,
            servings: None,
        };

        let mut app = test_app();
        assert!(app.latest_recipe().is_none());

        app.messages
            .push(Message::assistant("first", true, Some(recipe("Soup"))));
        app.messages.push(Message::assistant("plain", false, None));
        app.messages
            .push(Message::assistant("second", true, Some(recipe("Pasta"))));

        assert_eq!(app.latest_recipe().map(|r| r.title.as_str()), Some("Pasta"));
    }
}
