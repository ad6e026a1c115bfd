//! # Actions
//!
//! Everything that can happen in cookbot becomes an `Action`.
//! User presses Enter? That's `Action::Submit`.
//! Transport answers? That's `Action::ReplyReceived(reply)`.
//!
//! The `update()` function takes the current state and an action, then
//! returns the new state plus an `Effect` describing the I/O the caller
//! must perform. No side effects here. I/O happens elsewhere.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! This is the conversational session manager: it owns turn-taking, the
//! placeholder lifecycle, reveal application, retry, and the
//! one-outstanding-request rule (`Phase::AwaitingResponse` rejects further
//! submits). Background tasks feed results back as actions, so a reply or
//! reveal tick that arrives after a new-session reset is recognized as
//! stale and dropped.

use log::debug;

use crate::api::ChatReply;
use crate::core::message::{Message, Recipe, Role};
use crate::core::session;
use crate::core::state::{App, Phase};

#[derive(Debug, Clone)]
pub enum Action {
    /// User submitted the input draft.
    Submit(String),
    /// Re-send the most recent user message after a failure.
    Retry,
    /// Transport task finished successfully.
    ReplyReceived(ChatReply),
    /// Reveal task emitted the next prefix of the pending reply.
    RevealStep(String),
    /// Reveal task finished; commit the terminal assistant message.
    RevealDone,
    /// Transport task failed; carries the user-facing banner text.
    RequestFailed(String),
    /// Save the most recent recipe to the backend.
    SaveRecipe,
    /// Recipe save task finished.
    RecipeSaveFinished { note: String },
    /// Abandon the conversation and start a fresh empty session.
    NewSession,
    Quit,
}

/// I/O the caller must perform after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    /// Spawn the single-shot chat request for `text`.
    SpawnChatRequest { text: String },
    /// Spawn the reveal task for the full reply text.
    StartReveal { text: String },
    /// Spawn the recipe save request.
    SpawnRecipeSave { recipe: Recipe },
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Submit(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Effect::None;
            }
            if app.is_awaiting() {
                debug!("Submit ignored: a request is already in flight");
                return Effect::None;
            }
            begin_turn(app, text.to_string(), true)
        }

        Action::Retry => {
            if app.is_awaiting() {
                return Effect::None;
            }
            let Some(text) = last_sent_text(app) else {
                app.status_message = String::from("Nothing to retry yet.");
                return Effect::None;
            };
            begin_turn(app, text, false)
        }

        Action::ReplyReceived(reply) => {
            if !app.is_awaiting() {
                debug!("Dropping stale reply (session was reset)");
                return Effect::None;
            }
            let text = reply.reply_text.clone();
            app.pending_reply = Some(reply);
            Effect::StartReveal { text }
        }

        Action::RevealStep(prefix) => {
            // Only the placeholder's content moves during the reveal.
            if let Some(id) = app.placeholder_id.clone()
                && let Some(msg) = app.message_mut(&id)
            {
                msg.content = prefix;
            }
            Effect::None
        }

        Action::RevealDone => {
            let Some(reply) = app.pending_reply.take() else {
                return Effect::None;
            };
            remove_placeholder(app);
            app.status_message = if reply.is_recipe {
                String::from("Recipe ready. Ctrl+S saves it for later.")
            } else {
                String::from("Ready.")
            };
            app.messages
                .push(Message::assistant(reply.reply_text, reply.is_recipe, reply.recipe));
            app.phase = Phase::Idle;
            app.dirty = true;
            Effect::None
        }

        Action::RequestFailed(message) => {
            if !app.is_awaiting() {
                return Effect::None;
            }
            // The placeholder must never linger in a half-revealed state.
            remove_placeholder(app);
            app.pending_reply = None;
            app.error = Some(message);
            app.phase = Phase::Idle;
            app.status_message = String::from("Ctrl+R to retry.");
            app.dirty = true;
            Effect::None
        }

        Action::SaveRecipe => match app.latest_recipe().cloned() {
            Some(recipe) => {
                app.status_message = format!("Saving \"{}\"...", recipe.title);
                Effect::SpawnRecipeSave { recipe }
            }
            None => {
                app.status_message = String::from("No recipe in this conversation yet.");
                Effect::None
            }
        },

        Action::RecipeSaveFinished { note } => {
            app.status_message = note;
            Effect::None
        }

        Action::NewSession => {
            // In-flight task handles are aborted by the caller; the phase
            // reset makes any straggler reply/tick stale.
            app.messages.clear();
            app.error = None;
            app.placeholder_id = None;
            app.pending_reply = None;
            app.last_sent_id = None;
            app.phase = Phase::Idle;
            app.session_id = session::new_session_id();
            app.status_message = String::from("Started a new chat.");
            app.dirty = true;
            Effect::None
        }

        Action::Quit => Effect::Quit,
    }
}

/// Starts a request/placeholder cycle. `push_user` is false on retry, which
/// reuses the already-appended user message.
fn begin_turn(app: &mut App, text: String, push_user: bool) -> Effect {
    app.error = None;
    if push_user {
        let msg = Message::user(text.clone());
        app.last_sent_id = Some(msg.id.clone());
        app.messages.push(msg);
    }
    let placeholder = Message::placeholder();
    app.placeholder_id = Some(placeholder.id.clone());
    app.messages.push(placeholder);
    app.phase = Phase::AwaitingResponse;
    app.status_message = String::from("Thinking...");
    app.dirty = true;
    Effect::SpawnChatRequest { text }
}

/// Original text of the most recently sent user message, if it still
/// resolves to a user-role message in the list.
fn last_sent_text(app: &App) -> Option<String> {
    let id = app.last_sent_id.as_ref()?;
    app.messages
        .iter()
        .find(|m| &m.id == id && m.role == Role::User)
        .map(|m| m.content.clone())
}

fn remove_placeholder(app: &mut App) {
    if let Some(id) = app.placeholder_id.take() {
        app.messages.retain(|m| m.id != id);
    }
}
