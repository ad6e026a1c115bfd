//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI, and
//! translates keyboard events into `core::Action` values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Loop shape
//!
//! One iteration: draw (if anything changed) → poll terminal events → drain
//! the background-action channel → run effects → persist if the history is
//! dirty. Background work (the chat request, the reveal ticks, recipe
//! saves) runs in tokio tasks that report back as `Action`s over an
//! `mpsc` channel; their `AbortHandle`s are retained so quitting or
//! starting a new chat cancels them before they can touch stale state.
//!
//! ## Redraw strategy
//!
//! - **Animating** (awaiting a response): draws every ~80ms for the border
//!   pulse and reveal ticks.
//! - **Idle**: sleeps up to 500ms, only redraws on events or resize.

mod component;
mod components;
mod event;
mod ui;

use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::Duration;

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;
use log::{debug, info, warn};

use crate::api::ChatBackend;
use crate::core::action::{Action, Effect, update};
use crate::core::message::Recipe;
use crate::core::reveal::{RevealPlan, prefix};
use crate::core::session;
use crate::core::state::App;
use crate::tui::component::EventHandler;
use crate::tui::components::{InputBox, InputEvent, MessageListState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub message_list: MessageListState,
    pub input_box: InputBox,
    /// Border pulse intensity while a response is pending
    pub pulse_value: f32,
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            message_list: MessageListState::new(),
            input_box: InputBox::new(),
            pulse_value: 0.0,
        }
    }
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,                        // Show cursor for input editing
            SetCursorStyle::SteadyBlock, // Non-blinking: avoids blink timer reset from continuous redraws
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, steady block cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide // Hide cursor on exit
        );
    }
}

pub fn run(mut app: App) -> std::io::Result<()> {
    let mut tui = TuiState::new();

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();

    // Abort handles for the in-flight request and reveal (cancelled on quit
    // or new-session so nothing mutates state after teardown)
    let mut active_abort_handles: Vec<tokio::task::AbortHandle> = Vec::new();

    let start_time = std::time::Instant::now();
    let mut needs_redraw = true; // Force first frame
    let mut should_quit = false;

    loop {
        let animating = app.is_awaiting();
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            let elapsed = start_time.elapsed().as_secs_f32();
            tui.pulse_value = (elapsed * 5.0).sin() * 0.5 + 0.5;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui))?;
            needs_redraw = false;
        }

        // Dynamic poll timeout: short when animating, long when idle
        let timeout = if animating {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);

        if first_event.is_some() {
            needs_redraw = true;
        }

        // Process first event + drain ALL pending events before next draw
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            match event {
                // Resize just needs a redraw (already flagged above)
                TuiEvent::Resize => {}

                TuiEvent::Quit => {
                    let effect = update(&mut app, Action::Quit);
                    handle_effect(
                        effect,
                        &mut app,
                        &tx,
                        &mut active_abort_handles,
                        &mut should_quit,
                    );
                }

                TuiEvent::Retry => {
                    let effect = update(&mut app, Action::Retry);
                    handle_effect(
                        effect,
                        &mut app,
                        &tx,
                        &mut active_abort_handles,
                        &mut should_quit,
                    );
                }

                TuiEvent::NewSession => {
                    // Cancel any in-flight request/reveal before the reset.
                    for handle in active_abort_handles.drain(..) {
                        handle.abort();
                    }
                    let effect = update(&mut app, Action::NewSession);
                    tui.message_list = MessageListState::new();
                    handle_effect(
                        effect,
                        &mut app,
                        &tx,
                        &mut active_abort_handles,
                        &mut should_quit,
                    );
                }

                TuiEvent::SaveRecipe => {
                    let effect = update(&mut app, Action::SaveRecipe);
                    handle_effect(
                        effect,
                        &mut app,
                        &tx,
                        &mut active_abort_handles,
                        &mut should_quit,
                    );
                }

                TuiEvent::ScrollUp
                | TuiEvent::ScrollDown
                | TuiEvent::ScrollPageUp
                | TuiEvent::ScrollPageDown
                | TuiEvent::ScrollToBottom => {
                    tui.message_list.handle_event(&event);
                }

                // Everything else is draft editing
                _ => {
                    if let Some(InputEvent::Submit(text)) = tui.input_box.handle_event(&event) {
                        let effect = update(&mut app, Action::Submit(text));
                        handle_effect(
                            effect,
                            &mut app,
                            &tx,
                            &mut active_abort_handles,
                            &mut should_quit,
                        );
                    }
                }
            }
        }

        // Handle background task actions (reply, reveal ticks, save acks)
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            let effect = update(&mut app, action);
            handle_effect(
                effect,
                &mut app,
                &tx,
                &mut active_abort_handles,
                &mut should_quit,
            );
        }

        // Mirror the history to the store after every change
        if app.dirty {
            session::save_messages(&*app.store, &app.session_id, &app.persistable_messages());
            session::store_session_id(&*app.store, &app.session_id);
            app.dirty = false;
        }

        if should_quit {
            break;
        }
    }

    for handle in active_abort_handles.drain(..) {
        handle.abort();
    }

    ratatui::restore();
    Ok(())
}

fn handle_effect(
    effect: Effect,
    app: &mut App,
    tx: &mpsc::Sender<Action>,
    active_abort_handles: &mut Vec<tokio::task::AbortHandle>,
    should_quit: &mut bool,
) {
    match effect {
        Effect::None => {}
        Effect::Quit => *should_quit = true,
        Effect::SpawnChatRequest { text } => {
            *active_abort_handles = vec![spawn_chat_request(
                app.backend.clone(),
                text,
                app.session_id.clone(),
                tx.clone(),
            )];
        }
        Effect::StartReveal { text } => {
            active_abort_handles.push(spawn_reveal(text, tx.clone()));
        }
        Effect::SpawnRecipeSave { recipe } => {
            spawn_recipe_save(app.backend.clone(), app.session_id.clone(), recipe, tx.clone());
        }
    }
}

fn spawn_chat_request(
    backend: Arc<dyn ChatBackend>,
    text: String,
    session_id: String,
    tx: mpsc::Sender<Action>,
) -> tokio::task::AbortHandle {
    info!("Spawning chat request for session {}", session_id);
    let handle = tokio::spawn(async move {
        let action = match backend.send_chat(&text, &session_id).await {
            Ok(reply) => Action::ReplyReceived(reply),
            Err(e) => {
                info!("Chat request failed: {}", e);
                Action::RequestFailed(e.user_message())
            }
        };
        if tx.send(action).is_err() {
            warn!("Failed to deliver chat result: receiver dropped");
        }
    });
    handle.abort_handle()
}

/// Drives the reveal: one `RevealStep` per planned prefix, then
/// `RevealDone`. The whole schedule (including jittered delays) is computed
/// up front, so the task is a plain replay that aborts cleanly.
fn spawn_reveal(text: String, tx: mpsc::Sender<Action>) -> tokio::task::AbortHandle {
    let mut rng = rand::thread_rng();
    let plan = RevealPlan::new(&text, &mut rng);
    let ticks: Vec<(Duration, String)> = plan
        .steps()
        .iter()
        .map(|&n| (plan.tick_delay(&mut rng), prefix(&text, n).to_string()))
        .collect();
    debug!(
        "Revealing {} chars over {} ticks (worst case {:?})",
        text.chars().count(),
        ticks.len(),
        plan.max_duration()
    );

    let handle = tokio::spawn(async move {
        for (delay, shown) in ticks {
            tokio::time::sleep(delay).await;
            if tx.send(Action::RevealStep(shown)).is_err() {
                return;
            }
        }
        if tx.send(Action::RevealDone).is_err() {
            warn!("Failed to deliver RevealDone: receiver dropped");
        }
    });
    handle.abort_handle()
}

fn spawn_recipe_save(
    backend: Arc<dyn ChatBackend>,
    session_id: String,
    recipe: Recipe,
    tx: mpsc::Sender<Action>,
) {
    info!("Spawning recipe save: {}", recipe.title);
    tokio::spawn(async move {
        let note = match backend.save_recipe(&session_id, &recipe).await {
            Ok(ack) if ack.success => ack
                .message
                .unwrap_or_else(|| String::from("Recipe saved.")),
            Ok(ack) => ack
                .message
                .unwrap_or_else(|| String::from("The kitchen could not save that recipe.")),
            Err(e) => {
                warn!("Recipe save failed: {}", e);
                format!("Save failed: {}", e.user_message())
            }
        };
        if tx.send(Action::RecipeSaveFinished { note }).is_err() {
            warn!("Failed to deliver recipe save result: receiver dropped");
        }
    });
}
