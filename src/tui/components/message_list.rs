//! # MessageList Component
//!
//! Scrollable view of the conversation.
//!
//! `MessageList` is a transient component (created each frame) wrapping
//! `&mut MessageListState` (persistent scroll state) and the message slice
//! (props). Heights are predicted per message with
//! `MessageView::calculate_height` so the scroll canvas can be sized before
//! anything renders.

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Paragraph;
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::message::Message;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::MessageView;
use crate::tui::event::TuiEvent;

/// Scroll state for the message list. Persisted in the parent TuiState.
pub struct MessageListState {
    pub scroll_state: ScrollViewState,
    /// When true, auto-scroll to bottom on new content
    pub stick_to_bottom: bool,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
    /// Total content height from the last render pass
    content_height: u16,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            stick_to_bottom: true, // Start attached to bottom
            viewport_height: 0,
            content_height: 0,
        }
    }

    /// Clamp scroll offset so it never exceeds the content bounds.
    fn clamp_scroll(&mut self) {
        let max_y = self.content_height.saturating_sub(self.viewport_height);
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Re-engage auto-scroll if a scroll-down landed at the bottom.
    fn repin_if_at_bottom(&mut self) {
        let max_y = self.content_height.saturating_sub(self.viewport_height);
        if self.scroll_state.offset().y >= max_y {
            self.stick_to_bottom = true;
        }
    }
}

/// Scrollable conversation view, created fresh each frame.
pub struct MessageList<'a> {
    pub state: &'a mut MessageListState,
    pub messages: &'a [Message],
    pub is_awaiting: bool,
    pub pulse_value: f32,
}

impl<'a> MessageList<'a> {
    pub fn new(
        state: &'a mut MessageListState,
        messages: &'a [Message],
        is_awaiting: bool,
        pulse_value: f32,
    ) -> Self {
        Self {
            state,
            messages,
            is_awaiting,
            pulse_value,
        }
    }
}

impl<'a> Component for MessageList<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        if self.messages.is_empty() {
            let hint = Paragraph::new("Ask about any dish, technique, or ingredient.\nEnter sends · Ctrl+N new chat · Esc quits")
                .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))
                .alignment(ratatui::layout::Alignment::Center);
            let y = area.y + area.height / 2;
            let hint_area = Rect::new(area.x, y.min(area.y + area.height.saturating_sub(1)), area.width, 2.min(area.height));
            frame.render_widget(hint, hint_area);
            return;
        }

        let content_width = area.width.saturating_sub(1); // -1 for scrollbar safe area

        let heights: Vec<u16> = self
            .messages
            .iter()
            .map(|m| MessageView::calculate_height(m, content_width))
            .collect();
        let total_height: u16 = heights.iter().sum();

        self.state.viewport_height = area.height;
        self.state.content_height = total_height;
        if !self.state.stick_to_bottom {
            self.state.clamp_scroll();
        }

        let mut scroll_view = ScrollView::new(Size::new(content_width, total_height.max(1)))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Always)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let last = self.messages.len() - 1;
        let mut y_offset: u16 = 0;
        for (i, message) in self.messages.iter().enumerate() {
            let height = heights[i];
            let pulse = if i == last && self.is_awaiting {
                self.pulse_value
            } else {
                0.0
            };
            let view = MessageView::new(message, pulse);
            scroll_view.render_widget(view, Rect::new(0, y_offset, content_width, height));
            y_offset += height;
        }

        if self.state.stick_to_bottom {
            self.state.scroll_state.scroll_to_bottom();
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

impl EventHandler for MessageListState {
    type Event = (); // Scrolling is handled internally

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
                None
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
                None
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
                None
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
                None
            }
            TuiEvent::ScrollToBottom => {
                self.scroll_state.scroll_to_bottom();
                self.stick_to_bottom = true;
                None
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_up_detaches_from_bottom() {
        let mut state = MessageListState::new();
        assert!(state.stick_to_bottom);

        state.handle_event(&TuiEvent::ScrollUp);
        assert!(!state.stick_to_bottom);
    }

    #[test]
    fn test_scroll_to_bottom_repins() {
        let mut state = MessageListState::new();
        state.handle_event(&TuiEvent::ScrollUp);
        assert!(!state.stick_to_bottom);

        state.handle_event(&TuiEvent::ScrollToBottom);
        assert!(state.stick_to_bottom);
    }

    #[test]
    fn test_scroll_down_at_bottom_repins() {
        let mut state = MessageListState::new();
        state.content_height = 10;
        state.viewport_height = 20; // everything fits, so we're at the bottom
        state.handle_event(&TuiEvent::ScrollUp);
        state.handle_event(&TuiEvent::ScrollDown);
        assert!(state.stick_to_bottom);
    }

    #[test]
    fn test_clamp_scroll_bounds_offset() {
        let mut state = MessageListState::new();
        state.content_height = 30;
        state.viewport_height = 10;
        state.scroll_state.set_offset(Position { x: 0, y: 100 });

        state.clamp_scroll();
        assert_eq!(state.scroll_state.offset().y, 20);
    }
}
