//! # InputBox Component
//!
//! Single-line draft editor for the next question.
//!
//! The buffer is internal state; the cursor always sits on a char boundary.
//! Long drafts scroll horizontally so the cursor stays visible.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Paragraph};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// Borders top + bottom.
pub const INPUT_HEIGHT: u16 = 3;

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// User submitted the draft (Enter pressed, non-empty after trim)
    Submit(String),
    /// Text content changed
    ContentChanged,
}

pub struct InputBox {
    /// Draft text (internal state)
    pub buffer: String,
    /// Byte offset of the cursor; always a char boundary.
    cursor: usize,
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
        }
    }

    /// Display columns from the start of the buffer to the cursor.
    fn cursor_column(&self) -> usize {
        self.buffer[..self.cursor].width()
    }

    /// First visible byte offset so the cursor fits inside `width` columns.
    fn scroll_start(&self, width: u16) -> usize {
        let width = width as usize;
        if width == 0 {
            return 0;
        }
        let mut start = 0;
        let mut visible = self.cursor_column();
        let mut chars = self.buffer.char_indices();
        while visible >= width {
            match chars.next() {
                Some((idx, c)) => {
                    start = idx + c.len_utf8();
                    visible -= c.width().unwrap_or(0);
                }
                None => break,
            }
        }
        start
    }
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let inner_width = area.width.saturating_sub(2);
        let start = self.scroll_start(inner_width.saturating_sub(1));
        let visible = &self.buffer[start..];

        let block = Block::bordered()
            .border_type(ratatui::widgets::BorderType::Rounded)
            .title("Ask the kitchen");

        let input = Paragraph::new(visible)
            .block(block)
            .style(Style::default().fg(Color::Green));

        frame.render_widget(input, area);

        let cursor_x =
            area.x + 1 + (self.cursor_column() - self.buffer[..start].width()) as u16;
        frame.set_cursor_position((cursor_x.min(area.x + area.width.saturating_sub(2)), area.y + 1));
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar(c) => {
                self.buffer.insert(self.cursor, *c);
                self.cursor += c.len_utf8();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                // Single-line draft: pasted newlines become spaces.
                let text = text.replace(['\r', '\n'], " ");
                self.buffer.insert_str(self.cursor, &text);
                self.cursor += text.len();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Backspace => {
                if self.cursor > 0 {
                    let prev = prev_char_boundary(&self.buffer, self.cursor);
                    self.buffer.drain(prev..self.cursor);
                    self.cursor = prev;
                    Some(InputEvent::ContentChanged)
                } else {
                    None
                }
            }
            TuiEvent::Delete => {
                if self.cursor < self.buffer.len() {
                    let next = next_char_boundary(&self.buffer, self.cursor);
                    self.buffer.drain(self.cursor..next);
                    Some(InputEvent::ContentChanged)
                } else {
                    None
                }
            }
            TuiEvent::CursorLeft => {
                if self.cursor > 0 {
                    self.cursor = prev_char_boundary(&self.buffer, self.cursor);
                    Some(InputEvent::ContentChanged)
                } else {
                    None
                }
            }
            TuiEvent::CursorRight => {
                if self.cursor < self.buffer.len() {
                    self.cursor = next_char_boundary(&self.buffer, self.cursor);
                    Some(InputEvent::ContentChanged)
                } else {
                    None
                }
            }
            TuiEvent::CursorHome => {
                (self.cursor != 0).then(|| {
                    self.cursor = 0;
                    InputEvent::ContentChanged
                })
            }
            TuiEvent::Submit => {
                if !self.buffer.trim().is_empty() {
                    let text = std::mem::take(&mut self.buffer);
                    self.cursor = 0;
                    Some(InputEvent::Submit(text))
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

/// Largest char boundary strictly before `pos`.
fn prev_char_boundary(s: &str, pos: usize) -> usize {
    let mut i = pos - 1;
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Smallest char boundary strictly after `pos`.
fn next_char_boundary(s: &str, pos: usize) -> usize {
    let mut i = pos + 1;
    while i < s.len() && !s.is_char_boundary(i) {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_input_box_new() {
        let input = InputBox::new();
        assert!(input.buffer.is_empty());
        assert_eq!(input.cursor, 0);
    }

    #[test]
    fn test_handle_input() {
        let mut input = InputBox::new();

        let res = input.handle_event(&TuiEvent::InputChar('a'));
        assert_eq!(res, Some(InputEvent::ContentChanged));
        assert_eq!(input.buffer, "a");

        let res = input.handle_event(&TuiEvent::InputChar('b'));
        assert_eq!(res, Some(InputEvent::ContentChanged));
        assert_eq!(input.buffer, "ab");

        let res = input.handle_event(&TuiEvent::Backspace);
        assert_eq!(res, Some(InputEvent::ContentChanged));
        assert_eq!(input.buffer, "a");
    }

    #[test]
    fn test_multibyte_editing_stays_on_boundaries() {
        let mut input = InputBox::new();
        for c in "sauté".chars() {
            input.handle_event(&TuiEvent::InputChar(c));
        }
        assert_eq!(input.buffer, "sauté");

        input.handle_event(&TuiEvent::Backspace);
        assert_eq!(input.buffer, "saut");

        input.handle_event(&TuiEvent::CursorLeft);
        input.handle_event(&TuiEvent::InputChar('é'));
        assert_eq!(input.buffer, "sauét");
    }

    #[test]
    fn test_submit_trims_and_clears() {
        let mut input = InputBox::new();
        input.buffer = "hello".to_string();
        input.cursor = input.buffer.len();

        let res = input.handle_event(&TuiEvent::Submit);
        match res {
            Some(InputEvent::Submit(text)) => assert_eq!(text, "hello"),
            _ => panic!("Expected Submit event"),
        }
        assert!(input.buffer.is_empty(), "Buffer should be cleared after submit");
    }

    #[test]
    fn test_submit_rejects_blank_draft() {
        let mut input = InputBox::new();
        input.buffer = "   ".to_string();
        input.cursor = input.buffer.len();
        assert_eq!(input.handle_event(&TuiEvent::Submit), None);
    }

    #[test]
    fn test_paste_flattens_newlines() {
        let mut input = InputBox::new();
        input.handle_event(&TuiEvent::Paste("a\nb".to_string()));
        assert_eq!(input.buffer, "a b");
    }

    #[test]
    fn test_render_shows_title() {
        let backend = TestBackend::new(40, 3);
        let mut terminal = Terminal::new(backend).unwrap();

        let mut input = InputBox::new();
        terminal
            .draw(|f| {
                input.render(f, f.area());
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        let text = buffer.content().iter().map(|c| c.symbol()).collect::<String>();
        assert!(text.contains("Ask the kitchen"));
    }
}
