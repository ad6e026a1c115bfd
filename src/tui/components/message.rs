use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Padding, Paragraph, Widget, Wrap};

use crate::core::message::{Message, Recipe, Role};

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Total vertical space consumed by borders (1 top + 1 bottom).
const VERTICAL_OVERHEAD: u16 = 2;

/// Pulse intensity threshold above which the border transitions from normal to BOLD.
const PULSE_BOLD_THRESHOLD: f32 = 0.6;
/// Pulse intensity threshold above which the border transitions from DIM to normal.
const PULSE_NORMAL_THRESHOLD: f32 = 0.2;

/// Renders a single chat turn with role-based styling.
///
/// `MessageView` is a transient component: created fresh each frame with the
/// data it needs. Recipe turns get a structured block (ingredients and
/// numbered steps) appended below the reply text; the display text is built
/// once by [`display_text`] so height prediction and rendering always agree.
#[derive(Clone, Copy)]
pub struct MessageView<'a> {
    pub message: &'a Message,
    /// Current pulse intensity (0.0 to 1.0) while a response is pending.
    pub pulse_intensity: f32,
}

impl<'a> MessageView<'a> {
    pub fn new(message: &'a Message, pulse_intensity: f32) -> Self {
        Self {
            message,
            pulse_intensity,
        }
    }

    /// Predicts rendered height for a given width using `textwrap` with
    /// options matching Ratatui's `Paragraph` wrapping. Lets the message
    /// list compute scroll positions without rendering.
    pub fn calculate_height(message: &Message, width: u16) -> u16 {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            // Terminal too narrow for borders + padding; still occupy a row.
            return 1;
        }

        let text = display_text(message);
        let options = || {
            textwrap::Options::new(content_width as usize)
                .break_words(true)
                .word_separator(textwrap::WordSeparator::AsciiSpace)
        };

        // Paragraph starts a fresh line at every '\n'; wrap each one
        // independently so predicted and rendered heights agree.
        let lines: usize = text
            .lines()
            .map(|line| {
                if line.is_empty() {
                    1
                } else {
                    textwrap::wrap(line, options()).len()
                }
            })
            .sum();
        (lines as u16).max(1) + VERTICAL_OVERHEAD
    }
}

/// Full text shown for a message: the reply itself, plus the structured
/// recipe block when one is attached.
pub fn display_text(message: &Message) -> String {
    let mut text = message.content.trim().to_string();
    if text.is_empty() {
        // Placeholder while awaiting the first reveal tick.
        text = String::from("...");
    }
    if let Some(recipe) = &message.recipe {
        text.push_str("\n\n");
        text.push_str(&recipe_block(recipe));
    }
    text
}

fn recipe_block(recipe: &Recipe) -> String {
    let mut out = format!("── {} ──", recipe.title);

    let mut facts: Vec<String> = Vec::new();
    if let Some(servings) = &recipe.servings {
        facts.push(format!("serves {servings}"));
    }
    if let Some(prep) = &recipe.prep_time {
        facts.push(format!("prep {prep}"));
    }
    if let Some(cook) = &recipe.cook_time {
        facts.push(format!("cook {cook}"));
    }
    if !facts.is_empty() {
        out.push('\n');
        out.push_str(&facts.join(" | "));
    }

    if let Some(description) = &recipe.description {
        out.push('\n');
        out.push_str(description);
    }

    if !recipe.ingredients.is_empty() {
        out.push_str("\n\nIngredients:");
        for item in &recipe.ingredients {
            out.push_str(&format!("\n  - {item}"));
        }
    }

    if !recipe.instructions.is_empty() {
        out.push_str("\n\nSteps:");
        for (i, step) in recipe.instructions.iter().enumerate() {
            out.push_str(&format!("\n  {}. {}", i + 1, step));
        }
    }

    out
}

impl<'a> Widget for MessageView<'a> {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        let role = match self.message.role {
            Role::User => "you",
            Role::Assistant => "cookbot",
        };

        let style = match self.message.role {
            Role::User => Style::default().fg(Color::Green),
            Role::Assistant => Style::default().fg(Color::Blue),
        };

        let mut border_style = style.add_modifier(Modifier::DIM);

        // Three-phase breathing while a response is pending: DIM → normal → BOLD
        if self.pulse_intensity > PULSE_BOLD_THRESHOLD {
            border_style = border_style
                .remove_modifier(Modifier::DIM)
                .add_modifier(Modifier::BOLD);
        } else if self.pulse_intensity > PULSE_NORMAL_THRESHOLD {
            border_style = border_style.remove_modifier(Modifier::DIM);
        }

        let block = Block::bordered()
            .title(role)
            .border_type(ratatui::widgets::BorderType::Rounded)
            .border_style(border_style)
            .title_style(border_style)
            .padding(Padding::horizontal(CONTENT_PAD_H));

        let inner_area = block.inner(area);
        block.render(area, buf);

        let paragraph = Paragraph::new(display_text(self.message))
            .style(style)
            .wrap(Wrap { trim: false });

        paragraph.render(inner_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe() -> Recipe {
        Recipe {
            title: "Basic Pasta".to_string(),
            description: Some("Weeknight staple.".to_string()),
            ingredients: vec!["1 lb pasta".to_string(), "Salt".to_string()],
            instructions: vec!["Boil water...".to_string(), "Add pasta...".to_string()],
            prep_time: Some("5 min".to_string()),
            cook_time: Some("10 min".to_string()),
            servings: Some("4".to_string()),
        }
    }

    #[test]
    fn test_display_text_plain_reply() {
        let msg = Message::assistant("Just boil it.", false, None);
        assert_eq!(display_text(&msg), "Just boil it.");
    }

    #[test]
    fn test_display_text_placeholder_shows_ellipsis() {
        let msg = Message::placeholder();
        assert_eq!(display_text(&msg), "...");
    }

    #[test]
    fn test_display_text_includes_recipe_block() {
        let msg = Message::assistant("Here you go.", true, Some(recipe()));
        let text = display_text(&msg);
        assert!(text.contains("Basic Pasta"));
        assert!(text.contains("serves 4"));
        assert!(text.contains("- 1 lb pasta"));
        assert!(text.contains("1. Boil water..."));
        assert!(text.contains("2. Add pasta..."));
    }

    #[test]
    fn test_recipe_block_omits_missing_facts() {
        let mut r = recipe();
        r.servings = None;
        r.prep_time = None;
        r.cook_time = None;
        r.description = None;
        let block = recipe_block(&r);
        assert!(!block.contains("serves"));
        assert!(!block.contains("prep"));
        assert!(block.contains("Ingredients:"));
    }

    #[test]
    fn test_calculate_height_single_line() {
        let msg = Message::user("Hello");
        assert_eq!(
            MessageView::calculate_height(&msg, 80),
            1 + VERTICAL_OVERHEAD
        );
    }

    #[test]
    fn test_calculate_height_wraps_at_width_boundary() {
        let msg = Message::user("Hello world");
        // width 9 → content_width 5 → "Hello" | "world"
        assert_eq!(MessageView::calculate_height(&msg, 9), 2 + VERTICAL_OVERHEAD);
    }

    #[test]
    fn test_calculate_height_zero_width_returns_minimum() {
        let msg = Message::user("Hello world");
        assert_eq!(MessageView::calculate_height(&msg, 0), 1);
    }

    #[test]
    fn test_calculate_height_counts_recipe_lines() {
        let plain = Message::assistant("Here you go.", false, None);
        let with_recipe = Message::assistant("Here you go.", true, Some(recipe()));
        assert!(
            MessageView::calculate_height(&with_recipe, 80)
                > MessageView::calculate_height(&plain, 80)
        );
    }
}
