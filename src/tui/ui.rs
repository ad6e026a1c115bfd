//! Frame layout and the widgets that aren't full components: title bar,
//! error banner, status bar.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Wrap};

use crate::core::state::App;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{INPUT_HEIGHT, MessageList};

/// Rows used by the error banner when visible (text + borders).
const ERROR_BANNER_HEIGHT: u16 = 3;

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState) {
    let error_height = if app.error.is_some() {
        ERROR_BANNER_HEIGHT
    } else {
        0
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),            // title bar
            Constraint::Min(1),               // conversation
            Constraint::Length(error_height), // error banner (collapsed when clear)
            Constraint::Length(INPUT_HEIGHT), // input box
            Constraint::Length(1),            // status bar
        ])
        .split(frame.area());

    draw_title_bar(frame, rows[0], app);

    MessageList::new(
        &mut tui.message_list,
        &app.messages,
        app.is_awaiting(),
        tui.pulse_value,
    )
    .render(frame, rows[1]);

    if let Some(error) = &app.error {
        draw_error_banner(frame, rows[2], error);
    }

    tui.input_box.render(frame, rows[3]);

    draw_status_bar(frame, rows[4], app);
}

fn draw_title_bar(frame: &mut Frame, area: Rect, app: &App) {
    // Enough of the session id to tell two sessions apart at a glance.
    let short_id: String = app.session_id.chars().take(8).collect();
    let title = Line::from(vec![
        Span::styled(
            " cookbot ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" session {short_id}"),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(title), area);
}

fn draw_error_banner(frame: &mut Frame, area: Rect, error: &str) {
    let banner = Paragraph::new(error)
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: true })
        .block(
            Block::bordered()
                .border_type(ratatui::widgets::BorderType::Rounded)
                .border_style(Style::default().fg(Color::Red))
                .title("error · Ctrl+R to retry"),
        );
    frame.render_widget(banner, area);
}

fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let hints = "Enter send · Ctrl+R retry · Ctrl+S save recipe · Ctrl+N new chat · Esc quit";
    let status = Line::from(vec![
        Span::styled(
            format!(" {} ", app.status_message),
            Style::default().fg(Color::White),
        ),
        Span::styled(hints, Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(status), area);
}
