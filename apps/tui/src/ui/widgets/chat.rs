use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;
use throbber_widgets_tui::{Throbber, BRAILLE_SIX};

use outlet_map::chat::StatusKind;
use outlet_map::domain::{ChatMessage, ChatRole};

use crate::app::{App, Focus};

pub fn render_chat(app: &App, f: &mut Frame<'_>, area: Rect) {
    let focused = app.focus == Focus::Chat;
    let block = Block::default()
        .title(" Chat ")
        .title_style(Style::default().fg(Color::Green))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused {
            Color::Green
        } else {
            Color::DarkGray
        }));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [messages_area, status_area, input_area] = Layout::vertical([
        Constraint::Min(3),
        Constraint::Length(1),
        Constraint::Length(3),
    ])
    .areas(inner);

    render_messages(app.chat.messages(), f, messages_area);
    render_chat_status(app, f, status_area);
    render_input(app, f, input_area, focused);
}

fn message_lines(messages: &[ChatMessage]) -> Vec<TextLine<'static>> {
    let mut lines = Vec::new();
    for message in messages {
        let role_style = match message.role {
            ChatRole::User => Style::default().fg(Color::Cyan),
            ChatRole::Assistant => Style::default().fg(Color::Green),
        };
        lines.push(TextLine::from(vec![
            Span::styled(
                message.role.label(),
                role_style.add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}", message.sent_at.format("%H:%M")),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        lines.extend(
            message
                .content
                .lines()
                .map(|line| TextLine::from(line.to_string())),
        );
        lines.push(TextLine::from(""));
    }
    lines
}

/// Scroll offset that keeps the last wrapped row of `paragraph` on screen.
fn scroll_to_bottom(paragraph: &Paragraph<'_>, area: Rect) -> u16 {
    let rows = paragraph.line_count(area.width);
    let overflow = rows.saturating_sub(usize::from(area.height));
    u16::try_from(overflow).unwrap_or(u16::MAX)
}

fn render_messages(messages: &[ChatMessage], f: &mut Frame<'_>, area: Rect) {
    let paragraph = Paragraph::new(Text::from(message_lines(messages))).wrap(Wrap { trim: false });
    let scroll = scroll_to_bottom(&paragraph, area);
    f.render_widget(paragraph.scroll((scroll, 0)), area);
}

fn render_chat_status(app: &App, f: &mut Frame<'_>, area: Rect) {
    if app.chat.is_waiting() || app.chat.is_locating() {
        let label = if app.chat.is_waiting() {
            "Thinking..."
        } else {
            outlet_map::chat::STATUS_LOCATING
        };
        let throbber = Throbber::default()
            .label(label)
            .style(Style::default().fg(Color::Gray))
            .throbber_style(Style::default().fg(Color::Green))
            .throbber_set(BRAILLE_SIX);
        let mut state = app.throbber.clone();
        f.render_stateful_widget(throbber, area, &mut state);
        return;
    }

    let Some(status) = app.chat.location_status() else {
        return;
    };
    let color = match status.kind {
        StatusKind::Info => Color::Gray,
        StatusKind::Success => Color::Green,
        StatusKind::Error => Color::Red,
    };
    f.render_widget(
        Paragraph::new(Span::styled(status.message, Style::default().fg(color))),
        area,
    );
}

fn render_input(app: &App, f: &mut Frame<'_>, area: Rect, focused: bool) {
    let block = Block::default()
        .title(" Ask about outlets ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused {
            Color::Yellow
        } else {
            Color::DarkGray
        }));

    let cursor = if focused && (app.animation_counter * 2.0).fract() < 0.5 {
        "█"
    } else {
        " "
    };

    let line = if app.chat_input.is_empty() && !focused {
        TextLine::from(Span::styled(
            "Press Tab to type a question",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        TextLine::from(vec![
            Span::styled("> ", Style::default().fg(Color::Yellow)),
            Span::raw(app.chat_input.as_str()),
            Span::styled(cursor, Style::default().fg(Color::Yellow)),
        ])
    };

    f.render_widget(Paragraph::new(line).block(block), area);
}
