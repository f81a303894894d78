use crate::app::{App, Focus};
use crate::ui::widgets::chat::render_chat;
use crate::ui::widgets::map::render_map;
use crate::ui::widgets::popup::{centered_rect, ClearWidget};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MainLayout {
    pub header: Rect,
    pub map: Rect,
    pub chat: Option<Rect>,
    pub status: Rect,
    pub shortcuts: Rect,
}

pub fn render_main(app: &App, f: &mut Frame<'_>) {
    let layout = build_main_layout(app, f.area());

    render_header(app, f, layout.header);
    render_map(app, f, layout.map);
    if let Some(chat) = layout.chat {
        render_chat(app, f, chat);
    }
    render_status_section(app, f, layout.status);
    render_shortcuts(app, f, layout.shortcuts);

    if app.show_help {
        let area = f.area();
        render_help_popup(f, area);
    }
}

pub fn build_main_layout(app: &App, area: Rect) -> MainLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(8),    // Map and chat
            Constraint::Length(3), // Status area
            Constraint::Length(1), // Shortcuts hint
        ])
        .split(area.inner(Margin::new(1, 0)));

    let (map, chat) = if app.show_chat {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(rows[1]);
        (columns[0], Some(columns[1]))
    } else {
        (rows[1], None)
    };

    MainLayout {
        header: rows[0],
        map,
        chat,
        status: rows[2],
        shortcuts: rows[3],
    }
}

fn render_header(app: &App, f: &mut Frame<'_>, area: Rect) {
    let header_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let (radius_text, radius_color) = if app.selection.show_radius() {
        ("5km radius: on", Color::LightRed)
    } else {
        ("5km radius: off", Color::DarkGray)
    };

    let location = app.chat.user_location().map_or_else(
        || Span::styled("location: not set", Style::default().fg(Color::DarkGray)),
        |point| Span::styled(format!("location: {point}"), Style::default().fg(Color::Green)),
    );

    let line = TextLine::from(vec![
        Span::styled(
            "Outlet Map",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {} outlets", app.store.len()),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("  {} selected", app.selection.selected().len()),
            Style::default().fg(Color::Red),
        ),
        Span::raw("  "),
        Span::styled(radius_text, Style::default().fg(radius_color)),
        Span::raw("  "),
        location,
    ]);

    f.render_widget(Paragraph::new(line).block(header_block), area);
}

fn render_status_section(app: &App, f: &mut Frame<'_>, area: Rect) {
    let status_block = Block::default()
        .title(" Status ")
        .title_style(Style::default().fg(Color::Yellow))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let status_text = if app.status_message.is_empty() {
        Text::from(Span::styled(
            format!("Backend: {}", app.api_url()),
            Style::default().fg(Color::Gray),
        ))
    } else {
        let style = if app.status_message.starts_with("Error") {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Green)
        };

        Text::from(Span::styled(app.status_message.as_str(), style))
    };

    let status_paragraph = Paragraph::new(status_text)
        .block(status_block)
        .wrap(Wrap { trim: true });
    f.render_widget(status_paragraph, area);
}

fn render_shortcuts(app: &App, f: &mut Frame<'_>, area: Rect) {
    let shortcuts_paragraph =
        Paragraph::new(shortcuts_line(app.focus)).alignment(Alignment::Center);
    f.render_widget(shortcuts_paragraph, area);
}

fn key_span(key: &'static str) -> Span<'static> {
    Span::styled(
        key,
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )
}

fn shortcuts_line(focus: Focus) -> TextLine<'static> {
    let pairs: &[(&'static str, &'static str)] = match focus {
        Focus::Map => &[
            ("↑/↓", ": Outlet  "),
            ("Enter", ": Popup  "),
            ("r", ": Radius  "),
            ("c", ": Clear  "),
            ("Tab", ": Chat  "),
            ("F1", ": Help  "),
            ("q", ": Quit"),
        ],
        Focus::Chat => &[
            ("Enter", ": Send  "),
            ("Esc/Tab", ": Map  "),
            ("F5", ": Reset chat  "),
            ("F6", ": Location  "),
            ("F1", ": Help"),
        ],
    };

    TextLine::from(
        pairs
            .iter()
            .flat_map(|(key, action)| [key_span(key), Span::raw(*action)])
            .collect::<Vec<_>>(),
    )
}

fn build_help_lines() -> Vec<TextLine<'static>> {
    let section = |title: &'static str| {
        TextLine::from(Span::styled(
            title,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
    };
    let entry = |key: &'static str, text: &'static str| {
        TextLine::from(vec![key_span(key), Span::raw(format!("  {text}"))])
    };

    vec![
        section("Map"),
        entry("Up/Down", "Move between outlets"),
        entry("Enter", "Open the outlet popup, or close it if open"),
        entry("x", "Close the popup under the cursor"),
        entry("h/j/k/l", "Pan the map"),
        entry("+/-", "Zoom in / out"),
        entry("r, F2", "Toggle the 5km radius"),
        entry("c, F3", "Clear the selection"),
        entry("t, F4", "Show / hide the chat panel"),
        entry("R, F5", "Reset the chat"),
        entry("L, F6", "Use my location"),
        entry("Tab", "Focus the chat"),
        entry("q", "Quit"),
        TextLine::from(""),
        section("Chat"),
        entry("Enter", "Send the question"),
        entry("Backspace", "Delete a character"),
        entry("Esc/Tab", "Back to the map"),
        TextLine::from(""),
        section("Markers"),
        TextLine::from(vec![
            Span::styled("●", Style::default().fg(Color::Red)),
            Span::raw(" matched or near a match   "),
            Span::styled("●", Style::default().fg(Color::Blue)),
            Span::raw(" other outlet   "),
            Span::styled("◉", Style::default().fg(Color::Yellow)),
            Span::raw(" cursor   "),
            Span::styled("▲", Style::default().fg(Color::Green)),
            Span::raw(" you"),
        ]),
    ]
}

fn render_help_popup(f: &mut Frame<'_>, area: Rect) {
    let popup_area = centered_rect(70, 80, area);
    f.render_widget(ClearWidget, popup_area);

    let help_block = Block::default()
        .title("== Help & Keyboard Shortcuts ==")
        .title_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .title_bottom(TextLine::from(" F1/Esc to close ").alignment(Alignment::Center))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let help_paragraph = Paragraph::new(Text::from(build_help_lines()))
        .block(help_block)
        .wrap(Wrap { trim: true });

    f.render_widget(help_paragraph, popup_area);
}
