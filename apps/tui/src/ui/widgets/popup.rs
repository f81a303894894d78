use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::prelude::Buffer;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Widget, Wrap};
use ratatui::Frame;

use outlet_map::domain::Outlet;

use crate::app::App;

/// Lines one popup card takes in the info strip.
pub const CARD_HEIGHT: u16 = 3;

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let [_, middle, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(area);

    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(middle);

    center
}

pub struct ClearWidget;

impl Widget for ClearWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        ratatui::widgets::Clear.render(area, buf);
    }
}

/// Info cards for every open popup, in the order they were opened.
pub fn render_popup_cards(app: &App, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(" Open popups ")
        .title_style(Style::default().fg(Color::Yellow))
        .borders(Borders::TOP)
        .border_style(Style::default().fg(Color::DarkGray));

    let lines = app
        .selection
        .open_popups()
        .iter()
        .filter_map(|id| app.store.get(id))
        .flat_map(card_lines)
        .collect::<Vec<_>>();

    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn card_lines(outlet: &Outlet) -> Vec<TextLine<'static>> {
    let hours = if outlet.operating_hours.trim().is_empty() {
        "Hours not listed".to_string()
    } else {
        outlet.operating_hours.clone()
    };

    let mut links = Vec::new();
    for (label, link) in [
        ("Google Maps: ", &outlet.google_maps_link),
        ("Waze: ", &outlet.waze_link),
    ] {
        let Some(link) = link.as_deref().filter(|link| !link.trim().is_empty()) else {
            continue;
        };
        if !links.is_empty() {
            links.push(Span::raw("  "));
        }
        links.push(Span::styled(label, Style::default().fg(Color::Gray)));
        links.push(Span::styled(link.to_string(), Style::default().fg(Color::Cyan)));
    }

    vec![
        TextLine::from(vec![
            Span::styled(
                outlet.display_name().to_string(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  #{}", outlet.id), Style::default().fg(Color::DarkGray)),
        ]),
        TextLine::from(vec![
            Span::raw(outlet.address.clone()),
            Span::styled(format!("  {hours}"), Style::default().fg(Color::Green)),
        ]),
        TextLine::from(links),
    ]
}
