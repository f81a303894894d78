use std::f64::consts::TAU;

use ratatui::layout::{Alignment, Constraint, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line as TextLine, Span};
use ratatui::widgets::canvas::{Canvas, Context, Line as CanvasLine};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use throbber_widgets_tui::{Throbber, BRAILLE_SIX};

use outlet_map::geo::{km_to_lat_degrees, km_to_lon_degrees, GeoPoint, RADIUS_KM};
use outlet_map::selection::MarkerIcon;

use crate::app::{App, Focus};
use crate::ui::widgets::popup::{render_popup_cards, CARD_HEIGHT};

const CIRCLE_SEGMENTS: u32 = 48;

const HIGHLIGHT_COLOR: Color = Color::Red;
const DEFAULT_COLOR: Color = Color::Blue;
const CURSOR_COLOR: Color = Color::Yellow;
const RADIUS_COLOR: Color = Color::LightRed;
const USER_COLOR: Color = Color::Green;

#[derive(Debug)]
struct MarkerGlyph {
    point: GeoPoint,
    symbol: &'static str,
    color: Color,
    label: Option<String>,
}

/// Splits the map panel into the canvas and, when popups are open, the info
/// strip below it.
pub fn map_panel_layout(app: &App, area: Rect) -> (Rect, Option<Rect>) {
    let inner = area.inner(Margin::new(1, 1));
    let open = u16::try_from(app.selection.open_popups().len()).unwrap_or(u16::MAX);
    if open == 0 || inner.height < 8 {
        return (inner, None);
    }

    let strip = open
        .saturating_mul(CARD_HEIGHT)
        .saturating_add(1)
        .min(inner.height / 2);
    let [canvas, info] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(strip)]).areas(inner);
    (canvas, Some(info))
}

pub fn render_map(app: &App, f: &mut Frame<'_>, area: Rect) {
    let border = if app.focus == Focus::Map {
        Color::Cyan
    } else {
        Color::DarkGray
    };
    let block = Block::default()
        .title(format!(
            " Map  {}  zoom {:.0}{} ",
            app.camera.center(),
            app.camera.zoom(),
            if app.camera.is_animating() { "  ~" } else { "" }
        ))
        .title_style(Style::default().fg(Color::Cyan))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));
    f.render_widget(block, area);

    let (canvas_area, info_area) = map_panel_layout(app, area);
    if canvas_area.width < 4 || canvas_area.height < 2 {
        return;
    }

    render_canvas(app, f, canvas_area);

    if let Some(info) = info_area {
        render_popup_cards(app, f, info);
    }

    let banner = Rect {
        height: 1,
        ..canvas_area
    };
    if app.loading_outlets {
        let throbber = Throbber::default()
            .label("Loading map data...")
            .style(Style::default().fg(Color::White))
            .throbber_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .throbber_set(BRAILLE_SIX);
        let mut state = app.throbber.clone();
        f.render_stateful_widget(throbber, banner, &mut state);
    } else if app.store.is_loaded() && app.store.placeable_count() == 0 {
        let empty = Paragraph::new("No outlets to show")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray));
        f.render_widget(empty, banner);
    }
}

fn marker_glyphs(app: &App) -> Vec<MarkerGlyph> {
    let cursor = app.cursor_outlet().map(|outlet| outlet.id);

    app.store
        .placeable()
        .map(|(outlet, point)| {
            let style = app.selection.marker_style(outlet, &app.store);
            let color = match style.icon {
                MarkerIcon::Highlighted => HIGHLIGHT_COLOR,
                MarkerIcon::Default => DEFAULT_COLOR,
            };
            let (symbol, color) = if cursor == Some(outlet.id) {
                ("◉", CURSOR_COLOR)
            } else {
                ("●", color)
            };
            let label = app
                .selection
                .open_popups()
                .contains(outlet.id)
                .then(|| format!(" {}", outlet.display_name()));

            MarkerGlyph {
                point,
                symbol,
                color,
                label,
            }
        })
        .collect()
}

fn radius_centers(app: &App) -> Vec<GeoPoint> {
    app.store
        .placeable()
        .filter(|(outlet, _)| app.selection.shows_radius_circle(outlet))
        .map(|(_, point)| point)
        .collect()
}

fn draw_radius(ctx: &mut Context<'_>, center: GeoPoint) {
    let dlat = km_to_lat_degrees(RADIUS_KM);
    let dlon = km_to_lon_degrees(RADIUS_KM, center.lat);
    let point_at = |step: u32| {
        let angle = TAU * f64::from(step) / f64::from(CIRCLE_SEGMENTS);
        (
            angle.cos().mul_add(dlon, center.lon),
            angle.sin().mul_add(dlat, center.lat),
        )
    };

    for step in 0..CIRCLE_SEGMENTS {
        let (x1, y1) = point_at(step);
        let (x2, y2) = point_at(step + 1);
        ctx.draw(&CanvasLine {
            x1,
            y1,
            x2,
            y2,
            color: RADIUS_COLOR,
        });
    }
}

fn render_canvas(app: &App, f: &mut Frame<'_>, area: Rect) {
    let bounds = app.camera.visible_bounds();
    let glyphs = marker_glyphs(app);
    let circles = radius_centers(app);
    let user = app.chat.user_location();

    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([bounds.west, bounds.east])
        .y_bounds([bounds.south, bounds.north])
        .paint(|ctx| {
            for center in &circles {
                draw_radius(ctx, *center);
            }
            ctx.layer();

            if let Some(point) = user {
                ctx.print(
                    point.lon,
                    point.lat,
                    Span::styled("▲", Style::default().fg(USER_COLOR)),
                );
            }

            for glyph in &glyphs {
                let marker = Span::styled(glyph.symbol, Style::default().fg(glyph.color));
                match &glyph.label {
                    Some(label) => ctx.print(
                        glyph.point.lon,
                        glyph.point.lat,
                        TextLine::from(vec![
                            marker,
                            Span::styled(
                                label.clone(),
                                Style::default()
                                    .fg(Color::White)
                                    .add_modifier(Modifier::BOLD),
                            ),
                        ]),
                    ),
                    None => ctx.print(glyph.point.lon, glyph.point.lat, marker),
                }
            }
        });

    f.render_widget(canvas, area);
}
