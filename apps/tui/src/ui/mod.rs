// UI module for outlet-map
// Handles all UI rendering functions

pub mod screens;
pub mod widgets;

use crate::app::App;
use ratatui::layout::Rect;
use ratatui::Frame;

pub fn ui(app: &App, f: &mut Frame<'_>) {
    screens::main::render_main(app, f);
}

/// Cells the map canvas will occupy when the screen is `area`.
pub fn map_canvas_area(app: &App, area: Rect) -> Rect {
    let layout = screens::main::build_main_layout(app, area);
    widgets::map::map_panel_layout(app, layout.map).0
}
