use crate::app::state::{App, Focus};
use crossterm::event::KeyCode;

mod chat;
mod help;
mod map;

pub fn dispatch_input(app: &mut App, key: KeyCode) {
    if help::handle_help_toggle(app, key) {
        return;
    }

    if handle_function_keys(app, key) {
        return;
    }

    match app.focus {
        Focus::Map => map::handle_map_input(app, key),
        Focus::Chat => chat::handle_chat_input(app, key),
    }
}

/// Shortcuts that work from either focus.
fn handle_function_keys(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::F(2) => app.toggle_radius(),
        KeyCode::F(3) => app.clear_all(),
        KeyCode::F(4) => app.toggle_chat_panel(),
        KeyCode::F(5) => app.reset_chat(),
        KeyCode::F(6) => app.request_location(),
        _ => return false,
    }
    true
}
