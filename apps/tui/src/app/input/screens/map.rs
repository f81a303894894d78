use crate::app::state::App;
use crossterm::event::KeyCode;

pub fn handle_map_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Up => app.move_cursor(false),
        KeyCode::Down => app.move_cursor(true),
        KeyCode::Enter => app.click_cursor(),
        KeyCode::Char('x') => app.close_cursor_popup(),
        KeyCode::Char('r') => app.toggle_radius(),
        KeyCode::Char('c') => app.clear_all(),
        KeyCode::Char('t') => app.toggle_chat_panel(),
        KeyCode::Char('R') => app.reset_chat(),
        KeyCode::Char('L') => app.request_location(),
        KeyCode::Tab => app.focus_chat(),
        KeyCode::Char('h') | KeyCode::Left => app.camera.pan(-1, 0),
        KeyCode::Char('l') | KeyCode::Right => app.camera.pan(1, 0),
        KeyCode::Char('k') => app.camera.pan(0, 1),
        KeyCode::Char('j') => app.camera.pan(0, -1),
        KeyCode::Char('+' | '=') => app.camera.zoom_by(1.0),
        KeyCode::Char('-') => app.camera.zoom_by(-1.0),
        _ => {}
    }
}
