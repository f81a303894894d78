use crate::app::state::{App, Focus};
use crossterm::event::KeyCode;

pub fn handle_chat_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Esc | KeyCode::Tab => app.focus = Focus::Map,
        KeyCode::Enter => app.submit_chat(),
        KeyCode::Backspace => {
            app.chat_input.pop();
        }
        KeyCode::Char(ch) => app.chat_input.push(ch),
        _ => {}
    }
}
