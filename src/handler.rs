use crossterm::event::{
    KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;
use tracing::info;

use crate::app::App;
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
    }
}

/// Kick off a submission: record the user message, then put the transport
/// call on the runtime. The event loop joins it via `App::poll_reply`.
fn submit(app: &mut App) {
    if let Some(message) = app.begin_submit() {
        let api = app.api.clone();
        app.reply_task = Some(tokio::spawn(async move { api.send_message(&message).await }));
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match key.code {
        KeyCode::Esc => app.should_quit = true,

        // Enter submits under both bindings; the bindings differ in
        // whether a clickable Send control exists at all.
        KeyCode::Enter => submit(app),

        // Chat pane scrolling (the input is a single line, so the
        // vertical keys are free for it)
        KeyCode::Up => app.scroll_up(),
        KeyCode::Down => app.scroll_down(),

        // Input editing
        KeyCode::Backspace => {
            if app.cursor > 0 {
                app.cursor -= 1;
                let byte_pos = char_to_byte_index(&app.input, app.cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.input.chars().count();
            if app.cursor < char_count {
                let byte_pos = char_to_byte_index(&app.input, app.cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.cursor = app.cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.input.chars().count();
            app.cursor = (app.cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.cursor = 0;
        }
        KeyCode::End => {
            app.cursor = app.input.chars().count();
        }
        KeyCode::Char(c) => {
            if !key.modifiers.contains(KeyModifiers::CONTROL) {
                let byte_pos = char_to_byte_index(&app.input, app.cursor);
                app.input.insert(byte_pos, c);
                app.cursor += 1;
            }
        }
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn hit(area: Option<Rect>, x: u16, y: u16) -> bool {
    area.map(|r| point_in_rect(x, y, r)).unwrap_or(false)
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    match mouse.kind {
        MouseEventKind::ScrollDown => {
            if hit(app.chat_area, x, y) {
                app.scroll_down();
                app.scroll_down();
                app.scroll_down();
            }
        }
        MouseEventKind::ScrollUp => {
            if hit(app.chat_area, x, y) {
                app.scroll_up();
                app.scroll_up();
                app.scroll_up();
            }
        }
        MouseEventKind::Down(MouseButton::Left) => {
            // The send control only exists under the ButtonAndKey binding;
            // its area is None otherwise, so the click falls through.
            if hit(app.send_button_area, x, y) {
                submit(app);
            } else if hit(app.login_area, x, y) {
                info!("login clicked");
            } else if hit(app.register_area, x, y) {
                info!("register clicked");
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ChatApi;
    use crate::config::Config;

    fn test_app() -> App {
        App::new(ChatApi::new("http://localhost:9"), &Config::default())
    }

    fn press(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_typing_inserts_at_cursor() {
        let mut app = test_app();
        for c in "helo".chars() {
            handle_event(&mut app, press(KeyCode::Char(c)));
        }
        handle_event(&mut app, press(KeyCode::Left));
        handle_event(&mut app, press(KeyCode::Char('l')));

        assert_eq!(app.input, "hello");
        assert_eq!(app.cursor, 4);
    }

    #[test]
    fn test_backspace_is_utf8_safe() {
        let mut app = test_app();
        for c in "héllo".chars() {
            handle_event(&mut app, press(KeyCode::Char(c)));
        }
        handle_event(&mut app, press(KeyCode::Backspace));
        handle_event(&mut app, press(KeyCode::Backspace));

        assert_eq!(app.input, "hél");
        assert_eq!(app.cursor, 3);
    }

    #[test]
    fn test_escape_quits() {
        let mut app = test_app();
        handle_event(&mut app, press(KeyCode::Esc));
        assert!(app.should_quit);
    }

    #[test]
    fn test_click_outside_every_area_is_ignored() {
        let mut app = test_app();
        let click = AppEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 5,
            row: 5,
            modifiers: KeyModifiers::NONE,
        });

        // No areas resolved yet (nothing rendered): every hit test is None
        handle_event(&mut app, click);
        assert!(app.transcript.is_empty());
        assert!(!app.awaiting_reply);
    }

    #[test]
    fn test_point_in_rect_bounds() {
        let rect = Rect::new(2, 3, 4, 2);
        assert!(point_in_rect(2, 3, rect));
        assert!(point_in_rect(5, 4, rect));
        assert!(!point_in_rect(6, 4, rect));
        assert!(!point_in_rect(2, 5, rect));
    }
}
