use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{backend::Backend, Terminal};

use crate::app::{App, Focus};
use crate::config::Config;
use crate::ui;

/// Result of handling a key event.
#[derive(Debug, PartialEq, Eq)]
pub enum HandleResult {
    /// Continue running the app
    Continue,
    /// Exit the app
    Exit,
}

/// Cursor blink interval in milliseconds.
const CURSOR_BLINK_MS: u64 = 530;

/// Run the main application loop.
pub fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    config: &Config,
) -> io::Result<()> {
    let behavior = &config.behavior;
    let mut last_cursor_toggle = Instant::now();

    loop {
        // Apply whatever the background tasks have produced
        app.process_reply();
        app.process_health();
        app.tick();

        terminal.draw(|f| ui::ui(f, app, config))?;

        // Toggle cursor blink
        if last_cursor_toggle.elapsed() >= Duration::from_millis(CURSOR_BLINK_MS) {
            app.toggle_cursor();
            last_cursor_toggle = Instant::now();
        }

        // Fast polling while a reply or health check is pending
        let timeout = if app.is_busy() {
            Duration::from_millis(behavior.busy_poll_ms)
        } else {
            Duration::from_millis(behavior.idle_poll_ms)
        };

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    // Reset cursor to visible on any keypress
                    app.animation.cursor_visible = true;
                    last_cursor_toggle = Instant::now();

                    if handle_key_event(app, key.code, key.modifiers, config) == HandleResult::Exit {
                        return Ok(());
                    }
                }
            }
        }
    }
}

/// Handle a key event and return whether to continue or exit.
pub fn handle_key_event(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    config: &Config,
) -> HandleResult {
    let page_size = config.behavior.scroll_page_size;

    // Global shortcuts (work in both panes)
    match code {
        KeyCode::Char('c') | KeyCode::Char('d') if modifiers.contains(KeyModifiers::CONTROL) => {
            return HandleResult::Exit;
        }
        KeyCode::Esc => return HandleResult::Exit,
        KeyCode::Tab | KeyCode::BackTab => {
            app.toggle_focus();
            return HandleResult::Continue;
        }
        KeyCode::PageUp => {
            app.scroll.scroll_page_up(page_size);
            return HandleResult::Continue;
        }
        KeyCode::PageDown => {
            app.scroll.scroll_page_down(page_size);
            return HandleResult::Continue;
        }
        _ => {}
    }

    match app.focus {
        Focus::Sidebar => handle_sidebar_keys(app, code),
        Focus::Input => handle_input_keys(app, code),
    }
}

/// Handle key events while the story library has focus.
fn handle_sidebar_keys(app: &mut App, code: KeyCode) -> HandleResult {
    match code {
        KeyCode::Up | KeyCode::Char('k') => {
            app.sidebar.cursor_up();
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.sidebar.cursor_down();
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
            if let Some(event) = app.sidebar.activate() {
                app.handle_sidebar_event(event);
            }
        }
        _ => {}
    }
    HandleResult::Continue
}

/// Handle key events while the message input has focus.
fn handle_input_keys(app: &mut App, code: KeyCode) -> HandleResult {
    match code {
        KeyCode::Enter => {
            app.send(None);
        }
        KeyCode::Char(c) => {
            app.chat.handle_char(c);
        }
        KeyCode::Backspace => {
            app.chat.handle_backspace();
        }
        KeyCode::Left => {
            app.chat.move_cursor_left();
        }
        KeyCode::Right => {
            app.chat.move_cursor_right();
        }
        KeyCode::Up => {
            app.scroll.scroll_up();
        }
        KeyCode::Down => {
            app.scroll.scroll_down();
        }
        KeyCode::Home => {
            app.scroll.scroll_to_top();
        }
        KeyCode::End => {
            app.scroll.scroll_to_bottom();
        }
        _ => {}
    }
    HandleResult::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PromptCatalog;
    use crate::transport::{ChatClient, ClientConfig, TransportKind};

    fn app() -> App {
        let client_config = ClientConfig::new(
            TransportKind::OneShot,
            "http://127.0.0.1:9/chat",
            Some("keys".to_string()),
        )
        .unwrap();
        App::new(
            ChatClient::new(&client_config),
            client_config.session,
            PromptCatalog::builtin(),
        )
    }

    fn press(app: &mut App, code: KeyCode) -> HandleResult {
        handle_key_event(app, code, KeyModifiers::NONE, &Config::default())
    }

    #[test]
    fn test_exit_keys() {
        let mut app = app();
        assert_eq!(press(&mut app, KeyCode::Esc), HandleResult::Exit);
        assert_eq!(
            handle_key_event(
                &mut app,
                KeyCode::Char('c'),
                KeyModifiers::CONTROL,
                &Config::default()
            ),
            HandleResult::Exit
        );
    }

    #[test]
    fn test_typing_goes_to_draft() {
        let mut app = app();
        for c in "owl".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.chat.input, "ow");
    }

    #[test]
    fn test_tab_moves_keys_to_sidebar() {
        let mut app = app();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, Focus::Sidebar);

        // 'j' navigates instead of typing
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.sidebar.cursor(), 1);
        assert_eq!(app.chat.input, "");

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.sidebar.expanded(), Some("Adventure"));
        assert!(app.chat.messages.is_empty());
    }

    #[test]
    fn test_enter_on_blank_draft_does_nothing() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        assert!(app.chat.messages.is_empty());
        assert!(!app.is_typing());
    }

    #[test]
    fn test_page_keys_scroll_in_both_panes() {
        let mut app = app();
        press(&mut app, KeyCode::PageUp);
        assert_eq!(app.scroll.offset, 10);
        app.toggle_focus();
        press(&mut app, KeyCode::PageDown);
        assert_eq!(app.scroll.offset, 0);
    }
}
