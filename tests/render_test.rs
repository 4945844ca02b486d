//! Render tests for the main layout.
//!
//! Uses ratatui's TestBackend to render to a virtual terminal buffer and
//! checks the plain text that ends up on screen.

use ratatui::{backend::TestBackend, Terminal};

use story_chat::app::{App, Focus};
use story_chat::catalog::PromptCatalog;
use story_chat::config::Config;
use story_chat::message::Message;
use story_chat::transport::{ChatClient, ClientConfig, TransportKind};
use story_chat::ui;

const TERMINAL_WIDTH: u16 = 120;
const TERMINAL_HEIGHT: u16 = 40;

/// Helper to convert a ratatui Buffer to a plain text string (no ANSI codes).
fn buffer_to_string(buffer: &ratatui::buffer::Buffer) -> String {
    let mut output = String::new();
    for y in 0..buffer.area().height {
        for x in 0..buffer.area().width {
            output.push_str(buffer.get(x, y).symbol());
        }
        output.push('\n');
    }
    output
}

fn test_app() -> App {
    let config = ClientConfig::new(
        TransportKind::OneShot,
        "http://127.0.0.1:9/chat",
        Some("session-render".to_string()),
    )
    .unwrap();
    App::new(ChatClient::new(&config), config.session, PromptCatalog::builtin())
}

fn render(app: &mut App) -> String {
    let config = Config::default();
    let backend = TestBackend::new(TERMINAL_WIDTH, TERMINAL_HEIGHT);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(|f| ui::ui(f, app, &config)).unwrap();
    buffer_to_string(terminal.backend().buffer())
}

#[test]
fn empty_app_shows_library_and_placeholder() {
    let mut app = test_app();
    let screen = render(&mut app);

    assert!(screen.contains("Story Library"));
    assert!(screen.contains("Story Time"));
    assert!(screen.contains("● Ready"));
    assert!(screen.contains("Type your message..."));
    assert!(screen.contains("Send"));
    for category in PromptCatalog::builtin().categories() {
        assert!(screen.contains(&category.name), "missing {}", category.name);
    }
}

#[test]
fn collapsed_categories_hide_prompts() {
    let mut app = test_app();
    let screen = render(&mut app);

    assert!(!screen.contains("secret carrot cave"));
    assert!(screen.contains("▼ Comic Stories"));
}

#[test]
fn expanded_category_shows_its_prompts() {
    let mut app = test_app();
    app.sidebar.toggle_category("Bedtime Calm");
    let screen = render(&mut app);

    assert!(screen.contains("▲ Bedtime Calm"));
    assert!(screen.contains("▼ Comic Stories"));
    assert!(screen.contains("Tell me a"));
    assert!(!screen.contains("secret carrot cave"));
}

#[test]
fn transcript_shows_messages_with_prefixes() {
    let mut app = test_app();
    app.chat.messages.push(Message::user("Tell me about a brave turtle"));
    app.chat.messages.push(Message::assistant("The turtle crossed the river."));
    let screen = render(&mut app);

    assert!(screen.contains("You: Tell me about a brave turtle"));
    assert!(screen.contains("Storyteller: The turtle crossed the river."));
    assert!(!screen.contains("Pick a story from the library"));
}

#[test]
fn draft_is_shown_in_the_input() {
    let mut app = test_app();
    for c in "a sleepy owl".chars() {
        app.chat.handle_char(c);
    }
    app.focus = Focus::Sidebar;
    let screen = render(&mut app);

    assert!(screen.contains("a sleepy owl"));
    assert!(!screen.contains("Type your message..."));
    assert!(screen.contains("Enter pick"));
}

#[tokio::test]
async fn typing_indicator_is_shown_while_waiting() {
    let mut app = test_app();
    app.send(Some("hello"));
    assert!(app.is_typing());

    let screen = render(&mut app);
    assert!(screen.contains("Assistant is typing..."));
    assert!(screen.contains("● Thinking..."));
}

#[test]
fn long_transcript_keeps_newest_line_in_view() {
    let mut app = test_app();
    for i in 0..60 {
        app.chat.messages.push(Message::assistant(format!("line number {}", i)));
    }
    let screen = render(&mut app);

    assert!(screen.contains("line number 59"));
    assert!(!screen.contains("line number 0 "));

    app.scroll.scroll_to_top();
    let screen = render(&mut app);
    assert!(screen.contains("line number 0 "));
    assert!(!screen.contains("line number 59"));
}
