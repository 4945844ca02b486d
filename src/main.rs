//! story-chat - a terminal chat with a children's storyteller.
//!
//! Built with Rust and Ratatui.

use std::io;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use story_chat::app::App;
use story_chat::config::Config;
use story_chat::{input, logging};

fn main() -> Result<()> {
    // Logs go to a file; the terminal belongs to the UI
    if let Some(path) = logging::default_log_path() {
        if let Err(e) = logging::init(&path) {
            eprintln!("Warning: logging disabled: {:#}", e);
        }
    }

    // Load configuration
    let config = Config::load();

    // Background requests run on the runtime while the UI loop owns this thread
    let runtime = tokio::runtime::Runtime::new()?;
    let _guard = runtime.enter();

    // Create app
    let mut app = App::from_config(&config)?;
    if config.behavior.health_check {
        app.start_health_check();
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let res = input::run_app(&mut terminal, &mut app, &config);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Handle any errors
    if let Err(err) = res {
        tracing::error!(error = %err, "terminal loop failed");
        eprintln!("Error: {:?}", err);
    }

    tracing::info!(messages = app.chat.messages.len(), "exiting");
    Ok(())
}
