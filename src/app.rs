use ratatui::widgets::ScrollbarState;
use tokio::sync::{mpsc, oneshot};

use crate::catalog::PromptCatalog;
use crate::config::Config;
use crate::message::{Message, Role};
use crate::sidebar::{Sidebar, SidebarEvent};
use crate::transport::{
    ChatClient, ClientConfig, ReplyEvent, TransportError, TransportResult, FALLBACK_REPLY,
};
use crate::ui::ToastState;

/// Connection status shown in the chat title bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Health check in flight
    Checking,
    /// Ready to send messages
    Ready,
    /// Waiting for the storyteller to answer
    Waiting,
    /// Health check failed
    Offline(String),
    /// The last request failed
    Error(String),
}

/// Which pane receives key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    Sidebar,
    #[default]
    Input,
}

/// Result of a send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The message was appended and a request issued.
    Sent,
    /// Nothing to send; state untouched.
    Blank,
    /// A reply is still pending; state untouched.
    Busy,
}

/// Chat-related state: transcript and draft input.
#[derive(Debug, Default)]
pub struct ChatState {
    /// Chat transcript, in display order
    pub messages: Vec<Message>,
    /// Current draft text
    pub input: String,
    /// Cursor position in the draft, in characters
    pub cursor_position: usize,
}

impl ChatState {
    fn byte_index(&self) -> usize {
        self.input
            .char_indices()
            .nth(self.cursor_position)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len())
    }

    /// Handle a character input.
    pub fn handle_char(&mut self, c: char) {
        let at = self.byte_index();
        self.input.insert(at, c);
        self.cursor_position += 1;
    }

    /// Handle backspace key.
    pub fn handle_backspace(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            let at = self.byte_index();
            self.input.remove(at);
        }
    }

    /// Move cursor left.
    pub fn move_cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    /// Move cursor right.
    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.input.chars().count() {
            self.cursor_position += 1;
        }
    }

    /// Clear input and reset cursor.
    pub fn clear_input(&mut self) {
        self.input.clear();
        self.cursor_position = 0;
    }

    /// The draft split at the cursor.
    pub fn split_at_cursor(&self) -> (&str, &str) {
        self.input.split_at(self.byte_index())
    }
}

/// Scroll state for the transcript, counted in rendered lines.
///
/// `offset` is the distance from the bottom, so 0 means the newest line is
/// in view.
#[derive(Debug, Default)]
pub struct ScrollState {
    pub offset: usize,
    pub scrollbar: ScrollbarState,
}

impl ScrollState {
    /// Scroll up one line.
    pub fn scroll_up(&mut self) {
        self.offset = self.offset.saturating_add(1);
    }

    /// Scroll down one line.
    pub fn scroll_down(&mut self) {
        self.offset = self.offset.saturating_sub(1);
    }

    /// Scroll up by page size.
    pub fn scroll_page_up(&mut self, page_size: usize) {
        self.offset = self.offset.saturating_add(page_size);
    }

    /// Scroll down by page size.
    pub fn scroll_page_down(&mut self, page_size: usize) {
        self.offset = self.offset.saturating_sub(page_size);
    }

    /// Scroll to the oldest line. Clamped at render time.
    pub fn scroll_to_top(&mut self) {
        self.offset = usize::MAX;
    }

    /// Scroll to the newest line.
    pub fn scroll_to_bottom(&mut self) {
        self.offset = 0;
    }

    /// Clamp the offset and update the scrollbar for `total_lines` of
    /// content with `max_offset` lines hidden above the view at most.
    pub fn update(&mut self, total_lines: usize, max_offset: usize) {
        self.offset = self.offset.min(max_offset);
        self.scrollbar = self.scrollbar.content_length(total_lines);
        self.scrollbar = self.scrollbar.position(max_offset - self.offset);
    }
}

/// Animation state for the cursor blink and typing indicator.
#[derive(Debug)]
pub struct AnimationState {
    /// Cursor blink visibility state
    pub cursor_visible: bool,
    /// Frame counter for the typing dots
    pub typing_frame: usize,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self {
            cursor_visible: true,
            typing_frame: 0,
        }
    }
}

impl AnimationState {
    /// Toggle cursor visibility for blinking effect.
    pub fn toggle_cursor(&mut self) {
        self.cursor_visible = !self.cursor_visible;
    }
}

/// The request currently in flight.
#[derive(Debug)]
struct PendingReply {
    rx: mpsc::UnboundedReceiver<ReplyEvent>,
    /// Transcript index of the assistant message streamed text goes into.
    reply_index: Option<usize>,
}

/// Application state: sidebar and chat view.
pub struct App {
    /// Chat state: messages, input, cursor
    pub chat: ChatState,
    /// Transcript scroll position
    pub scroll: ScrollState,
    /// Story library sidebar
    pub sidebar: Sidebar,
    /// Which pane has keyboard focus
    pub focus: Focus,
    /// Animation state: cursor blink, typing dots
    pub animation: AnimationState,
    /// Current connection status
    pub status: ConnectionStatus,
    /// Toast notifications
    pub toasts: ToastState,
    client: ChatClient,
    session: String,
    pending: Option<PendingReply>,
    health_rx: Option<oneshot::Receiver<TransportResult<()>>>,
}

impl App {
    /// Create a new App talking to `client` under `session`.
    pub fn new(client: ChatClient, session: impl Into<String>, catalog: PromptCatalog) -> Self {
        Self {
            chat: ChatState::default(),
            scroll: ScrollState::default(),
            sidebar: Sidebar::new(catalog),
            focus: Focus::default(),
            animation: AnimationState::default(),
            status: ConnectionStatus::Ready,
            toasts: ToastState::default(),
            client,
            session: session.into(),
            pending: None,
            health_rx: None,
        }
    }

    /// Create a new App from config, resolving the service settings.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client_config = ClientConfig::from_env_and_config(&config.service)?;
        tracing::info!(
            endpoint = %client_config.endpoint,
            transport = client_config.kind.display_name(),
            session = %client_config.session,
            "starting chat"
        );

        let client = ChatClient::new(&client_config);
        let catalog = PromptCatalog::from_config(&config.catalog);
        Ok(Self::new(client, client_config.session, catalog))
    }

    pub fn session(&self) -> &str {
        &self.session
    }

    /// Whether a reply is pending. Drives the typing indicator.
    pub fn is_typing(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether any background work needs fast polling.
    pub fn is_busy(&self) -> bool {
        self.pending.is_some() || self.health_rx.is_some()
    }

    /// Send a message.
    ///
    /// Uses `text` when it is non-blank, the draft otherwise. Blank messages
    /// are ignored, and so is anything sent while a reply is still pending.
    pub fn send(&mut self, text: Option<&str>) -> SendOutcome {
        let text = match text {
            Some(t) if !t.trim().is_empty() => t.to_string(),
            _ => self.chat.input.clone(),
        };
        if text.trim().is_empty() {
            return SendOutcome::Blank;
        }
        if self.is_typing() {
            self.toasts.warning("The storyteller is still busy. One moment!");
            return SendOutcome::Busy;
        }

        self.push_message(Message::user(text.clone()));
        self.chat.clear_input();

        tracing::info!(chars = text.chars().count(), "sending message");
        let rx = self.client.request(&self.session, &text);
        self.pending = Some(PendingReply {
            rx,
            reply_index: None,
        });
        self.status = ConnectionStatus::Waiting;
        SendOutcome::Sent
    }

    /// Send a prompt picked from the sidebar.
    pub fn on_prompt_selected(&mut self, text: &str) -> SendOutcome {
        self.send(Some(text))
    }

    /// Dispatch an event coming from the sidebar.
    pub fn handle_sidebar_event(&mut self, event: SidebarEvent) {
        match event {
            SidebarEvent::PromptSelected(text) => {
                self.on_prompt_selected(&text);
            }
        }
    }

    /// Apply every reply event that has already arrived. Call this in the
    /// event loop.
    pub fn process_reply(&mut self) {
        loop {
            let Some(pending) = self.pending.as_mut() else {
                return;
            };
            match pending.rx.try_recv() {
                Ok(event) => self.apply_event(event),
                Err(mpsc::error::TryRecvError::Empty) => return,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    self.apply_event(ReplyEvent::Error(TransportError::Closed));
                    return;
                }
            }
        }
    }

    /// Wait until the pending reply, if any, has resolved.
    pub async fn wait_for_reply(&mut self) {
        while let Some(pending) = self.pending.as_mut() {
            let event = pending
                .rx
                .recv()
                .await
                .unwrap_or(ReplyEvent::Error(TransportError::Closed));
            self.apply_event(event);
        }
    }

    fn apply_event(&mut self, event: ReplyEvent) {
        match event {
            ReplyEvent::Chunk(text) => self.append_chunk(text),
            ReplyEvent::Reply(reply) => {
                let reply_index = self.release();
                self.status = ConnectionStatus::Ready;
                self.put_reply(reply_index, reply.into_text());
            }
            ReplyEvent::Done => {
                let reply_index = self.release();
                self.status = ConnectionStatus::Ready;
                if reply_index.is_none() {
                    tracing::warn!("stream ended without any text");
                    self.push_message(Message::assistant(FALLBACK_REPLY));
                }
            }
            ReplyEvent::Error(e) => {
                let reply_index = self.release();
                tracing::warn!(error = %e, "request failed");
                self.status = ConnectionStatus::Error(e.to_string());
                self.toasts.error(e.to_string());
                if reply_index.is_none() {
                    self.push_message(Message::assistant(FALLBACK_REPLY));
                }
            }
        }
    }

    /// Drop the pending request, clearing the typing indicator. Returns the
    /// index of the streamed reply message, if one was started.
    fn release(&mut self) -> Option<usize> {
        self.pending.take().and_then(|p| p.reply_index)
    }

    fn append_chunk(&mut self, text: String) {
        let Some(pending) = self.pending.as_mut() else {
            return;
        };
        match pending.reply_index {
            Some(i) => self.chat.messages[i].content.push_str(&text),
            None => {
                pending.reply_index = Some(self.chat.messages.len());
                self.push_message(Message::assistant(text));
            }
        }
    }

    fn put_reply(&mut self, reply_index: Option<usize>, text: String) {
        match reply_index {
            Some(i) => self.chat.messages[i].content = text,
            None => self.push_message(Message::assistant(text)),
        }
    }

    /// Append a message and bring the newest content into view.
    fn push_message(&mut self, message: Message) {
        tracing::debug!(
            role = message.role.as_str(),
            chars = message.content.chars().count(),
            "message added"
        );
        self.chat.messages.push(message);
        self.scroll.scroll_to_bottom();
    }

    /// Kick off the startup health check.
    pub fn start_health_check(&mut self) {
        let (tx, rx) = oneshot::channel();
        let client = self.client.clone();
        self.health_rx = Some(rx);
        self.status = ConnectionStatus::Checking;

        tokio::spawn(async move {
            let _ = tx.send(client.health().await);
        });
    }

    /// Apply the health check result once it arrives.
    pub fn process_health(&mut self) {
        let Some(mut rx) = self.health_rx.take() else {
            return;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(oneshot::error::TryRecvError::Empty) => {
                self.health_rx = Some(rx);
                return;
            }
            Err(oneshot::error::TryRecvError::Closed) => Err(TransportError::Closed),
        };

        // A send may have started while the check was running.
        if self.status != ConnectionStatus::Checking {
            return;
        }
        match result {
            Ok(()) => {
                tracing::info!("storyteller is up");
                self.toasts.success("Connected to the storyteller");
                self.status = ConnectionStatus::Ready;
            }
            Err(e) => {
                tracing::warn!(error = %e, "health check failed");
                self.toasts.warning(format!("Storyteller looks offline: {}", e));
                self.status = ConnectionStatus::Offline(e.to_string());
            }
        }
    }

    /// Switch keyboard focus between the sidebar and the input.
    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Sidebar => Focus::Input,
            Focus::Input => Focus::Sidebar,
        };
    }

    /// Toggle cursor visibility for blinking effect.
    pub fn toggle_cursor(&mut self) {
        self.animation.toggle_cursor();
    }

    /// Advance per-frame animations and expire toasts.
    pub fn tick(&mut self) {
        if self.is_typing() {
            self.animation.typing_frame = self.animation.typing_frame.wrapping_add(1);
        }
        self.toasts.tick();
    }

    /// Number of messages sent by `role`.
    pub fn count(&self, role: Role) -> usize {
        self.chat.messages.iter().filter(|m| m.role == role).count()
    }
}
