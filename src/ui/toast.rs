//! Toast notifications for transient status messages.
//!
//! Toasts appear in the top-right corner and expire on their own.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Toast level, deciding color and lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Warning,
    Error,
}

impl ToastLevel {
    pub fn color(&self) -> Color {
        match self {
            ToastLevel::Success => Color::Green,
            ToastLevel::Warning => Color::Yellow,
            ToastLevel::Error => Color::Red,
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            ToastLevel::Success => "[+]",
            ToastLevel::Warning => "[!]",
            ToastLevel::Error => "[x]",
        }
    }

    pub fn default_duration(&self) -> Duration {
        match self {
            ToastLevel::Success => Duration::from_secs(3),
            ToastLevel::Warning => Duration::from_secs(5),
            ToastLevel::Error => Duration::from_secs(8),
        }
    }
}

/// A single toast notification.
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub level: ToastLevel,
    pub created_at: Instant,
    pub duration: Duration,
}

impl Toast {
    pub fn new(message: impl Into<String>, level: ToastLevel) -> Self {
        Self {
            message: message.into(),
            level,
            created_at: Instant::now(),
            duration: level.default_duration(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.duration
    }
}

/// Queue of active toasts, oldest first.
#[derive(Debug)]
pub struct ToastState {
    pub toasts: VecDeque<Toast>,
    pub max_visible: usize,
}

impl Default for ToastState {
    fn default() -> Self {
        Self {
            toasts: VecDeque::new(),
            max_visible: 3,
        }
    }
}

impl ToastState {
    /// Add a toast, dropping the oldest ones beyond `max_visible`.
    pub fn push(&mut self, message: impl Into<String>, level: ToastLevel) {
        self.toasts.push_back(Toast::new(message, level));
        while self.toasts.len() > self.max_visible {
            self.toasts.pop_front();
        }
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(message, ToastLevel::Success)
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(message, ToastLevel::Warning)
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(message, ToastLevel::Error)
    }

    /// Remove expired toasts. Call once per frame.
    pub fn tick(&mut self) {
        self.toasts.retain(|t| !t.is_expired());
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }
}

/// Shorten `text` to at most `max` characters, marking the cut with "...".
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Render toasts stacked in the top-right corner of the frame.
pub fn render_toasts(f: &mut Frame, toast_state: &ToastState) {
    if toast_state.is_empty() {
        return;
    }

    let frame_area = f.size();
    let toast_width = 44u16.min(frame_area.width.saturating_sub(4));
    let toast_height = 3u16;
    let start_x = frame_area.width.saturating_sub(toast_width + 2);

    for (i, toast) in toast_state.toasts.iter().enumerate() {
        let y = 1 + (i as u16) * toast_height;
        if y + toast_height > frame_area.height {
            break;
        }

        let area = Rect::new(start_x, y, toast_width, toast_height);
        f.render_widget(Clear, area);

        let color = toast.level.color();
        let prefix = toast.level.prefix();
        let max_len = (toast_width as usize).saturating_sub(prefix.len() + 4);

        let content = Line::from(vec![
            Span::styled(prefix, Style::default().fg(color)),
            Span::raw(" "),
            Span::styled(truncate(&toast.message, max_len), Style::default().fg(Color::White)),
        ]);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .style(Style::default().bg(Color::Black));

        f.render_widget(Paragraph::new(content).block(block), area);
    }
}
