use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        block::{Padding, Position, Title},
        Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation,
    },
    Frame,
};

use crate::app::{App, ConnectionStatus, Focus};
use crate::config::Config;
use crate::message::Role;
use crate::sidebar::SidebarRow;

use super::gradient::{gradient_color, paint_gradient_border};
use super::text::{message_lines, typing_indicator};
use super::toast::render_toasts;

/// Prefix drawn in front of every prompt in the sidebar.
const PROMPT_BULLET: &str = "   * ";

/// Main UI rendering function.
pub fn ui(f: &mut Frame, app: &mut App, config: &Config) {
    let colors = &config.colors;

    let background = Block::default().style(Style::default().bg(Color::Black));
    f.render_widget(background, f.size());

    let inner_area = f.size().inner(&Margin {
        horizontal: 1,
        vertical: 0,
    });
    let inner_bg = Block::default().style(Style::default().bg(colors.bg_primary()));
    f.render_widget(inner_bg, inner_area);

    // Sidebar (left) and chat (right)
    let sidebar_width = config.behavior.sidebar_width.min(inner_area.width / 2);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(sidebar_width), Constraint::Min(20)])
        .split(inner_area);

    render_sidebar(f, app, config, columns[0]);

    // Chat: transcript (top) and input row (bottom)
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(columns[1]);

    render_transcript(f, app, config, rows[0]);
    render_input_row(f, app, config, rows[1]);

    render_toasts(f, &app.toasts);
}

/// Render the story library as an accordion.
fn render_sidebar(f: &mut Frame, app: &App, config: &Config, area: Rect) {
    let colors = &config.colors;
    let focused = app.focus == Focus::Sidebar;
    let inner_width = area.width.saturating_sub(2) as usize;

    let catalog = app.sidebar.catalog();
    let mut lines: Vec<Line> = Vec::new();
    let mut cursor_lines = 0..0;

    for (row_index, row) in app.sidebar.rows().into_iter().enumerate() {
        let start = lines.len();

        match row {
            SidebarRow::Category(i) => {
                let open = app.sidebar.is_expanded(i);
                let arrow = if open { "▲" } else { "▼" };
                let style = if open {
                    Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
                };
                lines.push(Line::from(vec![
                    Span::styled(format!(" {} ", arrow), style),
                    Span::styled(catalog.categories()[i].name.clone(), style),
                ]));
            }
            SidebarRow::Prompt { category, prompt } => {
                let text = &catalog.categories()[category].prompts[prompt];
                let style = Style::default().fg(Color::Rgb(200, 200, 210));
                for line in message_lines(PROMPT_BULLET, text, inner_width) {
                    lines.push(Line::from(Span::styled(line, style)));
                }
            }
        }

        if focused && row_index == app.sidebar.cursor() {
            cursor_lines = start..lines.len();
            let highlight = Style::default().bg(Color::Rgb(60, 60, 80));
            for line in &mut lines[start..] {
                line.style = highlight;
            }
        }
    }

    // Keep the cursor row in view.
    let height = area.height.saturating_sub(2) as usize;
    let scroll = cursor_lines.end.saturating_sub(height);

    let hint = if focused {
        " ↑↓ move · Enter pick · Tab chat "
    } else {
        " Tab to browse "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Title::from(Span::styled(
            " Story Library ",
            Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
        )))
        .title(
            Title::from(Span::styled(hint, Style::default().fg(Color::DarkGray)))
                .position(Position::Bottom)
                .alignment(Alignment::Center),
        );

    let paragraph = Paragraph::new(lines)
        .block(block)
        .scroll((scroll.min(u16::MAX as usize) as u16, 0));
    f.render_widget(paragraph, area);

    let (start, end) = colors.sidebar_gradient();
    paint_gradient_border(f.buffer_mut(), area, start, end);
}

/// Render the conversation, the typing indicator and the scrollbar.
fn render_transcript(f: &mut Frame, app: &mut App, config: &Config, area: Rect) {
    let colors = &config.colors;
    let (chat_start, chat_end) = colors.chat_gradient();

    // Borders plus one column for the scrollbar
    let width = area.width.saturating_sub(3) as usize;
    let mut lines: Vec<Line> = Vec::new();

    if app.chat.messages.is_empty() && !app.is_typing() {
        lines.push(Line::from(Span::styled(
            "Pick a story from the library, or type a message below.",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    for msg in &app.chat.messages {
        let style = match msg.role {
            Role::User => Style::default().fg(colors.user()),
            Role::Assistant => Style::default().fg(colors.assistant()),
        };
        let prefix = msg.role.prefix();

        for (i, line) in message_lines(prefix, &msg.content, width).into_iter().enumerate() {
            if i == 0 {
                let body = line[prefix.len()..].to_string();
                lines.push(Line::from(vec![
                    Span::styled(prefix, style.add_modifier(Modifier::BOLD)),
                    Span::styled(body, style),
                ]));
            } else {
                lines.push(Line::from(Span::styled(line, style)));
            }
        }

        // Empty line between messages
        lines.push(Line::from(""));
    }

    if app.is_typing() {
        lines.push(Line::from(Span::styled(
            typing_indicator(app.animation.typing_frame),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    let height = area.height.saturating_sub(2) as usize;
    let total_lines = lines.len();
    let max_offset = total_lines.saturating_sub(height);
    app.scroll.update(total_lines, max_offset);
    let first_line = max_offset - app.scroll.offset;

    let (status_text, status_color) = match &app.status {
        ConnectionStatus::Checking => ("● Connecting...", colors.status_busy()),
        ConnectionStatus::Ready => ("● Ready", colors.status_ready()),
        ConnectionStatus::Waiting => ("● Thinking...", colors.status_busy()),
        ConnectionStatus::Offline(_) => ("● Offline", colors.status_error()),
        ConnectionStatus::Error(_) => ("● Error", colors.status_error()),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Title::from(Span::styled(
            " Story Time ",
            Style::default()
                .fg(gradient_color(chat_start, chat_end, 0.0))
                .add_modifier(Modifier::BOLD),
        )))
        .title(
            Title::from(Span::styled(
                format!(" {} ", status_text),
                Style::default().fg(status_color),
            ))
            .alignment(Alignment::Right),
        );

    let paragraph = Paragraph::new(lines)
        .block(block)
        .scroll((first_line.min(u16::MAX as usize) as u16, 0));
    f.render_widget(paragraph, area);
    paint_gradient_border(f.buffer_mut(), area, chat_start, chat_end);

    let scroll_position = if max_offset > 0 {
        first_line as f32 / max_offset as f32
    } else {
        1.0
    };
    let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
        .begin_symbol(Some("▲"))
        .end_symbol(Some("▼"))
        .track_symbol(Some("░"))
        .thumb_symbol("█")
        .style(Style::default().fg(gradient_color(chat_start, chat_end, scroll_position)));

    if max_offset > 0 {
        f.render_stateful_widget(
            scrollbar,
            area.inner(&Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut app.scroll.scrollbar,
        );
    }
}

/// Render the draft input and the Send button.
fn render_input_row(f: &mut Frame, app: &App, config: &Config, area: Rect) {
    let colors = &config.colors;
    let focused = app.focus == Focus::Input;

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(10)])
        .split(area);

    let cursor_char = if focused && app.animation.cursor_visible {
        "▎"
    } else {
        " "
    };
    let cursor = Span::styled(
        cursor_char,
        Style::default().fg(colors.accent()).add_modifier(Modifier::SLOW_BLINK),
    );

    let input_text = if app.chat.input.is_empty() {
        Line::from(vec![
            cursor,
            Span::styled(
                "Type your message...",
                Style::default().fg(Color::DarkGray),
            ),
        ])
    } else {
        let (before, after) = app.chat.split_at_cursor();
        Line::from(vec![Span::raw(before), cursor, Span::raw(after)])
    };

    let border_color = if focused {
        colors.accent()
    } else {
        Color::DarkGray
    };
    let input_block = Block::default()
        .borders(Borders::LEFT)
        .border_style(Style::default().fg(border_color))
        .padding(Padding::new(1, 0, 1, 0))
        .style(Style::default().bg(colors.bg_secondary()));

    let input = Paragraph::new(input_text)
        .style(Style::default().fg(Color::White))
        .block(input_block);
    f.render_widget(input, columns[0]);

    // Disabled while a reply is pending
    let send_color = if app.is_typing() {
        Color::DarkGray
    } else {
        colors.accent()
    };
    let send = Paragraph::new(Span::styled(
        "Send",
        Style::default().fg(send_color).add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(send_color)),
    );
    f.render_widget(send, columns[1]);
}
