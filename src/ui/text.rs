/// Wrap text to fit within a given width.
///
/// Explicit line breaks are kept, so blank lines between story paragraphs
/// survive. Words longer than `width` get a line of their own. Widths are
/// counted in characters.
///
/// # Arguments
/// * `text` - The text to wrap
/// * `width` - Maximum width per line
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();

    for paragraph in text.trim_end_matches(['\n', '\r']).split('\n') {
        let mut current_line = String::new();
        let mut current_len = 0;

        for word in paragraph.split_whitespace() {
            let word_len = word.chars().count();
            if current_len > 0 && current_len + word_len + 1 > width {
                lines.push(std::mem::take(&mut current_line));
                current_len = 0;
            }

            if current_len > 0 {
                current_line.push(' ');
                current_len += 1;
            }
            current_line.push_str(word);
            current_len += word_len;
        }

        lines.push(current_line);
    }

    lines
}

/// Lay out one transcript message: `prefix` on the first line, continuation
/// lines indented to line up under the text.
pub fn message_lines(prefix: &str, content: &str, width: usize) -> Vec<String> {
    let indent = prefix.chars().count();
    wrap_text(content, width.saturating_sub(indent))
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                format!("{}{}", prefix, line)
            } else {
                format!("{}{}", " ".repeat(indent), line)
            }
        })
        .collect()
}

/// Text of the typing indicator for a given animation frame.
pub fn typing_indicator(frame: usize) -> String {
    let dots = match (frame / 10) % 3 {
        0 => "...",
        1 => ".",
        _ => "..",
    };
    format!("Assistant is typing{}", dots)
}
