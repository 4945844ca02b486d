use ratatui::{buffer::Buffer, layout::Rect, style::Color};

/// Create a gradient color between two RGB values.
///
/// # Arguments
/// * `start` - Starting RGB color
/// * `end` - Ending RGB color
/// * `position` - Position in gradient (0.0 to 1.0)
pub fn gradient_color(start: (u8, u8, u8), end: (u8, u8, u8), position: f32) -> Color {
    let position = position.clamp(0.0, 1.0);
    let r = (start.0 as f32 + (end.0 as f32 - start.0 as f32) * position) as u8;
    let g = (start.1 as f32 + (end.1 as f32 - start.1 as f32) * position) as u8;
    let b = (start.2 as f32 + (end.2 as f32 - start.2 as f32) * position) as u8;
    Color::Rgb(r, g, b)
}

/// Recolor the border cells of `area` with a left-to-right gradient.
///
/// Call after the bordered widget has been rendered; only foreground colors
/// change, so titles drawn on the border keep their symbols.
pub fn paint_gradient_border(buf: &mut Buffer, area: Rect, start: (u8, u8, u8), end: (u8, u8, u8)) {
    let area = area.intersection(buf.area);
    if area.width == 0 || area.height == 0 {
        return;
    }

    let span = area.width.saturating_sub(1).max(1) as f32;
    let color_at = |x: u16| gradient_color(start, end, (x - area.left()) as f32 / span);

    for x in area.left()..area.right() {
        let color = color_at(x);
        buf.get_mut(x, area.top()).set_fg(color);
        buf.get_mut(x, area.bottom() - 1).set_fg(color);
    }
    for y in area.top()..area.bottom() {
        buf.get_mut(area.left(), y).set_fg(color_at(area.left()));
        buf.get_mut(area.right() - 1, y).set_fg(color_at(area.right() - 1));
    }
}
