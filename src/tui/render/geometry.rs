//! Sizing and line-building primitives shared by the board, lanes and popups.
//!
//! Lines are composed from styled spans; widths are measured in terminal
//! cells and a span's style always travels with its text.

use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};

use crate::util::unicode::{display_width, take_width};

pub const ELLIPSIS: &str = "\u{2026}";

/// Minimum lane width in cells
pub const MIN_COLUMN_WIDTH: usize = 20;

/// Width of each of `n` lanes separated by `gutter` cells, leaving a
/// two-cell margin. Never narrower than [`MIN_COLUMN_WIDTH`].
pub fn column_widths(terminal_width: usize, n: usize, gutter: usize) -> usize {
    let n = n.max(1);
    let reserved = gutter * (n - 1) + 2;
    (terminal_width.saturating_sub(reserved) / n).max(MIN_COLUMN_WIDTH)
}

/// Compute total display width of a line
pub fn line_width(line: &Line) -> usize {
    line.spans
        .iter()
        .map(|s| display_width(&s.content))
        .sum()
}

/// Cut `line` to `width` cells, ending in `ellipsis` when anything was cut.
/// The ellipsis takes the style of the last span it follows.
pub fn truncate_line(line: Line<'static>, width: usize, ellipsis: &str) -> Line<'static> {
    if line_width(&line) <= width {
        return line;
    }
    let line_style = line.style;
    let ellipsis_width = display_width(ellipsis);
    if width < ellipsis_width {
        return Line::from(Span::raw(take_width(ellipsis, width).to_string())).style(line_style);
    }
    let budget = width - ellipsis_width;

    let mut used = 0;
    let mut last_style = Style::default();
    let mut spans: Vec<Span<'static>> = Vec::new();
    for span in line.spans {
        let w = display_width(&span.content);
        last_style = span.style;
        if used + w <= budget {
            used += w;
            spans.push(span);
            continue;
        }
        let part = take_width(&span.content, budget - used).to_string();
        if !part.is_empty() {
            spans.push(Span::styled(part, span.style));
        }
        break;
    }
    spans.push(Span::styled(ellipsis.to_string(), last_style));
    Line::from(spans).style(line_style)
}

/// Truncate or right-pad `line` to exactly `width` cells.
pub fn fit_line(line: Line<'static>, width: usize, fill: Style) -> Line<'static> {
    let mut line = truncate_line(line, width, ELLIPSIS);
    let pad = width.saturating_sub(line_width(&line));
    if pad > 0 {
        line.spans.push(Span::styled(" ".repeat(pad), fill));
    }
    line
}

/// Wrap pre-truncated `content` between two vertical glyphs, padding the
/// interior to `width - line_width(content) - 2`. Returns an empty line when
/// `width < 2`.
pub fn bordered_line(
    content: Line<'static>,
    width: usize,
    left: &str,
    right: &str,
    border_style: Style,
    fill: Style,
) -> Line<'static> {
    if width < 2 {
        return Line::default();
    }
    let interior = width - 2;
    let content = truncate_line(content, interior, ELLIPSIS);
    let pad = interior.saturating_sub(line_width(&content));

    let mut spans = Vec::with_capacity(content.spans.len() + 3);
    spans.push(Span::styled(left.to_string(), border_style));
    spans.extend(content.spans);
    if pad > 0 {
        spans.push(Span::styled(" ".repeat(pad), fill));
    }
    spans.push(Span::styled(right.to_string(), border_style));
    Line::from(spans)
}

/// Horizontal border `left fill… right`, optionally carrying a label after
/// the first fill glyph: `╔═ Label ════╗`. Returns an empty line when
/// `width < 2`.
pub fn horizontal_border(
    width: usize,
    left: &str,
    fill: &str,
    right: &str,
    label: Option<Line<'static>>,
    border_style: Style,
) -> Line<'static> {
    if width < 2 {
        return Line::default();
    }
    let interior = width - 2;
    let mut spans = vec![Span::styled(left.to_string(), border_style)];
    let mut used = 0;
    if let Some(label) = label
        && interior >= 3
    {
        spans.push(Span::styled(fill.to_string(), border_style));
        let label = truncate_line(label, interior - 1, ELLIPSIS);
        used = 1 + line_width(&label);
        spans.extend(label.spans);
    }
    spans.push(Span::styled(fill.repeat(interior - used), border_style));
    spans.push(Span::styled(right.to_string(), border_style));
    Line::from(spans)
}

/// A rectangle `percent` of `area` in each dimension, clamped to at least
/// `min_w`×`min_h` but never larger than `area`, centered in `area`.
pub fn popup_rect(area: Rect, percent: u16, min_w: u16, min_h: u16) -> Rect {
    let percent = percent.min(100) as u32;
    let w = ((area.width as u32 * percent) / 100) as u16;
    let h = ((area.height as u32 * percent) / 100) as u16;
    let w = w.max(min_w).min(area.width);
    let h = h.max(min_h).min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    fn plain(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn column_widths_formula_and_floor() {
        assert_eq!(column_widths(120, 3, 2), 38);
        assert_eq!(column_widths(80, 3, 2), 24);
        assert_eq!(column_widths(40, 3, 2), MIN_COLUMN_WIDTH);
        assert_eq!(column_widths(0, 3, 2), MIN_COLUMN_WIDTH);
    }

    #[test]
    fn truncate_line_keeps_span_styles() {
        let red = Style::default().fg(Color::Red);
        let line = Line::from(vec![Span::styled("abc", red), Span::raw("defgh")]);
        let cut = truncate_line(line, 5, ELLIPSIS);
        assert_eq!(plain(&cut), "abcd\u{2026}");
        assert_eq!(cut.spans[0].style, red);
        assert_eq!(line_width(&cut), 5);
    }

    #[test]
    fn truncate_line_identity_when_fits() {
        let line = Line::from("short");
        assert_eq!(plain(&truncate_line(line, 10, ELLIPSIS)), "short");
    }

    #[test]
    fn truncate_line_narrower_than_ellipsis() {
        let cut = truncate_line(Line::from("hello"), 1, "...");
        assert_eq!(plain(&cut), ".");
        assert_eq!(plain(&truncate_line(Line::from("hello"), 0, "...")), "");
    }

    #[test]
    fn bordered_line_pads_interior() {
        let line = bordered_line(
            Line::from("hi"),
            6,
            "\u{2551}",
            "\u{2551}",
            Style::default(),
            Style::default(),
        );
        assert_eq!(plain(&line), "\u{2551}hi  \u{2551}");
        assert_eq!(line_width(&line), 6);
    }

    #[test]
    fn bordered_line_too_narrow_is_empty() {
        let line = bordered_line(
            Line::from("hi"),
            1,
            "|",
            "|",
            Style::default(),
            Style::default(),
        );
        assert!(line.spans.is_empty());
        let two = bordered_line(Line::from("hi"), 2, "|", "|", Style::default(), Style::default());
        assert_eq!(plain(&two), "||");
    }

    #[test]
    fn horizontal_border_with_label() {
        let line = horizontal_border(
            12,
            "\u{2554}",
            "\u{2550}",
            "\u{2557}",
            Some(Line::from(" Todo ")),
            Style::default(),
        );
        assert_eq!(plain(&line), "\u{2554}\u{2550} Todo \u{2550}\u{2550}\u{2550}\u{2557}");
        assert_eq!(line_width(&line), 12);
    }

    #[test]
    fn popup_rect_is_centered_and_clamped() {
        let area = Rect::new(0, 0, 120, 40);
        let r = popup_rect(area, 75, 40, 10);
        assert_eq!((r.width, r.height), (90, 30));
        assert_eq!((r.x, r.y), (15, 5));

        let tiny = Rect::new(0, 0, 30, 8);
        let r = popup_rect(tiny, 75, 40, 10);
        assert_eq!((r.width, r.height), (30, 8));
        assert_eq!((r.x, r.y), (0, 0));
    }
}
