use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};

use crate::tui::theme::Theme;

use super::geometry::{ELLIPSIS, fit_line, popup_rect, truncate_line};

pub const POPUP_MIN_WIDTH: u16 = 40;
pub const POPUP_MIN_HEIGHT: u16 = 10;

/// Where a popup sits and how much text it shows at once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupLayout {
    pub area: Rect,
    pub content_width: usize,
    /// Rows for scrolled content; the last inner row is the hint line
    pub content_height: usize,
}

pub fn popup_layout(screen: Rect, percent: u16) -> PopupLayout {
    let area = popup_rect(screen, percent, POPUP_MIN_WIDTH, POPUP_MIN_HEIGHT);
    PopupLayout {
        area,
        content_width: area.width.saturating_sub(4) as usize,
        content_height: area.height.saturating_sub(3) as usize,
    }
}

/// Largest useful scroll offset for `line_count` lines of content
pub fn max_scroll(layout: &PopupLayout, line_count: usize) -> usize {
    line_count.saturating_sub(layout.content_height)
}

/// Draw a bordered popup over whatever is beneath it: `lines` from
/// `scroll` on, then a dim hint on the bottom inner row.
pub fn render_popup(
    frame: &mut Frame,
    layout: &PopupLayout,
    title: &str,
    lines: Vec<Line<'static>>,
    scroll: usize,
    hint: &str,
    theme: &Theme,
) {
    let bg = theme.background;
    let fill = Style::default().bg(bg);
    frame.render_widget(Clear, layout.area);

    let scroll = scroll.min(max_scroll(layout, lines.len()));
    let total = lines.len();
    let mut body: Vec<Line<'static>> = lines
        .into_iter()
        .skip(scroll)
        .take(layout.content_height)
        .map(|line| {
            let mut padded = vec![Span::styled(" ", fill)];
            padded.extend(fit_line(line, layout.content_width, fill).spans);
            Line::from(padded)
        })
        .collect();
    while body.len() < layout.content_height {
        body.push(Line::default());
    }

    let position = if total > layout.content_height {
        format!(
            "  {}-{}/{}",
            scroll + 1,
            (scroll + layout.content_height).min(total),
            total
        )
    } else {
        String::new()
    };
    let hint_line = Line::from(vec![
        Span::styled(" ", fill),
        Span::styled(format!("{}{}", hint, position), Style::default().fg(theme.dim).bg(bg)),
    ]);
    body.push(truncate_line(hint_line, layout.content_width + 1, ELLIPSIS));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.highlight).bg(bg))
        .title(Span::styled(
            format!(" {} ", title),
            Style::default()
                .fg(theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ))
        .style(fill);

    frame.render_widget(Paragraph::new(body).block(block).style(fill), layout.area);
}

/// `label` padded to a fixed column, then the value spans
pub fn field_line(label: &str, value: Vec<Span<'static>>, theme: &Theme) -> Line<'static> {
    let mut spans = vec![Span::styled(
        format!("{:<14}", label),
        Style::default().fg(theme.dim),
    )];
    spans.extend(value);
    Line::from(spans)
}

pub fn heading(text: &str, theme: &Theme) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default()
            .fg(theme.text_bright)
            .add_modifier(Modifier::BOLD),
    ))
}
