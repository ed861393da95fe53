use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::task::Lane;
use crate::tui::input::controls::describe_filters;
use crate::tui::modal::Modal;
use crate::tui::state::{BoardState, MessageKind};
use crate::util::unicode::display_width;

use super::format::compact_summary;
use super::geometry::{ELLIPSIS, line_width, truncate_line};

/// Append right-aligned `hint` when it fits after the content
fn with_hint(
    mut spans: Vec<Span<'static>>,
    hint: &str,
    width: usize,
    style: Style,
    fill: Style,
) -> Line<'static> {
    let content_width: usize = spans.iter().map(|s| display_width(&s.content)).sum();
    let hint_width = display_width(hint);
    if content_width + hint_width < width {
        let padding = width - content_width - hint_width;
        spans.push(Span::styled(" ".repeat(padding), fill));
        spans.push(Span::styled(hint.to_string(), style));
    }
    truncate_line(Line::from(spans), width, ELLIPSIS)
}

/// The status bar for the current mode
pub fn status_line(state: &BoardState, width: usize) -> Line<'static> {
    let theme = &state.theme;
    let bg = theme.background;
    let fill = Style::default().bg(bg);
    let dim = Style::default().fg(theme.dim).bg(bg);
    let bright = Style::default().fg(theme.text_bright).bg(bg);
    let cursor = Span::styled("\u{258C}", Style::default().fg(theme.highlight).bg(bg));

    match &state.modal {
        Modal::Search { buffer } => with_hint(
            vec![Span::styled(format!("/{}", buffer), bright), cursor],
            "Enter search  Esc cancel",
            width,
            dim,
            fill,
        ),
        Modal::EditTitle { task_id, buffer } => with_hint(
            vec![
                Span::styled(format!("Title #{}: ", task_id), dim),
                Span::styled(buffer.clone(), bright),
                cursor,
            ],
            "Enter save  Esc cancel",
            width,
            dim,
            fill,
        ),
        Modal::ConfirmDelete { task_id } => {
            let summary = state
                .find_task(*task_id)
                .map(|t| compact_summary(t, width.saturating_sub(20)))
                .unwrap_or_else(|| format!("#{}", task_id));
            with_hint(
                vec![
                    Span::styled(
                        "Delete ",
                        Style::default()
                            .fg(theme.red)
                            .bg(bg)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(summary, bright),
                    Span::styled("? ", bright),
                ],
                "y delete  n/Esc keep",
                width,
                dim,
                fill,
            )
        }
        Modal::AnyKey => with_hint(Vec::new(), "Press any key to return", width, dim, fill),
        Modal::None => {
            if let Some(message) = &state.message {
                let color = match message.kind {
                    MessageKind::Info => theme.text_bright,
                    MessageKind::Error => theme.red,
                };
                let text = Span::styled(message.text.clone(), Style::default().fg(color).bg(bg));
                return truncate_line(Line::from(text), width, ELLIPSIS);
            }
            summary_line(state, width)
        }
    }
}

/// Lane counts, completion, active filters and a key hint
fn summary_line(state: &BoardState, width: usize) -> Line<'static> {
    let theme = &state.theme;
    let bg = theme.background;
    let fill = Style::default().bg(bg);
    let dim = Style::default().fg(theme.dim).bg(bg);
    let stats = state.board.statistics();

    let mut spans = Vec::new();
    for (lane, count) in [
        (Lane::Pending, stats.pending),
        (Lane::InProgress, stats.in_progress),
        (Lane::Done, stats.done),
    ] {
        spans.push(Span::styled(
            format!("{} {}  ", lane.glyph(), count),
            Style::default().fg(theme.status_color(&lane.status())).bg(bg),
        ));
    }
    spans.push(Span::styled(
        format!("{}% done", stats.completion_percent),
        Style::default().fg(theme.green).bg(bg),
    ));
    let filters = describe_filters(state);
    if !filters.is_empty() {
        spans.push(Span::styled(
            format!("  [{}]", filters),
            Style::default().fg(theme.yellow).bg(bg),
        ));
    }
    with_hint(spans, "? help  q quit", width, dim, fill)
}

pub fn render_status_row(frame: &mut Frame, state: &BoardState, area: Rect) {
    let line = status_line(state, area.width as usize);
    if state.modal.shows_cursor() {
        // Cursor sits on the ▌ glyph, just after the typed text
        let before_cursor = line_width(&line).min(area.width as usize);
        let offset = line
            .spans
            .iter()
            .take_while(|s| s.content != "\u{258C}")
            .map(|s| display_width(&s.content))
            .sum::<usize>()
            .min(before_cursor);
        frame.set_cursor_position(Position::new(area.x + offset as u16, area.y));
    }
    let paragraph = Paragraph::new(line).style(Style::default().bg(state.theme.background));
    frame.render_widget(paragraph, area);
}
