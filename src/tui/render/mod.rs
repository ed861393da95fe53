pub mod details_popup;
pub mod format;
pub mod geometry;
pub mod help_overlay;
pub mod popup;
pub mod stats_popup;
pub mod status_row;

#[cfg(test)]
pub(crate) mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph};

use super::overlay::OverlayKind;
use super::state::BoardState;
use popup::{PopupLayout, max_scroll, popup_layout};

/// Main render function: board, status row, then overlays bottom to top
pub fn render(frame: &mut Frame, state: &BoardState) {
    let area = frame.area();

    let bg_style = Style::default().bg(state.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    // Layout: board | status row (1 row)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);

    let search_re = state.search_regex();
    let lines = state
        .board
        .compose_lines(&state.theme, state.original_tasks(), search_re.as_ref());
    frame.render_widget(Paragraph::new(lines).style(bg_style), chunks[0]);

    status_row::render_status_row(frame, state, chunks[1]);

    if state.overlays.is_empty() {
        return;
    }
    let layout = popup_layout(area, state.settings.popup_percent);
    for overlay in state.overlays.iter() {
        match overlay.kind {
            OverlayKind::Details => details_popup::render_details_popup(frame, state, &layout),
            OverlayKind::Help => help_overlay::render_help_overlay(frame, state, &layout),
            OverlayKind::Stats => stats_popup::render_stats_popup(frame, state, &layout),
        }
    }
}

/// Popup content for `kind`, wrapped to `width` where it wraps at all
pub fn overlay_lines(state: &BoardState, kind: OverlayKind, width: usize) -> Vec<Line<'static>> {
    match kind {
        OverlayKind::Details => details_popup::details_lines(state, width),
        OverlayKind::Help => help_overlay::help_lines(&state.theme),
        OverlayKind::Stats => stats_popup::stats_lines(state),
    }
}

fn current_popup_layout(state: &BoardState) -> PopupLayout {
    let (width, height) = state.terminal_size();
    popup_layout(Rect::new(0, 0, width, height), state.settings.popup_percent)
}

/// Largest scroll offset the `kind` popup accepts at the current size
pub fn overlay_max_scroll(state: &BoardState, kind: OverlayKind) -> usize {
    let layout = current_popup_layout(state);
    max_scroll(&layout, overlay_lines(state, kind, layout.content_width).len())
}

#[cfg(test)]
mod tests {
    use super::test_helpers::render_state;
    use super::*;
    use crate::model::task::{Task, TaskStatus};
    use crate::tui::input::test_support::{state_with, task_with_status};

    fn sample() -> Vec<Task> {
        vec![
            Task::new(1, "Set up repo"),
            task_with_status(2, TaskStatus::InProgress),
            task_with_status(3, TaskStatus::Done),
        ]
    }

    #[test]
    fn board_shows_three_lanes_and_status_row() {
        let state = state_with(sample());
        let out = render_state(&state, 120, 31);
        let rows: Vec<&str> = out.lines().collect();
        assert!(rows[0].contains("Pending 1"));
        assert!(rows[0].contains("In Progress 1"));
        assert!(rows[0].contains("Done 1"));
        assert!(out.contains("Set up repo"));
        assert!(rows[30].contains("33% done"));
    }

    #[test]
    fn help_overlay_drawn_over_board() {
        let mut state = state_with(sample());
        state.open_overlay(OverlayKind::Help);
        let out = render_state(&state, 120, 31);
        assert!(out.contains(" Help "));
        assert!(out.contains("Undo last status change"));
    }

    #[test]
    fn topmost_overlay_wins() {
        let mut state = state_with(sample());
        state.open_overlay(OverlayKind::Help);
        state.open_overlay(OverlayKind::Stats);
        let out = render_state(&state, 120, 31);
        assert!(out.contains(" Statistics "));
        assert!(!out.contains(" Help "));
    }

    #[test]
    fn help_scrolls_on_short_terminal() {
        let mut state = state_with(sample());
        state.resize(80, 16);
        assert!(overlay_max_scroll(&state, OverlayKind::Help) > 0);
        state.resize(120, 60);
        assert_eq!(overlay_max_scroll(&state, OverlayKind::Help), 0);
    }
}
