use std::collections::BTreeMap;

use ratatui::Frame;
use ratatui::style::Style;
use ratatui::text::{Line, Span};

use crate::model::task::{Lane, Priority, TaskStatus};
use crate::ops::status::incomplete_dependencies;
use crate::tui::overlay::OverlayKind;
use crate::tui::state::BoardState;

use super::format::{priority_marker, status_glyph};
use super::popup::{PopupLayout, field_line, heading, render_popup};

const BAR_WIDTH: usize = 20;

fn bar(count: usize, total: usize) -> String {
    let filled = if total == 0 {
        0
    } else {
        (count * BAR_WIDTH + total / 2) / total
    };
    format!(
        "{}{}",
        "\u{2588}".repeat(filled),
        "\u{2591}".repeat(BAR_WIDTH - filled)
    )
}

pub fn stats_lines(state: &BoardState) -> Vec<Line<'static>> {
    let theme = &state.theme;
    let stats = state.board.statistics();
    let all = state.original_tasks();
    let text = Style::default().fg(theme.text);
    let dim = Style::default().fg(theme.dim);

    let mut lines = vec![heading("Board", theme)];
    let shown = if state.has_active_filters() {
        format!("{} of {} tasks (filtered)", stats.total, all.len())
    } else {
        format!("{} tasks", stats.total)
    };
    lines.push(field_line("Showing", vec![Span::styled(shown, text)], theme));
    for (lane, count) in [
        (Lane::Pending, stats.pending),
        (Lane::InProgress, stats.in_progress),
        (Lane::Done, stats.done),
    ] {
        let status = lane.status();
        lines.push(field_line(
            lane.title(),
            vec![
                Span::styled(
                    bar(count, stats.total),
                    Style::default().fg(theme.status_color(&status)),
                ),
                Span::styled(format!(" {}", count), text),
            ],
            theme,
        ));
    }
    lines.push(field_line(
        "Complete",
        vec![Span::styled(
            format!("{}%", stats.completion_percent),
            Style::default().fg(theme.green),
        )],
        theme,
    ));

    if stats.folded > 0 {
        let mut side: BTreeMap<String, usize> = BTreeMap::new();
        for column in state.board.columns() {
            for task in column.tasks().iter().filter(|t| t.status.is_folded()) {
                *side.entry(task.status.to_string()).or_default() += 1;
            }
        }
        lines.push(Line::default());
        lines.push(heading("Side statuses (shown in Pending)", theme));
        for (name, count) in side {
            let status = TaskStatus::parse(&name);
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {} ", status_glyph(&status)),
                    Style::default().fg(theme.status_color(&status)),
                ),
                Span::styled(format!("{:<12}{}", name, count), text),
            ]));
        }
    }

    lines.push(Line::default());
    lines.push(heading("Priority", theme));
    for priority in [Priority::Critical, Priority::High, Priority::Medium, Priority::Low] {
        let count = state
            .board
            .columns()
            .iter()
            .flat_map(|c| c.tasks())
            .filter(|t| t.priority == priority)
            .count();
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {:<4}", priority_marker(priority)),
                Style::default().fg(theme.priority_color(priority)),
            ),
            Span::styled(format!("{:<12}{}", priority.as_str(), count), text),
        ]));
    }

    let waiting = all
        .iter()
        .filter(|t| t.status != TaskStatus::Done)
        .filter(|t| !incomplete_dependencies(all, t).is_empty())
        .count();
    lines.push(Line::default());
    lines.push(field_line(
        "Waiting on deps",
        vec![Span::styled(format!(" {}", waiting), text)],
        theme,
    ));

    if !state.operation_log.is_empty() {
        lines.push(Line::default());
        lines.push(heading("Recent operations", theme));
        for record in state.operation_log.iter().rev() {
            let time = record.timestamp.with_timezone(&chrono::Local);
            let kind = format!("{:<8}", record.kind.label());
            lines.push(Line::from(vec![
                Span::styled(format!("  {} ", time.format("%H:%M:%S")), dim),
                Span::styled(kind, Style::default().fg(theme.cyan)),
                Span::styled(record.summary.clone(), text),
            ]));
        }
    }

    lines
}

pub fn render_stats_popup(frame: &mut Frame, state: &BoardState, layout: &PopupLayout) {
    render_popup(
        frame,
        layout,
        OverlayKind::Stats.title(),
        stats_lines(state),
        state.overlays.scroll_of(OverlayKind::Stats),
        "\u{2191}\u{2193} scroll  c/Esc close",
        &state.theme,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::Task;
    use crate::tui::input::test_support::{state_with, task_with_status};

    fn plain(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn bar_is_proportional() {
        assert_eq!(bar(0, 0), "\u{2591}".repeat(20));
        assert_eq!(bar(1, 2), format!("{}{}", "\u{2588}".repeat(10), "\u{2591}".repeat(10)));
        assert_eq!(bar(4, 4), "\u{2588}".repeat(20));
    }

    #[test]
    fn counts_lanes_side_statuses_and_waiting() {
        let mut waiting = task_with_status(3, TaskStatus::Pending);
        waiting.dependencies = vec![1];
        let state = state_with(vec![
            task_with_status(1, TaskStatus::Blocked),
            task_with_status(2, TaskStatus::Done),
            waiting,
            Task::new(4, "x"),
        ]);
        let text = plain(&stats_lines(&state));
        assert!(text.contains(&"Showing       4 tasks".to_string()));
        assert!(text.contains(&"Complete      25%".to_string()));
        assert!(text.contains(&"  \u{2298} blocked     1".to_string()));
        assert!(text.contains(&"Waiting on deps 1".to_string()));
    }
}
