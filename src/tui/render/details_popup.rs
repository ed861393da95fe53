use ratatui::Frame;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::model::task::{Task, TaskStatus};
use crate::ops::task_ops::dependents_of;
use crate::tui::modal::Modal;
use crate::tui::overlay::OverlayKind;
use crate::tui::state::BoardState;
use crate::tui::theme::Theme;

use super::format::{priority_badge, sanitize, status_badge, status_glyph, word_wrap};
use super::popup::{PopupLayout, field_line, heading, render_popup};

/// Content of the task details popup, wrapped to `width`
pub fn details_lines(state: &BoardState, width: usize) -> Vec<Line<'static>> {
    let theme = &state.theme;
    let Some(task) = state.detail_task_id.and_then(|id| state.find_task(id)) else {
        return vec![Line::from(Span::styled(
            "No task selected",
            Style::default().fg(theme.dim),
        ))];
    };
    let all = state.original_tasks();
    let text = Style::default().fg(theme.text);
    let dim = Style::default().fg(theme.dim);

    let mut lines = Vec::new();
    let title_style = Style::default()
        .fg(theme.text_bright)
        .add_modifier(Modifier::BOLD);
    for (i, row) in word_wrap(&format!("#{} {}", task.id, sanitize(&task.title)), width)
        .into_iter()
        .enumerate()
    {
        let style = if i == 0 {
            title_style
        } else {
            title_style.remove_modifier(Modifier::BOLD)
        };
        lines.push(Line::from(Span::styled(row, style)));
    }
    lines.push(Line::default());

    let status = status_badge(&task.status, theme);
    lines.push(field_line("Status", vec![status], theme));
    let priority = priority_badge(task.priority, theme);
    lines.push(field_line(
        "Priority",
        vec![priority, Span::styled(format!(" {}", task.priority), text)],
        theme,
    ));

    if task.has_dependencies() {
        lines.push(Line::default());
        lines.push(heading("Dependencies", theme));
        for dep in &task.dependencies {
            lines.push(dependency_line(*dep, all, theme));
        }
    }

    let dependents = dependents_of(all, task.id);
    if !dependents.is_empty() {
        let ids: Vec<String> = dependents.iter().map(|id| format!("#{}", id)).collect();
        let ids = Span::styled(ids.join(", "), text);
        lines.push(field_line("Needed by", vec![ids], theme));
    }

    if task.has_subtasks() {
        let (done, total) = task.subtask_progress();
        lines.push(Line::default());
        lines.push(heading(&format!("Subtasks {}/{}", done, total), theme));
        for sub in &task.subtasks {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {} ", status_glyph(&sub.status)),
                    Style::default().fg(theme.status_color(&sub.status)),
                ),
                Span::styled(format!("{}. {}", sub.id, sanitize(&sub.title)), text),
            ]));
        }
    }

    for (label, body) in [
        ("Description", task.description.as_deref()),
        ("Details", task.details.as_deref()),
        ("Test strategy", task.test_strategy.as_deref()),
    ] {
        let Some(body) = body.filter(|b| !b.trim().is_empty()) else {
            continue;
        };
        lines.push(Line::default());
        lines.push(heading(label, theme));
        for row in wrap_block(body, width) {
            lines.push(Line::from(Span::styled(row, text)));
        }
    }

    if let Some(prd) = &task.prd_source {
        lines.push(Line::default());
        lines.push(heading("PRD source", theme));
        let fields = [
            ("File", prd.file_name().or(prd.file_path())),
            ("Path", prd.file_path()),
            ("Parsed", prd.parsed_date()),
        ];
        for (label, value) in fields {
            if let Some(value) = value {
                let value = Span::styled(sanitize(value), text);
                lines.push(field_line(label, vec![value], theme));
            }
        }
        if let Some(size) = prd.file_size() {
            let size = Span::styled(format!("{} bytes", size), dim);
            lines.push(field_line("Size", vec![size], theme));
        }
    }

    lines
}

/// Multi-line text: each source line sanitized and wrapped on its own
fn wrap_block(body: &str, width: usize) -> Vec<String> {
    body.lines()
        .flat_map(|line| word_wrap(&sanitize(line), width))
        .collect()
}

fn dependency_line(dep: u64, all: &[Task], theme: &Theme) -> Line<'static> {
    match all.iter().find(|t| t.id == dep) {
        Some(t) => {
            let style = Style::default().fg(theme.status_color(&t.status));
            let state = if t.status == TaskStatus::Done { "done" } else { "open" };
            Line::from(vec![
                Span::styled(format!("  {} ", status_glyph(&t.status)), style),
                Span::styled(
                    format!("#{} {}", t.id, sanitize(&t.title)),
                    Style::default().fg(theme.text),
                ),
                Span::styled(format!(" ({})", state), Style::default().fg(theme.dim)),
            ])
        }
        None => Line::from(vec![
            Span::styled("  ? ", Style::default().fg(theme.red)),
            Span::styled(format!("#{} (missing)", dep), Style::default().fg(theme.red)),
        ]),
    }
}

pub fn render_details_popup(frame: &mut Frame, state: &BoardState, layout: &PopupLayout) {
    let lines = details_lines(state, layout.content_width);
    let hint = if state.modal == Modal::AnyKey {
        "Press any key to return"
    } else {
        "\u{2191}\u{2193} scroll  c/Esc close"
    };
    render_popup(
        frame,
        layout,
        OverlayKind::Details.title(),
        lines,
        state.overlays.scroll_of(OverlayKind::Details),
        hint,
        &state.theme,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::{PrdSource, Subtask};
    use crate::tui::input::test_support::state_with;

    fn plain(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn shows_fields_dependencies_and_subtasks() {
        let mut task = Task::new(2, "Build board");
        task.dependencies = vec![1, 9];
        task.description = Some("Lanes and cards.\nWith scrolling.".into());
        task.subtasks = vec![Subtask::new(1, "Columns", TaskStatus::Done)];
        task.prd_source = Some(PrdSource::with_file_name("prd.md"));
        let mut state = state_with(vec![Task::new(1, "Model"), task]);
        state.detail_task_id = Some(2);

        let text = plain(&details_lines(&state, 60));
        assert_eq!(text[0], "#2 Build board");
        assert!(text.contains(&"Status        \u{25CB} pending".to_string()));
        assert!(text.contains(&"  \u{25CB} #1 Model (open)".to_string()));
        assert!(text.contains(&"  ? #9 (missing)".to_string()));
        assert!(text.contains(&"Subtasks 1/1".to_string()));
        assert!(text.contains(&"With scrolling.".to_string()));
        assert!(text.contains(&"File          prd.md".to_string()));
    }

    #[test]
    fn dependents_listed() {
        let mut b = Task::new(2, "b");
        b.dependencies = vec![1];
        let mut state = state_with(vec![Task::new(1, "a"), b]);
        state.detail_task_id = Some(1);
        let text = plain(&details_lines(&state, 60));
        assert!(text.contains(&"Needed by     #2".to_string()));
    }

    #[test]
    fn missing_task_shows_placeholder() {
        let state = state_with(Vec::new());
        assert_eq!(plain(&details_lines(&state, 40)), vec!["No task selected"]);
    }
}
