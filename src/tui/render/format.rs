use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use crate::model::task::{Priority, Task, TaskStatus};
use crate::ops::status::incomplete_dependencies;
use crate::tui::theme::Theme;
use crate::util::unicode::{self, display_width, take_width};

use super::geometry::ELLIPSIS;

/// Glyph for a task status
pub fn status_glyph(status: &TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "\u{25CB}",    // ○
        TaskStatus::InProgress => "\u{25D0}", // ◐
        TaskStatus::Done => "\u{25CF}",       // ●
        TaskStatus::Blocked => "\u{2298}",    // ⊘
        TaskStatus::Deferred => "\u{25CC}",   // ◌
        TaskStatus::Cancelled => "\u{2715}",  // ✕
        TaskStatus::Other(_) => "?",
    }
}

/// `○ pending`, `⊘ blocked`, `? review`, ...
pub fn status_badge(status: &TaskStatus, theme: &Theme) -> Span<'static> {
    Span::styled(
        format!("{} {}", status_glyph(status), status),
        Style::default().fg(theme.status_color(status)),
    )
}

pub fn priority_marker(priority: Priority) -> &'static str {
    match priority {
        Priority::Critical => "!!!",
        Priority::High => "!!",
        Priority::Medium => "!",
        Priority::Low => "\u{00B7}", // ·
    }
}

pub fn priority_badge(priority: Priority, theme: &Theme) -> Span<'static> {
    let mut style = Style::default().fg(theme.priority_color(priority));
    if priority == Priority::Critical {
        style = style.add_modifier(Modifier::BOLD);
    }
    Span::styled(priority_marker(priority), style)
}

/// `⛓2` or `⛓2(1 open)`; None for tasks without dependencies
pub fn dependency_badge(task: &Task, all_tasks: &[Task], theme: &Theme) -> Option<Span<'static>> {
    if !task.has_dependencies() {
        return None;
    }
    let open = incomplete_dependencies(all_tasks, task).len();
    let (text, color) = if open == 0 {
        (format!("\u{26D3}{}", task.dependencies.len()), theme.green)
    } else {
        (
            format!("\u{26D3}{}({} open)", task.dependencies.len(), open),
            theme.red,
        )
    };
    Some(Span::styled(text, Style::default().fg(color)))
}

/// `☑ 1/3`; None for tasks without subtasks
pub fn subtask_badge(task: &Task, theme: &Theme) -> Option<Span<'static>> {
    if !task.has_subtasks() {
        return None;
    }
    let (done, total) = task.subtask_progress();
    let color = if done == total { theme.green } else { theme.dim };
    Some(Span::styled(
        format!("\u{2611} {}/{}", done, total),
        Style::default().fg(color),
    ))
}

pub fn prd_badge(task: &Task, theme: &Theme) -> Option<Span<'static>> {
    task.prd_source
        .as_ref()
        .map(|_| Span::styled("\u{25C6}PRD", Style::default().fg(theme.blue)))
}

/// Make file-sourced text safe for a single styled line: escape sequences
/// removed, control characters (newlines included) turned into spaces.
pub fn sanitize(text: &str) -> String {
    unicode::strip_ansi(text)
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

/// Greedy whitespace word wrap by display width. Words wider than `width`
/// are broken by grapheme. `width == 0` returns the text as one line.
pub fn word_wrap(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_width = 0;
        for word in paragraph.split_whitespace() {
            let mut word = word;
            let mut ww = display_width(word);
            let sep = if current.is_empty() { 0 } else { 1 };
            if current_width + sep + ww <= width {
                if sep == 1 {
                    current.push(' ');
                }
                current.push_str(word);
                current_width += sep + ww;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            while ww > width {
                let mut head = take_width(word, width);
                if head.is_empty() {
                    // A single grapheme wider than the line
                    head = word.graphemes(true).next().unwrap_or(word);
                }
                lines.push(head.to_string());
                word = &word[head.len()..];
                ww = display_width(word);
            }
            current.push_str(word);
            current_width = ww;
        }
        lines.push(current);
    }
    lines
}

/// `#12 Title` cut to `width` cells
pub fn compact_summary(task: &Task, width: usize) -> String {
    let text = format!("#{} {}", task.id, sanitize(&task.title));
    unicode::truncate(&text, width, ELLIPSIS)
}

/// Push spans for text with regex match highlighting. If no regex or no matches,
/// pushes a single span with `base_style`. Otherwise splits text at match boundaries.
pub fn push_highlighted_spans(
    spans: &mut Vec<Span<'static>>,
    text: &str,
    base_style: Style,
    highlight_style: Style,
    search_re: Option<&Regex>,
) {
    let re = match search_re {
        Some(r) => r,
        None => {
            spans.push(Span::styled(text.to_string(), base_style));
            return;
        }
    };

    let mut last_end = 0;
    for m in re.find_iter(text) {
        if m.start() == m.end() {
            continue;
        }
        if m.start() > last_end {
            spans.push(Span::styled(
                text[last_end..m.start()].to_string(),
                base_style,
            ));
        }
        spans.push(Span::styled(
            text[m.start()..m.end()].to_string(),
            highlight_style,
        ));
        last_end = m.end();
    }
    if last_end < text.len() || text.is_empty() {
        spans.push(Span::styled(text[last_end..].to_string(), base_style));
    }
}

/// Case-insensitive literal regex for highlighting a search query
pub fn search_regex(query: &str) -> Option<Regex> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    Regex::new(&format!("(?i){}", regex::escape(query))).ok()
}

/// The two lines of a task card, unpadded.
///
/// Line one: side-status badge (for tasks folded into the pending lane),
/// id and title. Line two: priority, dependency, subtask and PRD badges.
pub fn card_lines(
    task: &Task,
    all_tasks: &[Task],
    theme: &Theme,
    search_re: Option<&Regex>,
    selected: bool,
) -> [Line<'static>; 2] {
    let bg = if selected {
        theme.selection_bg
    } else {
        theme.background
    };
    let title_style = if selected {
        Style::default()
            .fg(theme.text_bright)
            .bg(bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text).bg(bg)
    };
    let id_style = Style::default().fg(theme.dim).bg(bg);
    let match_style = Style::default()
        .fg(theme.search_match_fg)
        .bg(theme.search_match_bg);

    let mut first: Vec<Span<'static>> = Vec::new();
    if task.status.is_folded() {
        let badge = status_badge(&task.status, theme);
        first.push(Span::styled(format!("{} ", badge.content), badge.style.bg(bg)));
    }
    first.push(Span::styled(format!("#{} ", task.id), id_style));
    push_highlighted_spans(
        &mut first,
        &sanitize(&task.title),
        title_style,
        match_style,
        search_re,
    );

    let mut second: Vec<Span<'static>> = Vec::new();
    let badges = [
        Some(priority_badge(task.priority, theme)),
        dependency_badge(task, all_tasks, theme),
        subtask_badge(task, theme),
        prd_badge(task, theme),
    ];
    for badge in badges.into_iter().flatten() {
        if !second.is_empty() {
            second.push(Span::styled(" ", Style::default().bg(bg)));
        }
        second.push(Span::styled(badge.content, badge.style.bg(bg)));
    }

    [Line::from(first), Line::from(second)]
}
