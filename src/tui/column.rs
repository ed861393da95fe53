use std::ops::Range;

use ratatui::style::{Modifier, Style};
use ratatui::symbols::border;
use ratatui::text::{Line, Span};
use regex::Regex;

use crate::model::task::{Lane, Task};
use crate::tui::render::format::card_lines;
use crate::tui::render::geometry::{bordered_line, horizontal_border};
use crate::tui::theme::Theme;
use crate::util::unicode;

/// Rows taken by lane chrome: top border, more-above row, more-below row,
/// bottom border.
const CHROME_ROWS: usize = 4;

/// One status lane: its task subset, scroll viewport and selection cursor.
///
/// `selected_index` indexes the full task list and is kept inside the
/// visible window; `None` when nothing is selected.
#[derive(Debug, Clone)]
pub struct Column {
    pub lane: Lane,
    tasks: Vec<Task>,
    scroll_offset: usize,
    selected_index: Option<usize>,
    active: bool,
    width: usize,
    height: usize,
}

impl Column {
    pub fn new(lane: Lane, width: usize, height: usize) -> Self {
        Column {
            lane,
            tasks: Vec::new(),
            scroll_offset: 0,
            selected_index: None,
            active: false,
            width,
            height,
        }
    }

    /// Replace the lane's tasks. Scroll and selection are left alone; use
    /// [`Column::ensure_valid_selection`] to clamp them afterwards.
    pub fn set_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.selected_index.and_then(|i| self.tasks.get(i))
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Cards that fit: two lines each, one blank line between cards.
    pub fn max_visible_tasks(&self) -> usize {
        ((self.height.saturating_sub(CHROME_ROWS) + 1) / 2).max(1)
    }

    fn max_scroll(&self) -> usize {
        self.tasks.len().saturating_sub(self.max_visible_tasks())
    }

    /// Indices of the tasks currently in the viewport
    pub fn visible_range(&self) -> Range<usize> {
        let end = (self.scroll_offset + self.max_visible_tasks()).min(self.tasks.len());
        self.scroll_offset.min(end)..end
    }

    pub fn scroll_up(&mut self) -> bool {
        if self.scroll_offset == 0 {
            return false;
        }
        self.scroll_offset -= 1;
        self.keep_selection_in_window();
        true
    }

    pub fn scroll_down(&mut self) -> bool {
        if self.scroll_offset >= self.max_scroll() {
            return false;
        }
        self.scroll_offset += 1;
        self.keep_selection_in_window();
        true
    }

    /// Move the viewport a whole page up; returns whether it moved
    pub fn page_up(&mut self) -> bool {
        let mut moved = false;
        for _ in 0..self.max_visible_tasks() {
            moved |= self.scroll_up();
        }
        moved
    }

    pub fn page_down(&mut self) -> bool {
        let mut moved = false;
        for _ in 0..self.max_visible_tasks() {
            moved |= self.scroll_down();
        }
        moved
    }

    /// Select the previous task, wrapping to the last one
    pub fn move_selection_up(&mut self) -> bool {
        if self.tasks.is_empty() {
            return false;
        }
        let len = self.tasks.len();
        let next = match self.selected_index {
            Some(i) if i > 0 => i - 1,
            Some(_) => len - 1,
            None => 0,
        };
        self.select(Some(next));
        true
    }

    /// Select the next task, wrapping to the first one
    pub fn move_selection_down(&mut self) -> bool {
        if self.tasks.is_empty() {
            return false;
        }
        let len = self.tasks.len();
        let next = match self.selected_index {
            Some(i) => (i + 1) % len,
            None => 0,
        };
        self.select(Some(next));
        true
    }

    /// Select `index` (ignored when out of range) and scroll it into view
    pub fn select(&mut self, index: Option<usize>) {
        self.selected_index = index.filter(|i| *i < self.tasks.len());
        self.scroll_to_selection();
    }

    pub fn select_first(&mut self) {
        self.select(if self.tasks.is_empty() { None } else { Some(0) });
    }

    pub fn select_last(&mut self) {
        self.select(self.tasks.len().checked_sub(1));
    }

    /// Select the task with `id`; returns false when the lane lacks it
    pub fn select_task_id(&mut self, id: u64) -> bool {
        match self.tasks.iter().position(|t| t.id == id) {
            Some(index) => {
                self.select(Some(index));
                true
            }
            None => false,
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected_index = None;
    }

    /// Clamp scroll and selection after the task list or size changed
    pub fn ensure_valid_selection(&mut self) {
        self.scroll_offset = self.scroll_offset.min(self.max_scroll());
        if let Some(i) = self.selected_index {
            if self.tasks.is_empty() {
                self.selected_index = None;
            } else if i >= self.tasks.len() {
                self.selected_index = Some(self.tasks.len() - 1);
            }
        }
        self.scroll_to_selection();
    }

    /// New lane size; scroll and selection survive, clamped
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.ensure_valid_selection();
    }

    fn scroll_to_selection(&mut self) {
        let max_visible = self.max_visible_tasks();
        if let Some(i) = self.selected_index {
            if i < self.scroll_offset {
                self.scroll_offset = i;
            } else if i >= self.scroll_offset + max_visible {
                self.scroll_offset = i + 1 - max_visible;
            }
        }
        self.scroll_offset = self.scroll_offset.min(self.max_scroll());
    }

    fn keep_selection_in_window(&mut self) {
        if let Some(i) = self.selected_index {
            let range = self.visible_range();
            if range.is_empty() {
                return;
            }
            self.selected_index = Some(i.clamp(range.start, range.end - 1));
        }
    }

    /// Header text: glyph, name, count, the `(start-end/total)` window when
    /// the lane scrolls, and the number of side-status tasks folded in.
    pub fn header_text(&self) -> String {
        let mut text = format!("{} {} {}", self.lane.glyph(), self.lane.title(), self.len());
        if self.len() > self.max_visible_tasks() {
            let range = self.visible_range();
            text.push_str(&format!(
                " ({}-{}/{})",
                range.start + 1,
                range.end,
                self.len()
            ));
        }
        let folded = self.tasks.iter().filter(|t| t.status.is_folded()).count();
        if folded > 0 {
            text.push_str(&format!(" +{} side", folded));
        }
        text
    }

    /// Render exactly `height` lines of `width` cells.
    ///
    /// Active lanes get double-line borders, inactive ones rounded borders.
    /// The selected card is wrapped in an inner border.
    pub fn render(
        &self,
        theme: &Theme,
        all_tasks: &[Task],
        search_re: Option<&Regex>,
    ) -> Vec<Line<'static>> {
        let h = self.height;
        let w = self.width;
        if h == 0 {
            return Vec::new();
        }

        let (set, border_color) = if self.active {
            (border::DOUBLE, theme.active_border)
        } else {
            (border::ROUNDED, theme.inactive_border)
        };
        let bg = theme.background;
        let fill = Style::default().bg(bg);
        let border_style = Style::default().fg(border_color).bg(bg);
        let header_style = if self.active {
            Style::default()
                .fg(theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text).bg(bg)
        };
        let dim = Style::default().fg(theme.dim).bg(bg);
        let interior = w.saturating_sub(2);
        let row = |content: Line<'static>| {
            bordered_line(content, w, set.vertical_left, set.vertical_right, border_style, fill)
        };

        let mut lines: Vec<Line<'static>> = Vec::with_capacity(h);
        lines.push(horizontal_border(
            w,
            set.top_left,
            set.horizontal_top,
            set.top_right,
            Some(Line::from(Span::styled(
                format!(" {} ", self.header_text()),
                header_style,
            ))),
            border_style,
        ));

        let range = self.visible_range();
        let above = range.start;
        let below = self.len() - range.end;
        lines.push(row(if above > 0 {
            Line::from(Span::styled(format!(" \u{25B2} {} more above", above), dim))
        } else {
            Line::default()
        }));

        let body_rows = h.saturating_sub(CHROME_ROWS);
        let mut body: Vec<Line<'static>> = Vec::with_capacity(body_rows);
        if self.tasks.is_empty() {
            let middle = body_rows.saturating_sub(1) / 2;
            for i in 0..body_rows {
                if i == middle {
                    let msg = unicode::center("No tasks", interior);
                    body.push(row(Line::from(Span::styled(msg, dim))));
                } else {
                    body.push(row(Line::default()));
                }
            }
        } else {
            // Blank rows between cards only when every visible card fits with them
            let spaced = 3 * range.len() <= body_rows + 1;
            for index in range.clone() {
                if spaced && index > range.start {
                    body.push(row(Line::default()));
                }
                let selected = self.selected_index == Some(index);
                let (left, right, inner_style) = if selected {
                    (
                        "\u{2503}",
                        "\u{2503}",
                        Style::default().fg(theme.highlight).bg(bg),
                    )
                } else {
                    (" ", " ", fill)
                };
                let card_fill = if selected {
                    Style::default().bg(theme.selection_bg)
                } else {
                    fill
                };
                let task = &self.tasks[index];
                for card_line in card_lines(task, all_tasks, theme, search_re, selected) {
                    let inner =
                        bordered_line(card_line, interior, left, right, inner_style, card_fill);
                    body.push(row(inner));
                }
            }
            body.truncate(body_rows);
            while body.len() < body_rows {
                body.push(row(Line::default()));
            }
        }
        lines.extend(body);

        lines.push(row(if below > 0 {
            Line::from(Span::styled(format!(" \u{25BC} {} more below", below), dim))
        } else {
            Line::default()
        }));

        let footer_label = self.selected_index.map(|i| {
            Line::from(Span::styled(format!(" {}/{} ", i + 1, self.len()), dim))
        });
        let bottom = horizontal_border(
            w,
            set.bottom_left,
            set.horizontal_bottom,
            set.bottom_right,
            footer_label,
            border_style,
        );

        if h < 2 {
            lines.truncate(h);
            return lines;
        }
        lines.truncate(h - 1);
        lines.push(bottom);
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lane_with(n: u64, height: usize) -> Column {
        let mut col = Column::new(Lane::Pending, 30, height);
        col.set_tasks((1..=n).map(|id| Task::new(id, format!("Task {}", id))).collect());
        col
    }

    fn plain(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn max_visible_tasks_formula() {
        assert_eq!(lane_with(0, 31).max_visible_tasks(), 14);
        assert_eq!(lane_with(0, 32).max_visible_tasks(), 14);
        assert_eq!(lane_with(0, 10).max_visible_tasks(), 3);
        // Never below one, however small the lane
        assert_eq!(lane_with(0, 0).max_visible_tasks(), 1);
        assert_eq!(lane_with(0, 4).max_visible_tasks(), 1);
    }

    #[test]
    fn scroll_stays_in_bounds() {
        let mut col = lane_with(5, 10); // 3 visible, max scroll 2
        assert!(!col.scroll_up());
        assert!(col.scroll_down());
        assert!(col.scroll_down());
        assert!(!col.scroll_down());
        assert_eq!(col.scroll_offset(), 2);
        for _ in 0..10 {
            col.scroll_up();
        }
        assert_eq!(col.scroll_offset(), 0);
    }

    #[test]
    fn scroll_on_short_lane_does_nothing() {
        let mut col = lane_with(2, 10);
        assert!(!col.scroll_down());
        assert_eq!(col.scroll_offset(), 0);
    }

    #[test]
    fn selection_wraps_around() {
        let mut col = lane_with(4, 10);
        col.select(Some(1));
        for _ in 0..4 {
            assert!(col.move_selection_down());
        }
        assert_eq!(col.selected_index(), Some(1));

        col.select(Some(0));
        col.move_selection_up();
        assert_eq!(col.selected_index(), Some(3));
    }

    #[test]
    fn selection_on_empty_lane_fails() {
        let mut col = lane_with(0, 10);
        assert!(!col.move_selection_down());
        assert!(!col.move_selection_up());
        assert_eq!(col.selected_index(), None);
    }

    #[test]
    fn selection_scrolls_viewport() {
        let mut col = lane_with(10, 10); // 3 visible
        col.select_first();
        for _ in 0..5 {
            col.move_selection_down();
        }
        assert_eq!(col.selected_index(), Some(5));
        assert!(col.visible_range().contains(&5));
        // Wrap to the top brings the viewport back
        for _ in 0..5 {
            col.move_selection_down();
        }
        assert_eq!(col.selected_index(), Some(0));
        assert_eq!(col.scroll_offset(), 0);
    }

    #[test]
    fn scrolling_keeps_selection_visible() {
        let mut col = lane_with(10, 10);
        col.select_first();
        col.scroll_down();
        assert_eq!(col.selected_index(), Some(1));
        assert!(col.visible_range().contains(&1));
    }

    #[test]
    fn set_tasks_keeps_scroll_and_selection() {
        let mut col = lane_with(10, 10);
        col.select(Some(4));
        let offset = col.scroll_offset();
        col.set_tasks((1..=10).map(|id| Task::new(id, "x")).collect());
        assert_eq!(col.selected_index(), Some(4));
        assert_eq!(col.scroll_offset(), offset);
    }

    #[test]
    fn ensure_valid_selection_clamps_after_shrink() {
        let mut col = lane_with(10, 10);
        col.select(Some(9));
        col.set_tasks(vec![Task::new(1, "a"), Task::new(2, "b")]);
        col.ensure_valid_selection();
        assert_eq!(col.selected_index(), Some(1));
        assert_eq!(col.scroll_offset(), 0);

        col.set_tasks(Vec::new());
        col.ensure_valid_selection();
        assert_eq!(col.selected_index(), None);
    }

    #[test]
    fn header_shows_window_when_scrollable() {
        let mut col = lane_with(28, 31);
        assert_eq!(col.max_visible_tasks(), 14);
        assert!(col.header_text().ends_with("28 (1-14/28)"));
        col.scroll_down();
        assert!(col.header_text().ends_with("(2-15/28)"));
        let short = lane_with(3, 31);
        assert!(!short.header_text().contains('('));
    }

    #[test]
    fn render_shows_more_above_after_scroll() {
        let theme = Theme::default();
        let mut col = lane_with(28, 31);
        let all: Vec<Task> = col.tasks().to_vec();
        let lines = col.render(&theme, &all, None);
        assert_eq!(lines.len(), 31);
        assert!(!plain(&lines[1]).contains("more above"));
        assert!(plain(&lines[29]).contains("14 more below"));

        col.scroll_down();
        let lines = col.render(&theme, &all, None);
        assert!(plain(&lines[0]).contains("(2-15/28)"));
        assert!(plain(&lines[1]).contains("1 more above"));
    }

    #[test]
    fn render_lines_have_lane_width() {
        let theme = Theme::default();
        let mut col = lane_with(3, 12);
        col.select_first();
        let all: Vec<Task> = col.tasks().to_vec();
        for line in col.render(&theme, &all, None) {
            assert_eq!(crate::tui::render::geometry::line_width(&line), 30);
        }
    }

    #[test]
    fn active_lane_uses_double_border() {
        let theme = Theme::default();
        let mut col = lane_with(1, 8);
        let inactive = col.render(&theme, &[], None);
        assert!(plain(&inactive[0]).starts_with('\u{256D}')); // ╭
        col.set_active(true);
        let active = col.render(&theme, &[], None);
        assert!(plain(&active[0]).starts_with('\u{2554}')); // ╔
    }

    #[test]
    fn empty_lane_renders_no_tasks() {
        let theme = Theme::default();
        let col = lane_with(0, 9);
        let lines = col.render(&theme, &[], None);
        let hits = lines.iter().filter(|l| plain(l).contains("No tasks")).count();
        assert_eq!(hits, 1);
    }

    #[test]
    fn tiny_lane_degrades() {
        let theme = Theme::default();
        let col = lane_with(3, 2);
        assert_eq!(col.render(&theme, &[], None).len(), 2);
        let col = lane_with(3, 1);
        assert_eq!(col.render(&theme, &[], None).len(), 1);
        let col = lane_with(3, 0);
        assert!(col.render(&theme, &[], None).is_empty());
    }
}
