use ratatui::style::Style;
use ratatui::text::{Line, Span};
use regex::Regex;

use crate::model::task::{Lane, Task};
use crate::tui::column::Column;
use crate::tui::render::geometry::{column_widths, fit_line};
use crate::tui::theme::Theme;

/// Cells between adjacent lanes
pub const GUTTER: usize = 2;

/// Per-lane counts and completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoardStatistics {
    pub pending: usize,
    pub in_progress: usize,
    pub done: usize,
    /// Tasks with a side status, counted in `pending` as well
    pub folded: usize,
    pub total: usize,
    /// `round(done / total * 100)`, 0 for an empty board
    pub completion_percent: u8,
}

/// The three lanes side by side, with exactly one active lane.
#[derive(Debug, Clone)]
pub struct BoardLayout {
    columns: Vec<Column>,
    active: usize,
    width: usize,
    height: usize,
}

impl BoardLayout {
    /// `width`×`height` is the area the lanes occupy (the status row excluded)
    pub fn new(width: usize, height: usize) -> Self {
        let column_width = column_widths(width, Lane::ALL.len(), GUTTER);
        let mut columns: Vec<Column> = Lane::ALL
            .iter()
            .map(|lane| Column::new(*lane, column_width, height))
            .collect();
        columns[0].set_active(true);
        BoardLayout {
            columns,
            active: 0,
            width,
            height,
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, lane: Lane) -> &Column {
        &self.columns[lane.index()]
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_lane(&self) -> Lane {
        Lane::from_index(self.active)
    }

    pub fn active_column(&self) -> &Column {
        &self.columns[self.active]
    }

    pub fn active_column_mut(&mut self) -> &mut Column {
        &mut self.columns[self.active]
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.active_column().selected_task()
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Bucket `tasks` into lanes by status, keeping input order within a
    /// lane. Side and unknown statuses fold into the pending lane.
    ///
    /// Each lane keeps its selected task when it is still there; otherwise
    /// the selection is clamped. The active lane always ends up with a
    /// selection when it has tasks.
    pub fn load_tasks(&mut self, tasks: &[Task]) {
        let mut buckets: Vec<Vec<Task>> = vec![Vec::new(); Lane::ALL.len()];
        for task in tasks {
            buckets[task.status.lane().index()].push(task.clone());
        }
        for (column, bucket) in self.columns.iter_mut().zip(buckets) {
            let selected_id = column.selected_task().map(|t| t.id);
            column.set_tasks(bucket);
            column.ensure_valid_selection();
            if let Some(id) = selected_id {
                column.select_task_id(id);
            }
        }
        let active = &mut self.columns[self.active];
        if active.selected_index().is_none() {
            active.select_first();
        }
    }

    /// Make `index` (modulo the lane count) the active lane and select its
    /// first task. The lane being left loses its selection.
    pub fn activate(&mut self, index: usize) {
        let index = index % self.columns.len();
        let previous = &mut self.columns[self.active];
        previous.set_active(false);
        previous.clear_selection();
        self.active = index;
        let next = &mut self.columns[index];
        next.set_active(true);
        next.select_first();
    }

    pub fn move_to_next_column(&mut self) {
        self.activate(self.active + 1);
    }

    pub fn move_to_previous_column(&mut self) {
        self.activate(self.active + self.columns.len() - 1);
    }

    /// Find the lane holding `task_id` and select it there
    pub fn focus_task(&mut self, task_id: u64) -> bool {
        let Some(index) = self
            .columns
            .iter()
            .position(|c| c.tasks().iter().any(|t| t.id == task_id))
        else {
            return false;
        };
        if index != self.active {
            self.activate(index);
        }
        self.columns[index].select_task_id(task_id)
    }

    /// Recompute lane sizes. Scroll offsets and selections are kept and
    /// clamped to the new viewport.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        let column_width = column_widths(width, self.columns.len(), GUTTER);
        for column in &mut self.columns {
            let selected_id = column.selected_task().map(|t| t.id);
            column.resize(column_width, height);
            if let Some(id) = selected_id {
                column.select_task_id(id);
            }
        }
    }

    pub fn statistics(&self) -> BoardStatistics {
        let pending = self.columns[Lane::Pending.index()].len();
        let in_progress = self.columns[Lane::InProgress.index()].len();
        let done = self.columns[Lane::Done.index()].len();
        let folded = self.columns[Lane::Pending.index()]
            .tasks()
            .iter()
            .filter(|t| t.status.is_folded())
            .count();
        let total = pending + in_progress + done;
        let completion_percent = if total == 0 {
            0
        } else {
            (done as f64 / total as f64 * 100.0).round() as u8
        };
        BoardStatistics {
            pending,
            in_progress,
            done,
            folded,
            total,
            completion_percent,
        }
    }

    /// All lanes rendered and interleaved line by line: one margin cell,
    /// then each lane separated by the gutter. Returns `height` lines.
    pub fn compose_lines(
        &self,
        theme: &Theme,
        all_tasks: &[Task],
        search_re: Option<&Regex>,
    ) -> Vec<Line<'static>> {
        let fill = Style::default().bg(theme.background);
        let rendered: Vec<Vec<Line<'static>>> = self
            .columns
            .iter()
            .map(|c| c.render(theme, all_tasks, search_re))
            .collect();

        (0..self.height)
            .map(|row| {
                let mut spans: Vec<Span<'static>> = vec![Span::styled(" ", fill)];
                for (i, lines) in rendered.iter().enumerate() {
                    if i > 0 {
                        spans.push(Span::styled(" ".repeat(GUTTER), fill));
                    }
                    let width = self.columns[i].width();
                    let line = lines.get(row).cloned().unwrap_or_default();
                    spans.extend(fit_line(line, width, fill).spans);
                }
                Line::from(spans)
            })
            .collect()
    }
}
