use crate::ops::status::incomplete_dependencies;
use crate::ops::task_ops::{self, TaskError};
use crate::tui::modal::Modal;
use crate::tui::overlay::OverlayKind;
use crate::tui::render::format::{compact_summary, sanitize};
use crate::tui::state::{BoardState, Outcome};
use crate::tui::undo::{OperationKind, OperationRecord};

fn selected_id(state: &BoardState) -> Result<u64, Outcome> {
    state
        .selected_task()
        .map(|t| t.id)
        .ok_or_else(|| Outcome::Rejected("No task selected".into()))
}

/// Full detail view of the selected task; the next key dismisses it
pub fn view_task(state: &mut BoardState) -> Outcome {
    if let Err(outcome) = selected_id(state) {
        return outcome;
    }
    state.open_overlay(OverlayKind::Details);
    state.modal = Modal::AnyKey;
    Outcome::Success(String::new())
}

/// Close the detail view opened by [`view_task`]
pub fn dismiss_view(state: &mut BoardState) {
    state.modal = Modal::None;
    state.close_overlay(OverlayKind::Details);
}

/// One-line summary of the selected task
pub fn task_info(state: &BoardState) -> Outcome {
    let Some(task) = state.selected_task() else {
        return Outcome::Rejected("No task selected".into());
    };
    let mut parts = vec![
        format!("#{} {}", task.id, sanitize(&task.title)),
        task.status.to_string(),
        task.priority.to_string(),
    ];
    if task.has_dependencies() {
        let open = incomplete_dependencies(state.original_tasks(), task).len();
        parts.push(format!("deps {} ({} open)", task.dependencies.len(), open));
    }
    if task.has_subtasks() {
        let (done, total) = task.subtask_progress();
        parts.push(format!("subtasks {}/{}", done, total));
    }
    if task.has_prd_source() {
        parts.push("from PRD".into());
    }
    Outcome::Success(parts.join(" \u{00B7} "))
}

/// Ask before deleting the selected task
pub fn request_delete(state: &mut BoardState) -> Outcome {
    match selected_id(state) {
        Ok(task_id) => {
            state.modal = Modal::ConfirmDelete { task_id };
            Outcome::ConfirmationRequired
        }
        Err(outcome) => outcome,
    }
}

/// Delete after confirmation. References to the task are removed from
/// other tasks' dependencies; the document is restored if the write fails.
pub fn confirm_delete(state: &mut BoardState, task_id: u64) -> Outcome {
    state.modal = Modal::None;
    let snapshot = state.document.clone();
    let removed = match task_ops::delete_task(&mut state.document, task_id) {
        Ok(task) => task,
        Err(e) => return Outcome::Rejected(e.to_string()),
    };
    if let Err(e) = state.persist() {
        state.document = snapshot;
        tracing::error!(task = task_id, error = %e, "delete rolled back");
        return Outcome::Failed(format!("could not save: {}", e));
    }
    if state.detail_task_id == Some(task_id) {
        state.close_overlay(OverlayKind::Details);
    }
    let summary = compact_summary(&removed, 60);
    state.record(OperationRecord::new(
        OperationKind::Delete,
        Some(task_id),
        summary.clone(),
    ));
    state.reload_lanes();
    Outcome::Success(format!("Deleted {}", summary))
}

/// Start editing the selected task's title
pub fn request_edit(state: &mut BoardState) -> Outcome {
    let Some(task) = state.selected_task() else {
        return Outcome::Rejected("No task selected".into());
    };
    state.modal = Modal::EditTitle {
        task_id: task.id,
        buffer: task.title.clone(),
    };
    Outcome::InputRequired
}

/// Save an edited title. Empty titles are refused.
pub fn commit_edit(state: &mut BoardState, task_id: u64, title: &str) -> Outcome {
    state.modal = Modal::None;
    let old = match task_ops::edit_title(&mut state.document, task_id, title) {
        Ok(old) => old,
        Err(e @ TaskError::EmptyTitle) => return Outcome::Rejected(capitalize(&e.to_string())),
        Err(e) => return Outcome::Rejected(e.to_string()),
    };
    if old == title.trim() {
        return Outcome::Rejected("Title unchanged".into());
    }
    if let Err(e) = state.persist() {
        if let Some(task) = state.document.find_task_mut(task_id) {
            task.title = old;
        }
        tracing::error!(task = task_id, error = %e, "title edit rolled back");
        return Outcome::Failed(format!("could not save: {}", e));
    }
    state.record(OperationRecord::new(
        OperationKind::EditTitle,
        Some(task_id),
        format!("#{} renamed", task_id),
    ));
    state.reload_lanes();
    Outcome::Success(format!("Renamed #{}", task_id))
}

/// Re-read the tasks file. On failure the current board stays up.
pub fn refresh(state: &mut BoardState) -> Outcome {
    match state.store.load() {
        Ok(doc) => {
            let count = doc.tasks.len();
            state.document = doc;
            state.reload_lanes();
            state.record(OperationRecord::new(
                OperationKind::Refresh,
                None,
                format!("{} tasks", count),
            ));
            Outcome::Success(format!("Reloaded {} tasks", count))
        }
        Err(e) => {
            tracing::error!(error = %e, "refresh failed");
            Outcome::Failed(format!("Refresh failed: {}", e))
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
