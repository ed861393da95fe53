use crate::ops::filter::{FilterPreset, Filters};
use crate::tui::modal::Modal;
use crate::tui::overlay::OverlayKind;
use crate::tui::state::{BoardState, FocusMode, Outcome};
use crate::tui::undo::{OperationKind, OperationRecord};

/// Recompute the lanes from every task through the filters and query
pub fn apply_filters(state: &mut BoardState) {
    state.reload_lanes();
}

/// Set one filter by name. Invalid names or values leave everything as it
/// was.
pub fn set_filter(state: &mut BoardState, name: &str, value: &str) -> Outcome {
    let mut filters = state.filters.clone();
    if let Err(e) = filters.set(name, value) {
        return Outcome::Rejected(e.to_string());
    }
    state.filters = filters;
    state.preset = FilterPreset::Off;
    apply_filters(state);
    let summary = describe_filters(state);
    state.record(OperationRecord::new(OperationKind::Filter, None, summary.clone()));
    Outcome::Success(summary)
}

/// Drop every filter and the search query and show all tasks again
pub fn clear_all_filters(state: &mut BoardState) -> Outcome {
    if !state.has_active_filters() {
        return Outcome::Rejected("No filters active".into());
    }
    state.filters = Filters::default();
    state.preset = FilterPreset::Off;
    state.search_query.clear();
    apply_filters(state);
    state.record(OperationRecord::new(OperationKind::Filter, None, "cleared"));
    Outcome::Success("Filters cleared".into())
}

/// Step to the next quick filter preset
pub fn cycle_filter_preset(state: &mut BoardState) -> Outcome {
    state.preset = state.preset.next();
    state.filters = state.preset.filters();
    apply_filters(state);
    let label = state.preset.label();
    state.record(OperationRecord::new(OperationKind::Filter, None, label));
    Outcome::Success(format!("Filter: {}", label))
}

/// Active filter summary, e.g. `priority>=high /auth`
pub fn describe_filters(state: &BoardState) -> String {
    let mut parts = Vec::new();
    let filters = state.filters.describe();
    if !filters.is_empty() {
        parts.push(filters);
    }
    if !state.search_query.is_empty() {
        parts.push(format!("/{}", state.search_query));
    }
    parts.join(" ")
}

/// Open the search prompt, starting from the committed query
pub fn begin_search(state: &mut BoardState) {
    state.modal = Modal::Search {
        buffer: state.search_query.clone(),
    };
}

/// Lanes follow the search buffer while typing
pub fn search_changed(state: &mut BoardState) {
    apply_filters(state);
}

pub fn commit_search(state: &mut BoardState) -> Outcome {
    let Modal::Search { buffer } = std::mem::take(&mut state.modal) else {
        return Outcome::Rejected("Not searching".into());
    };
    state.search_query = buffer.trim().to_string();
    apply_filters(state);
    if state.search_query.is_empty() {
        return Outcome::Success("Search cleared".into());
    }
    let matches = state.visible_tasks().len();
    Outcome::Success(format!(
        "{} match{} for \"{}\"",
        matches,
        if matches == 1 { "" } else { "es" },
        state.search_query
    ))
}

/// Leave the search prompt; the committed query's view comes back
pub fn cancel_search(state: &mut BoardState) {
    state.modal = Modal::None;
    apply_filters(state);
}

/// Tab: board → details → help → board
pub fn cycle_focus(state: &mut BoardState) {
    match state.focus {
        FocusMode::Board => state.open_overlay(OverlayKind::Details),
        FocusMode::Details => {
            state.close_overlay(OverlayKind::Details);
            state.open_overlay(OverlayKind::Help);
        }
        FocusMode::Help => state.close_overlay(OverlayKind::Help),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::{Priority, Task, TaskStatus};
    use crate::tui::input::test_support::{state_with, task_with_status};

    fn tasks() -> Vec<Task> {
        let mut a = Task::new(1, "Implement auth flow");
        a.priority = Priority::High;
        let mut b = Task::new(2, "Refresh board");
        b.priority = Priority::Critical;
        b.dependencies = vec![1];
        let mut c = task_with_status(3, TaskStatus::Done);
        c.priority = Priority::Low;
        vec![a, b, c]
    }

    fn visible_ids(state: &BoardState) -> Vec<u64> {
        let mut ids: Vec<u64> = state
            .board
            .columns()
            .iter()
            .flat_map(|c| c.tasks().iter().map(|t| t.id))
            .collect();
        ids.sort();
        ids
    }

    #[test]
    fn filters_combine_and_clear_restores_everything() {
        let mut state = state_with(tasks());
        assert!(set_filter(&mut state, "hasDependencies", "yes").is_success());
        assert_eq!(visible_ids(&state), vec![2]);
        state.search_query = "auth".into();
        apply_filters(&mut state);
        assert!(visible_ids(&state).is_empty());

        assert!(clear_all_filters(&mut state).is_success());
        assert_eq!(visible_ids(&state), vec![1, 2, 3]);
        assert!(state.search_query.is_empty());
        assert_eq!(state.document.tasks, tasks());
    }

    #[test]
    fn invalid_filter_is_rejected_without_change() {
        let mut state = state_with(tasks());
        set_filter(&mut state, "priority", "high");
        let before = state.filters.clone();
        let outcome = set_filter(&mut state, "priority", "urgent");
        assert!(!outcome.is_success());
        assert!(outcome.reason().is_some_and(|r| r.contains("urgent")));
        assert_eq!(state.filters, before);
        assert_eq!(visible_ids(&state), vec![1]);
    }

    #[test]
    fn preset_cycle_filters_high_priority() {
        let mut state = state_with(tasks());
        let outcome = cycle_filter_preset(&mut state);
        assert_eq!(outcome, Outcome::Success("Filter: high priority".into()));
        assert_eq!(visible_ids(&state), vec![1, 2]);
        for _ in 0..4 {
            cycle_filter_preset(&mut state);
        }
        assert_eq!(state.preset, FilterPreset::Off);
        assert_eq!(visible_ids(&state), vec![1, 2, 3]);
    }

    #[test]
    fn live_search_and_cancel() {
        let mut state = state_with(tasks());
        begin_search(&mut state);
        if let Some(buffer) = state.modal.buffer_mut() {
            buffer.push_str("auth");
        }
        search_changed(&mut state);
        assert_eq!(visible_ids(&state), vec![1]);
        cancel_search(&mut state);
        assert_eq!(state.modal, Modal::None);
        assert_eq!(visible_ids(&state), vec![1, 2, 3]);
        assert!(state.search_query.is_empty());
    }

    #[test]
    fn commit_search_reports_matches() {
        let mut state = state_with(tasks());
        begin_search(&mut state);
        if let Some(buffer) = state.modal.buffer_mut() {
            buffer.push_str("AUTH ");
        }
        let outcome = commit_search(&mut state);
        assert_eq!(outcome, Outcome::Success("1 match for \"AUTH\"".into()));
        assert_eq!(state.search_query, "AUTH");
        assert_eq!(describe_filters(&state), "/AUTH");
    }

    #[test]
    fn tab_cycles_focus() {
        let mut state = state_with(tasks());
        cycle_focus(&mut state);
        assert_eq!(state.focus, FocusMode::Details);
        assert_eq!(state.overlays.top(), Some(OverlayKind::Details));
        cycle_focus(&mut state);
        assert_eq!(state.focus, FocusMode::Help);
        assert!(!state.overlays.is_open(OverlayKind::Details));
        cycle_focus(&mut state);
        assert_eq!(state.focus, FocusMode::Board);
        assert!(state.overlays.is_empty());
    }
}
