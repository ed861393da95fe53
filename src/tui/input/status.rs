use crate::io::task_store::StoreError;
use crate::model::task::TaskStatus;
use crate::ops::status::{TransitionError, validate_transition};
use crate::tui::state::{BoardState, Outcome};
use crate::tui::undo::{OperationKind, OperationRecord, StatusChange};

#[derive(Debug, thiserror::Error)]
pub enum StatusUpdateError {
    #[error(transparent)]
    Rejected(#[from] TransitionError),
    #[error("could not save: {0}")]
    Persist(#[from] StoreError),
    #[error("Nothing to undo")]
    NothingToUndo,
}

impl StatusUpdateError {
    /// Dependency ids blocking a move to done, if that was the reason
    pub fn incomplete_dependencies(&self) -> Option<&[u64]> {
        match self {
            StatusUpdateError::Rejected(TransitionError::IncompleteDependencies(ids)) => {
                Some(ids)
            }
            _ => None,
        }
    }
}

impl From<&StatusUpdateError> for Outcome {
    fn from(err: &StatusUpdateError) -> Self {
        match err {
            StatusUpdateError::Persist(_) => Outcome::Failed(err.to_string()),
            _ => Outcome::Rejected(err.to_string()),
        }
    }
}

/// Per-id results of a batch update
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub success_count: usize,
    pub error_count: usize,
    pub results: Vec<(u64, Result<StatusChange, StatusUpdateError>)>,
}

/// Move a task to one of the lane statuses.
///
/// The history entry is staged before the write and only committed once
/// the document is saved. A failed write puts the old status back and
/// discards the entry.
pub fn update_task_status(
    state: &mut BoardState,
    task_id: u64,
    new_status: TaskStatus,
) -> Result<StatusChange, StatusUpdateError> {
    let old_status = validate_transition(&state.document.tasks, task_id, &new_status)
        .inspect_err(|e| tracing::warn!(task = task_id, reason = %e, "status change rejected"))?;
    let staged = StatusChange::new(task_id, old_status.clone(), new_status.clone());

    set_status(state, task_id, new_status.clone());
    if let Err(e) = state.persist() {
        set_status(state, task_id, old_status);
        tracing::error!(task = task_id, error = %e, "status change rolled back");
        return Err(e.into());
    }

    state.status_history.push(staged.clone());
    state.record(OperationRecord::new(
        OperationKind::StatusChange,
        Some(task_id),
        format!("#{} {} -> {}", task_id, staged.old_status, new_status),
    ));
    state.reload_lanes();
    Ok(staged)
}

/// Revert the most recent status change.
///
/// The entry goes back on the history when the write fails. An entry for a
/// task that no longer exists is dropped.
pub fn undo_last_change(state: &mut BoardState) -> Result<StatusChange, StatusUpdateError> {
    let change = state
        .status_history
        .pop()
        .ok_or(StatusUpdateError::NothingToUndo)?;
    if state.find_task(change.task_id).is_none() {
        return Err(TransitionError::TaskNotFound(change.task_id).into());
    }

    set_status(state, change.task_id, change.old_status.clone());
    if let Err(e) = state.persist() {
        set_status(state, change.task_id, change.new_status.clone());
        tracing::error!(task = change.task_id, error = %e, "undo rolled back");
        state.status_history.push(change);
        return Err(e.into());
    }

    state.record(OperationRecord::new(
        OperationKind::Undo,
        Some(change.task_id),
        format!(
            "#{} {} -> {}",
            change.task_id, change.new_status, change.old_status
        ),
    ));
    state.reload_lanes();
    Ok(change)
}

/// Apply the same status to several tasks. Each id succeeds or fails on
/// its own.
pub fn batch_update_status(
    state: &mut BoardState,
    task_ids: &[u64],
    new_status: &TaskStatus,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    for &id in task_ids {
        let result = update_task_status(state, id, new_status.clone());
        if result.is_ok() {
            outcome.success_count += 1;
        } else {
            outcome.error_count += 1;
        }
        outcome.results.push((id, result));
    }
    outcome
}

/// Key handler for 1/2/3: move the selected task and report the result
pub fn move_selected(state: &mut BoardState, new_status: TaskStatus) -> Outcome {
    let Some(task_id) = state.selected_task().map(|t| t.id) else {
        return Outcome::Rejected("No task selected".into());
    };
    match update_task_status(state, task_id, new_status) {
        Ok(change) => Outcome::Success(format!(
            "#{} moved to {}",
            change.task_id, change.new_status
        )),
        Err(e) => Outcome::from(&e),
    }
}

/// Key handler for U
pub fn undo_selected(state: &mut BoardState) -> Outcome {
    match undo_last_change(state) {
        Ok(change) => Outcome::Success(format!(
            "Undid #{}: back to {}",
            change.task_id, change.old_status
        )),
        Err(e) => Outcome::from(&e),
    }
}

fn set_status(state: &mut BoardState, task_id: u64, status: TaskStatus) {
    if let Some(task) = state.document.find_task_mut(task_id) {
        task.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::Lane;
    use crate::tui::input::test_support::{failing_state_with, state_with, task_with_status};
    use crate::tui::undo::STATUS_HISTORY_LIMIT;

    #[test]
    fn accepted_change_persists_and_reloads() {
        let mut state = state_with(vec![task_with_status(1, TaskStatus::Pending)]);
        let change = update_task_status(&mut state, 1, TaskStatus::InProgress).unwrap();
        assert_eq!(change.old_status, TaskStatus::Pending);
        assert_eq!(state.document.tasks[0].status, TaskStatus::InProgress);
        assert!(state.document.metadata.updated_at.is_some());
        assert_eq!(state.board.column(Lane::InProgress).len(), 1);
        assert_eq!(state.status_history.len(), 1);
        assert_eq!(state.operation_log.len(), 1);
    }

    #[test]
    fn unchanged_status_is_rejected() {
        let mut state = state_with(vec![task_with_status(1, TaskStatus::Pending)]);
        let err = update_task_status(&mut state, 1, TaskStatus::Pending).unwrap_err();
        assert_eq!(err.to_string(), "Status unchanged");
        assert!(state.status_history.is_empty());
    }

    #[test]
    fn side_status_is_invalid_target() {
        let mut state = state_with(vec![task_with_status(1, TaskStatus::Pending)]);
        let err = update_task_status(&mut state, 1, TaskStatus::Blocked).unwrap_err();
        assert_eq!(Outcome::from(&err).reason(), Some("Invalid status"));
    }

    #[test]
    fn done_gated_on_dependencies() {
        let mut blocked = task_with_status(5, TaskStatus::InProgress);
        blocked.dependencies = vec![3, 4];
        let mut state = state_with(vec![
            task_with_status(3, TaskStatus::Done),
            task_with_status(4, TaskStatus::Pending),
            blocked,
        ]);
        let err = update_task_status(&mut state, 5, TaskStatus::Done).unwrap_err();
        assert_eq!(err.incomplete_dependencies(), Some(&[4][..]));
        assert_eq!(state.document.tasks[2].status, TaskStatus::InProgress);
        assert!(state.status_history.is_empty());
    }

    #[test]
    fn failed_write_rolls_back_without_history() {
        let mut state = failing_state_with(vec![task_with_status(1, TaskStatus::Pending)]);
        let err = update_task_status(&mut state, 1, TaskStatus::Done).unwrap_err();
        assert!(matches!(err, StatusUpdateError::Persist(_)));
        assert_eq!(state.document.tasks[0].status, TaskStatus::Pending);
        assert!(state.status_history.is_empty());
        assert_eq!(state.board.column(Lane::Pending).len(), 1);
    }

    #[test]
    fn undo_reverts_last_change() {
        let mut state = state_with(vec![task_with_status(1, TaskStatus::Pending)]);
        update_task_status(&mut state, 1, TaskStatus::InProgress).unwrap();
        update_task_status(&mut state, 1, TaskStatus::Done).unwrap();
        let undone = undo_last_change(&mut state).unwrap();
        assert_eq!(undone.new_status, TaskStatus::Done);
        assert_eq!(state.document.tasks[0].status, TaskStatus::InProgress);
        undo_last_change(&mut state).unwrap();
        assert_eq!(state.document.tasks[0].status, TaskStatus::Pending);
        assert!(matches!(
            undo_last_change(&mut state),
            Err(StatusUpdateError::NothingToUndo)
        ));
    }

    #[test]
    fn undo_restores_side_status() {
        let mut state = state_with(vec![task_with_status(1, TaskStatus::Blocked)]);
        update_task_status(&mut state, 1, TaskStatus::InProgress).unwrap();
        undo_last_change(&mut state).unwrap();
        assert_eq!(state.document.tasks[0].status, TaskStatus::Blocked);
    }

    #[test]
    fn failed_undo_keeps_entry() {
        let mut state = state_with(vec![task_with_status(1, TaskStatus::Pending)]);
        update_task_status(&mut state, 1, TaskStatus::InProgress).unwrap();
        state.store = Box::new({
            let mut store = crate::io::task_store::MemoryStore::new(state.document.clone());
            store.fail_writes = true;
            store
        });
        assert!(undo_last_change(&mut state).is_err());
        assert_eq!(state.document.tasks[0].status, TaskStatus::InProgress);
        assert_eq!(state.status_history.len(), 1);
    }

    #[test]
    fn status_history_is_capped() {
        let mut state = state_with(vec![task_with_status(1, TaskStatus::Pending)]);
        let cycle = [TaskStatus::InProgress, TaskStatus::Pending];
        for i in 0..30 {
            update_task_status(&mut state, 1, cycle[i % 2].clone()).unwrap();
        }
        assert_eq!(state.status_history.len(), STATUS_HISTORY_LIMIT);
    }

    #[test]
    fn batch_counts_each_id() {
        let mut state = state_with(vec![
            task_with_status(1, TaskStatus::Pending),
            task_with_status(2, TaskStatus::InProgress),
            task_with_status(3, TaskStatus::Pending),
        ]);
        let outcome = batch_update_status(&mut state, &[1, 2, 3, 9], &TaskStatus::InProgress);
        assert_eq!(outcome.success_count, 2);
        assert_eq!(outcome.error_count, 2);
        assert_eq!(outcome.results.len(), 4);
        assert!(outcome.results[1].1.is_err());
    }
}
