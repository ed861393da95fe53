use crate::model::task::{Lane, TaskStatus};
use crate::tui::state::{BoardState, Outcome};
use crate::tui::undo::NavigationEntry;

/// The position the cursor is at now, as a history entry
fn current_position(state: &BoardState) -> NavigationEntry {
    let column = state.board.active_column();
    match (column.selected_index(), column.selected_task()) {
        (Some(index), Some(task)) => NavigationEntry::Task {
            lane: column.lane,
            index,
            task_id: task.id,
        },
        _ => NavigationEntry::Column { lane: column.lane },
    }
}

fn remember_position(state: &mut BoardState) {
    let entry = current_position(state);
    state.navigation_history.push(entry);
}

pub fn move_left(state: &mut BoardState) {
    remember_position(state);
    state.board.move_to_previous_column();
}

pub fn move_right(state: &mut BoardState) {
    remember_position(state);
    state.board.move_to_next_column();
}

pub fn move_up(state: &mut BoardState) -> bool {
    state.board.active_column_mut().move_selection_up()
}

pub fn move_down(state: &mut BoardState) -> bool {
    state.board.active_column_mut().move_selection_down()
}

pub fn select_first(state: &mut BoardState) {
    state.board.active_column_mut().select_first();
}

pub fn select_last(state: &mut BoardState) {
    state.board.active_column_mut().select_last();
}

pub fn page_up(state: &mut BoardState) -> bool {
    state.board.active_column_mut().page_up()
}

pub fn page_down(state: &mut BoardState) -> bool {
    state.board.active_column_mut().page_down()
}

/// Activate the lane for `status` and select its first task
pub fn jump_to_column(state: &mut BoardState, status: &TaskStatus) -> Outcome {
    if !status.is_lane_status() {
        return Outcome::Rejected("Invalid status".into());
    }
    let Some(index) = Lane::ALL.iter().position(|lane| lane.status() == *status) else {
        return Outcome::Rejected("Invalid status".into());
    };
    remember_position(state);
    state.board.activate(index);
    tracing::debug!(lane = ?Lane::ALL[index], "jumped to lane");
    Outcome::Success(format!("{} lane", Lane::ALL[index].title()))
}

/// Activate whichever lane holds `task_id` and select the task
pub fn jump_to_task(state: &mut BoardState, task_id: u64) -> Outcome {
    let present = state
        .board
        .columns()
        .iter()
        .any(|c| c.tasks().iter().any(|t| t.id == task_id));
    if !present {
        return Outcome::Rejected(format!("Task #{} is not on the board", task_id));
    }
    remember_position(state);
    state.board.focus_task(task_id);
    tracing::debug!(task = task_id, lane = ?state.board.active_lane(), "jumped to task");
    Outcome::Success(format!("Jumped to #{}", task_id))
}

/// Return to the last remembered position.
///
/// A lane entry re-selects the lane's first task. A task entry re-selects
/// the same index when the lane still has it, else leaves nothing selected.
pub fn go_back(state: &mut BoardState) -> Outcome {
    let Some(entry) = state.navigation_history.pop() else {
        return Outcome::Rejected("No navigation history".into());
    };
    tracing::debug!(?entry, "going back");
    match entry {
        NavigationEntry::Column { lane } => {
            state.board.activate(lane.index());
        }
        NavigationEntry::Task { lane, index, .. } => {
            state.board.activate(lane.index());
            let column = state.board.active_column_mut();
            if index < column.len() {
                column.select(Some(index));
            } else {
                column.clear_selection();
            }
        }
    }
    Outcome::Success(String::new())
}
