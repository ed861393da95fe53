pub mod controls;
pub mod modal;
pub mod navigate;
pub mod status;
pub mod task_ops;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::task::TaskStatus;
use crate::tui::overlay::OverlayKind;
use crate::tui::render::overlay_max_scroll;
use crate::tui::state::BoardState;

/// Handle a key press
pub fn handle_key(state: &mut BoardState, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }

    if state.modal.is_active() {
        modal::handle_modal_key(state, key);
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if key.code == KeyCode::Char('c') {
            state.should_quit = true;
        }
        return;
    }

    if !state.overlays.is_empty() && handle_overlay_key(state, key) {
        return;
    }

    handle_board_key(state, key);
}

/// Keys taken by the topmost popup. Returns false for keys that fall
/// through to the board.
fn handle_overlay_key(state: &mut BoardState, key: KeyEvent) -> bool {
    let Some(top) = state.overlays.top() else {
        return false;
    };
    let page = state.board.size().1.max(2) as isize / 2;
    let delta = match key.code {
        KeyCode::Up => -1,
        KeyCode::Down => 1,
        KeyCode::PageUp => -page,
        KeyCode::PageDown => page,
        KeyCode::Esc | KeyCode::Char('c') | KeyCode::Char('C') => {
            state.close_top_overlay();
            return true;
        }
        _ => return false,
    };
    let max = overlay_max_scroll(state, top);
    state.overlays.scroll_top(delta, max);
    true
}

fn handle_board_key(state: &mut BoardState, key: KeyEvent) {
    let outcome = match key.code {
        KeyCode::Left => {
            navigate::move_left(state);
            None
        }
        KeyCode::Right => {
            navigate::move_right(state);
            None
        }
        KeyCode::Up => {
            navigate::move_up(state);
            None
        }
        KeyCode::Down => {
            navigate::move_down(state);
            None
        }
        KeyCode::Home => {
            navigate::select_first(state);
            None
        }
        KeyCode::End => {
            navigate::select_last(state);
            None
        }
        KeyCode::PageUp => {
            navigate::page_up(state);
            None
        }
        KeyCode::PageDown => {
            navigate::page_down(state);
            None
        }
        KeyCode::Backspace => Some(navigate::go_back(state)),
        KeyCode::Tab => {
            controls::cycle_focus(state);
            None
        }
        KeyCode::Char('/') => {
            controls::begin_search(state);
            None
        }
        KeyCode::Char('?') => {
            state.toggle_overlay(OverlayKind::Help);
            None
        }
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            '1' => Some(status::move_selected(state, TaskStatus::Pending)),
            '2' => Some(status::move_selected(state, TaskStatus::InProgress)),
            '3' => Some(status::move_selected(state, TaskStatus::Done)),
            'u' => Some(status::undo_selected(state)),
            'v' => Some(task_ops::view_task(state)),
            'i' => Some(task_ops::task_info(state)),
            'd' => Some(task_ops::request_delete(state)),
            'e' => Some(task_ops::request_edit(state)),
            'r' => Some(task_ops::refresh(state)),
            's' => {
                state.toggle_overlay(OverlayKind::Stats);
                None
            }
            'h' => {
                state.toggle_overlay(OverlayKind::Help);
                None
            }
            'f' => Some(controls::cycle_filter_preset(state)),
            'x' => Some(controls::clear_all_filters(state)),
            'q' => {
                state.should_quit = true;
                None
            }
            _ => None,
        },
        _ => None,
    };
    if let Some(outcome) = outcome {
        state.report(&outcome);
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{key, state_with, task_with_status};
    use super::*;
    use crate::model::task::Lane;
    use crate::tui::modal::Modal;
    use crate::tui::state::{FocusMode, MessageKind};

    fn sample() -> Vec<crate::model::Task> {
        vec![
            task_with_status(1, TaskStatus::Pending),
            task_with_status(2, TaskStatus::Pending),
            task_with_status(3, TaskStatus::InProgress),
        ]
    }

    #[test]
    fn digit_moves_selected_task() {
        let mut state = state_with(sample());
        handle_key(&mut state, key(KeyCode::Char('2')));
        assert_eq!(state.document.tasks[0].status, TaskStatus::InProgress);
        assert_eq!(state.board.column(Lane::InProgress).len(), 2);
        // Cursor stays in the pending lane on the next task
        assert_eq!(state.board.active_lane(), Lane::Pending);
        assert_eq!(state.selected_task().map(|t| t.id), Some(2));
    }

    #[test]
    fn same_lane_digit_reports_unchanged() {
        let mut state = state_with(sample());
        handle_key(&mut state, key(KeyCode::Char('1')));
        let message = state.message.clone().unwrap();
        assert_eq!(message.text, "Status unchanged");
        assert_eq!(message.kind, MessageKind::Error);
    }

    #[test]
    fn arrows_move_lanes_and_tasks() {
        let mut state = state_with(sample());
        handle_key(&mut state, key(KeyCode::Down));
        assert_eq!(state.selected_task().map(|t| t.id), Some(2));
        handle_key(&mut state, key(KeyCode::Right));
        assert_eq!(state.board.active_lane(), Lane::InProgress);
        handle_key(&mut state, key(KeyCode::Backspace));
        assert_eq!(state.board.active_lane(), Lane::Pending);
        assert_eq!(state.selected_task().map(|t| t.id), Some(2));
    }

    #[test]
    fn upper_and_lower_case_letters_match() {
        let mut state = state_with(sample());
        handle_key(&mut state, key(KeyCode::Char('S')));
        assert_eq!(state.overlays.top(), Some(OverlayKind::Stats));
        handle_key(&mut state, key(KeyCode::Char('s')));
        assert!(state.overlays.is_empty());
    }

    #[test]
    fn help_over_details_and_close_order() {
        let mut state = state_with(sample());
        handle_key(&mut state, key(KeyCode::Tab));
        handle_key(&mut state, key(KeyCode::Char('?')));
        let kinds: Vec<OverlayKind> = state.overlays.iter().map(|o| o.kind).collect();
        assert_eq!(kinds, vec![OverlayKind::Details, OverlayKind::Help]);
        handle_key(&mut state, key(KeyCode::Esc));
        assert_eq!(state.overlays.top(), Some(OverlayKind::Details));
        assert_eq!(state.focus, FocusMode::Details);
        handle_key(&mut state, key(KeyCode::Char('c')));
        assert!(state.overlays.is_empty());
    }

    #[test]
    fn popup_takes_arrow_keys() {
        let mut state = state_with(sample());
        handle_key(&mut state, key(KeyCode::Char('h')));
        handle_key(&mut state, key(KeyCode::Down));
        assert_eq!(state.selected_task().map(|t| t.id), Some(1));
        assert!(state.overlays.scroll_of(OverlayKind::Help) <= 1);
    }

    #[test]
    fn slash_opens_search_modal() {
        let mut state = state_with(sample());
        handle_key(&mut state, key(KeyCode::Char('/')));
        assert!(matches!(state.modal, Modal::Search { .. }));
        handle_key(&mut state, key(KeyCode::Char('q')));
        assert!(!state.should_quit);
        assert_eq!(state.modal.buffer(), Some("q"));
    }

    #[test]
    fn delete_key_asks_first() {
        let mut state = state_with(sample());
        handle_key(&mut state, key(KeyCode::Char('d')));
        assert_eq!(state.modal, Modal::ConfirmDelete { task_id: 1 });
        handle_key(&mut state, key(KeyCode::Esc));
        assert_eq!(state.modal, Modal::None);
        assert_eq!(state.document.tasks.len(), 3);
    }

    #[test]
    fn quit_keys() {
        let mut state = state_with(sample());
        handle_key(&mut state, key(KeyCode::Char('Q')));
        assert!(state.should_quit);

        let mut state = state_with(sample());
        handle_key(
            &mut state,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(state.should_quit);
    }

    #[test]
    fn undo_key_reverts_move() {
        let mut state = state_with(sample());
        handle_key(&mut state, key(KeyCode::Char('3')));
        assert_eq!(state.document.tasks[0].status, TaskStatus::Done);
        handle_key(&mut state, key(KeyCode::Char('u')));
        assert_eq!(state.document.tasks[0].status, TaskStatus::Pending);
    }
}
