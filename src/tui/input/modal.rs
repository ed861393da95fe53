use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::modal::Modal;
use crate::tui::state::{BoardState, Outcome};
use crate::util::unicode::prev_grapheme_boundary;

use super::controls::{cancel_search, commit_search, search_changed};
use super::task_ops::{confirm_delete, commit_edit, dismiss_view};

fn is_cancel(key: &KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Apply a text-editing key to `buffer`; returns whether it changed
fn edit_buffer(buffer: &mut String, key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Char(c)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            buffer.push(c);
            true
        }
        KeyCode::Backspace => match prev_grapheme_boundary(buffer, buffer.len()) {
            Some(at) => {
                buffer.truncate(at);
                true
            }
            None => false,
        },
        _ => false,
    }
}

/// Route a key to the active modal. Escape and Ctrl-C cancel any modal;
/// every exit leaves `Modal::None` behind.
pub fn handle_modal_key(state: &mut BoardState, key: KeyEvent) {
    if is_cancel(&key) {
        match state.modal {
            Modal::Search { .. } => cancel_search(state),
            Modal::AnyKey => dismiss_view(state),
            Modal::ConfirmDelete { .. } | Modal::EditTitle { .. } => {
                state.modal = Modal::None;
                state.info("Cancelled");
            }
            Modal::None => {}
        }
        return;
    }

    match &mut state.modal {
        Modal::None => {}
        Modal::AnyKey => dismiss_view(state),
        Modal::Search { buffer } => {
            if key.code == KeyCode::Enter {
                let outcome = commit_search(state);
                state.report(&outcome);
            } else if edit_buffer(buffer, &key) {
                search_changed(state);
            }
        }
        Modal::EditTitle { task_id, buffer } => {
            if key.code == KeyCode::Enter {
                let (task_id, title) = (*task_id, std::mem::take(buffer));
                let outcome = commit_edit(state, task_id, &title);
                state.report(&outcome);
            } else {
                edit_buffer(buffer, &key);
            }
        }
        Modal::ConfirmDelete { task_id } => {
            let task_id = *task_id;
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    let outcome = confirm_delete(state, task_id);
                    state.report(&outcome);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Enter => {
                    state.modal = Modal::None;
                    state.report(&Outcome::Success("Delete cancelled".into()));
                }
                _ => {}
            }
        }
    }
}
