/// Input capture that takes over the keyboard until it is committed or
/// cancelled. At most one is active.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Modal {
    #[default]
    None,
    /// Typing a search query; lanes preview the matches live
    Search { buffer: String },
    /// Waiting for y/n before deleting a task
    ConfirmDelete { task_id: u64 },
    /// Typing a replacement title
    EditTitle { task_id: u64, buffer: String },
    /// Full detail view; the next key dismisses it
    AnyKey,
}

impl Modal {
    pub fn is_active(&self) -> bool {
        !matches!(self, Modal::None)
    }

    /// The text being typed, for modals that take text
    pub fn buffer(&self) -> Option<&str> {
        match self {
            Modal::Search { buffer } | Modal::EditTitle { buffer, .. } => Some(buffer),
            _ => None,
        }
    }

    pub fn buffer_mut(&mut self) -> Option<&mut String> {
        match self {
            Modal::Search { buffer } | Modal::EditTitle { buffer, .. } => Some(buffer),
            _ => None,
        }
    }

    /// Text modals show the terminal cursor
    pub fn shows_cursor(&self) -> bool {
        self.buffer().is_some()
    }
}
