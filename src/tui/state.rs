use std::time::{Duration, Instant};

use regex::Regex;

use crate::io::task_store::{StoreError, TaskStore};
use crate::model::{BoardConfig, BoardSettings, Task, TaskDocument};
use crate::ops::filter::{FilterPreset, Filters, filter_tasks};
use crate::tui::board::BoardLayout;
use crate::tui::modal::Modal;
use crate::tui::overlay::{OverlayKind, OverlayStack};
use crate::tui::render::format::search_regex;
use crate::tui::theme::Theme;
use crate::tui::undo::{
    BoundedStack, NAVIGATION_HISTORY_LIMIT, NavigationEntry, OPERATION_LOG_LIMIT,
    OperationRecord, STATUS_HISTORY_LIMIT, StatusChange,
};

/// Which pane Tab has moved focus to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusMode {
    #[default]
    Board,
    Details,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Error,
}

/// Transient status-bar message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: MessageKind,
    pub expires_at: Instant,
}

/// Result of a user action, shown in the status bar.
///
/// `Rejected` is a validation failure with state unchanged; `Failed` is an
/// I/O failure after which state was rolled back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(String),
    Rejected(String),
    Failed(String),
    ConfirmationRequired,
    InputRequired,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Why the action did not go through, if it did not
    pub fn reason(&self) -> Option<&str> {
        match self {
            Outcome::Rejected(reason) | Outcome::Failed(reason) => Some(reason),
            Outcome::ConfirmationRequired => Some("confirmation required"),
            Outcome::InputRequired => Some("input required"),
            Outcome::Success(_) => None,
        }
    }
}

/// Everything the board session knows. Rebuilt from the tasks file on
/// launch and discarded on exit.
pub struct BoardState {
    pub store: Box<dyn TaskStore>,
    /// The full document as last read or written
    pub document: TaskDocument,
    pub board: BoardLayout,
    pub theme: Theme,
    pub settings: BoardSettings,
    pub filters: Filters,
    pub preset: FilterPreset,
    /// Committed search query; empty when not searching
    pub search_query: String,
    pub modal: Modal,
    pub overlays: OverlayStack,
    pub focus: FocusMode,
    /// Task shown by the details popup
    pub detail_task_id: Option<u64>,
    pub navigation_history: BoundedStack<NavigationEntry>,
    pub status_history: BoundedStack<StatusChange>,
    pub operation_log: BoundedStack<OperationRecord>,
    pub message: Option<StatusMessage>,
    pub should_quit: bool,
}

impl BoardState {
    /// Load the document from `store` and lay the board out in a
    /// `width`×`height` terminal (the last row is the status bar).
    pub fn new(
        store: Box<dyn TaskStore>,
        config: &BoardConfig,
        width: u16,
        height: u16,
    ) -> Result<Self, StoreError> {
        let document = store.load()?;
        tracing::info!(
            location = %store.location(),
            tasks = document.tasks.len(),
            "loaded tasks"
        );
        let mut state = BoardState {
            store,
            document,
            board: BoardLayout::new(width as usize, height.saturating_sub(1) as usize),
            theme: Theme::from_config(&config.ui),
            settings: config.board.clone(),
            filters: Filters::default(),
            preset: FilterPreset::Off,
            search_query: String::new(),
            modal: Modal::None,
            overlays: OverlayStack::default(),
            focus: FocusMode::Board,
            detail_task_id: None,
            navigation_history: BoundedStack::new(NAVIGATION_HISTORY_LIMIT),
            status_history: BoundedStack::new(STATUS_HISTORY_LIMIT),
            operation_log: BoundedStack::new(OPERATION_LOG_LIMIT),
            message: None,
            should_quit: false,
        };
        state.reload_lanes();
        Ok(state)
    }

    /// Every task, ignoring filters and search
    pub fn original_tasks(&self) -> &[Task] {
        &self.document.tasks
    }

    /// The query lanes are filtered by: the pending buffer while the search
    /// modal is open, the committed query otherwise.
    pub fn active_query(&self) -> &str {
        match &self.modal {
            Modal::Search { buffer } => buffer,
            _ => &self.search_query,
        }
    }

    pub fn search_regex(&self) -> Option<Regex> {
        search_regex(self.active_query())
    }

    pub fn has_active_filters(&self) -> bool {
        !self.filters.is_empty() || !self.search_query.trim().is_empty()
    }

    /// Tasks passing the filters and the active query, in document order
    pub fn visible_tasks(&self) -> Vec<Task> {
        filter_tasks(&self.document.tasks, &self.filters, self.active_query())
    }

    /// Rebucket the lanes from the document, keeping selections
    pub fn reload_lanes(&mut self) {
        let visible = self.visible_tasks();
        self.board.load_tasks(&visible);
    }

    /// Terminal resized to `width`×`height`
    pub fn resize(&mut self, width: u16, height: u16) {
        self.board
            .resize(width as usize, height.saturating_sub(1) as usize);
    }

    /// Full terminal size the board was laid out for
    pub fn terminal_size(&self) -> (u16, u16) {
        let (w, h) = self.board.size();
        (w as u16, h as u16 + 1)
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.board.selected_task()
    }

    pub fn find_task(&self, id: u64) -> Option<&Task> {
        self.document.find_task(id)
    }

    /// Write the document with a fresh `updatedAt`. The in-memory document
    /// only takes the new timestamp once the write succeeded.
    pub fn persist(&mut self) -> Result<(), StoreError> {
        let mut doc = self.document.clone();
        doc.touch();
        self.store.save(&doc)?;
        self.document.metadata = doc.metadata;
        tracing::debug!(location = %self.store.location(), "saved tasks");
        Ok(())
    }

    pub fn record(&mut self, record: OperationRecord) {
        tracing::info!(
            op = record.kind.label(),
            task = ?record.task_id,
            "{}",
            record.summary
        );
        self.operation_log.push(record);
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.set_message(text.into(), MessageKind::Info);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.set_message(text.into(), MessageKind::Error);
    }

    fn set_message(&mut self, text: String, kind: MessageKind) {
        let ttl = Duration::from_secs(self.settings.status_message_secs);
        self.message = Some(StatusMessage {
            text,
            kind,
            expires_at: Instant::now() + ttl,
        });
    }

    /// Show an action's outcome in the status bar
    pub fn report(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Success(text) if !text.is_empty() => self.info(text.clone()),
            Outcome::Rejected(reason) | Outcome::Failed(reason) => self.error(reason.clone()),
            _ => {}
        }
    }

    /// Drop the status message once it has expired
    pub fn expire_message(&mut self, now: Instant) -> bool {
        if self.message.as_ref().is_some_and(|m| now >= m.expires_at) {
            self.message = None;
            return true;
        }
        false
    }

    /// Open a popup, keeping the focus mode in step
    pub fn open_overlay(&mut self, kind: OverlayKind) {
        if kind == OverlayKind::Details {
            self.detail_task_id = self.selected_task().map(|t| t.id);
        }
        self.overlays.open(kind);
        self.sync_focus();
    }

    /// Open `kind`, or close it when it is already the topmost popup
    pub fn toggle_overlay(&mut self, kind: OverlayKind) {
        if kind == OverlayKind::Details && self.overlays.top() != Some(kind) {
            self.detail_task_id = self.selected_task().map(|t| t.id);
        }
        self.overlays.toggle(kind);
        self.sync_focus();
    }

    pub fn close_overlay(&mut self, kind: OverlayKind) {
        self.overlays.close(kind);
        self.sync_focus();
    }

    pub fn close_top_overlay(&mut self) -> Option<OverlayKind> {
        let closed = self.overlays.close_top();
        self.sync_focus();
        closed
    }

    fn sync_focus(&mut self) {
        self.focus = match self.overlays.top() {
            Some(OverlayKind::Details) => FocusMode::Details,
            Some(OverlayKind::Help) => FocusMode::Help,
            _ => FocusMode::Board,
        };
    }
}
