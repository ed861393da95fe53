use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::model::task::{Lane, TaskStatus};

pub const NAVIGATION_HISTORY_LIMIT: usize = 10;
pub const STATUS_HISTORY_LIMIT: usize = 20;
pub const OPERATION_LOG_LIMIT: usize = 10;

/// LIFO stack that drops its oldest entry once `limit` is exceeded
#[derive(Debug, Clone)]
pub struct BoundedStack<T> {
    items: VecDeque<T>,
    limit: usize,
}

impl<T> BoundedStack<T> {
    pub fn new(limit: usize) -> Self {
        BoundedStack {
            items: VecDeque::with_capacity(limit),
            limit,
        }
    }

    pub fn push(&mut self, item: T) {
        self.items.push_back(item);
        while self.items.len() > self.limit {
            self.items.pop_front();
        }
    }

    pub fn pop(&mut self) -> Option<T> {
        self.items.pop_back()
    }

    pub fn peek(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Oldest first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> {
        self.items.iter()
    }
}

/// A board position the user can return to with `go back`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEntry {
    Column { lane: Lane },
    Task { lane: Lane, index: usize, task_id: u64 },
}

/// One accepted status transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub task_id: u64,
    pub old_status: TaskStatus,
    pub new_status: TaskStatus,
    pub timestamp: DateTime<Utc>,
}

impl StatusChange {
    pub fn new(task_id: u64, old_status: TaskStatus, new_status: TaskStatus) -> Self {
        StatusChange {
            task_id,
            old_status,
            new_status,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationKind {
    StatusChange,
    Undo,
    Delete,
    EditTitle,
    Refresh,
    Filter,
}

impl OperationKind {
    pub fn label(&self) -> &'static str {
        match self {
            OperationKind::StatusChange => "status",
            OperationKind::Undo => "undo",
            OperationKind::Delete => "delete",
            OperationKind::EditTitle => "edit",
            OperationKind::Refresh => "refresh",
            OperationKind::Filter => "filter",
        }
    }
}

/// Entry in the operation log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRecord {
    pub kind: OperationKind,
    pub task_id: Option<u64>,
    pub summary: String,
    pub timestamp: DateTime<Utc>,
}

impl OperationRecord {
    pub fn new(kind: OperationKind, task_id: Option<u64>, summary: impl Into<String>) -> Self {
        OperationRecord {
            kind,
            task_id,
            summary: summary.into(),
            timestamp: Utc::now(),
        }
    }
}
