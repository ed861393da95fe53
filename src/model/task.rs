use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Workflow status of a task.
///
/// Statuses the board does not know are kept verbatim in `Other` so that a
/// read/write cycle never rewrites them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Done,
    Blocked,
    Deferred,
    Cancelled,
    Other(String),
}

impl TaskStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Done => "done",
            TaskStatus::Blocked => "blocked",
            TaskStatus::Deferred => "deferred",
            TaskStatus::Cancelled => "cancelled",
            TaskStatus::Other(raw) => raw,
        }
    }

    /// Parse a status name. Unknown names become `Other`.
    pub fn parse(s: &str) -> TaskStatus {
        match s {
            "pending" => TaskStatus::Pending,
            "in-progress" => TaskStatus::InProgress,
            "done" => TaskStatus::Done,
            "blocked" => TaskStatus::Blocked,
            "deferred" => TaskStatus::Deferred,
            "cancelled" => TaskStatus::Cancelled,
            other => TaskStatus::Other(other.to_string()),
        }
    }

    /// The lane this status is rendered in. Side statuses fold into pending.
    pub fn lane(&self) -> Lane {
        match self {
            TaskStatus::InProgress => Lane::InProgress,
            TaskStatus::Done => Lane::Done,
            _ => Lane::Pending,
        }
    }

    /// True for the three statuses that have a lane of their own
    pub fn is_lane_status(&self) -> bool {
        matches!(
            self,
            TaskStatus::Pending | TaskStatus::InProgress | TaskStatus::Done
        )
    }

    /// True for statuses rendered in a lane they do not belong to
    pub fn is_folded(&self) -> bool {
        !self.is_lane_status()
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

impl From<String> for TaskStatus {
    fn from(s: String) -> Self {
        TaskStatus::parse(&s)
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the three board lanes, in fixed display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lane {
    Pending,
    InProgress,
    Done,
}

impl Lane {
    pub const ALL: [Lane; 3] = [Lane::Pending, Lane::InProgress, Lane::Done];

    pub fn index(self) -> usize {
        match self {
            Lane::Pending => 0,
            Lane::InProgress => 1,
            Lane::Done => 2,
        }
    }

    pub fn from_index(index: usize) -> Lane {
        Lane::ALL[index % Lane::ALL.len()]
    }

    pub fn status(self) -> TaskStatus {
        match self {
            Lane::Pending => TaskStatus::Pending,
            Lane::InProgress => TaskStatus::InProgress,
            Lane::Done => TaskStatus::Done,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Lane::Pending => "Pending",
            Lane::InProgress => "In Progress",
            Lane::Done => "Done",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Lane::Pending => "\u{25CB}",    // ○
            Lane::InProgress => "\u{25D0}", // ◐
            Lane::Done => "\u{25CF}",       // ●
        }
    }
}

/// Task priority. Names are matched case-insensitively; anything else
/// reads as `Medium` and the stored value is written back untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }

    pub fn parse(s: &str) -> Option<Priority> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            "critical" => Some(Priority::Critical),
            _ => None,
        }
    }

    /// Priority for a stored value of any JSON type
    fn from_value(value: &Value) -> Priority {
        value.as_str().and_then(Priority::parse).unwrap_or_default()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance of a task generated from a PRD document.
///
/// Kept as the stored object so that every key, null or not, is written back
/// as read. The board only reads a few of them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrdSource {
    fields: IndexMap<String, Value>,
}

impl PrdSource {
    pub fn with_file_name(name: impl Into<String>) -> Self {
        let mut prd = PrdSource::default();
        prd.fields.insert("fileName".into(), Value::String(name.into()));
        prd
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn file_path(&self) -> Option<&str> {
        self.text("filePath")
    }

    pub fn file_name(&self) -> Option<&str> {
        self.text("fileName")
    }

    pub fn file_hash(&self) -> Option<&str> {
        self.text("fileHash")
    }

    pub fn parsed_date(&self) -> Option<&str> {
        self.text("parsedDate")
    }

    pub fn file_size(&self) -> Option<u64> {
        self.fields.get("fileSize").and_then(Value::as_u64)
    }
}

/// A subtask. Only the fields the board displays are typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SubtaskRecord", into = "SubtaskRecord")]
pub struct Subtask {
    pub id: u64,
    pub title: String,
    pub status: TaskStatus,
    pub extra: IndexMap<String, Value>,
    missing: MissingKeys,
}

impl Subtask {
    pub fn new(id: u64, title: impl Into<String>, status: TaskStatus) -> Self {
        Subtask {
            id,
            title: title.into(),
            status,
            extra: IndexMap::new(),
            missing: MissingKeys::default(),
        }
    }
}

/// A task as stored in the tasks document.
///
/// Reading and writing a task leaves its JSON unchanged: keys that were
/// absent stay absent while they hold their default, keys stored as `null`
/// are written as `null`, and a priority spelled differently from its
/// canonical name keeps its spelling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TaskRecord", into = "TaskRecord")]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub description: Option<String>,
    pub details: Option<String>,
    pub test_strategy: Option<String>,
    pub status: TaskStatus,
    pub priority: Priority,
    pub dependencies: Vec<u64>,
    pub subtasks: Vec<Subtask>,
    pub prd_source: Option<PrdSource>,
    /// Keys the board does not interpret, written back unchanged
    pub extra: IndexMap<String, Value>,
    missing: MissingKeys,
    stored_priority: Option<Value>,
}

impl Task {
    /// Create a pending, medium-priority task with no relations
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Task {
            id,
            title: title.into(),
            description: None,
            details: None,
            test_strategy: None,
            status: TaskStatus::Pending,
            priority: Priority::Medium,
            dependencies: Vec::new(),
            subtasks: Vec::new(),
            prd_source: None,
            extra: IndexMap::new(),
            missing: MissingKeys::default(),
            stored_priority: None,
        }
    }

    pub fn has_subtasks(&self) -> bool {
        !self.subtasks.is_empty()
    }

    pub fn has_dependencies(&self) -> bool {
        !self.dependencies.is_empty()
    }

    pub fn has_prd_source(&self) -> bool {
        self.prd_source.is_some()
    }

    /// (done, total) subtask counts
    pub fn subtask_progress(&self) -> (usize, usize) {
        let done = self
            .subtasks
            .iter()
            .filter(|s| s.status == TaskStatus::Done)
            .count();
        (done, self.subtasks.len())
    }

    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

/// Keys a stored task or subtask did not have, and optional keys it stored
/// as `null`. All false for tasks built in code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct MissingKeys {
    title: bool,
    status: bool,
    priority: bool,
    dependencies: bool,
    subtasks: bool,
    null_description: bool,
    null_details: bool,
    null_test_strategy: bool,
    null_prd_source: bool,
}

/// Wire shape of a task. `Some(None)` is a key stored as `null`.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskRecord {
    id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    details: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    test_strategy: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<TaskStatus>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    priority: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dependencies: Option<Vec<u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subtasks: Option<Vec<Subtask>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    prd_source: Option<Option<PrdSource>>,
    #[serde(flatten)]
    extra: IndexMap<String, Value>,
}

#[derive(Serialize, Deserialize)]
struct SubtaskRecord {
    id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<TaskStatus>,
    #[serde(flatten)]
    extra: IndexMap<String, Value>,
}

/// A key that is present deserializes to `Some`, even when its value is null
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Value to write for an optional key, given whether it was stored as null
fn nullable<T>(value: Option<T>, was_null: bool) -> Option<Option<T>> {
    match value {
        Some(v) => Some(Some(v)),
        None if was_null => Some(None),
        None => None,
    }
}

/// Value to write for a defaulted key, omitted while it was absent and unchanged
fn unless_default<T: Default + PartialEq>(value: T, was_missing: bool) -> Option<T> {
    if was_missing && value == T::default() {
        None
    } else {
        Some(value)
    }
}

impl From<TaskRecord> for Task {
    fn from(record: TaskRecord) -> Self {
        let missing = MissingKeys {
            title: record.title.is_none(),
            status: record.status.is_none(),
            priority: record.priority.is_none(),
            dependencies: record.dependencies.is_none(),
            subtasks: record.subtasks.is_none(),
            null_description: matches!(record.description, Some(None)),
            null_details: matches!(record.details, Some(None)),
            null_test_strategy: matches!(record.test_strategy, Some(None)),
            null_prd_source: matches!(record.prd_source, Some(None)),
        };
        Task {
            id: record.id,
            title: record.title.unwrap_or_default(),
            description: record.description.flatten(),
            details: record.details.flatten(),
            test_strategy: record.test_strategy.flatten(),
            status: record.status.unwrap_or_default(),
            priority: record
                .priority
                .as_ref()
                .map(Priority::from_value)
                .unwrap_or_default(),
            dependencies: record.dependencies.unwrap_or_default(),
            subtasks: record.subtasks.unwrap_or_default(),
            prd_source: record.prd_source.flatten(),
            extra: record.extra,
            missing,
            stored_priority: record.priority,
        }
    }
}

impl From<Task> for TaskRecord {
    fn from(task: Task) -> Self {
        let missing = task.missing;
        let priority = match task.stored_priority {
            Some(stored) if Priority::from_value(&stored) == task.priority => Some(stored),
            _ => unless_default(task.priority, missing.priority)
                .map(|p| Value::String(p.as_str().to_string())),
        };
        TaskRecord {
            id: task.id,
            title: unless_default(task.title, missing.title),
            description: nullable(task.description, missing.null_description),
            details: nullable(task.details, missing.null_details),
            test_strategy: nullable(task.test_strategy, missing.null_test_strategy),
            status: unless_default(task.status, missing.status),
            priority,
            dependencies: unless_default(task.dependencies, missing.dependencies),
            subtasks: unless_default(task.subtasks, missing.subtasks),
            prd_source: nullable(task.prd_source, missing.null_prd_source),
            extra: task.extra,
        }
    }
}

impl From<SubtaskRecord> for Subtask {
    fn from(record: SubtaskRecord) -> Self {
        Subtask {
            id: record.id,
            missing: MissingKeys {
                title: record.title.is_none(),
                status: record.status.is_none(),
                ..MissingKeys::default()
            },
            title: record.title.unwrap_or_default(),
            status: record.status.unwrap_or_default(),
            extra: record.extra,
        }
    }
}

impl From<Subtask> for SubtaskRecord {
    fn from(subtask: Subtask) -> Self {
        SubtaskRecord {
            id: subtask.id,
            title: unless_default(subtask.title, subtask.missing.title),
            status: unless_default(subtask.status, subtask.missing.status),
            extra: subtask.extra,
        }
    }
}
