use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::task::Task;

/// The persisted tasks document: an ordered task list plus metadata.
///
/// Top-level keys other than `tasks` and `metadata` are kept in `extra` and
/// written back unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TaskDocument {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default, skip_serializing_if = "DocumentMetadata::is_empty")]
    pub metadata: DocumentMetadata,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// Document metadata block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(
        rename = "updatedAt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl DocumentMetadata {
    pub fn is_empty(&self) -> bool {
        self.updated_at.is_none() && self.extra.is_empty()
    }
}

impl TaskDocument {
    pub fn new(tasks: Vec<Task>) -> Self {
        TaskDocument {
            tasks,
            ..Default::default()
        }
    }

    pub fn find_task(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn find_task_mut(&mut self, id: u64) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Stamp `metadata.updatedAt` with the current time
    pub fn touch(&mut self) {
        self.metadata.updated_at = Some(
            chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrelated_top_level_fields_round_trip() {
        let json = r#"{
            "tasks": [{"id": 1, "title": "a"}],
            "metadata": {"updatedAt": "2025-01-01T00:00:00Z", "projectName": "hero"},
            "version": 3
        }"#;
        let doc: TaskDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.extra.get("version"), Some(&Value::from(3)));
        assert_eq!(
            doc.metadata.extra.get("projectName"),
            Some(&Value::from("hero"))
        );

        let reparsed: TaskDocument =
            serde_json::from_str(&serde_json::to_string(&doc).unwrap()).unwrap();
        assert_eq!(reparsed, doc);
    }

    #[test]
    fn missing_metadata_is_not_invented() {
        let doc: TaskDocument = serde_json::from_str(r#"{"tasks":[]}"#).unwrap();
        let out = serde_json::to_value(&doc).unwrap();
        assert!(out.get("metadata").is_none());
    }

    #[test]
    fn touch_sets_updated_at() {
        let mut doc = TaskDocument::new(vec![Task::new(1, "a")]);
        assert!(doc.metadata.updated_at.is_none());
        doc.touch();
        let stamp = doc.metadata.updated_at.clone().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(&stamp).is_ok());
    }

    #[test]
    fn find_task_by_id() {
        let mut doc = TaskDocument::new(vec![Task::new(1, "a"), Task::new(9, "b")]);
        assert_eq!(doc.find_task(9).map(|t| t.title.as_str()), Some("b"));
        assert!(doc.find_task(2).is_none());
        doc.find_task_mut(1).unwrap().title = "renamed".into();
        assert_eq!(doc.tasks[0].title, "renamed");
    }
}
