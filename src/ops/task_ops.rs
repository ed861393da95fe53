use crate::model::document::TaskDocument;
use crate::model::task::Task;

/// Error type for task operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("task #{0} not found")]
    NotFound(u64),
    #[error("title cannot be empty")]
    EmptyTitle,
}

/// Remove a task and strip its id from every other task's dependency list.
/// Returns the removed task.
pub fn delete_task(doc: &mut TaskDocument, task_id: u64) -> Result<Task, TaskError> {
    let index = doc
        .tasks
        .iter()
        .position(|t| t.id == task_id)
        .ok_or(TaskError::NotFound(task_id))?;
    let removed = doc.tasks.remove(index);
    for task in &mut doc.tasks {
        task.dependencies.retain(|dep| *dep != task_id);
    }
    Ok(removed)
}

/// Replace a task's title. Returns the previous title.
pub fn edit_title(
    doc: &mut TaskDocument,
    task_id: u64,
    new_title: &str,
) -> Result<String, TaskError> {
    let trimmed = new_title.trim();
    if trimmed.is_empty() {
        return Err(TaskError::EmptyTitle);
    }
    let task = doc.find_task_mut(task_id).ok_or(TaskError::NotFound(task_id))?;
    Ok(std::mem::replace(&mut task.title, trimmed.to_string()))
}

/// Ids of tasks that list `task_id` as a dependency
pub fn dependents_of(tasks: &[Task], task_id: u64) -> Vec<u64> {
    tasks
        .iter()
        .filter(|t| t.dependencies.contains(&task_id))
        .map(|t| t.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_doc() -> TaskDocument {
        let mut b = Task::new(2, "Second");
        b.dependencies = vec![1];
        let mut c = Task::new(3, "Third");
        c.dependencies = vec![1, 2];
        TaskDocument::new(vec![Task::new(1, "First"), b, c])
    }

    #[test]
    fn delete_removes_task_and_dependency_references() {
        let mut doc = sample_doc();
        let removed = delete_task(&mut doc, 1).unwrap();
        assert_eq!(removed.title, "First");
        assert_eq!(doc.tasks.len(), 2);
        assert!(doc.tasks[0].dependencies.is_empty());
        assert_eq!(doc.tasks[1].dependencies, vec![2]);
    }

    #[test]
    fn delete_unknown_task_fails() {
        let mut doc = sample_doc();
        assert_eq!(delete_task(&mut doc, 9), Err(TaskError::NotFound(9)));
        assert_eq!(doc.tasks.len(), 3);
    }

    #[test]
    fn edit_title_trims_and_returns_old() {
        let mut doc = sample_doc();
        let old = edit_title(&mut doc, 2, "  Renamed  ").unwrap();
        assert_eq!(old, "Second");
        assert_eq!(doc.tasks[1].title, "Renamed");
    }

    #[test]
    fn edit_title_rejects_empty() {
        let mut doc = sample_doc();
        assert_eq!(edit_title(&mut doc, 2, "   "), Err(TaskError::EmptyTitle));
        assert_eq!(doc.tasks[1].title, "Second");
    }

    #[test]
    fn dependents_lists_referencing_tasks() {
        let doc = sample_doc();
        assert_eq!(dependents_of(&doc.tasks, 1), vec![2, 3]);
        assert!(dependents_of(&doc.tasks, 3).is_empty());
    }
}
