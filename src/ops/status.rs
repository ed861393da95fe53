use crate::model::task::{Task, TaskStatus};

/// Why a status transition was refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("Invalid status")]
    InvalidStatus(TaskStatus),
    #[error("task #{0} not found")]
    TaskNotFound(u64),
    #[error("Status unchanged")]
    Unchanged,
    #[error("Incomplete dependencies: {}", format_ids(.0))]
    IncompleteDependencies(Vec<u64>),
}

fn format_ids(ids: &[u64]) -> String {
    ids.iter()
        .map(|id| format!("#{}", id))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Dependencies of `task` that are not `done`, in dependency order.
/// An id that resolves to no task counts as incomplete.
pub fn incomplete_dependencies(tasks: &[Task], task: &Task) -> Vec<u64> {
    task.dependencies
        .iter()
        .copied()
        .filter(|dep| {
            !tasks
                .iter()
                .any(|t| t.id == *dep && t.status == TaskStatus::Done)
        })
        .collect()
}

/// Check whether `task_id` may move to `new_status`.
///
/// Only the three lane statuses are valid targets. A move to `done` is
/// gated on every dependency already being `done`. Returns the task's
/// current status on success.
pub fn validate_transition(
    tasks: &[Task],
    task_id: u64,
    new_status: &TaskStatus,
) -> Result<TaskStatus, TransitionError> {
    if !new_status.is_lane_status() {
        return Err(TransitionError::InvalidStatus(new_status.clone()));
    }
    let task = tasks
        .iter()
        .find(|t| t.id == task_id)
        .ok_or(TransitionError::TaskNotFound(task_id))?;
    if task.status == *new_status {
        return Err(TransitionError::Unchanged);
    }
    if *new_status == TaskStatus::Done {
        let open = incomplete_dependencies(tasks, task);
        if !open.is_empty() {
            return Err(TransitionError::IncompleteDependencies(open));
        }
    }
    Ok(task.status.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_status(id: u64, status: TaskStatus, deps: &[u64]) -> Task {
        let mut t = Task::new(id, format!("Task {}", id));
        t.status = status;
        t.dependencies = deps.to_vec();
        t
    }

    fn scenario() -> Vec<Task> {
        vec![
            with_status(2, TaskStatus::Done, &[]),
            with_status(3, TaskStatus::Pending, &[]),
            with_status(5, TaskStatus::Pending, &[2, 3]),
        ]
    }

    #[test]
    fn side_statuses_are_not_valid_targets() {
        let tasks = scenario();
        assert_eq!(
            validate_transition(&tasks, 3, &TaskStatus::Blocked),
            Err(TransitionError::InvalidStatus(TaskStatus::Blocked))
        );
        assert_eq!(
            TransitionError::InvalidStatus(TaskStatus::Blocked).to_string(),
            "Invalid status"
        );
    }

    #[test]
    fn same_status_is_rejected() {
        let tasks = scenario();
        assert_eq!(
            validate_transition(&tasks, 3, &TaskStatus::Pending),
            Err(TransitionError::Unchanged)
        );
    }

    #[test]
    fn done_gated_on_dependencies() {
        let tasks = scenario();
        assert_eq!(
            validate_transition(&tasks, 5, &TaskStatus::Done),
            Err(TransitionError::IncompleteDependencies(vec![3]))
        );
        // Other targets are not gated
        assert_eq!(
            validate_transition(&tasks, 5, &TaskStatus::InProgress),
            Ok(TaskStatus::Pending)
        );
    }

    #[test]
    fn done_allowed_once_dependencies_are_done() {
        let mut tasks = scenario();
        tasks[1].status = TaskStatus::Done;
        assert_eq!(
            validate_transition(&tasks, 5, &TaskStatus::Done),
            Ok(TaskStatus::Pending)
        );
    }

    #[test]
    fn missing_dependency_counts_as_incomplete() {
        let tasks = vec![with_status(1, TaskStatus::Pending, &[99])];
        assert_eq!(incomplete_dependencies(&tasks, &tasks[0]), vec![99]);
    }

    #[test]
    fn unknown_task_is_reported() {
        assert_eq!(
            validate_transition(&scenario(), 77, &TaskStatus::Done),
            Err(TransitionError::TaskNotFound(77))
        );
    }

    #[test]
    fn incomplete_dependencies_message_lists_ids() {
        assert_eq!(
            TransitionError::IncompleteDependencies(vec![3, 4]).to_string(),
            "Incomplete dependencies: #3, #4"
        );
    }
}
