use crate::model::task::{Priority, Task, TaskStatus};

/// Error type for filter validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("unknown filter: {0}")]
    UnknownFilter(String),
    #[error("invalid value {value:?} for filter {name}")]
    InvalidValue { name: String, value: String },
}

/// Independent optional predicates. Set predicates combine with AND; an
/// unset predicate matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    /// Priority at or above this level
    pub min_priority: Option<Priority>,
    pub prd_source: Option<bool>,
    pub has_subtasks: Option<bool>,
    pub has_dependencies: Option<bool>,
}

impl Filters {
    pub fn is_empty(&self) -> bool {
        *self == Filters::default()
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.status.as_ref().is_none_or(|s| task.status == *s)
            && self.priority.is_none_or(|p| task.priority == p)
            && self.min_priority.is_none_or(|p| task.priority >= p)
            && self.prd_source.is_none_or(|b| task.has_prd_source() == b)
            && self.has_subtasks.is_none_or(|b| task.has_subtasks() == b)
            && self
                .has_dependencies
                .is_none_or(|b| task.has_dependencies() == b)
    }

    /// Set one filter from its name and a textual value.
    ///
    /// `any`, `none` or an empty value clears the filter. The filters are
    /// left untouched when validation fails.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), FilterError> {
        let value = value.trim();
        let clear = value.is_empty() || value == "any" || value == "none";
        let invalid = || FilterError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
        };
        match name {
            "status" => {
                self.status = if clear {
                    None
                } else {
                    let status = TaskStatus::parse(value);
                    if let TaskStatus::Other(_) = status {
                        return Err(invalid());
                    }
                    Some(status)
                };
            }
            "priority" => {
                self.priority = if clear {
                    None
                } else {
                    Some(Priority::parse(value).ok_or_else(invalid)?)
                };
            }
            "prdSource" | "prd_source" => {
                self.prd_source = parse_flag(value, clear).ok_or_else(invalid)?;
            }
            "hasSubtasks" | "has_subtasks" => {
                self.has_subtasks = parse_flag(value, clear).ok_or_else(invalid)?;
            }
            "hasDependencies" | "has_dependencies" => {
                self.has_dependencies = parse_flag(value, clear).ok_or_else(invalid)?;
            }
            other => return Err(FilterError::UnknownFilter(other.to_string())),
        }
        Ok(())
    }

    /// Short description of the active predicates, e.g. `priority=high deps=yes`
    pub fn describe(&self) -> String {
        let yes_no = |b: bool| if b { "yes" } else { "no" };
        let mut parts = Vec::new();
        if let Some(status) = &self.status {
            parts.push(format!("status={}", status));
        }
        if let Some(priority) = self.priority {
            parts.push(format!("priority={}", priority));
        }
        if let Some(priority) = self.min_priority {
            parts.push(format!("priority>={}", priority));
        }
        if let Some(b) = self.prd_source {
            parts.push(format!("prd={}", yes_no(b)));
        }
        if let Some(b) = self.has_subtasks {
            parts.push(format!("subtasks={}", yes_no(b)));
        }
        if let Some(b) = self.has_dependencies {
            parts.push(format!("deps={}", yes_no(b)));
        }
        parts.join(" ")
    }
}

/// New value of a yes/no filter: `Some(None)` when cleared, `None` if unparseable
fn parse_flag(value: &str, clear: bool) -> Option<Option<bool>> {
    if clear {
        Some(None)
    } else {
        parse_bool(value).map(Some)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

/// Case-insensitive substring match over title, description and id.
/// An empty query matches every task.
pub fn matches_search(task: &Task, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    task.title.to_lowercase().contains(&query)
        || task.description_text().to_lowercase().contains(&query)
        || task.id.to_string().contains(&query)
}

/// The tasks passing both the filters and the search query, in input order.
pub fn filter_tasks(tasks: &[Task], filters: &Filters, query: &str) -> Vec<Task> {
    tasks
        .iter()
        .filter(|t| filters.matches(t) && matches_search(t, query))
        .cloned()
        .collect()
}

/// Quick filter presets cycled from the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterPreset {
    #[default]
    Off,
    HighPriority,
    HasDependencies,
    HasSubtasks,
    FromPrd,
}

impl FilterPreset {
    pub fn next(self) -> FilterPreset {
        match self {
            FilterPreset::Off => FilterPreset::HighPriority,
            FilterPreset::HighPriority => FilterPreset::HasDependencies,
            FilterPreset::HasDependencies => FilterPreset::HasSubtasks,
            FilterPreset::HasSubtasks => FilterPreset::FromPrd,
            FilterPreset::FromPrd => FilterPreset::Off,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterPreset::Off => "no filter",
            FilterPreset::HighPriority => "high priority",
            FilterPreset::HasDependencies => "has dependencies",
            FilterPreset::HasSubtasks => "has subtasks",
            FilterPreset::FromPrd => "from PRD",
        }
    }

    /// The filter set this preset stands for
    pub fn filters(self) -> Filters {
        let mut filters = Filters::default();
        match self {
            FilterPreset::Off => {}
            FilterPreset::HighPriority => filters.min_priority = Some(Priority::High),
            FilterPreset::HasDependencies => filters.has_dependencies = Some(true),
            FilterPreset::HasSubtasks => filters.has_subtasks = Some(true),
            FilterPreset::FromPrd => filters.prd_source = Some(true),
        }
        filters
    }
}
