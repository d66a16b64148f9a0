use super::enums::{Priority, TaskStatus};
use super::task::Task;

/// Filter criteria for the task list view
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub assignee: Option<i64>,
}

/// Sort order for the task list view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Creation time, oldest first
    Created,
    /// Due date, soonest first; tasks without one sort last
    Due,
    /// Priority, most urgent first
    Priority,
}

impl SortKey {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_uppercase().as_str() {
            "CREATED" => Some(Self::Created),
            "DUE" => Some(Self::Due),
            "PRIORITY" => Some(Self::Priority),
            _ => None,
        }
    }
}

/// Select the tasks matching every set criterion
pub fn filter_tasks<'a>(tasks: &'a [Task], filter: &TaskFilter) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| filter.status.map_or(true, |s| t.status == s))
        .filter(|t| filter.priority.map_or(true, |p| t.priority == p))
        .filter(|t| filter.assignee.map_or(true, |a| t.assignee == a))
        .collect()
}

/// Order a filtered view in place
pub fn sort_tasks(rows: &mut [&Task], key: SortKey) {
    match key {
        SortKey::Created => {
            // Tasks without a creation timestamp sort last
            rows.sort_by_key(|t| {
                t.important_dates
                    .created_at
                    .map(|dt| dt.timestamp_millis())
                    .unwrap_or(i64::MAX)
            });
        }
        SortKey::Due => {
            rows.sort_by_key(|t| t.important_dates.due_date.unwrap_or(chrono::NaiveDate::MAX));
        }
        SortKey::Priority => {
            rows.sort_by(|a, b| b.priority.weight().cmp(&a.priority.weight()));
        }
    }
}

/// Task counts by status, in a fixed order (the pie-chart data)
pub fn status_breakdown(tasks: &[Task]) -> Vec<(&'static str, usize)> {
    [TaskStatus::Open, TaskStatus::InProgress, TaskStatus::Closed]
        .iter()
        .map(|s| (s.as_str(), tasks.iter().filter(|t| t.status == *s).count()))
        .collect()
}

/// Task counts by priority, most urgent first
pub fn priority_breakdown(tasks: &[Task]) -> Vec<(&'static str, usize)> {
    [Priority::High, Priority::Medium, Priority::Low]
        .iter()
        .map(|p| (p.as_str(), tasks.iter().filter(|t| t.priority == *p).count()))
        .collect()
}
