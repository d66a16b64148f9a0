use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::enums::{Priority, TaskStatus};

/// An atomic checklist item within a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    /// Unique within the parent task, assigned monotonically
    pub id: u32,
    pub title: String,
    pub is_completed: bool,
}

/// Timestamps tracked per task
///
/// All three fields tolerate malformed or missing values in persisted data:
/// a date that fails to parse decodes to `None` and is logged, never an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportantDates {
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// A tracked task with subtasks and derived completion state
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Stable identifier, assigned from the creation timestamp (millis)
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub priority: Priority,
    pub status: TaskStatus,
    /// User id of the assignee
    pub assignee: i64,
    /// User id of the creator
    pub created_by: i64,
    /// Accumulated work time in seconds
    #[serde(default)]
    pub time_spent: u64,
    /// Derived: round(100 * completed subtasks / total), 0 without subtasks
    #[serde(default)]
    pub completion_percentage: u8,
    #[serde(default)]
    pub important_dates: ImportantDates,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    /// Display name resolved from the user list (enrichment, recomputed on load)
    #[serde(default)]
    pub assignee_name: String,
}

impl Task {
    pub fn new(
        title: String,
        description: Option<String>,
        priority: Priority,
        assignee: i64,
        created_by: i64,
        due_date: Option<NaiveDate>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: now.timestamp_millis(),
            title,
            description,
            priority,
            status: TaskStatus::Open,
            assignee,
            created_by,
            time_spent: 0,
            completion_percentage: 0,
            important_dates: ImportantDates {
                created_at: Some(now),
                due_date,
                completed_at: None,
            },
            subtasks: Vec::new(),
            assignee_name: String::new(),
        }
    }

    /// Next subtask id: one past the last, or 1 for the first
    pub fn next_subtask_id(&self) -> u32 {
        self.subtasks.last().map(|s| s.id + 1).unwrap_or(1)
    }

    /// Append a subtask with a freshly assigned id
    pub fn add_subtask(&mut self, title: String) {
        let id = self.next_subtask_id();
        self.subtasks.push(Subtask {
            id,
            title,
            is_completed: false,
        });
    }

    /// Retitle a subtask. Returns false when no subtask matches the id.
    pub fn rename_subtask(&mut self, subtask_id: u32, title: String) -> bool {
        match self.subtasks.iter_mut().find(|s| s.id == subtask_id) {
            Some(subtask) => {
                subtask.title = title;
                true
            }
            None => false,
        }
    }

    /// Flip a subtask's completion flag and recompute derived state.
    /// Returns false when no subtask matches the id.
    pub fn toggle_subtask(&mut self, subtask_id: u32) -> bool {
        let Some(subtask) = self.subtasks.iter_mut().find(|s| s.id == subtask_id) else {
            return false;
        };
        subtask.is_completed = !subtask.is_completed;
        self.recompute_completion();
        true
    }

    /// Re-derive `completion_percentage` and `completed_at` from the subtasks.
    ///
    /// `completed_at` is stamped exactly when the percentage reaches 100 and
    /// it was not already set; dropping back below 100 never clears it.
    /// The `status` field is left alone.
    pub fn recompute_completion(&mut self) {
        let total = self.subtasks.len();
        self.completion_percentage = if total > 0 {
            let completed = self.subtasks.iter().filter(|s| s.is_completed).count();
            ((completed as f64 / total as f64) * 100.0).round() as u8
        } else {
            0
        };

        if self.completion_percentage == 100 && self.important_dates.completed_at.is_none() {
            self.important_dates.completed_at = Some(Utc::now());
        }
    }
}

/// Parse an RFC 3339 timestamp, falling back to a bare calendar date
/// (midnight UTC). Unparseable input is logged and treated as absent.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let midnight = date.and_hms_opt(0, 0, 0)?;
        return Some(DateTime::from_naive_utc_and_offset(midnight, Utc));
    }
    tracing::warn!(value = raw, "unparseable timestamp, treating as unset");
    None
}

/// Parse a YYYY-MM-DD calendar date, falling back to the date component of
/// an RFC 3339 timestamp. Unparseable input is logged and treated as absent.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    tracing::warn!(value = raw, "unparseable date, treating as unset");
    None
}

fn lenient_timestamp<'de, D>(de: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(de)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

fn lenient_date<'de, D>(de: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(de)?;
    Ok(raw.as_deref().and_then(parse_date))
}
