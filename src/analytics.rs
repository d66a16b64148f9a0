//! Per-day aggregation over the task collection: how many tasks were open
//! on each day of a range, and the average completion percentage of the
//! tasks in their active window.
//!
//! Tasks with missing or unparseable dates are excluded from a day's
//! figures and logged; they never abort the aggregation.

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::Task;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error("invalid date range: {start} is after {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

/// One value per calendar day
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub value: u32,
}

/// Every day of the closed interval, ascending
fn day_interval(
    start: NaiveDate,
    end: NaiveDate,
) -> Result<impl Iterator<Item = NaiveDate>, AnalyticsError> {
    if start > end {
        return Err(AnalyticsError::InvalidRange { start, end });
    }
    Ok(start.iter_days().take_while(move |d| *d <= end))
}

/// Count of tasks open on each day of `[start, end]`: created on or before
/// the day and not completed before it. Dates compare at calendar-day
/// granularity.
pub fn concurrent_tasks_per_day(
    tasks: &[Task],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<DailyPoint>, AnalyticsError> {
    let points = day_interval(start, end)?
        .map(|day| {
            let count = tasks.iter().filter(|t| is_open_on(t, day)).count();
            DailyPoint {
                date: day,
                value: count as u32,
            }
        })
        .collect();
    Ok(points)
}

/// Average completion percentage per day of `[start, end]`, over the tasks
/// whose `[created_at, due_date]` window covers the day and which were not
/// completed before it. Days with no qualifying tasks report 0.
pub fn daily_average_completion(
    tasks: &[Task],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<DailyPoint>, AnalyticsError> {
    let points = day_interval(start, end)?
        .map(|day| {
            let selected: Vec<&Task> = tasks.iter().filter(|t| in_active_window(t, day)).collect();
            let value = if selected.is_empty() {
                0
            } else {
                let total: u64 = selected.iter().map(|t| t.completion_percentage as u64).sum();
                (total as f64 / selected.len() as f64).round() as u32
            };
            DailyPoint { date: day, value }
        })
        .collect();
    Ok(points)
}

fn is_open_on(task: &Task, day: NaiveDate) -> bool {
    let Some(created) = task.important_dates.created_at else {
        tracing::warn!(task_id = task.id, "task missing createdAt, excluded from concurrency count");
        return false;
    };
    if created.date_naive() > day {
        return false;
    }
    // A completedAt that failed to parse is None here: still open
    match task.important_dates.completed_at {
        None => true,
        Some(completed) => completed.date_naive() >= day,
    }
}

fn in_active_window(task: &Task, day: NaiveDate) -> bool {
    let (Some(created), Some(due)) = (
        task.important_dates.created_at,
        task.important_dates.due_date,
    ) else {
        tracing::warn!(task_id = task.id, "task missing createdAt or dueDate, excluded from daily average");
        return false;
    };
    if created.date_naive() > day || due < day {
        return false;
    }
    match task.important_dates.completed_at {
        None => true,
        Some(completed) => completed.date_naive() >= day,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Priority, Task};
    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn make_task(
        created: Option<&str>,
        due: Option<&str>,
        completed: Option<&str>,
        percentage: u8,
    ) -> Task {
        let mut task = Task::new("t".to_string(), None, Priority::Low, 2, 1, None);
        task.important_dates.created_at = created.map(ts);
        task.important_dates.due_date = due.map(day);
        task.important_dates.completed_at = completed.map(ts);
        task.completion_percentage = percentage;
        task
    }

    #[test]
    fn test_sequence_covers_interval_inclusive() {
        let tasks = vec![make_task(Some("2024-03-01T08:00:00Z"), None, None, 0)];
        let points = concurrent_tasks_per_day(&tasks, day("2024-03-01"), day("2024-03-05")).unwrap();
        assert_eq!(points.len(), 5);
        assert_eq!(points[0].date, day("2024-03-01"));
        assert_eq!(points[4].date, day("2024-03-05"));
    }

    #[test]
    fn test_single_day_interval() {
        let points = concurrent_tasks_per_day(&[], day("2024-03-01"), day("2024-03-01")).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].value, 0);
    }

    #[test]
    fn test_invalid_range_rejected() {
        let err = concurrent_tasks_per_day(&[], day("2024-03-05"), day("2024-03-01")).unwrap_err();
        assert_eq!(
            err,
            AnalyticsError::InvalidRange {
                start: day("2024-03-05"),
                end: day("2024-03-01"),
            }
        );
        assert!(daily_average_completion(&[], day("2024-03-05"), day("2024-03-01")).is_err());
    }

    #[test]
    fn test_concurrent_counts_open_window() {
        let tasks = vec![
            // Open from the 2nd, completed on the 4th
            make_task(
                Some("2024-03-02T09:00:00Z"),
                None,
                Some("2024-03-04T17:00:00Z"),
                100,
            ),
            // Open from the 1st, never completed
            make_task(Some("2024-03-01T09:00:00Z"), None, None, 40),
        ];
        let points = concurrent_tasks_per_day(&tasks, day("2024-03-01"), day("2024-03-05")).unwrap();
        let values: Vec<u32> = points.iter().map(|p| p.value).collect();
        // 1st: only the second task; 2nd-4th: both; 5th: first task done
        assert_eq!(values, vec![1, 2, 2, 2, 1]);
    }

    #[test]
    fn test_missing_created_at_excluded_without_raising() {
        let tasks = vec![
            make_task(None, Some("2024-03-10"), None, 80),
            make_task(Some("2024-03-01T00:00:00Z"), Some("2024-03-10"), None, 50),
        ];
        let counts = concurrent_tasks_per_day(&tasks, day("2024-03-02"), day("2024-03-02")).unwrap();
        assert_eq!(counts[0].value, 1);
        let avgs = daily_average_completion(&tasks, day("2024-03-02"), day("2024-03-02")).unwrap();
        assert_eq!(avgs[0].value, 50);
    }

    #[test]
    fn test_average_requires_due_date() {
        let tasks = vec![make_task(Some("2024-03-01T00:00:00Z"), None, None, 90)];
        let avgs = daily_average_completion(&tasks, day("2024-03-02"), day("2024-03-02")).unwrap();
        assert_eq!(avgs[0].value, 0);
    }

    #[test]
    fn test_average_rounds_to_nearest() {
        let tasks = vec![
            make_task(Some("2024-03-01T00:00:00Z"), Some("2024-03-10"), None, 33),
            make_task(Some("2024-03-01T00:00:00Z"), Some("2024-03-10"), None, 34),
        ];
        let avgs = daily_average_completion(&tasks, day("2024-03-02"), day("2024-03-02")).unwrap();
        // (33 + 34) / 2 = 33.5 rounds up
        assert_eq!(avgs[0].value, 34);
    }

    #[test]
    fn test_average_window_excludes_past_due() {
        let tasks = vec![make_task(
            Some("2024-03-01T00:00:00Z"),
            Some("2024-03-03"),
            None,
            60,
        )];
        let avgs = daily_average_completion(&tasks, day("2024-03-01"), day("2024-03-05")).unwrap();
        let values: Vec<u32> = avgs.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![60, 60, 60, 0, 0]);
    }

    #[test]
    fn test_completed_task_leaves_count_next_day() {
        let tasks = vec![make_task(
            Some("2024-03-01T00:00:00Z"),
            Some("2024-03-10"),
            Some("2024-03-03T12:00:00Z"),
            100,
        )];
        let points = concurrent_tasks_per_day(&tasks, day("2024-03-03"), day("2024-03-04")).unwrap();
        assert_eq!(points[0].value, 1); // completed that day still counts
        assert_eq!(points[1].value, 0);
    }
}
