//! Command handlers: the presentation layer over the auth and task stores.
//!
//! Every handler takes the stores it reads or mutates explicitly. All
//! commands except `init` and `login` are gated on an authenticated
//! session; mutations are additionally gated on role. Validation failures
//! abort before any state changes.

use anyhow::{anyhow, bail, Result};
use chrono::NaiveDate;

use crate::analytics::{concurrent_tasks_per_day, daily_average_completion};
use crate::domain::{
    filter_tasks, priority_breakdown, sort_tasks, status_breakdown, Priority, PublicUser, SortKey,
    Task, TaskFilter, TaskStatus,
};
use crate::store::{AuthStore, TaskStore};
use crate::timefmt::{
    elapsed_hhmm, format_display_date, format_display_day, format_time, parse_time_spent,
};
use crate::{persistence, persistence::seed};

/// Fields collected by the creation form
pub struct NewTaskInput {
    pub title: String,
    pub description: Option<String>,
    pub priority: String,
    pub assignee: Option<i64>,
    pub due: Option<String>,
    pub subtasks: Vec<String>,
}

/// Fields collected by the edit form; `None` leaves a field untouched
pub struct EditTaskInput {
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub assignee: Option<i64>,
    pub due: Option<String>,
    pub time_spent: Option<String>,
    /// New subtasks to append, by title
    pub add_subtasks: Vec<String>,
    /// Subtask retitles as `<id>:<title>`
    pub rename_subtasks: Vec<String>,
}

/// Filters and ordering for the list view
pub struct ListOptions {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assignee: Option<i64>,
    pub sort: Option<String>,
}

fn require_user(auth: &AuthStore) -> Result<&PublicUser> {
    auth.current_user()
        .ok_or_else(|| anyhow!("not logged in; run 'taskboard login <username> <password>'"))
}

fn require_admin(auth: &AuthStore) -> Result<&PublicUser> {
    let user = require_user(auth)?;
    if !user.is_admin() {
        bail!("this action requires the admin role");
    }
    Ok(user)
}

fn parse_due(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| anyhow!("invalid date '{}' (expected YYYY-MM-DD)", raw))
}

fn parse_subtask_edit(raw: &str) -> Result<(u32, String)> {
    let (id, title) = raw
        .split_once(':')
        .ok_or_else(|| anyhow!("invalid subtask edit '{}' (expected <id>:<title>)", raw))?;
    let id: u32 = id
        .trim()
        .parse()
        .map_err(|_| anyhow!("invalid subtask id in '{}'", raw))?;
    let title = title.trim().to_string();
    if title.is_empty() {
        bail!("subtask titles cannot be empty");
    }
    Ok((id, title))
}

pub fn cmd_init() -> Result<()> {
    let data_dir = persistence::init_local_dir()?;
    seed::write_default_seeds(&data_dir)?;
    println!("Initialized taskboard directory: {}", data_dir.display());
    println!();
    println!("Seed resources users.json and tasks.seed.json were written.");
    println!("Run 'taskboard login admin admin123' to start.");
    Ok(())
}

pub fn cmd_login(auth: &mut AuthStore, username: &str, password: &str) -> Result<()> {
    match auth.login(username, password)? {
        Some(user) => {
            println!("Logged in as {} ({})", user.username, user.role.as_str());
            Ok(())
        }
        None => bail!("invalid username or password"),
    }
}

pub fn cmd_logout(auth: &mut AuthStore) -> Result<()> {
    auth.logout()?;
    println!("Logged out.");
    Ok(())
}

pub fn cmd_whoami(auth: &AuthStore) -> Result<()> {
    match auth.current_user() {
        Some(user) => println!("{} ({})", user.username, user.role.as_str()),
        None => println!("Not logged in."),
    }
    Ok(())
}

pub fn cmd_add(store: &mut TaskStore, auth: &AuthStore, input: NewTaskInput) -> Result<()> {
    let admin = require_admin(auth)?;

    let title = input.title.trim().to_string();
    if title.is_empty() {
        bail!("a task title is required");
    }
    let priority = Priority::from_tag(&input.priority)
        .ok_or_else(|| anyhow!("invalid priority '{}' (low, medium or high)", input.priority))?;
    let assignee = input.assignee.ok_or_else(|| anyhow!("an assignee is required"))?;
    let due = input.due.as_deref().map(parse_due).transpose()?;

    if input.subtasks.is_empty() {
        bail!("at least one subtask is required");
    }
    let subtask_titles: Vec<String> = input
        .subtasks
        .iter()
        .map(|s| s.trim().to_string())
        .collect();
    if subtask_titles.iter().any(|s| s.is_empty()) {
        bail!("subtask titles cannot be empty");
    }

    let mut task = Task::new(title, input.description, priority, assignee, admin.id, due);
    for subtask in subtask_titles {
        task.add_subtask(subtask);
    }

    let id = task.id;
    store.create(task)?;
    println!("Created task {}", id);
    Ok(())
}

pub fn cmd_edit(store: &mut TaskStore, auth: &AuthStore, input: EditTaskInput) -> Result<()> {
    require_admin(auth)?;

    let mut task = store
        .get(input.id)
        .cloned()
        .ok_or_else(|| anyhow!("no task with id {}", input.id))?;

    if let Some(title) = input.title {
        let title = title.trim().to_string();
        if title.is_empty() {
            bail!("a task title is required");
        }
        task.title = title;
    }
    if let Some(description) = input.description {
        task.description = Some(description);
    }
    if let Some(priority) = input.priority {
        task.priority = Priority::from_tag(&priority)
            .ok_or_else(|| anyhow!("invalid priority '{}' (low, medium or high)", priority))?;
    }
    if let Some(status) = input.status {
        task.status = TaskStatus::from_tag(&status)
            .ok_or_else(|| anyhow!("invalid status '{}' (open, in-progress or closed)", status))?;
    }
    if let Some(assignee) = input.assignee {
        task.assignee = assignee;
    }
    if let Some(due) = input.due {
        task.important_dates.due_date = Some(parse_due(&due)?);
    }
    if let Some(raw) = input.time_spent {
        task.time_spent = parse_time_spent(&raw)
            .ok_or_else(|| anyhow!("malformed time '{}' (expected mm:ss)", raw))?;
    }
    for raw in &input.rename_subtasks {
        let (id, title) = parse_subtask_edit(raw)?;
        if !task.rename_subtask(id, title) {
            bail!("task {} has no subtask {}", task.id, id);
        }
    }
    for title in &input.add_subtasks {
        let title = title.trim().to_string();
        if title.is_empty() {
            bail!("subtask titles cannot be empty");
        }
        task.add_subtask(title);
    }
    // Appending subtasks changes the completed/total ratio
    if !input.add_subtasks.is_empty() {
        task.recompute_completion();
    }

    store.update(task)?;
    println!("Updated task {}", input.id);
    Ok(())
}

pub fn cmd_delete(store: &mut TaskStore, auth: &AuthStore, id: i64) -> Result<()> {
    require_admin(auth)?;

    if store.get(id).is_none() {
        println!("No task with id {} (nothing to delete)", id);
        return Ok(());
    }
    store.delete(id)?;
    println!("Deleted task {}", id);
    Ok(())
}

/// Resolve the list view for a user: parse the filter options and, for
/// non-admin users, scope the view down to their own tasks regardless of
/// any `--assignee` flag.
fn list_rows<'a>(
    store: &'a TaskStore,
    user: &PublicUser,
    options: &ListOptions,
) -> Result<Vec<&'a Task>> {
    let mut filter = TaskFilter {
        assignee: options.assignee,
        ..Default::default()
    };
    if !user.is_admin() {
        filter.assignee = Some(user.id);
    }
    if let Some(raw) = &options.status {
        filter.status = Some(
            TaskStatus::from_tag(raw)
                .ok_or_else(|| anyhow!("invalid status '{}' (open, in-progress or closed)", raw))?,
        );
    }
    if let Some(raw) = &options.priority {
        filter.priority = Some(
            Priority::from_tag(raw)
                .ok_or_else(|| anyhow!("invalid priority '{}' (low, medium or high)", raw))?,
        );
    }
    let sort = match &options.sort {
        Some(raw) => SortKey::from_tag(raw)
            .ok_or_else(|| anyhow!("invalid sort key '{}' (created, due or priority)", raw))?,
        None => SortKey::Created,
    };

    let mut rows = filter_tasks(store.tasks(), &filter);
    sort_tasks(&mut rows, sort);
    Ok(rows)
}

pub fn cmd_list(store: &TaskStore, auth: &AuthStore, options: ListOptions) -> Result<()> {
    let user = require_user(auth)?;
    let rows = list_rows(store, user, &options)?;

    if rows.is_empty() {
        println!("No tasks.");
        return Ok(());
    }

    println!(
        "{:<14} {:<32} {:<12} {:<8} {:<14} {:<12} {:>5}",
        "ID", "TITLE", "STATUS", "PRI", "ASSIGNEE", "DUE", "DONE"
    );
    for task in rows {
        println!(
            "{:<14} {:<32} {:<12} {:<8} {:<14} {:<12} {:>4}%",
            task.id,
            clip(&task.title, 32),
            task.status.as_str(),
            task.priority.as_str(),
            clip(&task.assignee_name, 14),
            task.important_dates
                .due_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string()),
            task.completion_percentage,
        );
    }
    Ok(())
}

pub fn cmd_show(store: &TaskStore, auth: &AuthStore, id: i64) -> Result<()> {
    require_user(auth)?;

    let task = store.get(id).ok_or_else(|| anyhow!("no task with id {}", id))?;

    println!("Title:        {}", task.title);
    println!(
        "Description:  {}",
        task.description.as_deref().unwrap_or("N/A")
    );
    println!("Priority:     {}", task.priority.as_str());
    println!("Status:       {}", task.status.as_str());
    println!("Assignee:     {}", task.assignee_name);
    println!(
        "Due Date:     {}",
        format_display_day(task.important_dates.due_date)
    );
    println!("Time Spent:   {} (mm:ss)", format_time(task.time_spent));
    if let Some(created) = task.important_dates.created_at {
        println!("Age:          {} (hh:mm)", elapsed_hhmm(created));
    }
    println!("Completion:   {}%", task.completion_percentage);
    println!(
        "Created At:   {}",
        format_display_date(task.important_dates.created_at)
    );
    println!(
        "Completed At: {}",
        format_display_date(task.important_dates.completed_at)
    );

    println!();
    if task.subtasks.is_empty() {
        println!("No subtasks.");
    } else {
        println!("Subtasks:");
        for subtask in &task.subtasks {
            let mark = if subtask.is_completed { "x" } else { " " };
            println!("  [{}] {}. {}", mark, subtask.id, subtask.title);
        }
    }
    Ok(())
}

pub fn cmd_toggle(
    store: &mut TaskStore,
    auth: &AuthStore,
    task_id: i64,
    subtask_id: u32,
) -> Result<()> {
    let user = require_user(auth)?;

    let task = store
        .get(task_id)
        .ok_or_else(|| anyhow!("no task with id {}", task_id))?;
    if !user.is_admin() && user.id != task.assignee {
        bail!("only an admin or the assignee can modify subtasks");
    }

    store.toggle_subtask(task_id, subtask_id)?;
    if let Some(task) = store.get(task_id) {
        println!(
            "Subtask {} toggled; task {} is now {}% complete",
            subtask_id, task_id, task.completion_percentage
        );
    }
    Ok(())
}

pub fn cmd_summary(store: &TaskStore, auth: &AuthStore) -> Result<()> {
    require_user(auth)?;

    let tasks = store.tasks();
    println!("Total tasks: {}", tasks.len());

    println!();
    println!("By status:");
    for (label, count) in status_breakdown(tasks) {
        println!("  {:<12} {:>4}  {}", label, count, share(count, tasks.len()));
    }
    println!();
    println!("By priority:");
    for (label, count) in priority_breakdown(tasks) {
        println!("  {:<12} {:>4}  {}", label, count, share(count, tasks.len()));
    }
    Ok(())
}

pub fn cmd_report(store: &TaskStore, auth: &AuthStore, from: &str, to: &str) -> Result<()> {
    require_user(auth)?;

    let start = parse_due(from)?;
    let end = parse_due(to)?;

    let concurrent = concurrent_tasks_per_day(store.tasks(), start, end)?;
    let averages = daily_average_completion(store.tasks(), start, end)?;

    println!("{:<12} {:>10} {:>16}", "DATE", "OPEN", "AVG COMPLETION");
    for (open, avg) in concurrent.iter().zip(averages.iter()) {
        println!("{:<12} {:>10} {:>15}%", open.date, open.value, avg.value);
    }
    Ok(())
}

fn clip(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut clipped: String = text.chars().take(max.saturating_sub(1)).collect();
        clipped.push('…');
        clipped
    }
}

fn share(count: usize, total: usize) -> String {
    if total == 0 {
        "0.0%".to_string()
    } else {
        format!("{:.1}%", 100.0 * count as f64 / total as f64)
    }
}
