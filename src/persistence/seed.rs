//! Seed resources: the static user list and the initial task collection
//! used when the repository holds no prior data.
//!
//! A missing or unreadable seed is never fatal - it is logged, the user is
//! told, and the collection falls back to empty.

use anyhow::Result;
use std::path::Path;

use crate::domain::{Task, User};
use crate::persistence::repository::decode_tasks;
use crate::persistence::{atomic_write, read_file};

/// Load the user list resource. Missing or malformed content yields an
/// empty list and a user-visible notice.
pub fn load_users(path: &Path) -> Vec<User> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "user list resource not found");
        eprintln!(
            "Warning: no user list at {}; assignee names will be unresolved. Run 'taskboard init'.",
            path.display()
        );
        return Vec::new();
    }

    let content = match read_file(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read user list resource");
            eprintln!("Warning: could not read {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<User>>(&content) {
        Ok(users) => users,
        Err(e) => {
            tracing::warn!(error = %e, "malformed user list resource");
            eprintln!("Warning: malformed user list at {}", path.display());
            Vec::new()
        }
    }
}

/// Load the initial task collection. Used only when the repository has
/// never been written; absent seed means an empty board.
pub fn load_seed_tasks(path: &Path) -> Vec<Task> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "task seed resource not found, starting empty");
        eprintln!("Note: no task seed at {}; starting with an empty board.", path.display());
        return Vec::new();
    }

    match read_file(path) {
        Ok(content) => decode_tasks(&content),
        Err(e) => {
            tracing::warn!(error = %e, "failed to read task seed resource");
            eprintln!("Warning: could not read {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// The user list written by `taskboard init`. Matches the credential table
/// so logins resolve to real display names.
const DEFAULT_USERS: &str = r#"[
  { "id": 1, "username": "admin", "role": "admin", "password": "admin123" },
  { "id": 2, "username": "user1", "role": "user", "password": "user123" },
  { "id": 3, "username": "user2", "role": "user", "password": "user123" }
]
"#;

/// A small starter board written by `taskboard init`
const DEFAULT_TASKS: &str = r#"[
  {
    "id": 1,
    "title": "Prepare project kickoff",
    "description": "Agenda, invite list and logistics for the kickoff meeting",
    "priority": "High",
    "status": "In Progress",
    "assignee": 2,
    "createdBy": 1,
    "timeSpent": 0,
    "completionPercentage": 50,
    "importantDates": {
      "createdAt": "2024-03-01T09:00:00Z",
      "dueDate": "2024-03-15",
      "completedAt": null
    },
    "subtasks": [
      { "id": 1, "title": "Draft agenda", "isCompleted": true },
      { "id": 2, "title": "Book meeting room", "isCompleted": false }
    ]
  },
  {
    "id": 2,
    "title": "Review onboarding docs",
    "description": null,
    "priority": "Low",
    "status": "Open",
    "assignee": 3,
    "createdBy": 1,
    "timeSpent": 0,
    "completionPercentage": 0,
    "importantDates": {
      "createdAt": "2024-03-02T10:30:00Z",
      "dueDate": "2024-03-20",
      "completedAt": null
    },
    "subtasks": [
      { "id": 1, "title": "Read handbook", "isCompleted": false }
    ]
  }
]
"#;

/// Write the default seed resources into a data directory
pub fn write_default_seeds(dir: &Path) -> Result<()> {
    atomic_write(dir.join("users.json"), DEFAULT_USERS)?;
    atomic_write(dir.join("tasks.seed.json"), DEFAULT_TASKS)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use tempfile::tempdir;

    #[test]
    fn test_default_seeds_parse() {
        let dir = tempdir().unwrap();
        write_default_seeds(dir.path()).unwrap();

        let users = load_users(&dir.path().join("users.json"));
        assert_eq!(users.len(), 3);
        assert_eq!(users[0].username, "admin");
        assert_eq!(users[0].role, Role::Admin);

        let tasks = load_seed_tasks(&dir.path().join("tasks.seed.json"));
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].subtasks.len(), 2);
        assert!(tasks[0].important_dates.due_date.is_some());
    }

    #[test]
    fn test_missing_resources_fall_back_to_empty() {
        let dir = tempdir().unwrap();
        assert!(load_users(&dir.path().join("users.json")).is_empty());
        assert!(load_seed_tasks(&dir.path().join("tasks.seed.json")).is_empty());
    }

    #[test]
    fn test_malformed_user_list_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.json");
        atomic_write(&path, "not json").unwrap();
        assert!(load_users(&path).is_empty());
    }
}
