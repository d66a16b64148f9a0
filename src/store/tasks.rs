use anyhow::Result;

use crate::domain::{Task, User};
use crate::persistence::TaskRepository;

/// Display name attached when an assignee id has no matching user
pub const UNKNOWN_USER: &str = "Unknown User";

/// Owner of the task collection for the lifetime of a session.
///
/// Every mutation resyncs the full collection through the repository, and
/// every create/update re-resolves the assignee display name against the
/// user list.
pub struct TaskStore {
    tasks: Vec<Task>,
    users: Vec<User>,
    repo: Box<dyn TaskRepository>,
}

impl TaskStore {
    /// Build the store from an already-loaded collection (prior data or
    /// seed - the caller decides) and enrich it.
    pub fn new(tasks: Vec<Task>, users: Vec<User>, repo: Box<dyn TaskRepository>) -> Self {
        let mut store = Self { tasks, users, repo };
        for task in &mut store.tasks {
            task.assignee_name = resolve_assignee(&store.users, task.assignee);
        }
        store
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: i64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Append a task. Always appends - a caller passing a duplicate id gets
    /// two entries, not an overwrite.
    pub fn create(&mut self, mut task: Task) -> Result<()> {
        task.assignee_name = resolve_assignee(&self.users, task.assignee);
        self.tasks.push(task);
        self.persist()
    }

    /// Replace the entry matching `task.id`. A silent no-op when no entry
    /// matches; callers are expected to pass an id that exists.
    pub fn update(&mut self, mut task: Task) -> Result<()> {
        task.assignee_name = resolve_assignee(&self.users, task.assignee);
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(slot) => {
                *slot = task;
                self.persist()
            }
            None => {
                tracing::warn!(task_id = task.id, "update for unknown task id, ignoring");
                Ok(())
            }
        }
    }

    /// Remove the entry matching `id`; idempotent when absent
    pub fn delete(&mut self, id: i64) -> Result<()> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            return Ok(());
        }
        self.persist()
    }

    /// Flip a subtask and recompute the parent's derived completion state
    pub fn toggle_subtask(&mut self, task_id: i64, subtask_id: u32) -> Result<()> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == task_id) else {
            anyhow::bail!("no task with id {}", task_id);
        };
        if !task.toggle_subtask(subtask_id) {
            anyhow::bail!("task {} has no subtask {}", task_id, subtask_id);
        }
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        self.repo.save(&self.tasks)
    }
}

fn resolve_assignee(users: &[User], assignee: i64) -> String {
    users
        .iter()
        .find(|u| u.id == assignee)
        .map(|u| u.username.clone())
        .unwrap_or_else(|| UNKNOWN_USER.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Priority, Role};
    use crate::persistence::JsonTaskRepository;
    use tempfile::tempdir;

    fn test_users() -> Vec<User> {
        vec![
            User {
                id: 1,
                username: "admin".to_string(),
                role: Role::Admin,
                password: String::new(),
            },
            User {
                id: 2,
                username: "user1".to_string(),
                role: Role::User,
                password: String::new(),
            },
        ]
    }

    fn store_in(dir: &std::path::Path) -> TaskStore {
        let repo = Box::new(JsonTaskRepository::new(dir.join("tasks.json")));
        TaskStore::new(Vec::new(), test_users(), repo)
    }

    fn sample_task(assignee: i64) -> Task {
        let mut task = Task::new("t".to_string(), None, Priority::Low, assignee, 1, None);
        task.add_subtask("step".to_string());
        task
    }

    #[test]
    fn test_create_enriches_and_persists() {
        let dir = tempdir().unwrap();
        let mut store = store_in(dir.path());

        store.create(sample_task(2)).unwrap();
        assert_eq!(store.tasks()[0].assignee_name, "user1");

        // A fresh store over the same repository sees the write
        let reloaded = JsonTaskRepository::new(dir.path().join("tasks.json"))
            .load()
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn test_unknown_assignee_gets_sentinel() {
        let dir = tempdir().unwrap();
        let mut store = store_in(dir.path());
        store.create(sample_task(99)).unwrap();
        assert_eq!(store.tasks()[0].assignee_name, UNKNOWN_USER);
    }

    #[test]
    fn test_update_replaces_matching_entry() {
        let dir = tempdir().unwrap();
        let mut store = store_in(dir.path());
        let task = sample_task(2);
        let id = task.id;
        store.create(task).unwrap();

        let mut edited = store.get(id).unwrap().clone();
        edited.title = "renamed".to_string();
        edited.assignee = 1;
        store.update(edited).unwrap();

        let task = store.get(id).unwrap();
        assert_eq!(task.title, "renamed");
        assert_eq!(task.assignee_name, "admin");
        assert_eq!(store.tasks().len(), 1);
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let dir = tempdir().unwrap();
        let mut store = store_in(dir.path());
        store.create(sample_task(2)).unwrap();

        let mut phantom = sample_task(2);
        phantom.id = 424242;
        store.update(phantom).unwrap();
        assert_eq!(store.tasks().len(), 1);
        assert!(store.get(424242).is_none());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let dir = tempdir().unwrap();
        let mut store = store_in(dir.path());
        let task = sample_task(2);
        let id = task.id;
        store.create(task).unwrap();

        store.delete(999).unwrap();
        assert_eq!(store.tasks().len(), 1);

        store.delete(id).unwrap();
        assert!(store.tasks().is_empty());

        store.delete(id).unwrap();
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn test_toggle_subtask_through_store() {
        let dir = tempdir().unwrap();
        let mut store = store_in(dir.path());
        let task = sample_task(2);
        let id = task.id;
        store.create(task).unwrap();

        store.toggle_subtask(id, 1).unwrap();
        let task = store.get(id).unwrap();
        assert_eq!(task.completion_percentage, 100);
        assert!(task.important_dates.completed_at.is_some());

        assert!(store.toggle_subtask(id, 9).is_err());
        assert!(store.toggle_subtask(777, 1).is_err());
    }

    #[test]
    fn test_seeded_tasks_enriched_on_construction() {
        let dir = tempdir().unwrap();
        let repo = Box::new(JsonTaskRepository::new(dir.path().join("tasks.json")));
        let store = TaskStore::new(vec![sample_task(2)], test_users(), repo);
        assert_eq!(store.tasks()[0].assignee_name, "user1");
    }
}
