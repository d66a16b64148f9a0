//! Repository interfaces over the JSON files in the data directory.
//!
//! The persisted task collection is a cache of the in-memory store, not a
//! source of truth beyond seeding, so loading is deliberately lenient: a
//! record or date field that fails to decode is logged and dropped rather
//! than failing the load. The session file is the opposite - anything that
//! does not match the expected shape is discarded wholesale.

use anyhow::Result;
use std::path::PathBuf;

use crate::domain::Task;
use crate::persistence::{atomic_write, read_file};
use crate::store::AuthState;

/// Load/save access to the persisted task collection
pub trait TaskRepository {
    /// The prior collection, or `None` when nothing has ever been saved
    /// (the caller should seed)
    fn load(&self) -> Result<Option<Vec<Task>>>;
    /// Resync the full collection
    fn save(&self, tasks: &[Task]) -> Result<()>;
}

/// Load/save access to the persisted session state
pub trait SessionRepository {
    /// The stored session, or the unauthenticated default when the file is
    /// missing or its shape does not validate
    fn load(&self) -> Result<AuthState>;
    fn save(&self, state: &AuthState) -> Result<()>;
}

/// Task collection persisted as a pretty-printed JSON array
pub struct JsonTaskRepository {
    path: PathBuf,
}

impl JsonTaskRepository {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl TaskRepository for JsonTaskRepository {
    fn load(&self) -> Result<Option<Vec<Task>>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = read_file(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(decode_tasks(&content)))
    }

    fn save(&self, tasks: &[Task]) -> Result<()> {
        let json = serde_json::to_string_pretty(tasks)?;
        atomic_write(&self.path, &json)
    }
}

/// Session state persisted as a single JSON object
pub struct JsonSessionRepository {
    path: PathBuf,
}

impl JsonSessionRepository {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SessionRepository for JsonSessionRepository {
    fn load(&self) -> Result<AuthState> {
        if !self.path.exists() {
            return Ok(AuthState::default());
        }
        let content = read_file(&self.path)?;
        match serde_json::from_str::<AuthState>(&content) {
            Ok(state) => Ok(state),
            Err(e) => {
                tracing::warn!(error = %e, "stored session has unexpected shape, discarding");
                Ok(AuthState::default())
            }
        }
    }

    fn save(&self, state: &AuthState) -> Result<()> {
        let json = serde_json::to_string_pretty(state)?;
        atomic_write(&self.path, &json)
    }
}

/// Decode a task array element by element, skipping anything malformed
pub fn decode_tasks(content: &str) -> Vec<Task> {
    let values: Vec<serde_json::Value> = match serde_json::from_str(content) {
        Ok(values) => values,
        Err(e) => {
            tracing::warn!(error = %e, "persisted task collection is not a JSON array, starting empty");
            return Vec::new();
        }
    };

    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<Task>(value) {
            Ok(task) => Some(task),
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed task record");
                None
            }
        })
        .collect()
}
