pub mod auth;
pub mod tasks;

pub use auth::{AuthState, AuthStore};
pub use tasks::{TaskStore, UNKNOWN_USER};
