pub mod enums;
pub mod task;
pub mod user;
pub mod views;

pub use enums::{Priority, Role, TaskStatus};
pub use task::{parse_date, parse_timestamp, ImportantDates, Subtask, Task};
pub use user::{PublicUser, User};
pub use views::{
    filter_tasks, priority_breakdown, sort_tasks, status_breakdown, SortKey, TaskFilter,
};
