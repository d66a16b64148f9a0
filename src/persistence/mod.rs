pub mod files;
pub mod repository;
pub mod seed;

pub use files::{
    atomic_write, ensure_data_dir, get_data_dir, init_local_dir, read_file, session_file,
    tasks_file, tasks_seed_file, users_file,
};
pub use repository::{
    JsonSessionRepository, JsonTaskRepository, SessionRepository, TaskRepository,
};
pub use seed::{load_seed_tasks, load_users, write_default_seeds};
