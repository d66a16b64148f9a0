mod analytics;
mod commands;
mod domain;
mod persistence;
mod store;
mod timefmt;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{EditTaskInput, ListOptions, NewTaskInput};
use persistence::{JsonSessionRepository, JsonTaskRepository, TaskRepository};
use store::{AuthStore, TaskStore};

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(about = "A task-tracking dashboard for the terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a local .taskboard directory with seed resources
    Init,
    /// Log in against the credential table
    Login { username: String, password: String },
    /// Clear the current session
    Logout,
    /// Show the current session identity
    Whoami,
    /// Create a task (admin only)
    Add {
        /// Task title
        #[arg(short, long)]
        title: String,
        /// Free-form description
        #[arg(short, long)]
        description: Option<String>,
        /// low, medium or high
        #[arg(short, long, default_value = "low")]
        priority: String,
        /// User id of the assignee
        #[arg(short, long)]
        assignee: Option<i64>,
        /// Due date, YYYY-MM-DD
        #[arg(long)]
        due: Option<String>,
        /// Subtask title; repeat for more than one
        #[arg(short, long = "subtask")]
        subtasks: Vec<String>,
    },
    /// Edit a task's fields (admin only)
    Edit {
        /// Task id
        id: i64,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        /// low, medium or high
        #[arg(short, long)]
        priority: Option<String>,
        /// open, in-progress or closed
        #[arg(short, long)]
        status: Option<String>,
        /// User id of the assignee
        #[arg(short, long)]
        assignee: Option<i64>,
        /// Due date, YYYY-MM-DD
        #[arg(long)]
        due: Option<String>,
        /// Accumulated work time as mm:ss
        #[arg(long)]
        time_spent: Option<String>,
        /// Subtask title to append; repeat for more than one
        #[arg(long = "add-subtask")]
        add_subtasks: Vec<String>,
        /// Retitle a subtask, as <id>:<title>; repeat for more than one
        #[arg(long = "rename-subtask")]
        rename_subtasks: Vec<String>,
    },
    /// Delete a task (admin only)
    Delete {
        /// Task id
        id: i64,
    },
    /// List tasks, optionally filtered and sorted
    List {
        /// open, in-progress or closed
        #[arg(short, long)]
        status: Option<String>,
        /// low, medium or high
        #[arg(short, long)]
        priority: Option<String>,
        /// User id of the assignee
        #[arg(short, long)]
        assignee: Option<i64>,
        /// created, due or priority
        #[arg(long)]
        sort: Option<String>,
    },
    /// Show a task in detail
    Show {
        /// Task id
        id: i64,
    },
    /// Toggle a subtask's completion (admin or assignee)
    Toggle {
        /// Task id
        task_id: i64,
        /// Subtask id within the task
        subtask_id: u32,
    },
    /// Status and priority breakdowns of the board
    Summary,
    /// Per-day open-task counts and average completion for a date range
    Report {
        /// First day, YYYY-MM-DD
        #[arg(long)]
        from: String,
        /// Last day (inclusive), YYYY-MM-DD
        #[arg(long)]
        to: String,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    if let Commands::Init = cli.command {
        return commands::cmd_init();
    }

    let mut auth = open_auth_store()?;
    match cli.command {
        Commands::Init => unreachable!("handled above"),
        Commands::Login { username, password } => commands::cmd_login(&mut auth, &username, &password),
        Commands::Logout => commands::cmd_logout(&mut auth),
        Commands::Whoami => commands::cmd_whoami(&auth),
        Commands::Add {
            title,
            description,
            priority,
            assignee,
            due,
            subtasks,
        } => {
            let mut store = open_task_store()?;
            commands::cmd_add(
                &mut store,
                &auth,
                NewTaskInput {
                    title,
                    description,
                    priority,
                    assignee,
                    due,
                    subtasks,
                },
            )
        }
        Commands::Edit {
            id,
            title,
            description,
            priority,
            status,
            assignee,
            due,
            time_spent,
            add_subtasks,
            rename_subtasks,
        } => {
            let mut store = open_task_store()?;
            commands::cmd_edit(
                &mut store,
                &auth,
                EditTaskInput {
                    id,
                    title,
                    description,
                    priority,
                    status,
                    assignee,
                    due,
                    time_spent,
                    add_subtasks,
                    rename_subtasks,
                },
            )
        }
        Commands::Delete { id } => {
            let mut store = open_task_store()?;
            commands::cmd_delete(&mut store, &auth, id)
        }
        Commands::List {
            status,
            priority,
            assignee,
            sort,
        } => {
            let store = open_task_store()?;
            commands::cmd_list(
                &store,
                &auth,
                ListOptions {
                    status,
                    priority,
                    assignee,
                    sort,
                },
            )
        }
        Commands::Show { id } => {
            let store = open_task_store()?;
            commands::cmd_show(&store, &auth, id)
        }
        Commands::Toggle {
            task_id,
            subtask_id,
        } => {
            let mut store = open_task_store()?;
            commands::cmd_toggle(&mut store, &auth, task_id, subtask_id)
        }
        Commands::Summary => {
            let store = open_task_store()?;
            commands::cmd_summary(&store, &auth)
        }
        Commands::Report { from, to } => {
            let store = open_task_store()?;
            commands::cmd_report(&store, &auth, &from, &to)
        }
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Rehydrate the session from the data directory
fn open_auth_store() -> Result<AuthStore> {
    let repo = Box::new(JsonSessionRepository::new(persistence::session_file()?));
    AuthStore::open(repo)
}

/// One-shot initialization of the task store: prior collection from the
/// repository when it exists, otherwise the seed resources
fn open_task_store() -> Result<TaskStore> {
    let users = persistence::load_users(&persistence::users_file()?);
    let repo = JsonTaskRepository::new(persistence::tasks_file()?);
    let tasks = match repo.load()? {
        Some(tasks) => tasks,
        None => persistence::load_seed_tasks(&persistence::tasks_seed_file()?),
    };
    Ok(TaskStore::new(tasks, users, Box::new(repo)))
}
