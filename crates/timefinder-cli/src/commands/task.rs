//! Task management commands for CLI.

use clap::Subcommand;
use timefinder_core::storage::Database;
use timefinder_core::task::{Concentration, Priority};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a new task
    Add {
        /// User key (OIDC sub)
        sub: String,
        /// Task name
        name: String,
        /// Priority: high, medium or low
        #[arg(long, default_value = "medium")]
        priority: String,
        /// Estimated duration in minutes
        #[arg(long)]
        duration: i64,
        /// Concentration demand: high, medium or low
        #[arg(long, default_value = "medium")]
        concentration: String,
    },
    /// List pending tasks
    List {
        /// User key (OIDC sub)
        sub: String,
    },
    /// Mark a task completed
    Done {
        /// Task ID
        id: String,
    },
}

pub fn run(action: TaskAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    match action {
        TaskAction::Add {
            sub,
            name,
            priority,
            duration,
            concentration,
        } => {
            let priority = Priority::parse(&priority)
                .ok_or_else(|| format!("unknown priority '{priority}'"))?;
            let concentration = Concentration::parse(&concentration)
                .ok_or_else(|| format!("unknown concentration '{concentration}'"))?;
            if duration <= 0 {
                return Err("duration must be positive".into());
            }

            let task = db.add_task(&sub, &name, priority, duration, concentration)?;
            println!("task created: {}", task.id);
        }
        TaskAction::List { sub } => {
            let tasks = db.pending_tasks(&sub)?;
            println!("{}", serde_json::to_string_pretty(&tasks)?);
        }
        TaskAction::Done { id } => {
            db.set_task_completed(&id, true)?;
            println!("task completed: {id}");
        }
    }
    Ok(())
}
