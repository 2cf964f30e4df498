use clap::{Args, Subcommand};

/// Task commands.
#[derive(Clone, Debug, Subcommand)]
pub enum TaskCommands {
    /// Create a task in a project.
    Create(TaskCreateArgs),
    /// List tasks of a project, or tasks assigned to a user.
    List {
        #[arg(long, conflicts_with = "assignee")]
        project: Option<String>,
        /// Assignee user ID (defaults to the acting user).
        #[arg(long)]
        assignee: Option<String>,
    },
    /// Get a task by ID.
    Get { id: String },
    /// Update a task.
    Update(TaskUpdateArgs),
    /// Delete a task.
    Remove { id: String },
}

#[derive(Clone, Debug, Args)]
pub struct TaskCreateArgs {
    #[arg(long)]
    pub project: String,
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub priority: Option<String>,
    #[arg(long)]
    pub assignee: Option<String>,
    /// RFC 3339 timestamp.
    #[arg(long)]
    pub due: Option<String>,
}

/// Empty strings clear the optional fields.
#[derive(Clone, Debug, Args)]
pub struct TaskUpdateArgs {
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub priority: Option<String>,
    #[arg(long)]
    pub assignee: Option<String>,
    #[arg(long)]
    pub due: Option<String>,
}
