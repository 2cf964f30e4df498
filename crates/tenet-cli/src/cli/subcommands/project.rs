use clap::Subcommand;

/// Project commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ProjectCommands {
    /// List projects, newest first.
    List,
    /// Get a project by ID.
    Get { id: String },
    /// Get a project together with its tasks.
    Show { id: String },
    /// Create a project.
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Update a project.
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        /// Pass an empty string to clear it.
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    /// Archive a project.
    Archive { id: String },
    /// Delete a project and its tasks.
    Remove { id: String },
}
