use clap::Subcommand;

/// Audit log commands.
#[derive(Clone, Debug, Subcommand)]
pub enum AuditCommands {
    /// List entries of the active organization, newest first.
    List {
        #[arg(long)]
        entity_type: Option<String>,
        #[arg(long)]
        entity_id: Option<String>,
        /// Dotted action tag, e.g. project.created.
        #[arg(long)]
        action: Option<String>,
        #[arg(long)]
        user_id: Option<String>,
    },
}
