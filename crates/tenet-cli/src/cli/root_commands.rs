use clap::{Args, Subcommand};

use crate::cli::subcommands::{
    AuditCommands, MemberCommands, OrgCommands, ProjectCommands, TaskCommands, UserCommands,
};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Create the database and run migrations.
    Init(InitArgs),
    /// Users and sessions.
    User {
        #[command(subcommand)]
        action: UserCommands,
    },
    /// Organizations and switching between them.
    Org {
        #[command(subcommand)]
        action: OrgCommands,
    },
    /// Membership of the active organization.
    Member {
        #[command(subcommand)]
        action: MemberCommands,
    },
    /// Projects of the active organization.
    Project {
        #[command(subcommand)]
        action: ProjectCommands,
    },
    /// Tasks of the active organization.
    Task {
        #[command(subcommand)]
        action: TaskCommands,
    },
    /// Audit log of the active organization.
    Audit {
        #[command(subcommand)]
        action: AuditCommands,
    },
}

#[derive(Clone, Debug, Args)]
pub struct InitArgs {
    /// Report the resolved database path without creating it.
    #[arg(long)]
    pub dry_run: bool,
}
