use clap::{Args, Subcommand};

/// Membership commands for the active organization.
#[derive(Clone, Debug, Subcommand)]
pub enum MemberCommands {
    /// Add an existing user.
    Add(MemberAddArgs),
    /// Change a member's role.
    Role {
        /// Membership ID.
        member_id: String,
        /// New role: admin or member.
        role: String,
    },
    /// Remove a user.
    Remove {
        user_id: String,
    },
}

#[derive(Clone, Debug, Args)]
pub struct MemberAddArgs {
    pub user_id: String,
    /// Role to assign: admin or member.
    #[arg(long, default_value = "member")]
    pub role: String,
}
