use clap::{Args, Subcommand};

/// Organization commands.
#[derive(Clone, Debug, Subcommand)]
pub enum OrgCommands {
    /// Create an organization owned by the acting user.
    Create(OrgCreateArgs),
    /// List organizations the acting user belongs to.
    List,
    /// Show the active organization.
    Current,
    /// List members of the active organization.
    Members,
    /// Make another organization the active one.
    Switch {
        organization_id: String,
    },
    /// Update the active organization.
    Update(OrgUpdateArgs),
}

#[derive(Clone, Debug, Args)]
pub struct OrgCreateArgs {
    pub name: String,
    #[arg(long)]
    pub slug: String,
}

#[derive(Clone, Debug, Args)]
pub struct OrgUpdateArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub slug: Option<String>,
    /// Logo URL; pass an empty string to clear it.
    #[arg(long)]
    pub logo: Option<String>,
    /// Metadata as a JSON document; pass "null" to clear it.
    #[arg(long)]
    pub metadata: Option<String>,
}
