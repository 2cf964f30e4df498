use clap::{Args, Subcommand};

/// User and session commands.
#[derive(Clone, Debug, Subcommand)]
pub enum UserCommands {
    /// Register a user.
    SignUp(UserSignUpArgs),
    /// Open a new session for a user.
    SignIn {
        /// User ID (defaults to --user).
        user_id: Option<String>,
    },
    /// Close the acting user's current session.
    SignOut,
    /// Show the acting user with their active organization.
    Whoami,
}

#[derive(Clone, Debug, Args)]
pub struct UserSignUpArgs {
    pub email: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub image: Option<String>,
}
