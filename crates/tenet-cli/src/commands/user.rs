use anyhow::Context;
use tenet_ops::users;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::UserCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `tnt user`.
pub async fn handle(action: &UserCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        UserCommands::SignUp(args) => {
            let user = users::sign_up(
                &ctx.service,
                &args.email,
                args.name.as_deref(),
                args.image.as_deref(),
            )
            .await?;
            output(&user, flags.format)
        }
        UserCommands::SignIn { user_id } => {
            let user_id = user_id
                .as_deref()
                .or(ctx.request.user_id.as_deref())
                .context("user sign-in: pass a user id or --user")?;
            let session = users::sign_in(&ctx.service, user_id).await?;
            output(&session, flags.format)
        }
        UserCommands::SignOut => {
            let session = users::sign_out(&ctx.service, &ctx.request).await?;
            output(&session, flags.format)
        }
        UserCommands::Whoami => {
            let current = users::get_current_with_org(&ctx.service, &ctx.request).await?;
            output(&current, flags.format)
        }
    }
}
