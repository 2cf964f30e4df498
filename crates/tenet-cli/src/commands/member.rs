use tenet_auth::membership::{add_member, remove_member, update_member_role};
use tenet_core::enums::Role;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::MemberCommands;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `tnt member`.
pub async fn handle(action: &MemberCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        MemberCommands::Add(args) => {
            let role: Role = parse_enum(&args.role)?;
            let membership = add_member(&ctx.service, &ctx.request, &args.user_id, role).await?;
            output(&membership, flags.format)
        }
        MemberCommands::Role { member_id, role } => {
            let role: Role = parse_enum(role)?;
            let membership = update_member_role(&ctx.service, &ctx.request, member_id, role).await?;
            output(&membership, flags.format)
        }
        MemberCommands::Remove { user_id } => {
            remove_member(&ctx.service, &ctx.request, user_id).await?;
            output(&serde_json::json!({ "removed": user_id }), flags.format)
        }
    }
}
