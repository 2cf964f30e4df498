use tenet_auth::audit::list_for_organization;
use tenet_core::enums::{AuditAction, EntityType};
use tenet_db::repos::audit::AuditFilter;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::AuditCommands;
use crate::commands::shared::parse::parse_opt_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `tnt audit`.
pub async fn handle(action: &AuditCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        AuditCommands::List {
            entity_type,
            entity_id,
            action,
            user_id,
        } => {
            let filter = AuditFilter {
                entity_type: parse_opt_enum::<EntityType>(entity_type.as_deref())?,
                entity_id: entity_id.clone(),
                action: parse_opt_enum::<AuditAction>(action.as_deref())?,
                user_id: user_id.clone(),
                limit: Some(ctx.limit(flags)),
            };
            let entries = list_for_organization(&ctx.service, &ctx.request, &filter).await?;
            output(&entries, flags.format)
        }
    }
}
