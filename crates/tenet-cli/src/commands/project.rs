use tenet_core::enums::ProjectStatus;
use tenet_db::updates::project::ProjectUpdate;
use tenet_ops::projects;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ProjectCommands;
use crate::commands::shared::parse::{clearable, parse_opt_enum};
use crate::context::AppContext;
use crate::output::output;

/// Handle `tnt project`.
pub async fn handle(action: &ProjectCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let svc = &ctx.service;
    let request = &ctx.request;
    match action {
        ProjectCommands::List => {
            let listed = projects::list(svc, request, Some(ctx.limit(flags))).await?;
            output(&listed, flags.format)
        }
        ProjectCommands::Get { id } => output(&projects::get(svc, request, id).await?, flags.format),
        ProjectCommands::Show { id } => {
            output(&projects::get_with_tasks(svc, request, id).await?, flags.format)
        }
        ProjectCommands::Create { name, description } => {
            let project = projects::create(svc, request, name, description.as_deref()).await?;
            output(&project, flags.format)
        }
        ProjectCommands::Update {
            id,
            name,
            description,
            status,
        } => {
            let patch = ProjectUpdate {
                name: name.clone(),
                description: clearable(description.as_deref()),
                status: parse_opt_enum::<ProjectStatus>(status.as_deref())?,
            };
            output(&projects::update(svc, request, id, &patch).await?, flags.format)
        }
        ProjectCommands::Archive { id } => {
            output(&projects::archive(svc, request, id).await?, flags.format)
        }
        ProjectCommands::Remove { id } => {
            projects::remove(svc, request, id).await?;
            output(&serde_json::json!({ "removed": id }), flags.format)
        }
    }
}
