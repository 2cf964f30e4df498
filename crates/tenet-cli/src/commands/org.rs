use tenet_auth::switch_organization;
use tenet_db::updates::organization::OrganizationUpdate;
use tenet_ops::organizations;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::OrgCommands;
use crate::cli::subcommands::org::OrgUpdateArgs;
use crate::commands::shared::parse::clearable;
use crate::context::AppContext;
use crate::output::output;

/// Handle `tnt org`.
pub async fn handle(action: &OrgCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let svc = &ctx.service;
    let request = &ctx.request;
    match action {
        OrgCommands::Create(args) => {
            let org = organizations::create(svc, request, &args.name, &args.slug).await?;
            output(&org, flags.format)
        }
        OrgCommands::List => output(&organizations::list_for_user(svc, request).await?, flags.format),
        OrgCommands::Current => output(&organizations::get_current(svc, request).await?, flags.format),
        OrgCommands::Members => output(&organizations::get_members(svc, request).await?, flags.format),
        OrgCommands::Switch { organization_id } => {
            let switched = switch_organization(svc, request, organization_id).await?;
            output(&switched, flags.format)
        }
        OrgCommands::Update(args) => {
            let patch = build_update(args)?;
            output(&organizations::update(svc, request, &patch).await?, flags.format)
        }
    }
}

fn build_update(args: &OrgUpdateArgs) -> anyhow::Result<OrganizationUpdate> {
    let metadata = match args.metadata.as_deref() {
        None => None,
        Some(raw) => {
            let value: serde_json::Value = serde_json::from_str(raw)
                .map_err(|error| anyhow::anyhow!("invalid --metadata JSON: {error}"))?;
            Some((!value.is_null()).then_some(value))
        }
    };
    Ok(OrganizationUpdate {
        name: args.name.clone(),
        slug: args.slug.clone(),
        logo: clearable(args.logo.as_deref()),
        metadata,
    })
}
