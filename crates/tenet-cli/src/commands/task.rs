use tenet_core::enums::{TaskPriority, TaskStatus};
use tenet_db::repos::task::NewTask;
use tenet_db::updates::task::TaskUpdate;
use tenet_ops::tasks;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::TaskCommands;
use crate::cli::subcommands::task::{TaskCreateArgs, TaskUpdateArgs};
use crate::commands::shared::parse::{clearable, parse_opt_enum, parse_timestamp};
use crate::context::AppContext;
use crate::output::output;

/// Handle `tnt task`.
pub async fn handle(action: &TaskCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let svc = &ctx.service;
    let request = &ctx.request;
    match action {
        TaskCommands::Create(args) => {
            let new = new_task(args)?;
            output(&tasks::create(svc, request, &args.project, &new).await?, flags.format)
        }
        TaskCommands::List { project, assignee } => {
            let listed = match project {
                Some(project_id) => tasks::list_for_project(svc, request, project_id).await?,
                None => {
                    tasks::list_assigned(svc, request, assignee.as_deref(), Some(ctx.limit(flags)))
                        .await?
                }
            };
            output(&listed, flags.format)
        }
        TaskCommands::Get { id } => output(&tasks::get(svc, request, id).await?, flags.format),
        TaskCommands::Update(args) => {
            let patch = task_update(args)?;
            output(&tasks::update(svc, request, &args.id, &patch).await?, flags.format)
        }
        TaskCommands::Remove { id } => {
            tasks::remove(svc, request, id).await?;
            output(&serde_json::json!({ "removed": id }), flags.format)
        }
    }
}

fn new_task(args: &TaskCreateArgs) -> anyhow::Result<NewTask> {
    Ok(NewTask {
        title: args.title.clone(),
        description: args.description.clone(),
        status: parse_opt_enum::<TaskStatus>(args.status.as_deref())?,
        priority: parse_opt_enum::<TaskPriority>(args.priority.as_deref())?,
        assignee_id: args.assignee.clone(),
        due_date: args.due.as_deref().map(parse_timestamp).transpose()?,
    })
}

fn task_update(args: &TaskUpdateArgs) -> anyhow::Result<TaskUpdate> {
    let due_date = match clearable(args.due.as_deref()) {
        None => None,
        Some(None) => Some(None),
        Some(Some(raw)) => Some(Some(parse_timestamp(&raw)?)),
    };
    Ok(TaskUpdate {
        title: args.title.clone(),
        description: clearable(args.description.as_deref()),
        status: parse_opt_enum::<TaskStatus>(args.status.as_deref())?,
        priority: parse_opt_enum::<TaskPriority>(args.priority.as_deref())?,
        assignee_id: clearable(args.assignee.as_deref()),
        due_date,
    })
}
