use serde::Serialize;
use tenet_config::TenetConfig;
use tenet_db::service::TenetService;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::InitArgs;
use crate::context::{ensure_parent_dir, resolve_db_path};
use crate::output::output;

#[derive(Serialize)]
struct InitResponse {
    database: String,
    created: bool,
}

/// Handle `tnt init`.
pub async fn handle(args: &InitArgs, config: &TenetConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let database = resolve_db_path(config, flags);
    if !args.dry_run {
        ensure_parent_dir(&database)?;
        // Opening runs migrations.
        TenetService::new_local(&database).await?;
        tracing::info!(path = %database, "database initialized");
    }
    output(
        &InitResponse {
            database,
            created: !args.dry_run,
        },
        flags.format,
    )
}
