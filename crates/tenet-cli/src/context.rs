use anyhow::Context;
use tenet_config::TenetConfig;
use tenet_core::identity::RequestContext;
use tenet_db::service::TenetService;

use crate::cli::GlobalFlags;

/// Shared application resources initialized once per invocation.
pub struct AppContext {
    pub service: TenetService,
    pub config: TenetConfig,
    /// The acting user, from `--user` or `general.user_id`.
    pub request: RequestContext,
}

impl AppContext {
    pub async fn init(config: TenetConfig, flags: &GlobalFlags) -> anyhow::Result<Self> {
        let path = resolve_db_path(&config, flags);
        ensure_parent_dir(&path)?;
        let service = TenetService::new_local(&path)
            .await
            .with_context(|| format!("failed to open database at {path}"))?;

        let request = flags
            .user
            .clone()
            .or_else(|| config.general.user_id.clone())
            .map_or_else(RequestContext::anonymous, RequestContext::for_user);
        tracing::debug!(path, user_id = ?request.user_id, "context ready");

        Ok(Self {
            service,
            config,
            request,
        })
    }

    /// Effective row cap for list commands.
    #[must_use]
    pub fn limit(&self, flags: &GlobalFlags) -> u32 {
        flags.limit.unwrap_or(self.config.general.default_limit)
    }
}

/// `--db` wins over `database.path`.
pub fn resolve_db_path(config: &TenetConfig, flags: &GlobalFlags) -> String {
    flags
        .db
        .clone()
        .unwrap_or_else(|| config.database.path.clone())
}

/// Create the directory a file-backed database lives in.
pub fn ensure_parent_dir(path: &str) -> anyhow::Result<()> {
    if path == tenet_config::IN_MEMORY {
        return Ok(());
    }
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    Ok(())
}
