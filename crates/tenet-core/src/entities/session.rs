use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A signed-in user agent. `active_organization_id` is the tenant every
/// guarded operation in this session runs against.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub active_organization_id: Option<String>,
    pub created_at: DateTime<Utc>,
}
