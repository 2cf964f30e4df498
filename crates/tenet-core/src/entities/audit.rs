use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{AuditAction, EntityType};

/// An append-only audit log entry recording a mutation inside one organization.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AuditLogEntry {
    pub id: String,
    pub organization_id: String,
    pub user_id: String,
    pub action: AuditAction,
    pub entity_type: EntityType,
    pub entity_id: String,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}
