//! Audit recorder and the organization's audit log query.
//!
//! `record` runs inside the caller's write transaction, so a failed append
//! rolls the accompanying mutation back with it.

use chrono::Utc;

use tenet_core::entities::AuditLogEntry;
use tenet_core::enums::{AuditAction, EntityType, Role};
use tenet_core::identity::RequestContext;
use tenet_core::ids::PREFIX_AUDIT;
use tenet_db::repos::audit::AuditFilter;
use tenet_db::service::TenetService;

use crate::error::AuthError;
use crate::gate::require_role;
use crate::guard::{VerifiedContext, require_auth};

/// Append one entry stamped with the context's organization and user.
///
/// # Errors
///
/// Returns `AuthError::Database` if the append fails.
pub async fn record(
    svc: &TenetService,
    ctx: &VerifiedContext,
    action: AuditAction,
    entity_type: EntityType,
    entity_id: &str,
    metadata: Option<serde_json::Value>,
) -> Result<AuditLogEntry, AuthError> {
    let entry = AuditLogEntry {
        id: svc.db().generate_id(PREFIX_AUDIT).await?,
        organization_id: ctx.organization_id().to_string(),
        user_id: ctx.user_id().to_string(),
        action,
        entity_type,
        entity_id: entity_id.to_string(),
        metadata,
        created_at: Utc::now(),
    };
    svc.append_audit(&entry).await?;
    tracing::debug!(action = %action, entity_id, "audit recorded");
    Ok(entry)
}

/// The caller's organization audit log, newest first. Owners and admins only.
///
/// # Errors
///
/// Returns the guard's and gate's policy failures, or `AuthError::Database`.
pub async fn list_for_organization(
    svc: &TenetService,
    request: &RequestContext,
    filter: &AuditFilter,
) -> Result<Vec<AuditLogEntry>, AuthError> {
    let txn = svc.db().begin_read().await?;
    let result: Result<_, AuthError> = async {
        let ctx = require_auth(svc, request).await?;
        require_role(&ctx, Role::MANAGERS)?;
        Ok(svc.query_audit(ctx.organization_id(), filter).await?)
    }
    .await;
    txn.finish(result).await
}
