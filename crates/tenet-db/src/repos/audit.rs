//! Audit log repository.
//!
//! Append-only entries recording every audited mutation inside one
//! organization. Queries are always scoped to an organization.

use tenet_core::entities::AuditLogEntry;
use tenet_core::enums::{AuditAction, EntityType};

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, json_text, parse_datetime, parse_enum, parse_optional_json};
use crate::service::TenetService;

/// Filter criteria for audit queries within one organization.
#[derive(Debug, Default)]
pub struct AuditFilter {
    pub entity_type: Option<EntityType>,
    pub entity_id: Option<String>,
    pub action: Option<AuditAction>,
    pub user_id: Option<String>,
    pub limit: Option<u32>,
}

impl TenetService {
    /// Append an audit entry.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn append_audit(&self, entry: &AuditLogEntry) -> Result<(), DatabaseError> {
        self.db()
            .conn()
            .execute(
                "INSERT INTO audit_log (id, organization_id, user_id, action, entity_type, entity_id, metadata, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                libsql::params![
                    entry.id.as_str(),
                    entry.organization_id.as_str(),
                    entry.user_id.as_str(),
                    entry.action.as_str(),
                    entry.entity_type.as_str(),
                    entry.entity_id.as_str(),
                    json_text(entry.metadata.as_ref()),
                    entry.created_at.to_rfc3339()
                ],
            )
            .await?;
        Ok(())
    }

    /// Query one organization's audit entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn query_audit(
        &self,
        organization_id: &str,
        filter: &AuditFilter,
    ) -> Result<Vec<AuditLogEntry>, DatabaseError> {
        let mut conditions = vec!["organization_id = ?1".to_string()];
        let mut params: Vec<libsql::Value> = vec![organization_id.into()];

        if let Some(ref et) = filter.entity_type {
            params.push(et.as_str().into());
            conditions.push(format!("entity_type = ?{}", params.len()));
        }
        if let Some(ref eid) = filter.entity_id {
            params.push(eid.as_str().into());
            conditions.push(format!("entity_id = ?{}", params.len()));
        }
        if let Some(ref action) = filter.action {
            params.push(action.as_str().into());
            conditions.push(format!("action = ?{}", params.len()));
        }
        if let Some(ref uid) = filter.user_id {
            params.push(uid.as_str().into());
            conditions.push(format!("user_id = ?{}", params.len()));
        }

        let limit = filter.limit.unwrap_or(100);
        let sql = format!(
            "SELECT id, organization_id, user_id, action, entity_type, entity_id, metadata, created_at
             FROM audit_log WHERE {}
             ORDER BY created_at DESC, rowid DESC LIMIT {limit}",
            conditions.join(" AND ")
        );

        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(AuditLogEntry {
                id: row.get::<String>(0)?,
                organization_id: row.get::<String>(1)?,
                user_id: row.get::<String>(2)?,
                action: parse_enum(&row.get::<String>(3)?)?,
                entity_type: parse_enum(&row.get::<String>(4)?)?,
                entity_id: row.get::<String>(5)?,
                metadata: parse_optional_json(get_opt_string(&row, 6)?.as_deref())?,
                created_at: parse_datetime(&row.get::<String>(7)?)?,
            });
        }
        Ok(entries)
    }

    /// Number of audit entries in an organization.
    pub async fn count_audit(&self, organization_id: &str) -> Result<u64, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT COUNT(*) FROM audit_log WHERE organization_id = ?1",
                [organization_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let count = row.get::<i64>(0)?;
        u64::try_from(count)
            .map_err(|_| DatabaseError::InvalidState(format!("negative count {count}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::test_service;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn entry(id: &str, org: &str, action: AuditAction) -> AuditLogEntry {
        AuditLogEntry {
            id: id.to_string(),
            organization_id: org.to_string(),
            user_id: "usr-1".to_string(),
            action,
            entity_type: action.entity_type(),
            entity_id: "prj-1".to_string(),
            metadata: Some(serde_json::json!({"name": "Website"})),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn append_and_query() {
        let svc = test_service().await;
        let e = entry("aud-1", "org-a", AuditAction::ProjectCreated);
        svc.append_audit(&e).await.unwrap();

        let entries = svc.query_audit("org-a", &AuditFilter::default()).await.unwrap();
        assert_eq!(entries, vec![e]);
    }

    #[tokio::test]
    async fn query_is_scoped_to_organization() {
        let svc = test_service().await;
        svc.append_audit(&entry("aud-1", "org-a", AuditAction::ProjectCreated))
            .await
            .unwrap();
        svc.append_audit(&entry("aud-2", "org-b", AuditAction::ProjectCreated))
            .await
            .unwrap();

        let entries = svc.query_audit("org-b", &AuditFilter::default()).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "aud-2");
        assert_eq!(svc.count_audit("org-a").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn filters_and_orders_newest_first() {
        let svc = test_service().await;
        svc.append_audit(&entry("aud-1", "org-a", AuditAction::ProjectCreated))
            .await
            .unwrap();
        svc.append_audit(&entry("aud-2", "org-a", AuditAction::ProjectUpdated))
            .await
            .unwrap();
        svc.append_audit(&entry("aud-3", "org-a", AuditAction::ProjectUpdated))
            .await
            .unwrap();

        let filter = AuditFilter {
            action: Some(AuditAction::ProjectUpdated),
            ..AuditFilter::default()
        };
        let entries = svc.query_audit("org-a", &filter).await.unwrap();
        let ids: Vec<_> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["aud-3", "aud-2"]);

        let limited = AuditFilter {
            limit: Some(1),
            ..AuditFilter::default()
        };
        assert_eq!(svc.query_audit("org-a", &limited).await.unwrap().len(), 1);
    }
}
