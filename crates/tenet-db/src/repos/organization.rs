//! Organization repository.

use chrono::Utc;

use tenet_core::entities::Organization;
use tenet_core::ids::PREFIX_ORGANIZATION;
use tenet_core::responses::OrganizationWithRole;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, json_text, parse_datetime, parse_enum, parse_optional_json};
use crate::service::TenetService;
use crate::updates::SetClauses;
use crate::updates::organization::OrganizationUpdate;

const SELECT_COLS: &str = "id, name, slug, logo, metadata, created_at";

fn row_to_organization(row: &libsql::Row) -> Result<Organization, DatabaseError> {
    Ok(Organization {
        id: row.get(0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
        logo: get_opt_string(row, 3)?,
        metadata: parse_optional_json(get_opt_string(row, 4)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

impl TenetService {
    pub async fn create_organization(
        &self,
        name: &str,
        slug: &str,
        logo: Option<&str>,
        metadata: Option<&serde_json::Value>,
    ) -> Result<Organization, DatabaseError> {
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_ORGANIZATION).await?;

        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO organizations ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
                ),
                libsql::params![
                    id.as_str(),
                    name,
                    slug,
                    logo,
                    json_text(metadata),
                    now.to_rfc3339()
                ],
            )
            .await?;

        Ok(Organization {
            id,
            name: name.to_string(),
            slug: slug.to_string(),
            logo: logo.map(String::from),
            metadata: metadata.cloned(),
            created_at: now,
        })
    }

    pub async fn get_organization(&self, id: &str) -> Result<Organization, DatabaseError> {
        self.find_organization(id)
            .await?
            .ok_or(DatabaseError::NoResult)
    }

    pub async fn find_organization(
        &self,
        id: &str,
    ) -> Result<Option<Organization>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM organizations WHERE id = ?1"),
                [id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_organization(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn find_organization_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<Organization>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM organizations WHERE slug = ?1"),
                [slug],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_organization(&row)?)),
            None => Ok(None),
        }
    }

    /// Apply a partial update. An empty update is a read.
    pub async fn update_organization(
        &self,
        id: &str,
        update: &OrganizationUpdate,
    ) -> Result<Organization, DatabaseError> {
        let mut clauses = SetClauses::default();
        if let Some(ref name) = update.name {
            clauses.push("name", name.as_str());
        }
        if let Some(ref slug) = update.slug {
            clauses.push("slug", slug.as_str());
        }
        if let Some(ref logo) = update.logo {
            clauses.push_opt("logo", logo.clone());
        }
        if let Some(ref metadata) = update.metadata {
            clauses.push_opt("metadata", json_text(metadata.as_ref()));
        }

        if clauses.is_empty() {
            return self.get_organization(id).await;
        }

        let (sql, params) = clauses.into_sql("organizations", id);
        let changed = self
            .db()
            .conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.get_organization(id).await
    }

    /// Organizations the user belongs to, with the user's role in each,
    /// oldest membership first.
    pub async fn list_organizations_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<OrganizationWithRole>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT o.id, o.name, o.slug, o.logo, o.metadata, o.created_at, m.role, m.created_at
                 FROM members m
                 JOIN organizations o ON o.id = m.organization_id
                 WHERE m.user_id = ?1
                 ORDER BY m.created_at, m.rowid",
                [user_id],
            )
            .await?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(OrganizationWithRole {
                organization: row_to_organization(&row)?,
                membership_role: parse_enum(&row.get::<String>(6)?)?,
                joined_at: parse_datetime(&row.get::<String>(7)?)?,
            });
        }
        Ok(out)
    }
}
