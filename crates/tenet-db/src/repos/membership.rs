//! Membership store.
//!
//! A membership row is the sole source of truth for whether a user belongs to
//! an organization and with which role. At most one row exists per
//! `(user_id, organization_id)`, enforced by a UNIQUE constraint, and a
//! partial unique index allows a single owner per organization.

use chrono::Utc;

use tenet_core::entities::Membership;
use tenet_core::enums::Role;
use tenet_core::ids::PREFIX_MEMBERSHIP;
use tenet_core::responses::{MemberWithUser, UserSummary};

use crate::error::DatabaseError;
use crate::helpers::{parse_datetime, parse_enum};
use crate::repos::user::row_to_user_at;
use crate::service::TenetService;

const SELECT_COLS: &str = "id, user_id, organization_id, role, created_at";

fn row_to_membership(row: &libsql::Row) -> Result<Membership, DatabaseError> {
    Ok(Membership {
        id: row.get(0)?,
        user_id: row.get(1)?,
        organization_id: row.get(2)?,
        role: parse_enum(&row.get::<String>(3)?)?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

impl TenetService {
    pub async fn create_membership(
        &self,
        user_id: &str,
        organization_id: &str,
        role: Role,
    ) -> Result<Membership, DatabaseError> {
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_MEMBERSHIP).await?;

        self.db()
            .conn()
            .execute(
                &format!("INSERT INTO members ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
                libsql::params![
                    id.as_str(),
                    user_id,
                    organization_id,
                    role.as_str(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        Ok(Membership {
            id,
            user_id: user_id.to_string(),
            organization_id: organization_id.to_string(),
            role,
            created_at: now,
        })
    }

    /// Point lookup by `(user_id, organization_id)`.
    pub async fn find_membership(
        &self,
        user_id: &str,
        organization_id: &str,
    ) -> Result<Option<Membership>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM members WHERE user_id = ?1 AND organization_id = ?2"
                ),
                libsql::params![user_id, organization_id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_membership(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn find_membership_by_id(
        &self,
        id: &str,
    ) -> Result<Option<Membership>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM members WHERE id = ?1"),
                [id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_membership(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn get_membership(&self, id: &str) -> Result<Membership, DatabaseError> {
        self.find_membership_by_id(id)
            .await?
            .ok_or(DatabaseError::NoResult)
    }

    pub async fn list_memberships_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<Membership>, DatabaseError> {
        self.query_memberships("user_id", user_id).await
    }

    pub async fn list_memberships_for_organization(
        &self,
        organization_id: &str,
    ) -> Result<Vec<Membership>, DatabaseError> {
        self.query_memberships("organization_id", organization_id)
            .await
    }

    async fn query_memberships(
        &self,
        column: &str,
        value: &str,
    ) -> Result<Vec<Membership>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM members WHERE {column} = ?1 ORDER BY created_at, rowid"
                ),
                [value],
            )
            .await?;
        let mut members = Vec::new();
        while let Some(row) = rows.next().await? {
            members.push(row_to_membership(&row)?);
        }
        Ok(members)
    }

    /// Members of an organization with their public profile.
    pub async fn list_members_with_users(
        &self,
        organization_id: &str,
    ) -> Result<Vec<MemberWithUser>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT m.id, m.user_id, m.organization_id, m.role, m.created_at,
                        u.id, u.email, u.name, u.image, u.created_at
                 FROM members m
                 LEFT JOIN users u ON u.id = m.user_id
                 WHERE m.organization_id = ?1
                 ORDER BY m.created_at, m.rowid",
                [organization_id],
            )
            .await?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            let membership = row_to_membership(&row)?;
            let user = match row.get::<Option<String>>(5)? {
                Some(_) => Some(UserSummary::from(row_to_user_at(&row, 5)?)),
                None => None,
            };
            out.push(MemberWithUser { membership, user });
        }
        Ok(out)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the membership does not exist.
    pub async fn update_membership_role(
        &self,
        id: &str,
        role: Role,
    ) -> Result<Membership, DatabaseError> {
        let changed = self
            .db()
            .conn()
            .execute(
                "UPDATE members SET role = ?1 WHERE id = ?2",
                libsql::params![role.as_str(), id],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.get_membership(id).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the membership does not exist.
    pub async fn delete_membership(&self, id: &str) -> Result<(), DatabaseError> {
        let changed = self
            .db()
            .conn()
            .execute("DELETE FROM members WHERE id = ?1", [id])
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{seed_org, seed_user, test_service};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn point_lookup_by_pair() {
        let svc = test_service().await;
        let ada = seed_user(&svc, "ada").await;
        let org = seed_org(&svc, "acme", &ada).await;

        let found = svc.find_membership(&ada.id, &org.id).await.unwrap().unwrap();
        assert_eq!(found.role, Role::Owner);
        assert!(found.id.starts_with("mem-"));
        assert!(svc.find_membership(&ada.id, "org-other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn pair_is_unique() {
        let svc = test_service().await;
        let ada = seed_user(&svc, "ada").await;
        let bo = seed_user(&svc, "bo").await;
        let org = seed_org(&svc, "acme", &ada).await;

        svc.create_membership(&bo.id, &org.id, Role::Member).await.unwrap();
        assert!(svc.create_membership(&bo.id, &org.id, Role::Admin).await.is_err());
    }

    #[tokio::test]
    async fn single_owner_per_organization() {
        let svc = test_service().await;
        let ada = seed_user(&svc, "ada").await;
        let bo = seed_user(&svc, "bo").await;
        let org = seed_org(&svc, "acme", &ada).await;

        assert!(svc.create_membership(&bo.id, &org.id, Role::Owner).await.is_err());
    }

    #[tokio::test]
    async fn update_role_and_delete() {
        let svc = test_service().await;
        let ada = seed_user(&svc, "ada").await;
        let bo = seed_user(&svc, "bo").await;
        let org = seed_org(&svc, "acme", &ada).await;
        let member = svc.create_membership(&bo.id, &org.id, Role::Member).await.unwrap();

        let updated = svc.update_membership_role(&member.id, Role::Admin).await.unwrap();
        assert_eq!(updated.role, Role::Admin);

        svc.delete_membership(&member.id).await.unwrap();
        assert!(svc.find_membership_by_id(&member.id).await.unwrap().is_none());
        assert!(matches!(
            svc.delete_membership(&member.id).await,
            Err(DatabaseError::NoResult)
        ));
    }

    #[tokio::test]
    async fn lists_by_user_and_by_org() {
        let svc = test_service().await;
        let ada = seed_user(&svc, "ada").await;
        let bo = seed_user(&svc, "bo").await;
        let acme = seed_org(&svc, "acme", &ada).await;
        let globex = seed_org(&svc, "globex", &bo).await;
        svc.create_membership(&bo.id, &acme.id, Role::Member).await.unwrap();

        assert_eq!(svc.list_memberships_for_user(&bo.id).await.unwrap().len(), 2);
        let acme_members = svc.list_memberships_for_organization(&acme.id).await.unwrap();
        assert_eq!(acme_members.len(), 2);
        assert_eq!(acme_members[0].user_id, ada.id);
        assert_eq!(
            svc.list_memberships_for_organization(&globex.id).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn members_come_with_user_summary() {
        let svc = test_service().await;
        let ada = seed_user(&svc, "ada").await;
        let org = seed_org(&svc, "acme", &ada).await;

        let members = svc.list_members_with_users(&org.id).await.unwrap();
        assert_eq!(members.len(), 1);
        let user = members[0].user.as_ref().unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.name.as_deref(), Some("ada"));
    }
}
