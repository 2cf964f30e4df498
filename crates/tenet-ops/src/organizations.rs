//! Organizations: creation, the caller's view of them, and settings updates.

use serde_json::json;

use tenet_auth::audit::record;
use tenet_auth::identity::{get_auth_user, safe_get_auth_user};
use tenet_auth::{AuthError, require_auth, require_membership, require_role};
use tenet_core::entities::Organization;
use tenet_core::enums::{AuditAction, EntityType, Role};
use tenet_core::errors::AccessError;
use tenet_core::identity::RequestContext;
use tenet_core::responses::{MemberWithUser, OrganizationWithRole};
use tenet_db::service::TenetService;
use tenet_db::updates::organization::OrganizationUpdate;

const SLUG_TAKEN: &str = "Organization slug is already taken";

/// Create an organization owned by the caller.
///
/// Needs only an authenticated user. The caller's session is left alone;
/// switch to the new organization to act in it.
///
/// # Errors
///
/// Returns `UNAUTHORIZED`, `CONFLICT` for a taken slug, or
/// `AuthError::Database`.
pub async fn create(
    svc: &TenetService,
    request: &RequestContext,
    name: &str,
    slug: &str,
) -> Result<Organization, AuthError> {
    let txn = svc.db().begin_write().await?;
    let result: Result<_, AuthError> = async {
        let auth = get_auth_user(svc, request).await?;
        if svc.find_organization_by_slug(slug).await?.is_some() {
            return Err(AccessError::conflict(SLUG_TAKEN).into());
        }

        let organization = svc.create_organization(name, slug, None, None).await?;
        svc.create_membership(&auth.user.id, &organization.id, Role::Owner)
            .await?;

        let ctx = require_membership(svc, &auth.user.id, &organization.id).await?;
        record(
            svc,
            &ctx,
            AuditAction::OrganizationCreated,
            EntityType::Organization,
            &organization.id,
            Some(json!({ "name": name, "slug": slug })),
        )
        .await?;
        Ok(organization)
    }
    .await;
    let organization = txn.finish(result).await?;

    tracing::info!(organization_id = %organization.id, slug, "organization created");
    Ok(organization)
}

/// Every organization the caller belongs to, with their role. Empty when
/// signed out.
///
/// # Errors
///
/// Returns `AuthError::Database` if a lookup fails.
pub async fn list_for_user(
    svc: &TenetService,
    request: &RequestContext,
) -> Result<Vec<OrganizationWithRole>, AuthError> {
    let txn = svc.db().begin_read().await?;
    let result: Result<_, AuthError> = async {
        let Some(auth) = safe_get_auth_user(svc, request).await? else {
            return Ok(Vec::new());
        };
        Ok(svc.list_organizations_for_user(&auth.user.id).await?)
    }
    .await;
    txn.finish(result).await
}

/// The caller's active organization.
///
/// # Errors
///
/// Guard failures, or `NOT_FOUND` when the organization row is gone.
pub async fn get_current(
    svc: &TenetService,
    request: &RequestContext,
) -> Result<Organization, AuthError> {
    let txn = svc.db().begin_read().await?;
    let result: Result<_, AuthError> = async {
        let ctx = require_auth(svc, request).await?;
        svc.find_organization(ctx.organization_id())
            .await?
            .ok_or_else(|| AccessError::not_found("Organization not found").into())
    }
    .await;
    txn.finish(result).await
}

/// Members of the caller's active organization, each with a user summary.
///
/// # Errors
///
/// Guard failures or `AuthError::Database`.
pub async fn get_members(
    svc: &TenetService,
    request: &RequestContext,
) -> Result<Vec<MemberWithUser>, AuthError> {
    let txn = svc.db().begin_read().await?;
    let result: Result<_, AuthError> = async {
        let ctx = require_auth(svc, request).await?;
        Ok(svc.list_members_with_users(ctx.organization_id()).await?)
    }
    .await;
    txn.finish(result).await
}

/// Update the active organization's settings. Owners and admins only.
///
/// An empty patch returns the organization unchanged and records nothing.
///
/// # Errors
///
/// Guard and gate failures, `CONFLICT` when the new slug belongs to another
/// organization, or `AuthError::Database`.
pub async fn update(
    svc: &TenetService,
    request: &RequestContext,
    patch: &OrganizationUpdate,
) -> Result<Organization, AuthError> {
    let txn = svc.db().begin_write().await?;
    let result: Result<_, AuthError> = async {
        let ctx = require_auth(svc, request).await?;
        require_role(&ctx, Role::MANAGERS)?;

        if patch.is_empty() {
            return svc
                .find_organization(ctx.organization_id())
                .await?
                .ok_or_else(|| AccessError::not_found("Organization not found").into());
        }
        if let Some(ref slug) = patch.slug {
            let taken = svc.find_organization_by_slug(slug).await?;
            if taken.is_some_and(|o| o.id != ctx.organization_id()) {
                return Err(AccessError::conflict(SLUG_TAKEN).into());
            }
        }

        let organization = svc
            .update_organization(ctx.organization_id(), patch)
            .await?;
        record(
            svc,
            &ctx,
            AuditAction::OrganizationUpdated,
            EntityType::Organization,
            &organization.id,
            Some(json!({ "changes": patch })),
        )
        .await?;
        Ok(organization)
    }
    .await;
    let organization = txn.finish(result).await?;

    tracing::info!(organization_id = %organization.id, "organization updated");
    Ok(organization)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{join, req, seed_active_org, seed_user, test_service};
    use pretty_assertions::assert_eq;
    use tenet_core::errors::ErrorCode;
    use tenet_db::repos::audit::AuditFilter;
    use tenet_db::updates::organization::OrganizationUpdateBuilder;

    #[tokio::test]
    async fn create_makes_caller_owner_and_audits() {
        let svc = test_service().await;
        let ada = seed_user(&svc, "ada").await;
        svc.create_session(&ada.id).await.unwrap();

        let org = create(&svc, &req(&ada), "Acme", "acme").await.unwrap();
        let membership = svc.find_membership(&ada.id, &org.id).await.unwrap().unwrap();
        assert_eq!(membership.role, Role::Owner);

        let entries = svc.query_audit(&org.id, &AuditFilter::default()).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, AuditAction::OrganizationCreated);
        assert_eq!(entries[0].user_id, ada.id);

        // Creating does not switch.
        let session = svc.find_latest_session(&ada.id).await.unwrap().unwrap();
        assert_eq!(session.active_organization_id, None);
    }

    #[tokio::test]
    async fn create_rejects_taken_slug() {
        let svc = test_service().await;
        let ada = seed_user(&svc, "ada").await;
        create(&svc, &req(&ada), "Acme", "acme").await.unwrap();

        let err = create(&svc, &req(&ada), "Acme 2", "acme").await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::Conflict));
        assert_eq!(svc.list_organizations_for_user(&ada.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_requires_sign_in() {
        let svc = test_service().await;
        let err = create(&svc, &RequestContext::anonymous(), "Acme", "acme")
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::Unauthorized));
    }

    #[tokio::test]
    async fn list_for_user_is_empty_when_signed_out() {
        let svc = test_service().await;
        let ada = seed_user(&svc, "ada").await;
        seed_active_org(&svc, "acme", &ada).await;

        assert!(list_for_user(&svc, &RequestContext::anonymous()).await.unwrap().is_empty());
        let listed = list_for_user(&svc, &req(&ada)).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].membership_role, Role::Owner);
    }

    #[tokio::test]
    async fn members_include_user_summaries() {
        let svc = test_service().await;
        let ada = seed_user(&svc, "ada").await;
        let bo = seed_user(&svc, "bo").await;
        let org = seed_active_org(&svc, "acme", &ada).await;
        join(&svc, &bo, &org, Role::Member).await;

        assert_eq!(get_current(&svc, &req(&bo)).await.unwrap(), org);
        let members = get_members(&svc, &req(&bo)).await.unwrap();
        let mut emails: Vec<_> = members
            .iter()
            .filter_map(|m| m.user.as_ref().map(|u| u.email.as_str()))
            .collect();
        emails.sort_unstable();
        assert_eq!(emails, vec!["ada@example.com", "bo@example.com"]);
    }

    #[tokio::test]
    async fn update_is_gated_and_audited() {
        let svc = test_service().await;
        let ada = seed_user(&svc, "ada").await;
        let bo = seed_user(&svc, "bo").await;
        let org = seed_active_org(&svc, "acme", &ada).await;
        join(&svc, &bo, &org, Role::Member).await;
        let patch = OrganizationUpdateBuilder::new().name("Acme Inc").build();

        let err = update(&svc, &req(&bo), &patch).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::Forbidden));

        let updated = update(&svc, &req(&ada), &patch).await.unwrap();
        assert_eq!(updated.name, "Acme Inc");
        let entries = svc.query_audit(&org.id, &AuditFilter::default()).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].metadata,
            Some(json!({ "changes": { "name": "Acme Inc" } }))
        );
    }

    #[tokio::test]
    async fn empty_update_writes_nothing() {
        let svc = test_service().await;
        let ada = seed_user(&svc, "ada").await;
        let org = seed_active_org(&svc, "acme", &ada).await;

        let same = update(&svc, &req(&ada), &OrganizationUpdate::default())
            .await
            .unwrap();
        assert_eq!(same, org);
        assert_eq!(svc.count_audit(&org.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn update_slug_conflicts_only_with_others() {
        let svc = test_service().await;
        let ada = seed_user(&svc, "ada").await;
        seed_active_org(&svc, "globex", &ada).await;
        seed_active_org(&svc, "acme", &ada).await;

        let own = OrganizationUpdateBuilder::new().slug("acme").build();
        update(&svc, &req(&ada), &own).await.unwrap();

        let taken = OrganizationUpdateBuilder::new().slug("globex").build();
        let err = update(&svc, &req(&ada), &taken).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::Conflict));
    }
}
