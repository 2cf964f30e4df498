//! Role-restricted membership mutations.
//!
//! Each public operation opens a write transaction, resolves the guard inside
//! it, and hands the verified context to its `*_as` step. The `*_as` steps
//! apply the role gate and the target checks in a fixed order, mutate, and
//! record an audit entry. Owner memberships can be neither re-roled nor
//! removed here, and nobody can be granted the owner role.

use serde_json::json;

use tenet_core::entities::Membership;
use tenet_core::enums::{AuditAction, EntityType, Role};
use tenet_core::errors::AccessError;
use tenet_core::identity::RequestContext;
use tenet_db::service::TenetService;

use crate::audit::record;
use crate::error::AuthError;
use crate::gate::require_role;
use crate::guard::{VerifiedContext, require_auth};

/// Add an existing user to the caller's organization.
///
/// # Errors
///
/// Guard and gate failures, then `FORBIDDEN` for the owner role,
/// `NOT_FOUND` for an unknown user, and `CONFLICT` for an existing member.
pub async fn add_member(
    svc: &TenetService,
    request: &RequestContext,
    user_id: &str,
    role: Role,
) -> Result<Membership, AuthError> {
    let txn = svc.db().begin_write().await?;
    let result: Result<_, AuthError> = async {
        let ctx = require_auth(svc, request).await?;
        add_member_as(svc, &ctx, user_id, role).await
    }
    .await;
    txn.finish(result).await
}

/// # Errors
///
/// See [`add_member`].
pub async fn add_member_as(
    svc: &TenetService,
    ctx: &VerifiedContext,
    user_id: &str,
    role: Role,
) -> Result<Membership, AuthError> {
    require_role(ctx, Role::MANAGERS)?;
    if role.is_owner() {
        return Err(AccessError::forbidden("Cannot assign the owner role").into());
    }
    if svc.find_user(user_id).await?.is_none() {
        return Err(AccessError::not_found("User not found").into());
    }
    if svc
        .find_membership(user_id, ctx.organization_id())
        .await?
        .is_some()
    {
        return Err(AccessError::conflict("User is already a member of this organization").into());
    }

    let membership = svc
        .create_membership(user_id, ctx.organization_id(), role)
        .await?;
    record(
        svc,
        ctx,
        AuditAction::MemberAdded,
        EntityType::Member,
        &membership.id,
        Some(json!({ "user_id": user_id, "role": role })),
    )
    .await?;

    tracing::info!(
        organization_id = ctx.organization_id(),
        user_id,
        role = %role,
        "member added"
    );
    Ok(membership)
}

/// Change a member's role.
///
/// # Errors
///
/// Guard and gate failures, then `NOT_FOUND` for an unknown membership,
/// `FORBIDDEN` for a membership in another organization, for an owner
/// target, and for the owner role as the new role.
pub async fn update_member_role(
    svc: &TenetService,
    request: &RequestContext,
    member_id: &str,
    role: Role,
) -> Result<Membership, AuthError> {
    let txn = svc.db().begin_write().await?;
    let result: Result<_, AuthError> = async {
        let ctx = require_auth(svc, request).await?;
        update_member_role_as(svc, &ctx, member_id, role).await
    }
    .await;
    txn.finish(result).await
}

/// # Errors
///
/// See [`update_member_role`].
pub async fn update_member_role_as(
    svc: &TenetService,
    ctx: &VerifiedContext,
    member_id: &str,
    role: Role,
) -> Result<Membership, AuthError> {
    require_role(ctx, Role::MANAGERS)?;

    let Some(target) = svc.find_membership_by_id(member_id).await? else {
        return Err(AccessError::not_found("Member not found").into());
    };
    // Existence in another organization is reported, not hidden.
    if target.organization_id != ctx.organization_id() {
        return Err(AccessError::forbidden("Member does not belong to your organization").into());
    }
    if target.role.is_owner() {
        return Err(AccessError::forbidden("Cannot change the owner's role").into());
    }
    if role.is_owner() {
        return Err(AccessError::forbidden("Cannot assign the owner role").into());
    }

    let updated = svc.update_membership_role(member_id, role).await?;
    record(
        svc,
        ctx,
        AuditAction::MemberRoleUpdated,
        EntityType::Member,
        member_id,
        Some(json!({
            "user_id": target.user_id,
            "previous_role": target.role,
            "role": role,
        })),
    )
    .await?;

    tracing::info!(
        organization_id = ctx.organization_id(),
        member_id,
        from = %target.role,
        to = %role,
        "member role updated"
    );
    Ok(updated)
}

/// Remove a user from the caller's organization.
///
/// # Errors
///
/// Guard and gate failures, then `FORBIDDEN` for self-removal (checked
/// before any lookup), `NOT_FOUND` when the user is not a member, and
/// `FORBIDDEN` for the owner.
pub async fn remove_member(
    svc: &TenetService,
    request: &RequestContext,
    user_id: &str,
) -> Result<(), AuthError> {
    let txn = svc.db().begin_write().await?;
    let result: Result<_, AuthError> = async {
        let ctx = require_auth(svc, request).await?;
        remove_member_as(svc, &ctx, user_id).await
    }
    .await;
    txn.finish(result).await
}

/// # Errors
///
/// See [`remove_member`].
pub async fn remove_member_as(
    svc: &TenetService,
    ctx: &VerifiedContext,
    user_id: &str,
) -> Result<(), AuthError> {
    require_role(ctx, Role::MANAGERS)?;
    if user_id == ctx.user_id() {
        return Err(AccessError::forbidden("Cannot remove yourself from the organization").into());
    }

    let Some(target) = svc.find_membership(user_id, ctx.organization_id()).await? else {
        return Err(AccessError::not_found("Member not found in this organization").into());
    };
    if target.role.is_owner() {
        return Err(AccessError::forbidden("Cannot remove the organization owner").into());
    }

    svc.delete_membership(&target.id).await?;
    record(
        svc,
        ctx,
        AuditAction::MemberRemoved,
        EntityType::Member,
        &target.id,
        Some(json!({ "user_id": user_id, "role": target.role })),
    )
    .await?;

    tracing::info!(
        organization_id = ctx.organization_id(),
        user_id,
        "member removed"
    );
    Ok(())
}
