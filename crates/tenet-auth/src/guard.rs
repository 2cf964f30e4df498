//! Tenancy guard.
//!
//! Every organization-scoped operation starts here. The guard recomputes the
//! caller's standing on every call: authenticated user, then the active
//! organization of their current session, then a membership point lookup.
//! Nothing is cached between calls.

use chrono::{DateTime, Utc};

use tenet_core::entities::Membership;
use tenet_core::enums::Role;
use tenet_core::errors::AccessError;
use tenet_core::identity::RequestContext;
use tenet_core::responses::MembershipView;
use tenet_db::service::TenetService;

use crate::error::AuthError;
use crate::identity::get_auth_user;

/// Proof that a user is authenticated and a member of the organization they
/// are acting in.
///
/// Only [`require_auth`] constructs one, and only after the membership lookup
/// succeeds. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedContext {
    user_id: String,
    organization_id: String,
    role: Role,
    joined_at: DateTime<Utc>,
}

impl VerifiedContext {
    fn from_membership(membership: &Membership) -> Self {
        Self {
            user_id: membership.user_id.clone(),
            organization_id: membership.organization_id.clone(),
            role: membership.role,
            joined_at: membership.created_at,
        }
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    #[must_use]
    pub fn organization_id(&self) -> &str {
        &self.organization_id
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub const fn joined_at(&self) -> DateTime<Utc> {
        self.joined_at
    }

    #[must_use]
    pub const fn membership_view(&self) -> MembershipView {
        MembershipView {
            role: self.role,
            joined_at: self.joined_at,
        }
    }

    /// Context for a membership that need not exist in storage.
    #[cfg(test)]
    pub(crate) fn unchecked(user_id: &str, organization_id: &str, role: Role) -> Self {
        Self {
            user_id: user_id.to_string(),
            organization_id: organization_id.to_string(),
            role,
            joined_at: Utc::now(),
        }
    }
}

/// Resolve the caller's verified context.
///
/// Fails, in order:
/// 1. `UNAUTHORIZED` when no user resolves from the request.
/// 2. `NO_ORGANIZATION` when the user has no session, or its active
///    organization is unset.
/// 3. `NOT_MEMBER` when no membership exists for the active organization.
///
/// Call it inside a transaction from `begin_read` or `begin_write`, so the
/// lookups cannot see another request's uncommitted writes.
///
/// # Errors
///
/// Returns `AuthError::Access` for the policy failures above and
/// `AuthError::Database` if a lookup fails.
pub async fn require_auth(
    svc: &TenetService,
    request: &RequestContext,
) -> Result<VerifiedContext, AuthError> {
    let auth = get_auth_user(svc, request).await?;

    let Some(organization_id) = auth
        .session
        .as_ref()
        .and_then(|s| s.active_organization_id.as_deref())
    else {
        tracing::debug!(user_id = %auth.user.id, "no active organization");
        return Err(AccessError::NoOrganization.into());
    };

    require_membership(svc, &auth.user.id, organization_id).await
}

/// Context for `user_id` acting in `organization_id`, without consulting the
/// session.
///
/// Used where the organization is named explicitly rather than taken from
/// the session, such as right after creating one.
///
/// # Errors
///
/// Returns `NOT_MEMBER` when no membership exists, or `AuthError::Database`.
pub async fn require_membership(
    svc: &TenetService,
    user_id: &str,
    organization_id: &str,
) -> Result<VerifiedContext, AuthError> {
    let Some(membership) = svc.find_membership(user_id, organization_id).await? else {
        tracing::debug!(user_id, organization_id, "user is not a member of organization");
        return Err(AccessError::NotMember.into());
    };
    Ok(VerifiedContext::from_membership(&membership))
}
