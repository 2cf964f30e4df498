//! Organization switch.
//!
//! Repoints the caller's current session at another organization they belong
//! to. Identity resolution, the membership check, session lookup, and patch
//! run in one write transaction, so concurrent switches by the same user serialize and the
//! last commit wins. Switching is not audited.

use tenet_core::errors::AccessError;
use tenet_core::identity::RequestContext;
use tenet_core::responses::{MembershipView, SwitchOrganizationResponse};
use tenet_db::service::TenetService;

use crate::error::AuthError;
use crate::identity::get_auth_user;

/// Make `organization_id` the active organization of the caller's session.
///
/// Does not require an active organization beforehand.
///
/// # Errors
///
/// - `UNAUTHORIZED` when no user resolves from the request.
/// - `NOT_MEMBER` when the caller has no membership in the target.
/// - `NO_SESSION` when the caller has no session to repoint.
pub async fn switch_organization(
    svc: &TenetService,
    request: &RequestContext,
    organization_id: &str,
) -> Result<SwitchOrganizationResponse, AuthError> {
    let txn = svc.db().begin_write().await?;
    let result: Result<_, AuthError> = async {
        let user_id = get_auth_user(svc, request).await?.user.id;
        let Some(membership) = svc.find_membership(&user_id, organization_id).await? else {
            tracing::debug!(%user_id, organization_id, "switch denied: not a member");
            return Err(AccessError::NotMember.into());
        };
        let Some(session) = svc.find_latest_session(&user_id).await? else {
            return Err(AccessError::NoSession.into());
        };
        svc.set_active_organization(&session.id, Some(organization_id))
            .await?;
        let organization = svc.find_organization(organization_id).await?;
        Ok(SwitchOrganizationResponse {
            organization,
            membership: MembershipView::from(&membership),
        })
    }
    .await;
    let response = txn.finish(result).await?;

    tracing::info!(user_id = ?request.user_id, organization_id, "switched active organization");
    Ok(response)
}
