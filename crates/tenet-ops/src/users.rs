//! Users and sessions from the caller's side.
//!
//! `sign_up`, `sign_in`, and `sign_out` stand in for the identity provider's
//! own flows. The two `get_current*` reads never fail on a missing identity.

use tenet_auth::identity::{get_auth_user, safe_get_auth_user};
use tenet_auth::AuthError;
use tenet_core::entities::{Session, User};
use tenet_core::errors::AccessError;
use tenet_core::identity::RequestContext;
use tenet_core::responses::{CurrentUserWithOrg, MembershipView};
use tenet_db::error::DatabaseError;
use tenet_db::service::TenetService;

/// Register a user.
///
/// # Errors
///
/// Returns `CONFLICT` when the email is taken, or `AuthError::Database`.
pub async fn sign_up(
    svc: &TenetService,
    email: &str,
    name: Option<&str>,
    image: Option<&str>,
) -> Result<User, AuthError> {
    let txn = svc.db().begin_write().await?;
    let result: Result<_, AuthError> = async {
        if svc.find_user_by_email(email).await?.is_some() {
            return Err(AccessError::conflict("A user with this email already exists").into());
        }
        Ok(svc.create_user(email, name, image).await?)
    }
    .await;
    let user = txn.finish(result).await?;
    tracing::info!(user_id = %user.id, "user signed up");
    Ok(user)
}

/// Open a new session for `user_id`. The session starts with no active
/// organization and becomes the user's current session.
///
/// # Errors
///
/// Returns `NOT_FOUND` for an unknown user, or `AuthError::Database`.
pub async fn sign_in(svc: &TenetService, user_id: &str) -> Result<Session, AuthError> {
    let txn = svc.db().begin_write().await?;
    let result: Result<_, AuthError> = async {
        if svc.find_user(user_id).await?.is_none() {
            return Err(AccessError::not_found("User not found").into());
        }
        Ok(svc.create_session(user_id).await?)
    }
    .await;
    let session = txn.finish(result).await?;
    tracing::info!(user_id, session_id = %session.id, "signed in");
    Ok(session)
}

/// Delete the caller's current session and return it.
///
/// An older session, if any, becomes current afterwards.
///
/// # Errors
///
/// Returns `UNAUTHORIZED`, `NO_SESSION`, or `AuthError::Database`.
pub async fn sign_out(svc: &TenetService, request: &RequestContext) -> Result<Session, AuthError> {
    let txn = svc.db().begin_write().await?;
    let result: Result<_, AuthError> = async {
        let auth = get_auth_user(svc, request).await?;
        let Some(session) = auth.session else {
            return Err(AccessError::NoSession.into());
        };
        svc.delete_session(&session.id).await?;
        Ok(session)
    }
    .await;
    let session = txn.finish(result).await?;
    tracing::info!(user_id = %session.user_id, session_id = %session.id, "signed out");
    Ok(session)
}

/// The signed-in user, or `None`.
///
/// # Errors
///
/// Returns `DatabaseError` if a lookup fails.
pub async fn get_current(
    svc: &TenetService,
    request: &RequestContext,
) -> Result<Option<User>, DatabaseError> {
    let txn = svc.db().begin_read().await?;
    let result = safe_get_auth_user(svc, request).await;
    Ok(txn.finish(result).await?.map(|auth| auth.user))
}

/// The signed-in user with their active organization and membership.
///
/// `organization` and `membership` are `None` when no organization is active.
/// Either may also be `None` on its own when the row has gone away.
///
/// # Errors
///
/// Returns `DatabaseError` if a lookup fails.
pub async fn get_current_with_org(
    svc: &TenetService,
    request: &RequestContext,
) -> Result<Option<CurrentUserWithOrg>, DatabaseError> {
    let txn = svc.db().begin_read().await?;
    let result = current_with_org(svc, request).await;
    txn.finish(result).await
}

async fn current_with_org(
    svc: &TenetService,
    request: &RequestContext,
) -> Result<Option<CurrentUserWithOrg>, DatabaseError> {
    let Some(auth) = safe_get_auth_user(svc, request).await? else {
        return Ok(None);
    };
    let Some(organization_id) = auth
        .session
        .as_ref()
        .and_then(|s| s.active_organization_id.clone())
    else {
        return Ok(Some(CurrentUserWithOrg {
            user: auth.user,
            organization: None,
            membership: None,
        }));
    };

    let organization = svc.find_organization(&organization_id).await?;
    let membership = svc
        .find_membership(&auth.user.id, &organization_id)
        .await?
        .as_ref()
        .map(MembershipView::from);
    Ok(Some(CurrentUserWithOrg {
        user: auth.user,
        organization,
        membership,
    }))
}
