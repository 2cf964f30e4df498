//! Identity provider: turns a request context into a user and their current
//! session.

use tenet_core::entities::{Session, User};
use tenet_core::errors::AccessError;
use tenet_core::identity::RequestContext;
use tenet_db::error::DatabaseError;
use tenet_db::service::TenetService;

use crate::error::AuthError;

/// An authenticated caller. `session` is the user's current session (most
/// recently created), if they have one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user: User,
    pub session: Option<Session>,
}

/// Resolve the caller, or `None` when the request is anonymous or names an
/// unknown user.
///
/// # Errors
///
/// Returns `DatabaseError` if a lookup fails.
pub async fn safe_get_auth_user(
    svc: &TenetService,
    request: &RequestContext,
) -> Result<Option<AuthUser>, DatabaseError> {
    let Some(user_id) = request.user_id.as_deref() else {
        return Ok(None);
    };
    let Some(user) = svc.find_user(user_id).await? else {
        return Ok(None);
    };
    let session = svc.find_latest_session(&user.id).await?;
    Ok(Some(AuthUser { user, session }))
}

/// Resolve the caller or fail `UNAUTHORIZED`.
///
/// # Errors
///
/// Returns `AccessError::Unauthorized` for anonymous or unknown callers.
pub async fn get_auth_user(
    svc: &TenetService,
    request: &RequestContext,
) -> Result<AuthUser, AuthError> {
    safe_get_auth_user(svc, request).await?.ok_or_else(|| {
        tracing::debug!("request has no resolvable user");
        AuthError::Access(AccessError::Unauthorized)
    })
}
