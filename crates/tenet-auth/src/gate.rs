//! Role gate: a pure check of a verified context against an allow-list.

use tenet_core::enums::Role;
use tenet_core::errors::AccessError;

use crate::guard::VerifiedContext;

/// Fail `FORBIDDEN` unless the context's role is in `allowed`.
///
/// The error carries the allow-list and the caller's role.
///
/// # Errors
///
/// Returns `AccessError::Forbidden` when the role is not allowed.
pub fn require_role(ctx: &VerifiedContext, allowed: &[Role]) -> Result<(), AccessError> {
    if ctx.role().is_one_of(allowed) {
        return Ok(());
    }
    tracing::debug!(
        user_id = ctx.user_id(),
        organization_id = ctx.organization_id(),
        role = %ctx.role(),
        "role gate denied"
    );
    Err(AccessError::insufficient_role(allowed, ctx.role()))
}
