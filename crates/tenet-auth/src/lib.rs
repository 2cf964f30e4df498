//! # tenet-auth
//!
//! Tenancy and authorization for Tenet.
//!
//! - [`guard::require_auth`] resolves a request to a [`VerifiedContext`]
//!   (authenticated user + membership in the session's active organization)
//! - [`gate::require_role`] checks a context against a role allow-list
//! - [`audit::record`] appends audit entries inside the caller's transaction
//! - [`switch::switch_organization`] repoints the caller's session
//! - [`membership`] adds, re-roles, and removes members

pub mod audit;
pub mod error;
pub mod gate;
pub mod guard;
pub mod identity;
pub mod membership;
pub mod switch;

pub use error::AuthError;
pub use gate::require_role;
pub use guard::{VerifiedContext, require_auth, require_membership};
pub use identity::{AuthUser, get_auth_user, safe_get_auth_user};
pub use switch::switch_organization;
