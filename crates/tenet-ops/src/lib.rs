//! # tenet-ops
//!
//! Domain operations built on the tenancy guard. Every organization-scoped
//! operation resolves a [`tenet_auth::VerifiedContext`] first and filters
//! storage by its organization id. Mutations run in one write transaction
//! together with their audit entry.
//!
//! - [`users`]: sign-up, sign-in, sign-out, current user
//! - [`organizations`]: create, list, current, members, update
//! - [`projects`]: CRUD plus archive
//! - [`tasks`]: CRUD scoped through their project

pub mod organizations;
pub mod projects;
pub mod tasks;
pub mod users;

mod test_support;

/// Row cap applied to list operations when the caller gives none.
pub const DEFAULT_LIMIT: u32 = 100;
