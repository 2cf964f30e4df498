//! Repository modules implementing storage operations for all Tenet entities.
//!
//! Each module adds methods to `TenetService` via `impl TenetService` blocks.
//! Repos never check permissions; that is `tenet-auth`'s job.

pub mod audit;
pub mod membership;
pub mod organization;
pub mod project;
pub mod session;
pub mod task;
pub mod user;
