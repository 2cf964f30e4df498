//! # tenet-core
//!
//! Core types shared across all Tenet crates.
//!
//! - Entity structs for users, sessions, organizations, memberships,
//!   projects, tasks, and the audit log
//! - Closed enums for roles, statuses, audit actions, and entity types
//! - ID prefix constants
//! - The access error taxonomy (`UNAUTHORIZED`, `NO_ORGANIZATION`, ...)
//! - The request context handed in by the transport layer
//! - Response views returned by domain operations

pub mod entities;
pub mod enums;
pub mod errors;
pub mod identity;
pub mod ids;
pub mod responses;
