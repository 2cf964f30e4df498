//! Access error taxonomy shared by every Tenet crate.
//!
//! `AccessError` covers policy failures: the caller is not signed in, has no
//! tenant selected, is not a member, lacks a role, or asked for something that
//! is absent. Infrastructure errors (`DatabaseError`, `ConfigError`) live in
//! their own crates and converge in `tenet-auth::AuthError`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::enums::Role;

/// Stable machine-readable tag for an access failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Unauthorized,
    NoOrganization,
    NotMember,
    Forbidden,
    NotFound,
    NoSession,
    Conflict,
}

impl ErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::NoOrganization => "NO_ORGANIZATION",
            Self::NotMember => "NOT_MEMBER",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::NoSession => "NO_SESSION",
            Self::Conflict => "CONFLICT",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A policy failure surfaced to the caller. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// No authenticated identity could be resolved.
    #[error("Authentication required")]
    Unauthorized,

    /// The session has no active organization.
    #[error("No active organization selected")]
    NoOrganization,

    /// No membership row exists for the user in the organization.
    #[error("User is not a member of this organization")]
    NotMember,

    /// The caller is known and a member, but the action is not allowed.
    ///
    /// `required_roles` is empty for forbidden actions that are not role
    /// checks (cross-tenant access, owner immutability, self-removal).
    #[error("{message}")]
    Forbidden {
        message: String,
        required_roles: Vec<Role>,
        current_role: Option<Role>,
    },

    #[error("{message}")]
    NotFound { message: String },

    /// The user has no session to repoint.
    #[error("No active session found")]
    NoSession,

    /// A uniqueness rule would be violated (duplicate membership or slug).
    #[error("{message}")]
    Conflict { message: String },
}

impl AccessError {
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
            required_roles: Vec::new(),
            current_role: None,
        }
    }

    /// Role gate failure carrying the allow-list and the caller's role.
    #[must_use]
    pub fn insufficient_role(allowed: &[Role], current: Role) -> Self {
        let names: Vec<&str> = allowed.iter().map(|r| r.as_str()).collect();
        Self::Forbidden {
            message: format!("Insufficient permissions. Required roles: {}", names.join(", ")),
            required_roles: allowed.to_vec(),
            current_role: Some(current),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Unauthorized => ErrorCode::Unauthorized,
            Self::NoOrganization => ErrorCode::NoOrganization,
            Self::NotMember => ErrorCode::NotMember,
            Self::Forbidden { .. } => ErrorCode::Forbidden,
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::NoSession => ErrorCode::NoSession,
            Self::Conflict { .. } => ErrorCode::Conflict,
        }
    }

    /// Structured form for transport adapters.
    #[must_use]
    pub fn to_body(&self) -> ErrorBody {
        let (required_roles, current_role) = match self {
            Self::Forbidden {
                required_roles,
                current_role,
                ..
            } if !required_roles.is_empty() => (Some(required_roles.clone()), *current_role),
            _ => (None, None),
        };
        ErrorBody {
            code: self.code(),
            message: self.to_string(),
            required_roles,
            current_role,
        }
    }
}

/// Serializable error payload: code, message, and role diagnostics for
/// role-gate failures.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_roles: Option<Vec<Role>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_role: Option<Role>,
}
