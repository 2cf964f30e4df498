//! Roles, statuses, audit actions, and entity types for Tenet.
//!
//! Storage enums use `snake_case` serialization. `AuditAction` serializes as
//! dotted `entity.verb` tags (e.g. `project.created`) because that is the
//! form written to the audit log.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A string did not match any variant of the named enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Implements `Display` via `as_str` and `FromStr` by matching against every
/// variant's `as_str`.
macro_rules! str_enum {
    ($ty:ident, $kind:literal, [$($variant:ident),+ $(,)?]) => {
        impl $ty {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// A member's role within one organization.
///
/// Exactly one membership per organization holds `Owner`, and that role is
/// never changed or removed through the membership mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Owner,
    Admin,
    Member,
}

impl Role {
    /// Roles allowed to manage members, archive projects, and edit the organization.
    pub const MANAGERS: &'static [Self] = &[Self::Owner, Self::Admin];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }

    /// Whether this role appears in `allowed`.
    #[must_use]
    pub fn is_one_of(self, allowed: &[Self]) -> bool {
        allowed.contains(&self)
    }

    #[must_use]
    pub const fn is_owner(self) -> bool {
        matches!(self, Self::Owner)
    }
}

str_enum!(Role, "role", [Owner, Admin, Member]);

// ---------------------------------------------------------------------------
// ProjectStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Active,
    Archived,
}

impl ProjectStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Archived => "archived",
        }
    }
}

str_enum!(ProjectStatus, "project status", [Active, Archived]);

// ---------------------------------------------------------------------------
// TaskStatus
// ---------------------------------------------------------------------------

/// Status of a task. Any status may move to any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Done => "done",
        }
    }
}

str_enum!(TaskStatus, "task status", [Todo, InProgress, Done]);

// ---------------------------------------------------------------------------
// TaskPriority
// ---------------------------------------------------------------------------

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

str_enum!(TaskPriority, "task priority", [Low, Medium, High]);

// ---------------------------------------------------------------------------
// AuditAction
// ---------------------------------------------------------------------------

/// Action recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum AuditAction {
    #[serde(rename = "organization.created")]
    OrganizationCreated,
    #[serde(rename = "organization.updated")]
    OrganizationUpdated,
    #[serde(rename = "member.added")]
    MemberAdded,
    #[serde(rename = "member.role_updated")]
    MemberRoleUpdated,
    #[serde(rename = "member.removed")]
    MemberRemoved,
    #[serde(rename = "project.created")]
    ProjectCreated,
    #[serde(rename = "project.updated")]
    ProjectUpdated,
    #[serde(rename = "project.archived")]
    ProjectArchived,
    #[serde(rename = "project.deleted")]
    ProjectDeleted,
    #[serde(rename = "task.created")]
    TaskCreated,
    #[serde(rename = "task.updated")]
    TaskUpdated,
    #[serde(rename = "task.deleted")]
    TaskDeleted,
}

impl AuditAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OrganizationCreated => "organization.created",
            Self::OrganizationUpdated => "organization.updated",
            Self::MemberAdded => "member.added",
            Self::MemberRoleUpdated => "member.role_updated",
            Self::MemberRemoved => "member.removed",
            Self::ProjectCreated => "project.created",
            Self::ProjectUpdated => "project.updated",
            Self::ProjectArchived => "project.archived",
            Self::ProjectDeleted => "project.deleted",
            Self::TaskCreated => "task.created",
            Self::TaskUpdated => "task.updated",
            Self::TaskDeleted => "task.deleted",
        }
    }

    /// The entity type this action is about.
    #[must_use]
    pub const fn entity_type(self) -> EntityType {
        match self {
            Self::OrganizationCreated | Self::OrganizationUpdated => EntityType::Organization,
            Self::MemberAdded | Self::MemberRoleUpdated | Self::MemberRemoved => {
                EntityType::Member
            }
            Self::ProjectCreated
            | Self::ProjectUpdated
            | Self::ProjectArchived
            | Self::ProjectDeleted => EntityType::Project,
            Self::TaskCreated | Self::TaskUpdated | Self::TaskDeleted => EntityType::Task,
        }
    }
}

str_enum!(
    AuditAction,
    "audit action",
    [
        OrganizationCreated,
        OrganizationUpdated,
        MemberAdded,
        MemberRoleUpdated,
        MemberRemoved,
        ProjectCreated,
        ProjectUpdated,
        ProjectArchived,
        ProjectDeleted,
        TaskCreated,
        TaskUpdated,
        TaskDeleted,
    ]
);

// ---------------------------------------------------------------------------
// EntityType
// ---------------------------------------------------------------------------

/// Type of entity referenced by an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Organization,
    Member,
    Project,
    Task,
}

impl EntityType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Organization => "organization",
            Self::Member => "member",
            Self::Project => "project",
            Self::Task => "task",
        }
    }
}

str_enum!(EntityType, "entity type", [Organization, Member, Project, Task]);

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
