//! Response views returned by domain operations and printed by `tnt`.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{Membership, Organization, Project, Task, User};
use crate::enums::Role;

/// The part of a membership the caller is allowed to see about itself.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct MembershipView {
    pub role: Role,
    pub joined_at: DateTime<Utc>,
}

impl From<&Membership> for MembershipView {
    fn from(membership: &Membership) -> Self {
        Self {
            role: membership.role,
            joined_at: membership.created_at,
        }
    }
}

/// One row of `organizations::list_for_user`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct OrganizationWithRole {
    pub organization: Organization,
    pub membership_role: Role,
    pub joined_at: DateTime<Utc>,
}

/// Public profile fields of a user.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct UserSummary {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
    pub image: Option<String>,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            image: user.image,
        }
    }
}

/// One row of `organizations::get_members`. `user` is `None` when the user
/// row no longer exists.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct MemberWithUser {
    #[serde(flatten)]
    pub membership: Membership,
    pub user: Option<UserSummary>,
}

/// Result of switching the session's active organization.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SwitchOrganizationResponse {
    pub organization: Option<Organization>,
    pub membership: MembershipView,
}

/// Result of `users::get_current_with_org`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CurrentUserWithOrg {
    pub user: User,
    pub organization: Option<Organization>,
    pub membership: Option<MembershipView>,
}

/// Result of `projects::get_with_tasks`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ProjectWithTasks {
    pub project: Project,
    pub tasks: Vec<Task>,
}
