//! ID prefix constants.
//!
//! Every row ID is `{prefix}-{16 hex chars}`, generated in SQL by
//! `TenetDb::generate_id`.

pub const PREFIX_USER: &str = "usr";
pub const PREFIX_SESSION: &str = "ses";
pub const PREFIX_ORGANIZATION: &str = "org";
pub const PREFIX_MEMBERSHIP: &str = "mem";
pub const PREFIX_PROJECT: &str = "prj";
pub const PREFIX_TASK: &str = "tsk";
pub const PREFIX_AUDIT: &str = "aud";

/// All prefixes, for exhaustive tests.
pub const ALL_PREFIXES: &[&str] = &[
    PREFIX_USER,
    PREFIX_SESSION,
    PREFIX_ORGANIZATION,
    PREFIX_MEMBERSHIP,
    PREFIX_PROJECT,
    PREFIX_TASK,
    PREFIX_AUDIT,
];

/// Check whether `id` carries the given prefix.
#[must_use]
pub fn has_prefix(id: &str, prefix: &str) -> bool {
    id.strip_prefix(prefix)
        .is_some_and(|rest| rest.starts_with('-') && rest.len() > 1)
}
