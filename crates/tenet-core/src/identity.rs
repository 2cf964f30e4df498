use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// What the transport layer knows about the caller of one operation.
///
/// Produced by whatever authenticates the request (cookie, bearer token, CLI
/// `--user` flag) and consumed by `tenet-auth`. Contains only data fields; the
/// user id is not trusted until the identity provider resolves it to a row.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct RequestContext {
    /// Authenticated user id. `None` = anonymous request.
    pub user_id: Option<String>,
}

impl RequestContext {
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }
}
