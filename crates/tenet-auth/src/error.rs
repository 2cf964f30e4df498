use tenet_core::errors::{AccessError, ErrorCode};
use tenet_db::error::DatabaseError;
use thiserror::Error;

/// Failure of a guarded operation: either a policy decision or storage.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl AuthError {
    /// Stable code for policy failures, `None` for infrastructure failures.
    #[must_use]
    pub const fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Access(err) => Some(err.code()),
            Self::Database(_) => None,
        }
    }

    #[must_use]
    pub const fn access(&self) -> Option<&AccessError> {
        match self {
            Self::Access(err) => Some(err),
            Self::Database(_) => None,
        }
    }
}
