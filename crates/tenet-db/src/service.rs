//! Service layer that all repository methods hang off.
//!
//! `TenetService` wraps `TenetDb`. Repo modules add methods through
//! `impl TenetService` blocks; none of them open transactions themselves.
//! Callers that need atomicity wrap a sequence of repo calls in
//! [`TenetDb::begin_write`] and [`crate::WriteTxn::finish`].

use crate::TenetDb;
use crate::error::DatabaseError;

pub struct TenetService {
    db: TenetDb,
}

impl TenetService {
    /// Create a service over a local database file, or `":memory:"`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str) -> Result<Self, DatabaseError> {
        let db = TenetDb::open_local(db_path).await?;
        Ok(Self { db })
    }

    /// Create from an existing `TenetDb`.
    #[must_use]
    pub const fn from_db(db: TenetDb) -> Self {
        Self { db }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &TenetDb {
        &self.db
    }
}
