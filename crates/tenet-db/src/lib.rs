//! # tenet-db
//!
//! libSQL storage for Tenet: users and sessions (the identity provider's
//! tables), organizations, memberships, projects, tasks, and the audit log.
//!
//! All repository methods hang off [`service::TenetService`]. Writes that
//! must be atomic run inside a [`WriteTxn`] obtained from
//! [`TenetDb::begin_write`], which serializes writers on an async gate and
//! opens a `BEGIN IMMEDIATE` transaction on the shared connection. Reads
//! that make access decisions run inside a [`ReadTxn`] from
//! [`TenetDb::begin_read`], which takes the same gate, so they never observe
//! another request's uncommitted writes.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod service;
mod test_support;
pub mod updates;

use error::DatabaseError;
use libsql::{Builder, TransactionBehavior};
use tokio::sync::{Mutex, MutexGuard};

/// Central database handle.
///
/// Holds one connection. SQLite transactions belong to the connection, so any
/// statement issued through [`TenetDb::conn`] while a [`WriteTxn`] is open
/// runs inside that transaction. Every request therefore holds the gate for
/// its whole lifetime, through either [`TenetDb::begin_write`] or
/// [`TenetDb::begin_read`].
pub struct TenetDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
    gate: Mutex<()>,
}

impl TenetDb {
    /// Open a local database at the given path, or `":memory:"`.
    ///
    /// Runs migrations automatically on open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Foreign keys are per-connection in SQLite.
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let tenet_db = Self {
            db,
            conn,
            gate: Mutex::new(()),
        };
        tenet_db.run_migrations().await?;
        tracing::debug!(path, "database opened");
        Ok(tenet_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Generate a prefixed ID via libSQL. Returns e.g. `"org-3fa9c01b77d2e845"`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT '{prefix}-' || lower(hex(randomblob(8)))"),
                (),
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<String>(0)?)
    }

    /// Acquire the write gate and open an immediate transaction.
    ///
    /// Must not be called again while the returned [`WriteTxn`] is alive on
    /// the same task: the gate is not reentrant.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if `BEGIN IMMEDIATE` fails.
    pub async fn begin_write(&self) -> Result<WriteTxn<'_>, DatabaseError> {
        let guard = self.gate.lock().await;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .await?;
        Ok(WriteTxn { tx, _guard: guard })
    }

    /// Acquire the gate and open a deferred transaction for reads.
    ///
    /// Waits for any open [`WriteTxn`] to finish, so every read inside sees
    /// committed state only. Same reentrancy rule as
    /// [`TenetDb::begin_write`].
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if `BEGIN` fails.
    pub async fn begin_read(&self) -> Result<ReadTxn<'_>, DatabaseError> {
        let guard = self.gate.lock().await;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Deferred)
            .await?;
        Ok(ReadTxn { tx, _guard: guard })
    }
}

/// An open read transaction holding the gate.
pub struct ReadTxn<'a> {
    tx: libsql::Transaction,
    _guard: MutexGuard<'a, ()>,
}

impl ReadTxn<'_> {
    /// End the transaction and hand `result` back.
    ///
    /// Nothing was written, so ending it only releases the snapshot. A failed
    /// `COMMIT` after a failed read is logged and the read's error wins.
    ///
    /// # Errors
    ///
    /// Returns the error inside `result`, or the failure to end the
    /// transaction converted into `E`.
    pub async fn finish<T, E>(self, result: Result<T, E>) -> Result<T, E>
    where
        E: From<DatabaseError>,
    {
        let ended = self.tx.commit().await.map_err(DatabaseError::from);
        match (result, ended) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(err)) => Err(err.into()),
            (Err(err), ended) => {
                if let Err(end_err) = ended {
                    tracing::warn!(error = %end_err, "ending read transaction failed");
                }
                Err(err)
            }
        }
    }
}

/// An open write transaction holding the write gate.
///
/// Finish it with [`WriteTxn::finish`], [`WriteTxn::commit`], or
/// [`WriteTxn::rollback`]. The gate is released when the value is dropped.
pub struct WriteTxn<'a> {
    tx: libsql::Transaction,
    _guard: MutexGuard<'a, ()>,
}

impl WriteTxn<'_> {
    /// # Errors
    ///
    /// Returns `DatabaseError` if `COMMIT` fails.
    pub async fn commit(self) -> Result<(), DatabaseError> {
        self.tx.commit().await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if `ROLLBACK` fails.
    pub async fn rollback(self) -> Result<(), DatabaseError> {
        self.tx.rollback().await?;
        Ok(())
    }

    /// Commit when `result` is `Ok`, roll back when it is `Err`, and hand
    /// `result` back.
    ///
    /// A failed rollback is logged and the error from `result` is returned.
    ///
    /// # Errors
    ///
    /// Returns the error inside `result`, or the commit failure converted
    /// into `E`.
    pub async fn finish<T, E>(self, result: Result<T, E>) -> Result<T, E>
    where
        E: From<DatabaseError>,
    {
        match result {
            Ok(value) => {
                self.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.rollback().await {
                    tracing::warn!(error = %rollback_err, "rollback failed");
                }
                Err(err)
            }
        }
    }
}
