//! Session repository.
//!
//! A user may hold several sessions. The "current" one is the most recently
//! created: `created_at` descending, ties broken by insertion order. Both
//! the tenancy guard and the organization switch resolve it the same way.

use chrono::Utc;

use tenet_core::entities::Session;
use tenet_core::ids::PREFIX_SESSION;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime};
use crate::service::TenetService;

const SELECT_COLS: &str = "id, user_id, active_organization_id, created_at";

fn row_to_session(row: &libsql::Row) -> Result<Session, DatabaseError> {
    Ok(Session {
        id: row.get(0)?,
        user_id: row.get(1)?,
        active_organization_id: get_opt_string(row, 2)?,
        created_at: parse_datetime(&row.get::<String>(3)?)?,
    })
}

impl TenetService {
    /// Start a session with no active organization.
    pub async fn create_session(&self, user_id: &str) -> Result<Session, DatabaseError> {
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_SESSION).await?;

        self.db()
            .conn()
            .execute(
                &format!("INSERT INTO sessions ({SELECT_COLS}) VALUES (?1, ?2, NULL, ?3)"),
                libsql::params![id.as_str(), user_id, now.to_rfc3339()],
            )
            .await?;

        Ok(Session {
            id,
            user_id: user_id.to_string(),
            active_organization_id: None,
            created_at: now,
        })
    }

    pub async fn get_session(&self, id: &str) -> Result<Session, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM sessions WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_session(&row)
    }

    /// The user's current session, if any.
    pub async fn find_latest_session(
        &self,
        user_id: &str,
    ) -> Result<Option<Session>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM sessions WHERE user_id = ?1
                     ORDER BY created_at DESC, rowid DESC LIMIT 1"
                ),
                [user_id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_session(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn list_sessions_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<Session>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM sessions WHERE user_id = ?1
                     ORDER BY created_at DESC, rowid DESC"
                ),
                [user_id],
            )
            .await?;
        let mut sessions = Vec::new();
        while let Some(row) = rows.next().await? {
            sessions.push(row_to_session(&row)?);
        }
        Ok(sessions)
    }

    /// Repoint a session at an organization, or clear it with `None`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the session does not exist.
    pub async fn set_active_organization(
        &self,
        session_id: &str,
        organization_id: Option<&str>,
    ) -> Result<(), DatabaseError> {
        let changed = self
            .db()
            .conn()
            .execute(
                "UPDATE sessions SET active_organization_id = ?1 WHERE id = ?2",
                libsql::params![organization_id, session_id],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        Ok(())
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<(), DatabaseError> {
        let changed = self
            .db()
            .conn()
            .execute("DELETE FROM sessions WHERE id = ?1", [session_id])
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        Ok(())
    }
}
