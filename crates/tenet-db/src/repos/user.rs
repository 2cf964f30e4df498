//! User repository. Users are owned by the identity provider; the core only
//! creates them at sign-up and reads them afterwards.

use chrono::Utc;

use tenet_core::entities::User;
use tenet_core::ids::PREFIX_USER;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime};
use crate::service::TenetService;

const SELECT_COLS: &str = "id, email, name, image, created_at";

pub(crate) fn row_to_user(row: &libsql::Row) -> Result<User, DatabaseError> {
    row_to_user_at(row, 0)
}

/// Parse a user whose columns start at `offset` (for joined queries).
pub(crate) fn row_to_user_at(row: &libsql::Row, offset: i32) -> Result<User, DatabaseError> {
    Ok(User {
        id: row.get(offset)?,
        email: row.get(offset + 1)?,
        name: get_opt_string(row, offset + 2)?,
        image: get_opt_string(row, offset + 3)?,
        created_at: parse_datetime(&row.get::<String>(offset + 4)?)?,
    })
}

impl TenetService {
    pub async fn create_user(
        &self,
        email: &str,
        name: Option<&str>,
        image: Option<&str>,
    ) -> Result<User, DatabaseError> {
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_USER).await?;

        self.db()
            .conn()
            .execute(
                &format!("INSERT INTO users ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
                libsql::params![id.as_str(), email, name, image, now.to_rfc3339()],
            )
            .await?;

        Ok(User {
            id,
            email: email.to_string(),
            name: name.map(String::from),
            image: image.map(String::from),
            created_at: now,
        })
    }

    pub async fn get_user(&self, id: &str) -> Result<User, DatabaseError> {
        self.find_user(id).await?.ok_or(DatabaseError::NoResult)
    }

    pub async fn find_user(&self, id: &str) -> Result<Option<User>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM users WHERE id = ?1"), [id])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM users WHERE email = ?1"),
                [email],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_user(&row)?)),
            None => Ok(None),
        }
    }
}
