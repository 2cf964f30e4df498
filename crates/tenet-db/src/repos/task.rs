//! Task repository.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tenet_core::entities::Task;
use tenet_core::enums::{TaskPriority, TaskStatus};
use tenet_core::ids::PREFIX_TASK;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum, parse_optional_datetime};
use crate::service::TenetService;
use crate::updates::SetClauses;
use crate::updates::task::TaskUpdate;

const SELECT_COLS: &str = "id, organization_id, project_id, title, description, status, priority, \
     assignee_id, created_by, due_date, created_at, updated_at";

fn row_to_task(row: &libsql::Row) -> Result<Task, DatabaseError> {
    Ok(Task {
        id: row.get(0)?,
        organization_id: row.get(1)?,
        project_id: row.get(2)?,
        title: row.get(3)?,
        description: get_opt_string(row, 4)?,
        status: parse_enum(&row.get::<String>(5)?)?,
        priority: parse_enum(&row.get::<String>(6)?)?,
        assignee_id: get_opt_string(row, 7)?,
        created_by: row.get(8)?,
        due_date: parse_optional_datetime(get_opt_string(row, 9)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(10)?)?,
        updated_at: parse_datetime(&row.get::<String>(11)?)?,
    })
}

/// Fields supplied when creating a task. Status defaults to `todo` and
/// priority to `medium`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub assignee_id: Option<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

impl TenetService {
    pub async fn create_task(
        &self,
        organization_id: &str,
        project_id: &str,
        created_by: &str,
        new: &NewTask,
    ) -> Result<Task, DatabaseError> {
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_TASK).await?;
        let status = new.status.unwrap_or(TaskStatus::Todo);
        let priority = new.priority.unwrap_or_default();

        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO tasks ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
                ),
                libsql::params![
                    id.as_str(),
                    organization_id,
                    project_id,
                    new.title.as_str(),
                    new.description.as_deref(),
                    status.as_str(),
                    priority.as_str(),
                    new.assignee_id.as_deref(),
                    created_by,
                    new.due_date.map(|d| d.to_rfc3339()),
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        Ok(Task {
            id,
            organization_id: organization_id.to_string(),
            project_id: project_id.to_string(),
            title: new.title.clone(),
            description: new.description.clone(),
            status,
            priority,
            assignee_id: new.assignee_id.clone(),
            created_by: created_by.to_string(),
            due_date: new.due_date,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_task(&self, id: &str) -> Result<Task, DatabaseError> {
        self.find_task(id).await?.ok_or(DatabaseError::NoResult)
    }

    pub async fn find_task(&self, id: &str) -> Result<Option<Task>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM tasks WHERE id = ?1"), [id])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_task(&row)?)),
            None => Ok(None),
        }
    }

    /// Tasks of one project, newest first.
    pub async fn list_tasks_for_project(
        &self,
        project_id: &str,
    ) -> Result<Vec<Task>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM tasks WHERE project_id = ?1
                     ORDER BY created_at DESC, rowid DESC"
                ),
                [project_id],
            )
            .await?;
        collect_tasks(&mut rows).await
    }

    /// Tasks assigned to a user inside one organization, newest first.
    pub async fn list_tasks_for_assignee(
        &self,
        organization_id: &str,
        assignee_id: &str,
        limit: u32,
    ) -> Result<Vec<Task>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM tasks WHERE organization_id = ?1 AND assignee_id = ?2
                     ORDER BY created_at DESC, rowid DESC LIMIT ?3"
                ),
                libsql::params![organization_id, assignee_id, limit],
            )
            .await?;
        collect_tasks(&mut rows).await
    }

    /// Apply a partial update. An empty update is a read.
    pub async fn update_task(&self, id: &str, update: &TaskUpdate) -> Result<Task, DatabaseError> {
        let mut clauses = SetClauses::default();
        if let Some(ref title) = update.title {
            clauses.push("title", title.as_str());
        }
        if let Some(ref description) = update.description {
            clauses.push_opt("description", description.clone());
        }
        if let Some(status) = update.status {
            clauses.push("status", status.as_str());
        }
        if let Some(priority) = update.priority {
            clauses.push("priority", priority.as_str());
        }
        if let Some(ref assignee_id) = update.assignee_id {
            clauses.push_opt("assignee_id", assignee_id.clone());
        }
        if let Some(due_date) = update.due_date {
            clauses.push_opt("due_date", due_date.map(|d| d.to_rfc3339()));
        }

        if clauses.is_empty() {
            return self.get_task(id).await;
        }
        clauses.push("updated_at", Utc::now().to_rfc3339());

        let (sql, params) = clauses.into_sql("tasks", id);
        let changed = self
            .db()
            .conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.get_task(id).await
    }

    pub async fn delete_task(&self, id: &str) -> Result<(), DatabaseError> {
        let changed = self
            .db()
            .conn()
            .execute("DELETE FROM tasks WHERE id = ?1", [id])
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        Ok(())
    }
}

async fn collect_tasks(rows: &mut libsql::Rows) -> Result<Vec<Task>, DatabaseError> {
    let mut tasks = Vec::new();
    while let Some(row) = rows.next().await? {
        tasks.push(row_to_task(&row)?);
    }
    Ok(tasks)
}
