//! Project repository.

use chrono::Utc;

use tenet_core::entities::Project;
use tenet_core::enums::ProjectStatus;
use tenet_core::ids::PREFIX_PROJECT;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum};
use crate::service::TenetService;
use crate::updates::SetClauses;
use crate::updates::project::ProjectUpdate;

const SELECT_COLS: &str = "id, organization_id, name, description, status, created_by, updated_by, created_at, updated_at";

fn row_to_project(row: &libsql::Row) -> Result<Project, DatabaseError> {
    Ok(Project {
        id: row.get(0)?,
        organization_id: row.get(1)?,
        name: row.get(2)?,
        description: get_opt_string(row, 3)?,
        status: parse_enum(&row.get::<String>(4)?)?,
        created_by: row.get(5)?,
        updated_by: row.get(6)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
        updated_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

impl TenetService {
    pub async fn create_project(
        &self,
        organization_id: &str,
        name: &str,
        description: Option<&str>,
        created_by: &str,
    ) -> Result<Project, DatabaseError> {
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_PROJECT).await?;

        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO projects ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
                ),
                libsql::params![
                    id.as_str(),
                    organization_id,
                    name,
                    description,
                    ProjectStatus::Active.as_str(),
                    created_by,
                    created_by,
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        Ok(Project {
            id,
            organization_id: organization_id.to_string(),
            name: name.to_string(),
            description: description.map(String::from),
            status: ProjectStatus::Active,
            created_by: created_by.to_string(),
            updated_by: created_by.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_project(&self, id: &str) -> Result<Project, DatabaseError> {
        self.find_project(id).await?.ok_or(DatabaseError::NoResult)
    }

    pub async fn find_project(&self, id: &str) -> Result<Option<Project>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM projects WHERE id = ?1"),
                [id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_project(&row)?)),
            None => Ok(None),
        }
    }

    /// Projects of one organization, newest first.
    pub async fn list_projects(
        &self,
        organization_id: &str,
        limit: u32,
    ) -> Result<Vec<Project>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM projects WHERE organization_id = ?1
                     ORDER BY created_at DESC, rowid DESC LIMIT ?2"
                ),
                libsql::params![organization_id, limit],
            )
            .await?;

        let mut projects = Vec::new();
        while let Some(row) = rows.next().await? {
            projects.push(row_to_project(&row)?);
        }
        Ok(projects)
    }

    /// Apply a partial update, stamping `updated_by`/`updated_at`. An empty
    /// update still stamps.
    pub async fn update_project(
        &self,
        id: &str,
        update: &ProjectUpdate,
        updated_by: &str,
    ) -> Result<Project, DatabaseError> {
        let mut clauses = SetClauses::default();
        if let Some(ref name) = update.name {
            clauses.push("name", name.as_str());
        }
        if let Some(ref description) = update.description {
            clauses.push_opt("description", description.clone());
        }
        if let Some(status) = update.status {
            clauses.push("status", status.as_str());
        }

        clauses.push("updated_by", updated_by);
        clauses.push("updated_at", Utc::now().to_rfc3339());

        let (sql, params) = clauses.into_sql("projects", id);
        let changed = self
            .db()
            .conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.get_project(id).await
    }

    /// Delete a project and its tasks. Returns the number of tasks removed.
    pub async fn delete_project(&self, id: &str) -> Result<u64, DatabaseError> {
        let tasks = self
            .db()
            .conn()
            .execute("DELETE FROM tasks WHERE project_id = ?1", [id])
            .await?;
        let changed = self
            .db()
            .conn()
            .execute("DELETE FROM projects WHERE id = ?1", [id])
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::task::NewTask;
    use crate::test_support::helpers::{seed_org, seed_user, test_service};
    use crate::updates::project::ProjectUpdateBuilder;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn create_project_roundtrip() {
        let svc = test_service().await;
        let ada = seed_user(&svc, "ada").await;
        let org = seed_org(&svc, "acme", &ada).await;

        let project = svc
            .create_project(&org.id, "Website", Some("Marketing site"), &ada.id)
            .await
            .unwrap();
        assert!(project.id.starts_with("prj-"));
        assert_eq!(project.status, ProjectStatus::Active);
        assert_eq!(project.updated_by, ada.id);

        let fetched = svc.get_project(&project.id).await.unwrap();
        assert_eq!(fetched, project);
    }

    #[tokio::test]
    async fn list_is_scoped_and_newest_first() {
        let svc = test_service().await;
        let ada = seed_user(&svc, "ada").await;
        let acme = seed_org(&svc, "acme", &ada).await;
        let globex = seed_org(&svc, "globex", &ada).await;

        let first = svc.create_project(&acme.id, "One", None, &ada.id).await.unwrap();
        let second = svc.create_project(&acme.id, "Two", None, &ada.id).await.unwrap();
        svc.create_project(&globex.id, "Other", None, &ada.id).await.unwrap();

        let listed = svc.list_projects(&acme.id, 100).await.unwrap();
        let ids: Vec<_> = listed.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec![second.id.as_str(), first.id.as_str()]);

        assert_eq!(svc.list_projects(&acme.id, 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_project_stamps_editor() {
        let svc = test_service().await;
        let ada = seed_user(&svc, "ada").await;
        let bo = seed_user(&svc, "bo").await;
        let org = seed_org(&svc, "acme", &ada).await;
        let project = svc.create_project(&org.id, "Old", Some("d"), &ada.id).await.unwrap();

        let update = ProjectUpdateBuilder::new()
            .name("New")
            .description(None)
            .status(ProjectStatus::Archived)
            .build();
        let updated = svc.update_project(&project.id, &update, &bo.id).await.unwrap();

        assert_eq!(updated.name, "New");
        assert_eq!(updated.description, None);
        assert_eq!(updated.status, ProjectStatus::Archived);
        assert_eq!(updated.updated_by, bo.id);
        assert_eq!(updated.created_by, ada.id);
        assert!(updated.updated_at >= project.updated_at);
    }

    #[tokio::test]
    async fn empty_update_project_still_stamps() {
        let svc = test_service().await;
        let ada = seed_user(&svc, "ada").await;
        let bo = seed_user(&svc, "bo").await;
        let org = seed_org(&svc, "acme", &ada).await;
        let project = svc.create_project(&org.id, "Site", None, &ada.id).await.unwrap();

        let touched = svc
            .update_project(&project.id, &ProjectUpdate::default(), &bo.id)
            .await
            .unwrap();
        assert_eq!(touched.name, "Site");
        assert_eq!(touched.updated_by, bo.id);
    }

    #[tokio::test]
    async fn delete_project_removes_tasks() {
        let svc = test_service().await;
        let ada = seed_user(&svc, "ada").await;
        let org = seed_org(&svc, "acme", &ada).await;
        let project = svc.create_project(&org.id, "P", None, &ada.id).await.unwrap();
        for title in ["a", "b"] {
            svc.create_task(&org.id, &project.id, &ada.id, &NewTask::titled(title))
                .await
                .unwrap();
        }

        let removed = svc.delete_project(&project.id).await.unwrap();
        assert_eq!(removed, 2);
        assert!(svc.find_project(&project.id).await.unwrap().is_none());
        assert!(svc.list_tasks_for_project(&project.id).await.unwrap().is_empty());
    }
}
