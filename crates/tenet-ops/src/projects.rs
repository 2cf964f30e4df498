//! Projects of the caller's active organization.
//!
//! Reads and writes by id check that the project belongs to the caller's
//! organization. A project in another organization is reported as
//! `FORBIDDEN`, not hidden.

use serde_json::json;

use tenet_auth::audit::record;
use tenet_auth::{AuthError, VerifiedContext, require_auth, require_role};
use tenet_core::entities::Project;
use tenet_core::enums::{AuditAction, EntityType, ProjectStatus, Role};
use tenet_core::errors::AccessError;
use tenet_core::identity::RequestContext;
use tenet_core::responses::ProjectWithTasks;
use tenet_db::service::TenetService;
use tenet_db::updates::project::{ProjectUpdate, ProjectUpdateBuilder};

use crate::DEFAULT_LIMIT;

/// Load a project and check it belongs to the context's organization.
pub(crate) async fn owned_project(
    svc: &TenetService,
    ctx: &VerifiedContext,
    project_id: &str,
) -> Result<Project, AuthError> {
    let Some(project) = svc.find_project(project_id).await? else {
        return Err(AccessError::not_found("Project not found").into());
    };
    if project.organization_id != ctx.organization_id() {
        return Err(AccessError::forbidden("Project does not belong to your organization").into());
    }
    Ok(project)
}

/// Projects of the active organization, newest first.
///
/// # Errors
///
/// Guard failures or `AuthError::Database`.
pub async fn list(
    svc: &TenetService,
    request: &RequestContext,
    limit: Option<u32>,
) -> Result<Vec<Project>, AuthError> {
    let txn = svc.db().begin_read().await?;
    let result: Result<_, AuthError> = async {
        let ctx = require_auth(svc, request).await?;
        Ok(svc
            .list_projects(ctx.organization_id(), limit.unwrap_or(DEFAULT_LIMIT))
            .await?)
    }
    .await;
    txn.finish(result).await
}

/// # Errors
///
/// Guard failures, `NOT_FOUND`, or `FORBIDDEN` for another organization's
/// project.
pub async fn get(
    svc: &TenetService,
    request: &RequestContext,
    project_id: &str,
) -> Result<Project, AuthError> {
    let txn = svc.db().begin_read().await?;
    let result: Result<_, AuthError> = async {
        let ctx = require_auth(svc, request).await?;
        owned_project(svc, &ctx, project_id).await
    }
    .await;
    txn.finish(result).await
}

/// A project with all of its tasks, newest first.
///
/// # Errors
///
/// Same as [`get`].
pub async fn get_with_tasks(
    svc: &TenetService,
    request: &RequestContext,
    project_id: &str,
) -> Result<ProjectWithTasks, AuthError> {
    let txn = svc.db().begin_read().await?;
    let result: Result<_, AuthError> = async {
        let ctx = require_auth(svc, request).await?;
        let project = owned_project(svc, &ctx, project_id).await?;
        let tasks = svc.list_tasks_for_project(&project.id).await?;
        Ok(ProjectWithTasks { project, tasks })
    }
    .await;
    txn.finish(result).await
}

/// Create an active project in the caller's organization. Any member may.
///
/// # Errors
///
/// Guard failures or `AuthError::Database`.
pub async fn create(
    svc: &TenetService,
    request: &RequestContext,
    name: &str,
    description: Option<&str>,
) -> Result<Project, AuthError> {
    let txn = svc.db().begin_write().await?;
    let result: Result<_, AuthError> = async {
        let ctx = require_auth(svc, request).await?;
        let project = svc
            .create_project(ctx.organization_id(), name, description, ctx.user_id())
            .await?;
        record(
            svc,
            &ctx,
            AuditAction::ProjectCreated,
            EntityType::Project,
            &project.id,
            Some(json!({ "name": name })),
        )
        .await?;
        Ok(project)
    }
    .await;
    txn.finish(result).await
}

/// Apply a partial update.
///
/// Setting the status to archived needs the owner or admin role, checked
/// after the ownership check. Every call stamps the editor and records
/// `project.updated`, even with an empty patch.
///
/// # Errors
///
/// Guard failures, `NOT_FOUND`, `FORBIDDEN` for another organization's
/// project or a member archiving, or `AuthError::Database`.
pub async fn update(
    svc: &TenetService,
    request: &RequestContext,
    project_id: &str,
    patch: &ProjectUpdate,
) -> Result<Project, AuthError> {
    let txn = svc.db().begin_write().await?;
    let result: Result<_, AuthError> = async {
        let ctx = require_auth(svc, request).await?;
        let project = owned_project(svc, &ctx, project_id).await?;
        if patch.status == Some(ProjectStatus::Archived) {
            require_role(&ctx, Role::MANAGERS)?;
        }
        let updated = svc
            .update_project(project_id, patch, ctx.user_id())
            .await?;
        record(
            svc,
            &ctx,
            AuditAction::ProjectUpdated,
            EntityType::Project,
            project_id,
            Some(json!({ "changes": patch })),
        )
        .await?;
        Ok(updated)
    }
    .await;
    txn.finish(result).await
}

/// Archive a project. Owners and admins only; the role is checked before
/// the project is looked up.
///
/// # Errors
///
/// Guard and gate failures, `NOT_FOUND`, `FORBIDDEN` for another
/// organization's project, or `AuthError::Database`.
pub async fn archive(
    svc: &TenetService,
    request: &RequestContext,
    project_id: &str,
) -> Result<Project, AuthError> {
    let txn = svc.db().begin_write().await?;
    let result: Result<_, AuthError> = async {
        let ctx = require_auth(svc, request).await?;
        require_role(&ctx, Role::MANAGERS)?;
        let project = owned_project(svc, &ctx, project_id).await?;

        let patch = ProjectUpdateBuilder::new()
            .status(ProjectStatus::Archived)
            .build();
        let archived = svc
            .update_project(project_id, &patch, ctx.user_id())
            .await?;
        record(
            svc,
            &ctx,
            AuditAction::ProjectArchived,
            EntityType::Project,
            project_id,
            Some(json!({ "previous_status": project.status })),
        )
        .await?;
        Ok(archived)
    }
    .await;
    txn.finish(result).await
}

/// Delete a project and its tasks. Owners and admins only.
///
/// # Errors
///
/// Guard and gate failures, `NOT_FOUND`, `FORBIDDEN` for another
/// organization's project, or `AuthError::Database`.
pub async fn remove(
    svc: &TenetService,
    request: &RequestContext,
    project_id: &str,
) -> Result<(), AuthError> {
    let txn = svc.db().begin_write().await?;
    let result: Result<_, AuthError> = async {
        let ctx = require_auth(svc, request).await?;
        require_role(&ctx, Role::MANAGERS)?;
        let project = owned_project(svc, &ctx, project_id).await?;

        let tasks_deleted = svc.delete_project(project_id).await?;
        record(
            svc,
            &ctx,
            AuditAction::ProjectDeleted,
            EntityType::Project,
            project_id,
            Some(json!({ "name": project.name, "tasks_deleted": tasks_deleted })),
        )
        .await?;
        tracing::info!(project_id, tasks_deleted, "project removed");
        Ok(())
    }
    .await;
    txn.finish(result).await
}
