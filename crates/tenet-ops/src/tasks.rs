//! Tasks, reached through a project of the caller's organization.

use serde_json::json;

use tenet_auth::audit::record;
use tenet_auth::{AuthError, VerifiedContext, require_auth};
use tenet_core::entities::Task;
use tenet_core::enums::{AuditAction, EntityType};
use tenet_core::errors::AccessError;
use tenet_core::identity::RequestContext;
use tenet_db::repos::task::NewTask;
use tenet_db::service::TenetService;
use tenet_db::updates::task::TaskUpdate;

use crate::DEFAULT_LIMIT;
use crate::projects::owned_project;

async fn owned_task(
    svc: &TenetService,
    ctx: &VerifiedContext,
    task_id: &str,
) -> Result<Task, AuthError> {
    let Some(task) = svc.find_task(task_id).await? else {
        return Err(AccessError::not_found("Task not found").into());
    };
    if task.organization_id != ctx.organization_id() {
        return Err(AccessError::forbidden("Task does not belong to your organization").into());
    }
    Ok(task)
}

/// Assignees must be members of the organization the task lives in.
async fn check_assignee(
    svc: &TenetService,
    ctx: &VerifiedContext,
    assignee_id: &str,
) -> Result<(), AuthError> {
    if svc
        .find_membership(assignee_id, ctx.organization_id())
        .await?
        .is_none()
    {
        tracing::debug!(assignee_id, "assignee is not a member");
        return Err(AccessError::NotMember.into());
    }
    Ok(())
}

/// Create a task in one of the organization's projects.
///
/// # Errors
///
/// Guard failures, `NOT_FOUND` / `FORBIDDEN` for the project, `NOT_MEMBER`
/// when the assignee does not belong to the organization, or
/// `AuthError::Database`.
pub async fn create(
    svc: &TenetService,
    request: &RequestContext,
    project_id: &str,
    new: &NewTask,
) -> Result<Task, AuthError> {
    let txn = svc.db().begin_write().await?;
    let result: Result<_, AuthError> = async {
        let ctx = require_auth(svc, request).await?;
        let project = owned_project(svc, &ctx, project_id).await?;
        if let Some(ref assignee_id) = new.assignee_id {
            check_assignee(svc, &ctx, assignee_id).await?;
        }

        let task = svc
            .create_task(ctx.organization_id(), &project.id, ctx.user_id(), new)
            .await?;
        record(
            svc,
            &ctx,
            AuditAction::TaskCreated,
            EntityType::Task,
            &task.id,
            Some(json!({ "project_id": project.id, "title": task.title })),
        )
        .await?;
        Ok(task)
    }
    .await;
    txn.finish(result).await
}

/// Tasks of one project, newest first.
///
/// # Errors
///
/// Guard failures, `NOT_FOUND` / `FORBIDDEN` for the project, or
/// `AuthError::Database`.
pub async fn list_for_project(
    svc: &TenetService,
    request: &RequestContext,
    project_id: &str,
) -> Result<Vec<Task>, AuthError> {
    let txn = svc.db().begin_read().await?;
    let result: Result<_, AuthError> = async {
        let ctx = require_auth(svc, request).await?;
        let project = owned_project(svc, &ctx, project_id).await?;
        Ok(svc.list_tasks_for_project(&project.id).await?)
    }
    .await;
    txn.finish(result).await
}

/// Tasks assigned to `assignee_id` in the active organization, defaulting to
/// the caller.
///
/// # Errors
///
/// Guard failures or `AuthError::Database`.
pub async fn list_assigned(
    svc: &TenetService,
    request: &RequestContext,
    assignee_id: Option<&str>,
    limit: Option<u32>,
) -> Result<Vec<Task>, AuthError> {
    let txn = svc.db().begin_read().await?;
    let result: Result<_, AuthError> = async {
        let ctx = require_auth(svc, request).await?;
        let assignee_id = assignee_id.unwrap_or_else(|| ctx.user_id());
        Ok(svc
            .list_tasks_for_assignee(
                ctx.organization_id(),
                assignee_id,
                limit.unwrap_or(DEFAULT_LIMIT),
            )
            .await?)
    }
    .await;
    txn.finish(result).await
}

/// # Errors
///
/// Guard failures, `NOT_FOUND`, `FORBIDDEN` for another organization's task,
/// or `AuthError::Database`.
pub async fn get(
    svc: &TenetService,
    request: &RequestContext,
    task_id: &str,
) -> Result<Task, AuthError> {
    let txn = svc.db().begin_read().await?;
    let result: Result<_, AuthError> = async {
        let ctx = require_auth(svc, request).await?;
        owned_task(svc, &ctx, task_id).await
    }
    .await;
    txn.finish(result).await
}

/// Apply a partial update. Any status may move to any other. An empty patch
/// returns the task unchanged and records nothing.
///
/// # Errors
///
/// Guard failures, `NOT_FOUND` / `FORBIDDEN` for the task, `NOT_MEMBER` for
/// a new assignee outside the organization, or `AuthError::Database`.
pub async fn update(
    svc: &TenetService,
    request: &RequestContext,
    task_id: &str,
    patch: &TaskUpdate,
) -> Result<Task, AuthError> {
    let txn = svc.db().begin_write().await?;
    let result: Result<_, AuthError> = async {
        let ctx = require_auth(svc, request).await?;
        let task = owned_task(svc, &ctx, task_id).await?;
        if let Some(Some(ref assignee_id)) = patch.assignee_id {
            check_assignee(svc, &ctx, assignee_id).await?;
        }
        if patch.is_empty() {
            return Ok(task);
        }

        let updated = svc.update_task(task_id, patch).await?;
        record(
            svc,
            &ctx,
            AuditAction::TaskUpdated,
            EntityType::Task,
            task_id,
            Some(json!({ "changes": patch })),
        )
        .await?;
        Ok(updated)
    }
    .await;
    txn.finish(result).await
}

/// Delete a task. Any member of the organization may.
///
/// # Errors
///
/// Guard failures, `NOT_FOUND` / `FORBIDDEN` for the task, or
/// `AuthError::Database`.
pub async fn remove(
    svc: &TenetService,
    request: &RequestContext,
    task_id: &str,
) -> Result<(), AuthError> {
    let txn = svc.db().begin_write().await?;
    let result: Result<_, AuthError> = async {
        let ctx = require_auth(svc, request).await?;
        let task = owned_task(svc, &ctx, task_id).await?;
        svc.delete_task(task_id).await?;
        record(
            svc,
            &ctx,
            AuditAction::TaskDeleted,
            EntityType::Task,
            task_id,
            Some(json!({ "project_id": task.project_id, "title": task.title })),
        )
        .await?;
        Ok(())
    }
    .await;
    txn.finish(result).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projects;
    use crate::test_support::helpers::{join, req, seed_active_org, seed_user, test_service};
    use pretty_assertions::assert_eq;
    use tenet_core::enums::{Role, TaskPriority, TaskStatus};
    use tenet_core::errors::ErrorCode;
    use tenet_db::repos::audit::AuditFilter;
    use tenet_db::updates::task::TaskUpdateBuilder;

    #[tokio::test]
    async fn create_defaults_and_audits() {
        let svc = test_service().await;
        let ada = seed_user(&svc, "ada").await;
        let org = seed_active_org(&svc, "acme", &ada).await;
        let project = projects::create(&svc, &req(&ada), "Site", None).await.unwrap();

        let task = create(&svc, &req(&ada), &project.id, &NewTask::titled("Ship"))
            .await
            .unwrap();
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.organization_id, org.id);
        assert_eq!(task.created_by, ada.id);

        let entries = svc
            .query_audit(
                &org.id,
                &AuditFilter {
                    entity_id: Some(task.id.clone()),
                    ..AuditFilter::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, AuditAction::TaskCreated);
    }

    #[tokio::test]
    async fn assignee_must_be_member() {
        let svc = test_service().await;
        let ada = seed_user(&svc, "ada").await;
        let outsider = seed_user(&svc, "outsider").await;
        seed_active_org(&svc, "acme", &ada).await;
        let project = projects::create(&svc, &req(&ada), "Site", None).await.unwrap();

        let new = NewTask {
            assignee_id: Some(outsider.id.clone()),
            ..NewTask::titled("Ship")
        };
        let err = create(&svc, &req(&ada), &project.id, &new).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::NotMember));
        assert!(svc.list_tasks_for_project(&project.id).await.unwrap().is_empty());

        let task = create(&svc, &req(&ada), &project.id, &NewTask::titled("Ship"))
            .await
            .unwrap();
        let reassign = TaskUpdateBuilder::new()
            .assignee_id(Some(outsider.id.clone()))
            .build();
        let err = update(&svc, &req(&ada), &task.id, &reassign).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::NotMember));
    }

    #[tokio::test]
    async fn task_in_foreign_project_is_forbidden() {
        let svc = test_service().await;
        let ada = seed_user(&svc, "ada").await;
        let bo = seed_user(&svc, "bo").await;
        seed_active_org(&svc, "acme", &ada).await;
        seed_active_org(&svc, "globex", &bo).await;
        let theirs = projects::create(&svc, &req(&bo), "Secret", None).await.unwrap();
        let task = create(&svc, &req(&bo), &theirs.id, &NewTask::titled("x"))
            .await
            .unwrap();

        let err = create(&svc, &req(&ada), &theirs.id, &NewTask::titled("y"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::Forbidden));

        let err = get(&svc, &req(&ada), &task.id).await.unwrap_err();
        assert_eq!(err.to_string(), "Task does not belong to your organization");
        let err = remove(&svc, &req(&ada), &task.id).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::Forbidden));
        assert!(svc.find_task(&task.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn list_assigned_defaults_to_caller() {
        let svc = test_service().await;
        let ada = seed_user(&svc, "ada").await;
        let bo = seed_user(&svc, "bo").await;
        let org = seed_active_org(&svc, "acme", &ada).await;
        join(&svc, &bo, &org, Role::Member).await;
        let project = projects::create(&svc, &req(&ada), "Site", None).await.unwrap();

        for (title, assignee) in [("mine", &ada), ("theirs", &bo)] {
            let new = NewTask {
                assignee_id: Some(assignee.id.clone()),
                ..NewTask::titled(title)
            };
            create(&svc, &req(&ada), &project.id, &new).await.unwrap();
        }

        let mine = list_assigned(&svc, &req(&ada), None, None).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].title, "mine");

        let theirs = list_assigned(&svc, &req(&ada), Some(&bo.id), None)
            .await
            .unwrap();
        assert_eq!(theirs[0].title, "theirs");
    }

    #[tokio::test]
    async fn update_moves_status_freely() {
        let svc = test_service().await;
        let ada = seed_user(&svc, "ada").await;
        let org = seed_active_org(&svc, "acme", &ada).await;
        let project = projects::create(&svc, &req(&ada), "Site", None).await.unwrap();
        let task = create(&svc, &req(&ada), &project.id, &NewTask::titled("Ship"))
            .await
            .unwrap();

        for status in [TaskStatus::Done, TaskStatus::Todo, TaskStatus::InProgress] {
            let patch = TaskUpdateBuilder::new().status(status).build();
            let updated = update(&svc, &req(&ada), &task.id, &patch).await.unwrap();
            assert_eq!(updated.status, status);
        }

        let same = update(&svc, &req(&ada), &task.id, &TaskUpdate::default())
            .await
            .unwrap();
        assert_eq!(same.status, TaskStatus::InProgress);
        // created + three updates; the empty patch records nothing.
        assert_eq!(svc.count_audit(&org.id).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn remove_deletes_and_audits() {
        let svc = test_service().await;
        let ada = seed_user(&svc, "ada").await;
        let org = seed_active_org(&svc, "acme", &ada).await;
        let project = projects::create(&svc, &req(&ada), "Site", None).await.unwrap();
        let task = create(&svc, &req(&ada), &project.id, &NewTask::titled("Ship"))
            .await
            .unwrap();

        remove(&svc, &req(&ada), &task.id).await.unwrap();
        let err = get(&svc, &req(&ada), &task.id).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::NotFound));

        let entries = svc
            .query_audit(
                &org.id,
                &AuditFilter {
                    action: Some(AuditAction::TaskDeleted),
                    ..AuditFilter::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(entries[0].entity_id, task.id);
    }
}
