//! Task API endpoints.

use api_protocol::{ApiResponse, CreateTaskRequest, LinkIssueRequest, UpdateTaskRequest};
use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::Utc;
use entities::{Project, Task, ValidationError};
use task_store::{TaskFilter, TaskStore};
use uuid::Uuid;

use crate::error::ServerResult;
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::AuthenticatedUser;
use crate::services::access::{load_project, load_task_with_project, require};
use crate::services::activity::{self, EntityKind};
use crate::state::SharedState;

/// Tasks may only be assigned to members of their project.
fn check_assignee(project: &Project, assignee_id: Option<Uuid>) -> ServerResult<()> {
    match assignee_id {
        Some(id) if !project.is_member(id) => Err(ValidationError::new(
            "assignee_id",
            "Assignee must be a member of the project",
        )
        .into()),
        _ => Ok(()),
    }
}

/// Creates a task in a project.
pub async fn create_task<S: TaskStore>(
    State(state): State<SharedState<S>>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(request): ApiJson<CreateTaskRequest>,
) -> ServerResult<(StatusCode, Json<ApiResponse<Task>>)> {
    let project = load_project(&state.store, request.project_id).await?;
    require(
        project.can_create_or_edit_task(user.id),
        "Not authorized to create tasks for this project",
    )?;

    let task = request.to_task(user.id)?;
    check_assignee(&project, task.assignee_id)?;
    let task = state.store.create_task(task).await?;

    activity::record("created", EntityKind::Task, task.id, user.id);

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(task))))
}

/// Lists the tasks assigned to the requester.
pub async fn my_tasks<S: TaskStore>(
    State(state): State<SharedState<S>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ServerResult<Json<ApiResponse<Vec<Task>>>> {
    let (tasks, _) = state
        .store
        .list_tasks(TaskFilter {
            assignee_id: Some(user.id),
            ..Default::default()
        })
        .await?;

    Ok(Json(ApiResponse::list(tasks)))
}

/// Lists the tasks of a project.
pub async fn project_tasks<S: TaskStore>(
    State(state): State<SharedState<S>>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiPath(project_id): ApiPath<Uuid>,
) -> ServerResult<Json<ApiResponse<Vec<Task>>>> {
    let project = load_project(&state.store, project_id).await?;
    require(
        project.can_read(user.id),
        "Not authorized to view tasks for this project",
    )?;

    let (tasks, _) = state
        .store
        .list_tasks(TaskFilter {
            project_id: Some(project.id),
            ..Default::default()
        })
        .await?;

    Ok(Json(ApiResponse::list(tasks)))
}

/// Gets a task.
pub async fn get_task<S: TaskStore>(
    State(state): State<SharedState<S>>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> ServerResult<Json<ApiResponse<Task>>> {
    let (task, project) = load_task_with_project(&state.store, id).await?;
    require(project.can_read(user.id), "Not authorized to view this task")?;

    Ok(Json(ApiResponse::ok(task)))
}

/// Updates a task. Status changes stamp `completed_at` the first time the
/// task is completed.
pub async fn update_task<S: TaskStore>(
    State(state): State<SharedState<S>>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateTaskRequest>,
) -> ServerResult<Json<ApiResponse<Task>>> {
    let (mut task, project) = load_task_with_project(&state.store, id).await?;
    require(
        project.can_create_or_edit_task(user.id),
        "Not authorized to update this task",
    )?;
    check_assignee(&project, request.new_assignee())?;

    let previous_status = task.status;
    request.apply_to(&mut task, Utc::now())?;
    let task = state.store.update_task(task).await?;

    if task.status != previous_status {
        activity::record_with(
            "status_changed",
            EntityKind::Task,
            task.id,
            user.id,
            &format!("{} -> {}", previous_status.as_str(), task.status.as_str()),
        );
    } else {
        activity::record("updated", EntityKind::Task, task.id, user.id);
    }

    Ok(Json(ApiResponse::ok(task)))
}

/// Deletes a task. Owners may delete any task; others only their own.
pub async fn delete_task<S: TaskStore>(
    State(state): State<SharedState<S>>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> ServerResult<Json<ApiResponse<()>>> {
    let (task, project) = load_task_with_project(&state.store, id).await?;
    require(
        project.can_delete_task(user.id, &task),
        "Not authorized to delete this task",
    )?;

    state.store.delete_task(task.id).await?;

    activity::record("deleted", EntityKind::Task, task.id, user.id);

    Ok(Json(ApiResponse::message("Task deleted")))
}

/// Links a GitHub issue to a task.
pub async fn link_issue<S: TaskStore>(
    State(state): State<SharedState<S>>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<LinkIssueRequest>,
) -> ServerResult<Json<ApiResponse<Task>>> {
    let (mut task, project) = load_task_with_project(&state.store, id).await?;
    require(
        project.can_create_or_edit_task(user.id),
        "Not authorized to update this task",
    )?;

    let issue = request.to_issue()?;
    let number = issue.number;
    task.github_issue = Some(issue);
    task.touch();
    let task = state.store.update_task(task).await?;

    activity::record_with(
        "issue_linked",
        EntityKind::Task,
        task.id,
        user.id,
        &format!("#{}", number),
    );

    Ok(Json(ApiResponse::ok(task)))
}
