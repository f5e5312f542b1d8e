//! Project API endpoints.

use api_protocol::{
    ApiResponse, CreateProjectRequest, DeleteProjectResponse, LinkRepositoryRequest,
    ProjectDetail, ProjectView, UpdateProjectRequest,
};
use axum::{Extension, Json, extract::State, http::StatusCode};
use task_store::{ProjectFilter, TaskFilter, TaskStore};
use uuid::Uuid;

use crate::error::ServerResult;
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::AuthenticatedUser;
use crate::services::access::{load_project, project_view, project_views, require};
use crate::services::activity::{self, EntityKind};
use crate::state::SharedState;

/// Creates a project owned by the requester.
pub async fn create_project<S: TaskStore>(
    State(state): State<SharedState<S>>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(request): ApiJson<CreateProjectRequest>,
) -> ServerResult<(StatusCode, Json<ApiResponse<ProjectView>>)> {
    let project = request.to_project(user.id)?;
    let project = state.store.create_project(project).await?;

    activity::record("created", EntityKind::Project, project.id, user.id);

    let view = project_view(&state.store, project).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(view))))
}

/// Lists the projects the requester is a member of.
pub async fn list_projects<S: TaskStore>(
    State(state): State<SharedState<S>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ServerResult<Json<ApiResponse<Vec<ProjectView>>>> {
    let (projects, _) = state
        .store
        .list_projects(ProjectFilter {
            member_id: Some(user.id),
            ..Default::default()
        })
        .await?;

    let views = project_views(&state.store, projects).await?;
    Ok(Json(ApiResponse::list(views)))
}

/// Gets a project with its members and tasks.
pub async fn get_project<S: TaskStore>(
    State(state): State<SharedState<S>>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> ServerResult<Json<ApiResponse<ProjectDetail>>> {
    let project = load_project(&state.store, id).await?;
    require(project.can_read(user.id), "Not authorized to access this project")?;

    let (tasks, _) = state
        .store
        .list_tasks(TaskFilter {
            project_id: Some(project.id),
            ..Default::default()
        })
        .await?;

    let project = project_view(&state.store, project).await?;
    Ok(Json(ApiResponse::ok(ProjectDetail { project, tasks })))
}

/// Edits a project's name, description, status or dates.
pub async fn update_project<S: TaskStore>(
    State(state): State<SharedState<S>>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateProjectRequest>,
) -> ServerResult<Json<ApiResponse<ProjectView>>> {
    let mut project = load_project(&state.store, id).await?;
    require(
        project.can_edit_project(user.id),
        "Not authorized to update this project",
    )?;

    request.apply_to(&mut project)?;
    let project = state.store.update_project(project).await?;

    activity::record("updated", EntityKind::Project, project.id, user.id);

    let view = project_view(&state.store, project).await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// Deletes a project and every task in it.
pub async fn delete_project<S: TaskStore>(
    State(state): State<SharedState<S>>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> ServerResult<Json<ApiResponse<DeleteProjectResponse>>> {
    let project = load_project(&state.store, id).await?;
    require(
        project.can_delete_project(user.id),
        "Not authorized to delete this project",
    )?;

    // The store also drops tasks inserted after this count was taken.
    let deleted_tasks = state.store.delete_tasks_by_project(project.id).await?;
    state.store.delete_project(project.id).await?;

    activity::record_with(
        "deleted",
        EntityKind::Project,
        project.id,
        user.id,
        &format!("{} tasks", deleted_tasks),
    );

    Ok(Json(
        ApiResponse::ok(DeleteProjectResponse {
            id: project.id,
            deleted_tasks,
        })
        .with_message("Project deleted"),
    ))
}

/// Links a GitHub repository to a project.
pub async fn link_repository<S: TaskStore>(
    State(state): State<SharedState<S>>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<LinkRepositoryRequest>,
) -> ServerResult<Json<ApiResponse<ProjectView>>> {
    let mut project = load_project(&state.store, id).await?;
    require(
        project.can_edit_project(user.id),
        "Not authorized to connect GitHub repository to this project",
    )?;

    let repo = request.to_repo()?;
    let full_name = repo.full_name.clone();
    project.github_repo = Some(repo);
    project.touch();
    let project = state.store.update_project(project).await?;

    activity::record_with(
        "repository_linked",
        EntityKind::Project,
        project.id,
        user.id,
        &full_name,
    );

    let view = project_view(&state.store, project).await?;
    Ok(Json(ApiResponse::ok(view)))
}
