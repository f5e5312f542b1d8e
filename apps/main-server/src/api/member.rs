//! Project member API endpoints.
//!
//! Each handler loads the project fresh, checks the requester may manage
//! members, applies the change to the loaded copy and saves it against the
//! loaded version. A concurrent change to the same project fails the save
//! with a conflict instead of overwriting it.

use api_protocol::{AddMemberRequest, ApiResponse, ChangeRoleRequest, ProjectView};
use axum::{Extension, Json, extract::State};
use task_store::TaskStore;
use uuid::Uuid;

use crate::error::ServerResult;
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::AuthenticatedUser;
use crate::services::access::{load_project, project_view, require, resolve_user_by_email};
use crate::services::activity::{self, EntityKind};
use crate::state::SharedState;

/// Adds a registered user, found by email, to a project.
pub async fn add_member<S: TaskStore>(
    State(state): State<SharedState<S>>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<AddMemberRequest>,
) -> ServerResult<Json<ApiResponse<ProjectView>>> {
    let mut project = load_project(&state.store, id).await?;
    require(
        project.can_manage_members(user.id),
        "Not authorized to add members to this project",
    )?;

    let email = request.normalized_email()?;
    let target = resolve_user_by_email(&state.store, &email).await?;

    project.add_member(&target, request.role)?;
    project.touch();
    let project = state.store.update_project(project).await?;

    activity::record_with(
        "member_added",
        EntityKind::Project,
        project.id,
        user.id,
        &format!("{} as {}", target.id, request.role.as_str()),
    );

    let view = project_view(&state.store, project).await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// Changes a member's role.
pub async fn change_role<S: TaskStore>(
    State(state): State<SharedState<S>>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiPath((id, member_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(request): ApiJson<ChangeRoleRequest>,
) -> ServerResult<Json<ApiResponse<ProjectView>>> {
    let mut project = load_project(&state.store, id).await?;
    require(
        project.can_manage_members(user.id),
        "Not authorized to update member roles in this project",
    )?;

    project.change_role(member_id, request.role)?;
    project.touch();
    let project = state.store.update_project(project).await?;

    activity::record_with(
        "role_changed",
        EntityKind::Project,
        project.id,
        user.id,
        &format!("{} to {}", member_id, request.role.as_str()),
    );

    let view = project_view(&state.store, project).await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// Removes a member from a project.
pub async fn remove_member<S: TaskStore>(
    State(state): State<SharedState<S>>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiPath((id, member_id)): ApiPath<(Uuid, Uuid)>,
) -> ServerResult<Json<ApiResponse<ProjectView>>> {
    let mut project = load_project(&state.store, id).await?;
    require(
        project.can_manage_members(user.id),
        "Not authorized to remove members from this project",
    )?;

    project.remove_member(member_id)?;
    project.touch();
    let project = state.store.update_project(project).await?;

    activity::record_with(
        "member_removed",
        EntityKind::Project,
        project.id,
        user.id,
        &member_id,
    );

    let view = project_view(&state.store, project).await?;
    Ok(Json(ApiResponse::ok(view)))
}
