//! Loading records and gating access to them.
//!
//! Every lifecycle handler follows the same shape: load the project fresh,
//! ask the membership model whether the requester may act, then mutate and
//! save with the loaded version.

use std::collections::HashMap;

use api_protocol::ProjectView;
use entities::{MembershipError, Project, Task, User, UserSummary};
use task_store::TaskStore;
use uuid::Uuid;

use crate::error::{ServerError, ServerResult};

/// Loads a project or fails with `NotFound`.
pub async fn load_project<S: TaskStore>(store: &S, id: Uuid) -> ServerResult<Project> {
    store
        .get_project(id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Project not found".to_string()))
}

/// Loads a task or fails with `NotFound`.
pub async fn load_task<S: TaskStore>(store: &S, id: Uuid) -> ServerResult<Task> {
    store
        .get_task(id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Task not found".to_string()))
}

/// Loads a task together with its parent project.
pub async fn load_task_with_project<S: TaskStore>(
    store: &S,
    task_id: Uuid,
) -> ServerResult<(Task, Project)> {
    let task = load_task(store, task_id).await?;
    let project = load_project(store, task.project_id).await?;
    Ok((task, project))
}

/// Fails with `Forbidden` unless `allowed`.
pub fn require(allowed: bool, message: &str) -> ServerResult<()> {
    if allowed {
        Ok(())
    } else {
        Err(ServerError::Forbidden(message.to_string()))
    }
}

/// Resolves a registered user by (normalized) email.
pub async fn resolve_user_by_email<S: TaskStore>(store: &S, email: &str) -> ServerResult<User> {
    store
        .get_user_by_email(email)
        .await?
        .ok_or_else(|| {
            MembershipError::UserNotFound {
                email: email.to_string(),
            }
            .into()
        })
}

/// Fetches the public fields of every member of the given projects.
async fn member_summaries<S: TaskStore>(
    store: &S,
    projects: &[Project],
) -> ServerResult<HashMap<Uuid, UserSummary>> {
    let mut users = HashMap::new();
    for member in projects.iter().flat_map(|p| p.members.iter()) {
        if users.contains_key(&member.user_id) {
            continue;
        }
        match store.get_user(member.user_id).await? {
            Some(user) => {
                users.insert(user.id, user.summary());
            }
            None => {
                tracing::warn!(user_id = %member.user_id, "Project member has no user record");
            }
        }
    }
    Ok(users)
}

/// Builds the client view of one project.
pub async fn project_view<S: TaskStore>(store: &S, project: Project) -> ServerResult<ProjectView> {
    let users = member_summaries(store, std::slice::from_ref(&project)).await?;
    Ok(ProjectView::from_project(project, |id| users.get(&id).cloned()))
}

/// Builds the client views of several projects.
pub async fn project_views<S: TaskStore>(
    store: &S,
    projects: Vec<Project>,
) -> ServerResult<Vec<ProjectView>> {
    let users = member_summaries(store, &projects).await?;
    Ok(projects
        .into_iter()
        .map(|project| ProjectView::from_project(project, |id| users.get(&id).cloned()))
        .collect())
}
