//! API endpoints.

pub mod auth;
pub mod member;
pub mod preference;
pub mod project;
pub mod task;

#[cfg(test)]
mod tests;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use task_store::TaskStore;

use crate::middleware::auth_middleware;
use crate::state::SharedState;

/// Creates the API router with all endpoints.
///
/// Everything except registration, login, logout and the health check
/// requires a bearer token.
pub fn create_router<S: TaskStore + 'static>(state: SharedState<S>) -> Router<SharedState<S>> {
    let protected = Router::new()
        // Auth endpoints
        .route("/api/auth/me", get(auth::get_current_user))
        // Project endpoints
        .route(
            "/api/projects",
            get(project::list_projects).post(project::create_project),
        )
        .route(
            "/api/projects/:id",
            get(project::get_project)
                .put(project::update_project)
                .delete(project::delete_project),
        )
        .route("/api/projects/:id/github", post(project::link_repository))
        // Member endpoints
        .route("/api/projects/:id/members", post(member::add_member))
        .route(
            "/api/projects/:id/members/:user_id",
            put(member::change_role).delete(member::remove_member),
        )
        // Task endpoints
        .route("/api/tasks", post(task::create_task))
        .route("/api/tasks/my-tasks", get(task::my_tasks))
        .route("/api/tasks/project/:project_id", get(task::project_tasks))
        .route(
            "/api/tasks/:id",
            get(task::get_task)
                .put(task::update_task)
                .delete(task::delete_task),
        )
        .route("/api/tasks/:id/github-issue", post(task::link_issue))
        // Preference endpoints
        .route(
            "/api/preferences/:email",
            get(preference::get_preference).put(preference::update_preference),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware::<S>));

    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", get(auth::logout))
        .route("/health", get(health_check))
        .merge(protected)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
