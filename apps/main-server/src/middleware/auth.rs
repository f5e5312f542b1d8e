//! Authentication middleware.

use auth::Claims;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use entities::User;
use task_store::TaskStore;
use uuid::Uuid;

use crate::error::ServerError;
use crate::state::SharedState;

/// Authenticated user information.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// User ID.
    pub id: Uuid,
    /// User email.
    pub email: String,
    /// User display name.
    pub name: String,
}

impl From<&User> for AuthenticatedUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
}

/// Extracts the JWT token from the Authorization header.
fn extract_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

fn not_authorized() -> Response {
    ServerError::Unauthorized("Not authorized to access this route".to_string()).into_response()
}

/// Authentication middleware.
///
/// Validates the bearer token, loads the user it names and stores an
/// [`AuthenticatedUser`] in the request extensions. Tokens of deleted users
/// are rejected.
pub async fn auth_middleware<S: TaskStore + 'static>(
    State(state): State<SharedState<S>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_token(&request) else {
        return not_authorized();
    };

    let user_id = match state
        .jwt_manager
        .validate_token(token)
        .and_then(|claims: Claims| claims.user_id())
    {
        Ok(id) => id,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected access token");
            return not_authorized();
        }
    };

    let user = match state.store.get_user(user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => return not_authorized(),
        Err(e) => return ServerError::from(e).into_response(),
    };

    request
        .extensions_mut()
        .insert(AuthenticatedUser::from(&user));

    next.run(request).await
}
