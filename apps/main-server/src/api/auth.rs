//! Authentication API endpoints.

use api_protocol::{ApiResponse, AuthResponse, LoginRequest, RegisterRequest};
use auth::AuthError;
use axum::{Extension, Json, extract::State, http::StatusCode};
use entities::User;
use task_store::TaskStore;

use crate::error::{ServerError, ServerResult};
use crate::extract::ApiJson;
use crate::middleware::AuthenticatedUser;
use crate::state::{AppState, SharedState};

fn auth_response<S: TaskStore>(state: &AppState<S>, user: &User) -> ServerResult<AuthResponse> {
    let token = state
        .jwt_manager
        .generate_token(user.id, user.email.clone(), Some(user.name.clone()))?;

    Ok(AuthResponse {
        token,
        user: user.summary(),
    })
}

/// Registers a new account and signs it in.
pub async fn register<S: TaskStore>(
    State(state): State<SharedState<S>>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> ServerResult<(StatusCode, Json<ApiResponse<AuthResponse>>)> {
    let user = request.to_user()?;

    if state.store.get_user_by_email(&user.email).await?.is_some() {
        return Err(ServerError::InvalidRequest("User already exists".to_string()));
    }

    let hash = state.password_hasher.hash(&request.password)?;
    let user = state.store.create_user(user.with_password_hash(hash)).await?;

    tracing::info!(user_id = %user.id, "User registered");

    let response = auth_response(&state, &user)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(response))))
}

/// Signs in with email and password.
pub async fn login<S: TaskStore>(
    State(state): State<SharedState<S>>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ServerResult<Json<ApiResponse<AuthResponse>>> {
    let email = request.normalized_email()?;

    let user = state
        .store
        .get_user_by_email(&email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    // Accounts created through an external identity provider have no password.
    let hash = user
        .password_hash
        .as_deref()
        .ok_or(AuthError::InvalidCredentials)?;

    if !state.password_hasher.verify(&request.password, hash)? {
        tracing::debug!(user_id = %user.id, "Password mismatch");
        return Err(AuthError::InvalidCredentials.into());
    }

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(ApiResponse::ok(auth_response(&state, &user)?)))
}

/// Gets the current authenticated user.
pub async fn get_current_user<S: TaskStore>(
    State(state): State<SharedState<S>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ServerResult<Json<ApiResponse<User>>> {
    let user = state
        .store
        .get_user(user.id)
        .await?
        .ok_or_else(|| ServerError::NotFound("User not found".to_string()))?;

    Ok(Json(ApiResponse::ok(user)))
}

/// Logs out. Tokens are stateless, so clients simply discard theirs.
pub async fn logout() -> Json<ApiResponse<()>> {
    Json(ApiResponse::message("User logged out successfully"))
}
