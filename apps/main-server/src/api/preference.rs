//! User preference API endpoints.

use api_protocol::{ApiResponse, UpdatePreferenceRequest};
use axum::{Extension, Json, extract::State};
use entities::UserPreference;
use task_store::TaskStore;

use crate::error::{ServerError, ServerResult};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::AuthenticatedUser;
use crate::services::access::{require, resolve_user_by_email};
use crate::state::SharedState;

/// Gets the preference stored for an email.
pub async fn get_preference<S: TaskStore>(
    State(state): State<SharedState<S>>,
    ApiPath(email): ApiPath<String>,
) -> ServerResult<Json<ApiResponse<UserPreference>>> {
    let email = email.trim().to_lowercase();

    let preference = state
        .store
        .get_preference(&email)
        .await?
        .ok_or_else(|| ServerError::NotFound("Preference not found".to_string()))?;

    Ok(Json(ApiResponse::ok(preference)))
}

/// Creates or replaces the requester's own preference.
pub async fn update_preference<S: TaskStore>(
    State(state): State<SharedState<S>>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiPath(email): ApiPath<String>,
    ApiJson(request): ApiJson<UpdatePreferenceRequest>,
) -> ServerResult<Json<ApiResponse<UserPreference>>> {
    let email = email.trim().to_lowercase();

    let owner = resolve_user_by_email(&state.store, &email).await?;
    require(
        owner.id == user.id,
        "Not authorized to update preferences for this user",
    )?;

    let preference = state
        .store
        .upsert_preference(UserPreference::new(email, request.theme))
        .await?;

    tracing::debug!(user_id = %user.id, theme = preference.theme.as_str(), "Preference saved");

    Ok(Json(ApiResponse::ok(preference)))
}
