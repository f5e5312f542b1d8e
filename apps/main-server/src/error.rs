//! Server error types.

use api_protocol::{ErrorBody, ErrorCode};
use auth::AuthError;
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use entities::{MembershipError, ValidationError};
use task_store::TaskStoreError;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Invalid request body or parameters.
    #[error("{0}")]
    InvalidRequest(String),

    /// A field failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A member list change was rejected.
    #[error(transparent)]
    Membership(#[from] MembershipError),

    /// Missing or invalid credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not allowed.
    #[error("{0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// The record changed since it was loaded.
    #[error("{0}")]
    Conflict(String),

    /// Storage error.
    #[error("Database error: {0}")]
    Database(TaskStoreError),

    /// Authentication error.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl From<TaskStoreError> for ServerError {
    fn from(e: TaskStoreError) -> Self {
        match e {
            TaskStoreError::NotFound { entity_type, .. } => {
                ServerError::NotFound(format!("{} not found", entity_type))
            }
            TaskStoreError::AlreadyExists { entity_type, .. } => {
                ServerError::InvalidRequest(format!("{} already exists", entity_type))
            }
            TaskStoreError::Conflict { entity_type, .. } => ServerError::Conflict(format!(
                "{} was modified by another request, please retry",
                entity_type
            )),
            other => ServerError::Database(other),
        }
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ServerError {
    fn from(_: PathRejection) -> Self {
        ServerError::NotFound("Resource not found".to_string())
    }
}

impl ServerError {
    /// Returns the wire error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            ServerError::InvalidRequest(_) | ServerError::Validation(_) => ErrorCode::ValidationError,
            ServerError::Membership(e) => match e {
                MembershipError::AlreadyMember { .. } => ErrorCode::AlreadyMember,
                MembershipError::UserNotFound { .. } => ErrorCode::UserNotFound,
                MembershipError::NotAMember { .. } => ErrorCode::NotAMember,
                MembershipError::LastOwnerViolation { .. } => ErrorCode::LastOwnerViolation,
            },
            ServerError::Unauthorized(_) => ErrorCode::Unauthorized,
            ServerError::Forbidden(_) => ErrorCode::Forbidden,
            ServerError::NotFound(_) => ErrorCode::NotFound,
            ServerError::Conflict(_) => ErrorCode::Conflict,
            ServerError::Auth(e) => match e {
                AuthError::TokenExpired
                | AuthError::InvalidToken
                | AuthError::InvalidCredentials
                | AuthError::JwtValidation(_) => ErrorCode::Unauthorized,
                _ => ErrorCode::InternalError,
            },
            ServerError::Database(_) => ErrorCode::InternalError,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let code = self.code();
        let status =
            StatusCode::from_u16(code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = if code == ErrorCode::InternalError {
            tracing::error!(error = %self, "Request failed");
            "Server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorBody::new(code, message))).into_response()
    }
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use entities::OwnerChange;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_membership_codes() {
        let err = ServerError::from(MembershipError::LastOwnerViolation {
            user_id: Uuid::new_v4(),
            change: OwnerChange::Removal,
        });
        assert_eq!(err.code(), ErrorCode::LastOwnerViolation);
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        let err = ServerError::from(MembershipError::NotAMember {
            user_id: Uuid::new_v4(),
        });
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_store_conflict_maps_to_409() {
        let err = ServerError::from(TaskStoreError::conflict("Project", "p1", 1, 2));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);

        let err = ServerError::from(TaskStoreError::not_found("Task", "t1"));
        assert_eq!(err.to_string(), "Task not found");
    }

    #[test]
    fn test_storage_faults_are_internal() {
        let err = ServerError::from(TaskStoreError::Other("disk full".to_string()));
        assert_eq!(err.code(), ErrorCode::InternalError);
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_bad_credentials_are_unauthorized() {
        let err = ServerError::from(AuthError::InvalidCredentials);
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }
}
