//! API error codes.

use serde::{Deserialize, Serialize};

/// Machine readable error code carried by every failed response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Malformed or out-of-range input.
    ValidationError,
    /// Target user is already on the project.
    AlreadyMember,
    /// The change would leave a project without an owner.
    LastOwnerViolation,
    /// Missing or invalid credentials.
    Unauthorized,
    /// Authenticated but not allowed.
    Forbidden,
    /// The requested resource does not exist.
    NotFound,
    /// No user is registered under the given email.
    UserNotFound,
    /// Target user is not on the project.
    NotAMember,
    /// The project changed since it was loaded.
    Conflict,
    /// Storage or other server fault.
    InternalError,
}

impl ErrorCode {
    /// HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ValidationError | Self::AlreadyMember | Self::LastOwnerViolation => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound | Self::UserNotFound | Self::NotAMember => 404,
            Self::Conflict => 409,
            Self::InternalError => 500,
        }
    }

    /// Wire name of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "validation_error",
            Self::AlreadyMember => "already_member",
            Self::LastOwnerViolation => "last_owner_violation",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::UserNotFound => "user_not_found",
            Self::NotAMember => "not_a_member",
            Self::Conflict => "conflict",
            Self::InternalError => "internal_error",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of every failed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Always false.
    pub success: bool,
    /// Error code.
    pub code: ErrorCode,
    /// Human readable message.
    pub message: String,
}

impl ErrorBody {
    /// Creates an error body.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            code,
            message: message.into(),
        }
    }
}
