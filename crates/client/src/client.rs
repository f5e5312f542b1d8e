//! HTTP client for the TaskFlow server.

use api_protocol::{
    AddMemberRequest, ApiResponse, AuthResponse, ChangeRoleRequest, CreateProjectRequest,
    CreateTaskRequest, DeleteProjectResponse, ErrorBody, ErrorCode, LinkIssueRequest,
    LinkRepositoryRequest, LoginRequest, ProjectDetail, ProjectView, RegisterRequest,
    UpdatePreferenceRequest, UpdateProjectRequest, UpdateTaskRequest,
};
use entities::{MemberRole, Task, Theme, User, UserPreference};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::Session;

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("API error ({status} {code}): {message}")]
    Api {
        status: u16,
        code: ErrorCode,
        message: String,
    },

    #[error("Not signed in")]
    NotAuthenticated,
}

impl ClientError {
    /// The API error code, if the server answered with one.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Decodes a response body into the success envelope or an API error.
fn decode<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<ApiResponse<T>, ClientError> {
    if !status.is_success() {
        return Err(match serde_json::from_slice::<ErrorBody>(body) {
            Ok(error) => ClientError::Api {
                status: status.as_u16(),
                code: error.code,
                message: error.message,
            },
            Err(_) => ClientError::ServerError(format!("Server returned status {}", status)),
        });
    }

    serde_json::from_slice(body).map_err(|e| ClientError::Deserialization(e.to_string()))
}

/// Path of the preference resource for `email`, which may contain
/// characters that are not valid in a path segment.
fn preference_path(email: &str) -> String {
    format!("/api/preferences/{}", urlencoding::encode(email))
}

fn into_data<T>(response: ApiResponse<T>) -> Result<T, ClientError> {
    response
        .data
        .ok_or_else(|| ClientError::Deserialization("Response missing data".to_string()))
}

/// Client for the TaskFlow REST API.
///
/// Holds only the connection pool; authentication comes from the
/// [`Session`] passed to each call.
#[derive(Debug, Clone, Default)]
pub struct TaskFlowClient {
    http_client: reqwest::Client,
}

impl TaskFlowClient {
    /// Creates a new client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing reqwest client.
    pub fn with_http_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }

    fn request(&self, session: &Session, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http_client.request(method, session.url(path));
        match session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn authed(&self, session: &Session, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        if !session.is_authenticated() {
            return Err(ClientError::NotAuthenticated);
        }
        Ok(self.request(session, method, path))
    }

    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<ApiResponse<T>, ClientError> {
        let response = builder
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        debug!(status = %status, "Received response");
        decode(status, &body)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        session: &Session,
        method: Method,
        path: &str,
    ) -> Result<T, ClientError> {
        let builder = self.authed(session, method, path)?;
        into_data(self.execute(builder).await?)
    }

    async fn call_with<B: Serialize, T: DeserializeOwned>(
        &self,
        session: &Session,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let builder = self.authed(session, method, path)?.json(body);
        into_data(self.execute(builder).await?)
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Registers an account and signs the session in.
    pub async fn register(
        &self,
        session: &mut Session,
        request: &RegisterRequest,
    ) -> Result<User, ClientError> {
        let builder = self
            .request(session, Method::POST, "/api/auth/register")
            .json(request);
        let auth: AuthResponse = into_data(self.execute(builder).await?)?;
        session.sign_in(auth);
        self.me(session).await
    }

    /// Signs the session in.
    pub async fn login(&self, session: &mut Session, email: &str, password: &str) -> Result<(), ClientError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let builder = self
            .request(session, Method::POST, "/api/auth/login")
            .json(&request);
        let auth: AuthResponse = into_data(self.execute(builder).await?)?;
        session.sign_in(auth);
        Ok(())
    }

    /// Signs the session out.
    pub async fn logout(&self, session: &mut Session) -> Result<(), ClientError> {
        let builder = self.request(session, Method::GET, "/api/auth/logout");
        self.execute::<()>(builder).await?;
        session.sign_out();
        Ok(())
    }

    /// Gets the signed-in user.
    pub async fn me(&self, session: &Session) -> Result<User, ClientError> {
        self.call(session, Method::GET, "/api/auth/me").await
    }

    // =========================================================================
    // Projects
    // =========================================================================

    /// Lists the projects the user belongs to.
    pub async fn list_projects(&self, session: &Session) -> Result<Vec<ProjectView>, ClientError> {
        self.call(session, Method::GET, "/api/projects").await
    }

    /// Creates a project owned by the user.
    pub async fn create_project(
        &self,
        session: &Session,
        request: &CreateProjectRequest,
    ) -> Result<ProjectView, ClientError> {
        self.call_with(session, Method::POST, "/api/projects", request)
            .await
    }

    /// Gets a project with its members and tasks.
    pub async fn get_project(&self, session: &Session, id: Uuid) -> Result<ProjectDetail, ClientError> {
        self.call(session, Method::GET, &format!("/api/projects/{}", id))
            .await
    }

    /// Edits a project.
    pub async fn update_project(
        &self,
        session: &Session,
        id: Uuid,
        request: &UpdateProjectRequest,
    ) -> Result<ProjectView, ClientError> {
        self.call_with(session, Method::PUT, &format!("/api/projects/{}", id), request)
            .await
    }

    /// Deletes a project and its tasks.
    pub async fn delete_project(
        &self,
        session: &Session,
        id: Uuid,
    ) -> Result<DeleteProjectResponse, ClientError> {
        self.call(session, Method::DELETE, &format!("/api/projects/{}", id))
            .await
    }

    /// Links a GitHub repository to a project.
    pub async fn link_repository(
        &self,
        session: &Session,
        id: Uuid,
        request: &LinkRepositoryRequest,
    ) -> Result<ProjectView, ClientError> {
        self.call_with(
            session,
            Method::POST,
            &format!("/api/projects/{}/github", id),
            request,
        )
        .await
    }

    // =========================================================================
    // Members
    // =========================================================================

    /// Adds a registered user to a project by email.
    pub async fn add_member(
        &self,
        session: &Session,
        project_id: Uuid,
        email: &str,
        role: MemberRole,
    ) -> Result<ProjectView, ClientError> {
        let request = AddMemberRequest {
            email: email.to_string(),
            role,
        };
        self.call_with(
            session,
            Method::POST,
            &format!("/api/projects/{}/members", project_id),
            &request,
        )
        .await
    }

    /// Changes a member's role.
    pub async fn change_role(
        &self,
        session: &Session,
        project_id: Uuid,
        user_id: Uuid,
        role: MemberRole,
    ) -> Result<ProjectView, ClientError> {
        self.call_with(
            session,
            Method::PUT,
            &format!("/api/projects/{}/members/{}", project_id, user_id),
            &ChangeRoleRequest { role },
        )
        .await
    }

    /// Removes a member from a project.
    pub async fn remove_member(
        &self,
        session: &Session,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<ProjectView, ClientError> {
        self.call(
            session,
            Method::DELETE,
            &format!("/api/projects/{}/members/{}", project_id, user_id),
        )
        .await
    }

    // =========================================================================
    // Tasks
    // =========================================================================

    /// Creates a task.
    pub async fn create_task(&self, session: &Session, request: &CreateTaskRequest) -> Result<Task, ClientError> {
        self.call_with(session, Method::POST, "/api/tasks", request)
            .await
    }

    /// Lists the tasks assigned to the user.
    pub async fn my_tasks(&self, session: &Session) -> Result<Vec<Task>, ClientError> {
        self.call(session, Method::GET, "/api/tasks/my-tasks").await
    }

    /// Lists the tasks of a project.
    pub async fn project_tasks(&self, session: &Session, project_id: Uuid) -> Result<Vec<Task>, ClientError> {
        self.call(
            session,
            Method::GET,
            &format!("/api/tasks/project/{}", project_id),
        )
        .await
    }

    /// Gets a task.
    pub async fn get_task(&self, session: &Session, id: Uuid) -> Result<Task, ClientError> {
        self.call(session, Method::GET, &format!("/api/tasks/{}", id))
            .await
    }

    /// Updates a task.
    pub async fn update_task(
        &self,
        session: &Session,
        id: Uuid,
        request: &UpdateTaskRequest,
    ) -> Result<Task, ClientError> {
        self.call_with(session, Method::PUT, &format!("/api/tasks/{}", id), request)
            .await
    }

    /// Deletes a task.
    pub async fn delete_task(&self, session: &Session, id: Uuid) -> Result<(), ClientError> {
        let builder = self.authed(session, Method::DELETE, &format!("/api/tasks/{}", id))?;
        self.execute::<()>(builder).await?;
        Ok(())
    }

    /// Links a GitHub issue to a task.
    pub async fn link_issue(
        &self,
        session: &Session,
        id: Uuid,
        request: &LinkIssueRequest,
    ) -> Result<Task, ClientError> {
        self.call_with(
            session,
            Method::POST,
            &format!("/api/tasks/{}/github-issue", id),
            request,
        )
        .await
    }

    // =========================================================================
    // Preferences
    // =========================================================================

    /// Gets the preference stored on the server for an email.
    pub async fn get_preference(&self, session: &Session, email: &str) -> Result<UserPreference, ClientError> {
        self.call(session, Method::GET, &preference_path(email))
            .await
    }

    /// Saves the signed-in user's theme on the server.
    pub async fn update_preference(
        &self,
        session: &Session,
        email: &str,
        theme: Theme,
    ) -> Result<UserPreference, ClientError> {
        self.call_with(
            session,
            Method::PUT,
            &preference_path(email),
            &UpdatePreferenceRequest { theme },
        )
        .await
    }

    /// Check server health.
    pub async fn health_check(&self, session: &Session) -> Result<(), ClientError> {
        let response = self
            .http_client
            .get(session.url("/health"))
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ClientError::ServerError(format!(
                "Health check failed with status {}",
                response.status()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_decode_success() {
        let body = json!({ "success": true, "data": [1, 2], "count": 2 }).to_string();
        let response: ApiResponse<Vec<u32>> = decode(StatusCode::OK, body.as_bytes()).unwrap();
        assert_eq!(response.count, Some(2));
        assert_eq!(into_data(response).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_decode_api_error() {
        let body = json!({
            "success": false,
            "code": "last_owner_violation",
            "message": "Cannot remove the last owner from the project"
        })
        .to_string();

        let err = decode::<()>(StatusCode::BAD_REQUEST, body.as_bytes()).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::LastOwnerViolation));
        assert!(matches!(err, ClientError::Api { status: 400, .. }));
    }

    #[test]
    fn test_decode_non_json_error() {
        let err = decode::<()>(StatusCode::BAD_GATEWAY, b"<html>").unwrap_err();
        assert!(matches!(err, ClientError::ServerError(_)));
        assert_eq!(err.code(), None);
    }

    #[test]
    fn test_preference_path_encodes_email() {
        assert_eq!(
            preference_path("ada+tasks@example.com"),
            "/api/preferences/ada%2Btasks%40example.com"
        );
        assert_eq!(
            preference_path("a/b?c@example.com"),
            "/api/preferences/a%2Fb%3Fc%40example.com"
        );
    }

    #[test]
    fn test_missing_data() {
        let response: ApiResponse<u32> = ApiResponse {
            success: true,
            data: None,
            count: None,
            message: None,
        };
        assert!(matches!(into_data(response), Err(ClientError::Deserialization(_))));
    }

    #[tokio::test]
    async fn test_signed_out_session_is_rejected_locally() {
        let client = TaskFlowClient::new();
        let session = Session::new("http://127.0.0.1:9");

        let result = client.list_projects(&session).await;
        assert!(matches!(result, Err(ClientError::NotAuthenticated)));
    }
}
