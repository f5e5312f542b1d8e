//! Response bodies.

use chrono::{DateTime, Utc};
use entities::{GithubRepo, MemberRole, Project, ProjectStatus, Task, UserSummary};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope wrapping every successful response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Number of items, set on list responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Wraps a payload.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            count: None,
            message: None,
        }
    }

    /// Attaches a message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// Wraps a list and records its length.
    pub fn list(items: Vec<T>) -> Self {
        let count = items.len();
        Self {
            count: Some(count),
            ..Self::ok(items)
        }
    }
}

impl ApiResponse<()> {
    /// A payload-free response carrying only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            count: None,
            message: Some(message.into()),
        }
    }
}

/// Returned by register and login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserSummary,
}

/// A member entry joined with the user's public fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDetail {
    #[serde(flatten)]
    pub user: UserSummary,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
}

/// A project as returned to clients, with member details resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectView {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    /// First owner in member order.
    pub owner: Option<UserSummary>,
    pub members: Vec<MemberDetail>,
    pub github_repo: Option<GithubRepo>,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectView {
    /// Resolves member ids through `lookup`. Members whose user record is
    /// missing are left out.
    pub fn from_project<F>(project: Project, lookup: F) -> Self
    where
        F: Fn(Uuid) -> Option<UserSummary>,
    {
        let owner = project.primary_owner().and_then(&lookup);
        let members = project
            .members
            .iter()
            .filter_map(|m| {
                lookup(m.user_id).map(|user| MemberDetail {
                    user,
                    role: m.role,
                    joined_at: m.joined_at,
                })
            })
            .collect();

        Self {
            id: project.id,
            name: project.name,
            description: project.description,
            status: project.status,
            start_date: project.start_date,
            end_date: project.end_date,
            owner,
            members,
            github_repo: project.github_repo,
            version: project.version,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

/// A project with its tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: ProjectView,
    pub tasks: Vec<Task>,
}

/// Returned by project deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteProjectResponse {
    pub id: Uuid,
    pub deleted_tasks: u64,
}
