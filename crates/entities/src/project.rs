//! Project-related entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a Project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    /// Not started yet.
    #[default]
    Planning,
    /// Work is underway.
    InProgress,
    /// Finished.
    Completed,
    /// Paused.
    OnHold,
}

impl ProjectStatus {
    /// Converts the status to its wire/storage string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::OnHold => "on-hold",
        }
    }

    /// Parses a status from its wire/storage string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "planning" => Some(Self::Planning),
            "in-progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "on-hold" => Some(Self::OnHold),
            _ => None,
        }
    }
}

/// Role a user holds within a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    /// Full control, including membership management.
    Owner,
    /// May create and edit tasks.
    #[default]
    Member,
    /// Read-only access.
    Viewer,
}

impl MemberRole {
    /// Converts the role to its wire/storage string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Member => "member",
            Self::Viewer => "viewer",
        }
    }

    /// Parses a role from its wire/storage string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "owner" => Some(Self::Owner),
            "member" => Some(Self::Member),
            "viewer" => Some(Self::Viewer),
            _ => None,
        }
    }
}

/// An entry of a project's member list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMember {
    /// Member user ID.
    pub user_id: Uuid,
    /// Role within the project.
    pub role: MemberRole,
    /// When the user joined.
    pub joined_at: DateTime<Utc>,
}

impl ProjectMember {
    /// Creates a member entry joining now.
    pub fn new(user_id: Uuid, role: MemberRole) -> Self {
        Self {
            user_id,
            role,
            joined_at: Utc::now(),
        }
    }
}

/// GitHub repository linked to a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubRepo {
    /// Repository owner login.
    pub owner: String,
    /// Repository name.
    pub name: String,
    /// `owner/name`.
    pub full_name: String,
    /// Web URL.
    pub url: String,
}

/// A project and its team.
///
/// The member list is the only record of who owns the project: the creator
/// is seeded as its first member with [`MemberRole::Owner`], and ownership is
/// afterwards a role like any other. See the membership operations for the
/// rules that keep at least one owner in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier.
    pub id: Uuid,
    /// Project name.
    pub name: String,
    /// Project description.
    pub description: String,
    /// Current status.
    pub status: ProjectStatus,
    /// Start date.
    pub start_date: DateTime<Utc>,
    /// Optional end date.
    pub end_date: Option<DateTime<Utc>>,
    /// Ordered member list.
    pub members: Vec<ProjectMember>,
    /// Linked GitHub repository.
    pub github_repo: Option<GithubRepo>,
    /// Optimistic concurrency token, bumped by the store on every update.
    pub version: u64,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
    /// When this record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Creates a new project owned by `owner_id`.
    pub fn new(name: impl Into<String>, description: impl Into<String>, owner_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            status: ProjectStatus::Planning,
            start_date: now,
            end_date: None,
            members: vec![ProjectMember::new(owner_id, MemberRole::Owner)],
            github_repo: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the status.
    pub fn with_status(mut self, status: ProjectStatus) -> Self {
        self.status = status;
        self
    }

    /// Returns the member entry for a user.
    pub fn member(&self, user_id: Uuid) -> Option<&ProjectMember> {
        self.members.iter().find(|m| m.user_id == user_id)
    }

    /// Returns true if the user is in the member list.
    pub fn is_member(&self, user_id: Uuid) -> bool {
        self.member(user_id).is_some()
    }

    /// Returns the first owner in member order.
    pub fn primary_owner(&self) -> Option<Uuid> {
        self.members
            .iter()
            .find(|m| m.role == MemberRole::Owner)
            .map(|m| m.user_id)
    }

    /// Number of members holding the owner role.
    pub fn owner_count(&self) -> usize {
        self.members
            .iter()
            .filter(|m| m.role == MemberRole::Owner)
            .count()
    }

    /// Marks the record as modified.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
