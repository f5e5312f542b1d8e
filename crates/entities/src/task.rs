//! Task-related entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a Task.
///
/// Any status may move to any other. The only side effect of a transition is
/// the completion timestamp, see [`TaskStatus::completion_time`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    ToDo,
    InProgress,
    InReview,
    Completed,
}

impl TaskStatus {
    /// Converts the status to its wire/storage string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToDo => "to-do",
            Self::InProgress => "in-progress",
            Self::InReview => "in-review",
            Self::Completed => "completed",
        }
    }

    /// Parses a status from its wire/storage string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "to-do" => Some(Self::ToDo),
            "in-progress" => Some(Self::InProgress),
            "in-review" => Some(Self::InReview),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Returns the completion timestamp after moving from `from` to `to`.
    ///
    /// Entering `Completed` from another status stamps `now`, but only when
    /// no timestamp is recorded yet. Leaving `Completed` keeps the existing
    /// timestamp.
    pub fn completion_time(
        from: TaskStatus,
        to: TaskStatus,
        completed_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        if from != to && to == TaskStatus::Completed && completed_at.is_none() {
            Some(now)
        } else {
            completed_at
        }
    }
}

/// Priority of a Task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    /// Converts the priority to its wire/storage string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Parses a priority from its wire/storage string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// GitHub issue linked to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubIssue {
    /// GitHub's issue ID.
    pub id: u64,
    /// Issue number within the repository.
    pub number: u64,
    /// Web URL.
    pub url: String,
}

/// A unit of work inside a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier.
    pub id: Uuid,
    /// Parent project ID.
    pub project_id: Uuid,
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Current status.
    pub status: TaskStatus,
    /// Priority.
    pub priority: TaskPriority,
    /// Assigned user.
    pub assignee_id: Option<Uuid>,
    /// Due date.
    pub due_date: Option<DateTime<Utc>>,
    /// First time the task was completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// Linked GitHub issue.
    pub github_issue: Option<GithubIssue>,
    /// User who created the task.
    pub created_by: Uuid,
    /// Optimistic concurrency token, bumped by the store on every update.
    pub version: u64,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
    /// When this record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task in the default status and priority.
    pub fn new(project_id: Uuid, title: impl Into<String>, created_by: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            project_id,
            title: title.into(),
            description: None,
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            assignee_id: None,
            due_date: None,
            completed_at: None,
            github_issue: None,
            created_by,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the assignee.
    pub fn with_assignee(mut self, assignee_id: Uuid) -> Self {
        self.assignee_id = Some(assignee_id);
        self
    }

    /// Moves the task to `status` at `now`, stamping `completed_at` as needed.
    pub fn set_status_at(&mut self, status: TaskStatus, now: DateTime<Utc>) {
        self.completed_at = TaskStatus::completion_time(self.status, status, self.completed_at, now);
        self.status = status;
    }

    /// Marks the record as modified.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
