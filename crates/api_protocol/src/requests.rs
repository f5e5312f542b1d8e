//! Request bodies.
//!
//! Every body rejects unknown fields. Update bodies distinguish an omitted
//! field (leave unchanged) from an explicit `null` (clear) where clearing is
//! meaningful.

use chrono::{DateTime, Utc};
use entities::{
    bounded_text, check_password, normalize_email, required_text, GithubIssue, GithubRepo,
    MemberRole, Project, ProjectStatus, Task, TaskPriority, TaskStatus, Theme, User,
    ValidationError, ValidationResult, MAX_DESCRIPTION_LEN, MAX_PROJECT_NAME_LEN,
    MAX_TASK_TITLE_LEN, MAX_USER_NAME_LEN,
};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Deserializes a present field (including `null`) as `Some(_)`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn check_dates(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> ValidationResult<()> {
    match end {
        Some(end) if end < start => Err(ValidationError::new(
            "end_date",
            "End date cannot be before start date",
        )),
        _ => Ok(()),
    }
}

fn optional_description(value: Option<&str>) -> ValidationResult<Option<String>> {
    value
        .map(|d| bounded_text("description", d.trim(), MAX_DESCRIPTION_LEN))
        .transpose()
}

// ============================================================================
// Auth Requests
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    /// Checks the fields and builds the user record, without a password hash.
    pub fn to_user(&self) -> ValidationResult<User> {
        let name = required_text("name", &self.name, MAX_USER_NAME_LEN)?;
        let email = normalize_email(&self.email)?;
        check_password(&self.password)?;
        Ok(User::new(name, email))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    /// Returns the lookup key for the account.
    pub fn normalized_email(&self) -> ValidationResult<String> {
        let email = self.email.trim().to_lowercase();
        if email.is_empty() || self.password.is_empty() {
            return Err(ValidationError::new(
                "email",
                "Please provide an email and password",
            ));
        }
        Ok(email)
    }
}

// ============================================================================
// Project Requests
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateProjectRequest {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
}

impl CreateProjectRequest {
    /// Builds a new project with `owner_id` seeded as its owner.
    pub fn to_project(&self, owner_id: Uuid) -> ValidationResult<Project> {
        let name = required_text("name", &self.name, MAX_PROJECT_NAME_LEN)?;
        let description = required_text("description", &self.description, MAX_DESCRIPTION_LEN)?;

        let mut project = Project::new(name, description, owner_id)
            .with_status(self.status.unwrap_or_default());
        if let Some(start) = self.start_date {
            project.start_date = start;
        }
        check_dates(project.start_date, self.end_date)?;
        project.end_date = self.end_date;

        Ok(project)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProjectRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<Option<DateTime<Utc>>>,
}

impl UpdateProjectRequest {
    /// Applies the present fields. On error the project is left untouched.
    pub fn apply_to(&self, project: &mut Project) -> ValidationResult<()> {
        let name = self
            .name
            .as_deref()
            .map(|n| required_text("name", n, MAX_PROJECT_NAME_LEN))
            .transpose()?;
        let description = self
            .description
            .as_deref()
            .map(|d| required_text("description", d, MAX_DESCRIPTION_LEN))
            .transpose()?;
        let start_date = self.start_date.unwrap_or(project.start_date);
        let end_date = self.end_date.unwrap_or(project.end_date);
        check_dates(start_date, end_date)?;

        if let Some(name) = name {
            project.name = name;
        }
        if let Some(description) = description {
            project.description = description;
        }
        if let Some(status) = self.status {
            project.status = status;
        }
        project.start_date = start_date;
        project.end_date = end_date;
        project.touch();

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddMemberRequest {
    pub email: String,
    #[serde(default)]
    pub role: MemberRole,
}

impl AddMemberRequest {
    /// Returns the lookup key for the user being added.
    pub fn normalized_email(&self) -> ValidationResult<String> {
        normalize_email(&self.email)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChangeRoleRequest {
    pub role: MemberRole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkRepositoryRequest {
    pub owner: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub url: String,
}

impl LinkRepositoryRequest {
    /// Builds the repository descriptor. `full_name` defaults to `owner/name`.
    pub fn to_repo(&self) -> ValidationResult<GithubRepo> {
        let owner = required_text("owner", &self.owner, MAX_PROJECT_NAME_LEN)?;
        let name = required_text("name", &self.name, MAX_PROJECT_NAME_LEN)?;
        let url = required_text("url", &self.url, MAX_DESCRIPTION_LEN)?;
        let full_name = match self.full_name.as_deref() {
            Some(full_name) => required_text("full_name", full_name, MAX_DESCRIPTION_LEN)?,
            None => format!("{}/{}", owner, name),
        };

        Ok(GithubRepo {
            owner,
            name,
            full_name,
            url,
        })
    }
}

// ============================================================================
// Task Requests
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTaskRequest {
    #[serde(alias = "project")]
    pub project_id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(default, alias = "assigned_to", skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

impl CreateTaskRequest {
    /// Builds the task. A task created as completed is stamped like any
    /// transition out of to-do.
    pub fn to_task(&self, created_by: Uuid) -> ValidationResult<Task> {
        let title = required_text("title", &self.title, MAX_TASK_TITLE_LEN)?;
        let description = optional_description(self.description.as_deref())?;

        let mut task = Task::new(self.project_id, title, created_by)
            .with_priority(self.priority.unwrap_or_default());
        task.description = description;
        task.assignee_id = self.assignee_id;
        task.due_date = self.due_date;
        task.set_status_at(self.status.unwrap_or_default(), task.created_at);

        Ok(task)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateTaskRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(
        default,
        alias = "assigned_to",
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub assignee_id: Option<Option<Uuid>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl UpdateTaskRequest {
    /// The new assignee, when the request sets one.
    pub fn new_assignee(&self) -> Option<Uuid> {
        self.assignee_id.flatten()
    }

    /// Applies the present fields. On error the task is left untouched.
    pub fn apply_to(&self, task: &mut Task, now: DateTime<Utc>) -> ValidationResult<()> {
        let title = self
            .title
            .as_deref()
            .map(|t| required_text("title", t, MAX_TASK_TITLE_LEN))
            .transpose()?;
        let description = self
            .description
            .as_ref()
            .map(|d| optional_description(d.as_deref()))
            .transpose()?;

        if let Some(title) = title {
            task.title = title;
        }
        if let Some(description) = description {
            task.description = description;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(assignee_id) = self.assignee_id {
            task.assignee_id = assignee_id;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        // Saving the same status still runs through the lifecycle so that a
        // no-op save keeps completed_at as it was.
        task.set_status_at(self.status.unwrap_or(task.status), now);
        task.updated_at = now;

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkIssueRequest {
    pub id: u64,
    pub number: u64,
    pub url: String,
}

impl LinkIssueRequest {
    /// Builds the issue descriptor.
    pub fn to_issue(&self) -> ValidationResult<GithubIssue> {
        Ok(GithubIssue {
            id: self.id,
            number: self.number,
            url: required_text("url", &self.url, MAX_DESCRIPTION_LEN)?,
        })
    }
}

// ============================================================================
// Preference Requests
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatePreferenceRequest {
    #[serde(default)]
    pub theme: Theme,
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_unknown_fields_rejected() {
        let result = serde_json::from_value::<RegisterRequest>(json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": "secret1",
            "role": "admin"
        }));
        assert!(result.is_err());

        let result = serde_json::from_value::<UpdateTaskRequest>(json!({
            "project_id": Uuid::new_v4()
        }));
        assert!(result.is_err(), "a task cannot move between projects");
    }

    #[test]
    fn test_register_normalizes_email() {
        let request = RegisterRequest {
            name: "  Ada  ".to_string(),
            email: " Ada@Example.COM ".to_string(),
            password: "secret1".to_string(),
        };
        let user = request.to_user().unwrap();
        assert_eq!(user.name, "Ada");
        assert_eq!(user.email, "ada@example.com");

        let short = RegisterRequest {
            password: "12345".to_string(),
            ..request
        };
        assert_eq!(short.to_user().unwrap_err().field, "password");
    }

    #[test]
    fn test_create_project_rejects_inverted_dates() {
        let now = Utc::now();
        let request = CreateProjectRequest {
            name: "Capstone".to_string(),
            description: "Final year".to_string(),
            status: None,
            start_date: Some(now),
            end_date: Some(now - Duration::days(1)),
        };
        assert_eq!(request.to_project(Uuid::new_v4()).unwrap_err().field, "end_date");
    }

    #[test]
    fn test_create_project_seeds_owner() {
        let owner = Uuid::new_v4();
        let request: CreateProjectRequest = serde_json::from_value(json!({
            "name": "Capstone",
            "description": "Final year",
            "status": "in-progress"
        }))
        .unwrap();

        let project = request.to_project(owner).unwrap();
        assert_eq!(project.status, ProjectStatus::InProgress);
        assert_eq!(project.primary_owner(), Some(owner));
    }

    #[test]
    fn test_update_project_is_all_or_nothing() {
        let mut project = Project::new("Capstone", "Final year", Uuid::new_v4());
        let request = UpdateProjectRequest {
            name: Some("Renamed".to_string()),
            end_date: Some(Some(project.start_date - Duration::days(3))),
            ..Default::default()
        };

        assert!(request.apply_to(&mut project).is_err());
        assert_eq!(project.name, "Capstone");
        assert!(project.end_date.is_none());
    }

    #[test]
    fn test_update_project_clears_end_date() {
        let mut project = Project::new("Capstone", "Final year", Uuid::new_v4());
        project.end_date = Some(project.start_date + Duration::days(30));

        let request: UpdateProjectRequest =
            serde_json::from_value(json!({ "end_date": null })).unwrap();
        request.apply_to(&mut project).unwrap();
        assert!(project.end_date.is_none());

        let request: UpdateProjectRequest = serde_json::from_value(json!({})).unwrap();
        assert!(request.end_date.is_none());
    }

    #[test]
    fn test_add_member_role_defaults_to_member() {
        let request: AddMemberRequest =
            serde_json::from_value(json!({ "email": "bob@example.com" })).unwrap();
        assert_eq!(request.role, MemberRole::Member);
    }

    #[test]
    fn test_create_completed_task_is_stamped() {
        let request: CreateTaskRequest = serde_json::from_value(json!({
            "project": Uuid::new_v4(),
            "title": "Write report",
            "status": "completed"
        }))
        .unwrap();

        let task = request.to_task(Uuid::new_v4()).unwrap();
        assert_eq!(task.completed_at, Some(task.created_at));
    }

    #[test]
    fn test_update_task_null_unassigns() {
        let mut task = Task::new(Uuid::new_v4(), "Write report", Uuid::new_v4())
            .with_assignee(Uuid::new_v4());

        let request: UpdateTaskRequest =
            serde_json::from_value(json!({ "assignee_id": null })).unwrap();
        assert_eq!(request.new_assignee(), None);
        request.apply_to(&mut task, Utc::now()).unwrap();
        assert!(task.assignee_id.is_none());
    }

    #[test]
    fn test_update_task_keeps_completed_at() {
        let mut task = Task::new(Uuid::new_v4(), "Write report", Uuid::new_v4());
        let first = Utc::now();
        task.set_status_at(TaskStatus::Completed, first);

        let reopen = UpdateTaskRequest {
            status: Some(TaskStatus::InProgress),
            ..Default::default()
        };
        reopen.apply_to(&mut task, first + Duration::hours(1)).unwrap();
        assert_eq!(task.completed_at, Some(first));

        let noop = UpdateTaskRequest::default();
        noop.apply_to(&mut task, first + Duration::hours(2)).unwrap();
        assert_eq!(task.completed_at, Some(first));
    }

    #[test]
    fn test_update_request_omits_absent_fields() {
        let request = UpdateTaskRequest {
            assignee_id: Some(None),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&request).unwrap(), json!({ "assignee_id": null }));
    }

    #[test]
    fn test_link_repository_defaults_full_name() {
        let repo = LinkRepositoryRequest {
            owner: "ada".to_string(),
            name: "capstone".to_string(),
            full_name: None,
            url: "https://github.com/ada/capstone".to_string(),
        }
        .to_repo()
        .unwrap();
        assert_eq!(repo.full_name, "ada/capstone");
    }
}
