//! Task store trait definitions.

use async_trait::async_trait;
use entities::{Project, Task, TaskStatus, User, UserPreference};
use uuid::Uuid;

use crate::TaskStoreResult;

/// Filter options for listing projects.
#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    /// Only projects this user is a member of.
    pub member_id: Option<Uuid>,
    /// Maximum number of results.
    pub limit: Option<u32>,
    /// Offset for pagination.
    pub offset: Option<u32>,
}

/// Filter options for listing tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Filter by project ID.
    pub project_id: Option<Uuid>,
    /// Filter by assignee.
    pub assignee_id: Option<Uuid>,
    /// Filter by status.
    pub status: Option<TaskStatus>,
    /// Maximum number of results.
    pub limit: Option<u32>,
    /// Offset for pagination.
    pub offset: Option<u32>,
}

/// Trait for TaskFlow storage operations.
///
/// Results are ordered by creation time, oldest first.
#[async_trait]
pub trait TaskStore: Send + Sync {
    // =========================================================================
    // User operations
    // =========================================================================

    /// Creates a new user. Fails if the email is already registered.
    async fn create_user(&self, user: User) -> TaskStoreResult<User>;

    /// Gets a user by ID.
    async fn get_user(&self, id: Uuid) -> TaskStoreResult<Option<User>>;

    /// Gets a user by email.
    async fn get_user_by_email(&self, email: &str) -> TaskStoreResult<Option<User>>;

    // =========================================================================
    // Project operations
    // =========================================================================

    /// Creates a new project.
    async fn create_project(&self, project: Project) -> TaskStoreResult<Project>;

    /// Gets a project by ID.
    async fn get_project(&self, id: Uuid) -> TaskStoreResult<Option<Project>>;

    /// Lists projects with optional filters.
    async fn list_projects(&self, filter: ProjectFilter) -> TaskStoreResult<(Vec<Project>, u32)>;

    /// Saves a project loaded earlier.
    ///
    /// The write only lands if the stored version still equals
    /// `project.version`; otherwise [`crate::TaskStoreError::Conflict`] is
    /// returned and nothing changes. The returned project carries the new
    /// version.
    async fn update_project(&self, project: Project) -> TaskStoreResult<Project>;

    /// Deletes a project along with any tasks still attached to it.
    ///
    /// Callers normally clear tasks first with
    /// [`TaskStore::delete_tasks_by_project`] to learn how many were removed;
    /// this catches tasks created in between.
    async fn delete_project(&self, id: Uuid) -> TaskStoreResult<()>;

    // =========================================================================
    // Task operations
    // =========================================================================

    /// Creates a new task. Fails with `NotFound` if its project does not
    /// exist.
    async fn create_task(&self, task: Task) -> TaskStoreResult<Task>;

    /// Gets a task by ID.
    async fn get_task(&self, id: Uuid) -> TaskStoreResult<Option<Task>>;

    /// Lists tasks with optional filters.
    async fn list_tasks(&self, filter: TaskFilter) -> TaskStoreResult<(Vec<Task>, u32)>;

    /// Saves a task loaded earlier, with the same version check as
    /// [`TaskStore::update_project`].
    async fn update_task(&self, task: Task) -> TaskStoreResult<Task>;

    /// Deletes a task.
    async fn delete_task(&self, id: Uuid) -> TaskStoreResult<()>;

    /// Deletes every task of a project, returning how many were removed.
    async fn delete_tasks_by_project(&self, project_id: Uuid) -> TaskStoreResult<u64>;

    // =========================================================================
    // Preference operations
    // =========================================================================

    /// Inserts or replaces the preference for `preference.email`.
    async fn upsert_preference(&self, preference: UserPreference) -> TaskStoreResult<UserPreference>;

    /// Gets the preference for an email.
    async fn get_preference(&self, email: &str) -> TaskStoreResult<Option<UserPreference>>;
}
