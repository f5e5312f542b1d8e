//! In-memory task store implementation.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use entities::{Project, Task, User, UserPreference};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{ProjectFilter, TaskFilter, TaskStore, TaskStoreError, TaskStoreResult};

/// In-memory task store for tests and ephemeral deployments.
///
/// Operations touching both maps lock `projects` before `tasks`.
#[derive(Debug, Default)]
pub struct MemoryTaskStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    projects: Arc<RwLock<HashMap<Uuid, Project>>>,
    tasks: Arc<RwLock<HashMap<Uuid, Task>>>,
    preferences: Arc<RwLock<HashMap<String, UserPreference>>>,
}

impl MemoryTaskStore {
    /// Creates a new in-memory task store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Applies offset and limit to an already filtered list.
fn paginate<T>(mut items: Vec<T>, offset: Option<u32>, limit: Option<u32>) -> (Vec<T>, u32) {
    let total = items.len() as u32;

    if let Some(offset) = offset {
        items = items.into_iter().skip(offset as usize).collect();
    }
    if let Some(limit) = limit {
        items.truncate(limit as usize);
    }

    (items, total)
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    // =========================================================================
    // User operations
    // =========================================================================

    async fn create_user(&self, user: User) -> TaskStoreResult<User> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) || users.values().any(|u| u.email == user.email) {
            return Err(TaskStoreError::already_exists("User", user.email));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> TaskStoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> TaskStoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    // =========================================================================
    // Project operations
    // =========================================================================

    async fn create_project(&self, project: Project) -> TaskStoreResult<Project> {
        let mut projects = self.projects.write().await;
        if projects.contains_key(&project.id) {
            return Err(TaskStoreError::already_exists("Project", project.id.to_string()));
        }
        projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn get_project(&self, id: Uuid) -> TaskStoreResult<Option<Project>> {
        let projects = self.projects.read().await;
        Ok(projects.get(&id).cloned())
    }

    async fn list_projects(&self, filter: ProjectFilter) -> TaskStoreResult<(Vec<Project>, u32)> {
        let projects = self.projects.read().await;
        let mut result: Vec<Project> = projects
            .values()
            .filter(|p| match filter.member_id {
                Some(member_id) => p.is_member(member_id),
                None => true,
            })
            .cloned()
            .collect();
        result.sort_by_key(|p| p.created_at);

        Ok(paginate(result, filter.offset, filter.limit))
    }

    async fn update_project(&self, mut project: Project) -> TaskStoreResult<Project> {
        let mut projects = self.projects.write().await;
        let stored = projects
            .get(&project.id)
            .ok_or_else(|| TaskStoreError::not_found("Project", project.id.to_string()))?;

        if stored.version != project.version {
            return Err(TaskStoreError::conflict(
                "Project",
                project.id.to_string(),
                project.version,
                stored.version,
            ));
        }

        project.version += 1;
        projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn delete_project(&self, id: Uuid) -> TaskStoreResult<()> {
        let mut projects = self.projects.write().await;
        if projects.remove(&id).is_none() {
            return Err(TaskStoreError::not_found("Project", id.to_string()));
        }

        let mut tasks = self.tasks.write().await;
        tasks.retain(|_, t| t.project_id != id);
        Ok(())
    }

    // =========================================================================
    // Task operations
    // =========================================================================

    async fn create_task(&self, task: Task) -> TaskStoreResult<Task> {
        let projects = self.projects.read().await;
        if !projects.contains_key(&task.project_id) {
            return Err(TaskStoreError::not_found("Project", task.project_id.to_string()));
        }

        let mut tasks = self.tasks.write().await;
        if tasks.contains_key(&task.id) {
            return Err(TaskStoreError::already_exists("Task", task.id.to_string()));
        }
        tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn get_task(&self, id: Uuid) -> TaskStoreResult<Option<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.get(&id).cloned())
    }

    async fn list_tasks(&self, filter: TaskFilter) -> TaskStoreResult<(Vec<Task>, u32)> {
        let tasks = self.tasks.read().await;
        let mut result: Vec<Task> = tasks
            .values()
            .filter(|t| filter.project_id.is_none_or(|id| t.project_id == id))
            .filter(|t| filter.assignee_id.is_none_or(|id| t.assignee_id == Some(id)))
            .filter(|t| filter.status.is_none_or(|status| t.status == status))
            .cloned()
            .collect();
        result.sort_by_key(|t| t.created_at);

        Ok(paginate(result, filter.offset, filter.limit))
    }

    async fn update_task(&self, mut task: Task) -> TaskStoreResult<Task> {
        let mut tasks = self.tasks.write().await;
        let stored = tasks
            .get(&task.id)
            .ok_or_else(|| TaskStoreError::not_found("Task", task.id.to_string()))?;

        if stored.version != task.version {
            return Err(TaskStoreError::conflict(
                "Task",
                task.id.to_string(),
                task.version,
                stored.version,
            ));
        }

        task.version += 1;
        tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn delete_task(&self, id: Uuid) -> TaskStoreResult<()> {
        let mut tasks = self.tasks.write().await;
        if tasks.remove(&id).is_none() {
            return Err(TaskStoreError::not_found("Task", id.to_string()));
        }
        Ok(())
    }

    async fn delete_tasks_by_project(&self, project_id: Uuid) -> TaskStoreResult<u64> {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|_, t| t.project_id != project_id);
        Ok((before - tasks.len()) as u64)
    }

    // =========================================================================
    // Preference operations
    // =========================================================================

    async fn upsert_preference(&self, preference: UserPreference) -> TaskStoreResult<UserPreference> {
        let mut preferences = self.preferences.write().await;
        preferences.insert(preference.email.clone(), preference.clone());
        Ok(preference)
    }

    async fn get_preference(&self, email: &str) -> TaskStoreResult<Option<UserPreference>> {
        let preferences = self.preferences.read().await;
        Ok(preferences.get(email).cloned())
    }
}
