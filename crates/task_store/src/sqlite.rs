//! SQLite task store implementation.
//!
//! Member lists and GitHub link descriptors are stored as JSON text columns;
//! everything else maps to plain columns. Timestamps are RFC 3339 strings.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use entities::{
    Project, ProjectStatus, Task, TaskPriority, TaskStatus, Theme, User, UserPreference,
};
use sqlx::{sqlite::SqlitePoolOptions, FromRow, Pool, Sqlite};
use uuid::Uuid;

use crate::{ProjectFilter, TaskFilter, TaskStore, TaskStoreError, TaskStoreResult};

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT,
    google_id TEXT,
    avatar TEXT,
    github_username TEXT,
    github_token TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS projects (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL,
    status TEXT NOT NULL,
    start_date TEXT NOT NULL,
    end_date TEXT,
    members TEXT NOT NULL,
    github_repo TEXT,
    version INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL REFERENCES projects (id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    description TEXT,
    status TEXT NOT NULL,
    priority TEXT NOT NULL,
    assignee_id TEXT,
    due_date TEXT,
    completed_at TEXT,
    github_issue TEXT,
    created_by TEXT NOT NULL,
    version INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tasks_project_id ON tasks (project_id);
CREATE INDEX IF NOT EXISTS idx_tasks_assignee_id ON tasks (assignee_id);

CREATE TABLE IF NOT EXISTS user_preferences (
    email TEXT PRIMARY KEY,
    theme TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

fn parse_uuid(value: &str) -> TaskStoreResult<Uuid> {
    value
        .parse()
        .map_err(|_| TaskStoreError::Other(format!("Invalid UUID in database: {}", value)))
}

fn parse_time(value: &str) -> TaskStoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| TaskStoreError::Other(format!("Invalid timestamp in database: {}", value)))
}

fn parse_optional_time(value: Option<&str>) -> TaskStoreResult<Option<DateTime<Utc>>> {
    value.map(parse_time).transpose()
}

fn unknown_value(kind: &str, value: &str) -> TaskStoreError {
    TaskStoreError::Other(format!("Unknown {} in database: {}", kind, value))
}

/// Database row for User.
#[derive(Debug, FromRow)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    password_hash: Option<String>,
    google_id: Option<String>,
    avatar: Option<String>,
    github_username: Option<String>,
    github_token: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<UserRow> for User {
    type Error = TaskStoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: parse_uuid(&row.id)?,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            google_id: row.google_id,
            avatar: row.avatar,
            github_username: row.github_username,
            github_token: row.github_token,
            created_at: parse_time(&row.created_at)?,
            updated_at: parse_time(&row.updated_at)?,
        })
    }
}

/// Database row for Project.
#[derive(Debug, FromRow)]
struct ProjectRow {
    id: String,
    name: String,
    description: String,
    status: String,
    start_date: String,
    end_date: Option<String>,
    members: String,
    github_repo: Option<String>,
    version: i64,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ProjectRow> for Project {
    type Error = TaskStoreError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        Ok(Project {
            id: parse_uuid(&row.id)?,
            name: row.name,
            description: row.description,
            status: ProjectStatus::parse(&row.status)
                .ok_or_else(|| unknown_value("project status", &row.status))?,
            start_date: parse_time(&row.start_date)?,
            end_date: parse_optional_time(row.end_date.as_deref())?,
            members: serde_json::from_str(&row.members)?,
            github_repo: row
                .github_repo
                .as_deref()
                .map(serde_json::from_str)
                .transpose()?,
            version: row.version as u64,
            created_at: parse_time(&row.created_at)?,
            updated_at: parse_time(&row.updated_at)?,
        })
    }
}

/// Database row for Task.
#[derive(Debug, FromRow)]
struct TaskRow {
    id: String,
    project_id: String,
    title: String,
    description: Option<String>,
    status: String,
    priority: String,
    assignee_id: Option<String>,
    due_date: Option<String>,
    completed_at: Option<String>,
    github_issue: Option<String>,
    created_by: String,
    version: i64,
    created_at: String,
    updated_at: String,
}

impl TryFrom<TaskRow> for Task {
    type Error = TaskStoreError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        Ok(Task {
            id: parse_uuid(&row.id)?,
            project_id: parse_uuid(&row.project_id)?,
            title: row.title,
            description: row.description,
            status: TaskStatus::parse(&row.status)
                .ok_or_else(|| unknown_value("task status", &row.status))?,
            priority: TaskPriority::parse(&row.priority)
                .ok_or_else(|| unknown_value("task priority", &row.priority))?,
            assignee_id: row.assignee_id.as_deref().map(parse_uuid).transpose()?,
            due_date: parse_optional_time(row.due_date.as_deref())?,
            completed_at: parse_optional_time(row.completed_at.as_deref())?,
            github_issue: row
                .github_issue
                .as_deref()
                .map(serde_json::from_str)
                .transpose()?,
            created_by: parse_uuid(&row.created_by)?,
            version: row.version as u64,
            created_at: parse_time(&row.created_at)?,
            updated_at: parse_time(&row.updated_at)?,
        })
    }
}

/// Database row for UserPreference.
#[derive(Debug, FromRow)]
struct PreferenceRow {
    email: String,
    theme: String,
    updated_at: String,
}

impl TryFrom<PreferenceRow> for UserPreference {
    type Error = TaskStoreError;

    fn try_from(row: PreferenceRow) -> Result<Self, Self::Error> {
        Ok(UserPreference {
            theme: Theme::parse(&row.theme).ok_or_else(|| unknown_value("theme", &row.theme))?,
            email: row.email,
            updated_at: parse_time(&row.updated_at)?,
        })
    }
}

/// Maps a unique constraint violation to `AlreadyExists`.
fn map_unique<'a>(
    entity_type: &'static str,
    id: &'a str,
) -> impl FnOnce(sqlx::Error) -> TaskStoreError + 'a {
    move |e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            TaskStoreError::already_exists(entity_type, id)
        }
        _ => TaskStoreError::Database(e),
    }
}

/// SQLite-backed task store.
#[derive(Debug, Clone)]
pub struct SqliteTaskStore {
    pool: Pool<Sqlite>,
}

impl SqliteTaskStore {
    /// Connects to `database_url` and creates the schema.
    pub async fn connect(database_url: &str) -> TaskStoreResult<Self> {
        // Every connection to `:memory:` opens its own database.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        let store = Self { pool };
        store.init().await?;
        Ok(store)
    }

    /// Creates tables and indexes if they do not exist.
    async fn init(&self) -> TaskStoreResult<()> {
        sqlx::raw_sql(SCHEMA_SQL).execute(&self.pool).await?;
        tracing::debug!("SQLite schema ready");
        Ok(())
    }
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    // =========================================================================
    // User operations
    // =========================================================================

    async fn create_user(&self, user: User) -> TaskStoreResult<User> {
        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, google_id, avatar, \
             github_username, github_token, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user.id.to_string())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.google_id)
        .bind(&user.avatar)
        .bind(&user.github_username)
        .bind(&user.github_token)
        .bind(user.created_at.to_rfc3339())
        .bind(user.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(map_unique("User", &user.email))?;

        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> TaskStoreResult<Option<User>> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn get_user_by_email(&self, email: &str) -> TaskStoreResult<Option<User>> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    // =========================================================================
    // Project operations
    // =========================================================================

    async fn create_project(&self, project: Project) -> TaskStoreResult<Project> {
        sqlx::query(
            "INSERT INTO projects (id, name, description, status, start_date, end_date, members, \
             github_repo, version, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(project.id.to_string())
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.status.as_str())
        .bind(project.start_date.to_rfc3339())
        .bind(project.end_date.map(|d| d.to_rfc3339()))
        .bind(serde_json::to_string(&project.members)?)
        .bind(project.github_repo.as_ref().map(serde_json::to_string).transpose()?)
        .bind(project.version as i64)
        .bind(project.created_at.to_rfc3339())
        .bind(project.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(map_unique("Project", &project.id.to_string()))?;

        Ok(project)
    }

    async fn get_project(&self, id: Uuid) -> TaskStoreResult<Option<Project>> {
        sqlx::query_as::<_, ProjectRow>("SELECT * FROM projects WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .map(Project::try_from)
            .transpose()
    }

    async fn list_projects(&self, filter: ProjectFilter) -> TaskStoreResult<(Vec<Project>, u32)> {
        const MEMBER_CLAUSE: &str = "(?1 IS NULL OR EXISTS (SELECT 1 FROM json_each(projects.members) \
             WHERE json_extract(json_each.value, '$.user_id') = ?1))";

        let member_id = filter.member_id.map(|id| id.to_string());

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM projects WHERE {}",
            MEMBER_CLAUSE
        ))
        .bind(&member_id)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT * FROM projects WHERE {} ORDER BY created_at LIMIT ?2 OFFSET ?3",
            MEMBER_CLAUSE
        ))
        .bind(&member_id)
        .bind(filter.limit.map(i64::from).unwrap_or(-1))
        .bind(filter.offset.map(i64::from).unwrap_or(0))
        .fetch_all(&self.pool)
        .await?;

        let projects = rows
            .into_iter()
            .map(Project::try_from)
            .collect::<TaskStoreResult<Vec<_>>>()?;

        Ok((projects, total as u32))
    }

    async fn update_project(&self, project: Project) -> TaskStoreResult<Project> {
        let result = sqlx::query(
            "UPDATE projects SET name = ?, description = ?, status = ?, start_date = ?, \
             end_date = ?, members = ?, github_repo = ?, version = version + 1, updated_at = ? \
             WHERE id = ? AND version = ?",
        )
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.status.as_str())
        .bind(project.start_date.to_rfc3339())
        .bind(project.end_date.map(|d| d.to_rfc3339()))
        .bind(serde_json::to_string(&project.members)?)
        .bind(project.github_repo.as_ref().map(serde_json::to_string).transpose()?)
        .bind(project.updated_at.to_rfc3339())
        .bind(project.id.to_string())
        .bind(project.version as i64)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let actual: Option<i64> = sqlx::query_scalar("SELECT version FROM projects WHERE id = ?")
                .bind(project.id.to_string())
                .fetch_optional(&self.pool)
                .await?;

            return Err(match actual {
                Some(actual) => TaskStoreError::conflict(
                    "Project",
                    project.id.to_string(),
                    project.version,
                    actual as u64,
                ),
                None => TaskStoreError::not_found("Project", project.id.to_string()),
            });
        }

        Ok(Project {
            version: project.version + 1,
            ..project
        })
    }

    async fn delete_project(&self, id: Uuid) -> TaskStoreResult<()> {
        let mut tx = self.pool.begin().await?;

        let stragglers = sqlx::query("DELETE FROM tasks WHERE project_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let result = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(TaskStoreError::not_found("Project", id.to_string()));
        }
        tx.commit().await?;

        if stragglers > 0 {
            tracing::debug!(project_id = %id, count = stragglers, "Removed tasks left on deleted project");
        }
        Ok(())
    }

    // =========================================================================
    // Task operations
    // =========================================================================

    async fn create_task(&self, task: Task) -> TaskStoreResult<Task> {
        // Single statement, so a concurrent project delete either sees the
        // task or the insert sees no project.
        let result = sqlx::query(
            "INSERT INTO tasks (id, project_id, title, description, status, priority, \
             assignee_id, due_date, completed_at, github_issue, created_by, version, \
             created_at, updated_at) \
             SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14 \
             WHERE EXISTS (SELECT 1 FROM projects WHERE id = ?2)",
        )
        .bind(task.id.to_string())
        .bind(task.project_id.to_string())
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(task.priority.as_str())
        .bind(task.assignee_id.map(|id| id.to_string()))
        .bind(task.due_date.map(|d| d.to_rfc3339()))
        .bind(task.completed_at.map(|d| d.to_rfc3339()))
        .bind(task.github_issue.as_ref().map(serde_json::to_string).transpose()?)
        .bind(task.created_by.to_string())
        .bind(task.version as i64)
        .bind(task.created_at.to_rfc3339())
        .bind(task.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(map_unique("Task", &task.id.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(TaskStoreError::not_found("Project", task.project_id.to_string()));
        }
        Ok(task)
    }

    async fn get_task(&self, id: Uuid) -> TaskStoreResult<Option<Task>> {
        sqlx::query_as::<_, TaskRow>("SELECT * FROM tasks WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .map(Task::try_from)
            .transpose()
    }

    async fn list_tasks(&self, filter: TaskFilter) -> TaskStoreResult<(Vec<Task>, u32)> {
        const WHERE_CLAUSE: &str = "(?1 IS NULL OR project_id = ?1) \
             AND (?2 IS NULL OR assignee_id = ?2) \
             AND (?3 IS NULL OR status = ?3)";

        let project_id = filter.project_id.map(|id| id.to_string());
        let assignee_id = filter.assignee_id.map(|id| id.to_string());
        let status = filter.status.map(|s| s.as_str());

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM tasks WHERE {}", WHERE_CLAUSE))
                .bind(&project_id)
                .bind(&assignee_id)
                .bind(status)
                .fetch_one(&self.pool)
                .await?;

        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT * FROM tasks WHERE {} ORDER BY created_at LIMIT ?4 OFFSET ?5",
            WHERE_CLAUSE
        ))
        .bind(&project_id)
        .bind(&assignee_id)
        .bind(status)
        .bind(filter.limit.map(i64::from).unwrap_or(-1))
        .bind(filter.offset.map(i64::from).unwrap_or(0))
        .fetch_all(&self.pool)
        .await?;

        let tasks = rows
            .into_iter()
            .map(Task::try_from)
            .collect::<TaskStoreResult<Vec<_>>>()?;

        Ok((tasks, total as u32))
    }

    async fn update_task(&self, task: Task) -> TaskStoreResult<Task> {
        let result = sqlx::query(
            "UPDATE tasks SET title = ?, description = ?, status = ?, priority = ?, \
             assignee_id = ?, due_date = ?, completed_at = ?, github_issue = ?, \
             version = version + 1, updated_at = ? WHERE id = ? AND version = ?",
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(task.priority.as_str())
        .bind(task.assignee_id.map(|id| id.to_string()))
        .bind(task.due_date.map(|d| d.to_rfc3339()))
        .bind(task.completed_at.map(|d| d.to_rfc3339()))
        .bind(task.github_issue.as_ref().map(serde_json::to_string).transpose()?)
        .bind(task.updated_at.to_rfc3339())
        .bind(task.id.to_string())
        .bind(task.version as i64)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let actual: Option<i64> = sqlx::query_scalar("SELECT version FROM tasks WHERE id = ?")
                .bind(task.id.to_string())
                .fetch_optional(&self.pool)
                .await?;

            return Err(match actual {
                Some(actual) => {
                    TaskStoreError::conflict("Task", task.id.to_string(), task.version, actual as u64)
                }
                None => TaskStoreError::not_found("Task", task.id.to_string()),
            });
        }

        Ok(Task {
            version: task.version + 1,
            ..task
        })
    }

    async fn delete_task(&self, id: Uuid) -> TaskStoreResult<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(TaskStoreError::not_found("Task", id.to_string()));
        }
        Ok(())
    }

    async fn delete_tasks_by_project(&self, project_id: Uuid) -> TaskStoreResult<u64> {
        let result = sqlx::query("DELETE FROM tasks WHERE project_id = ?")
            .bind(project_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    // Preference operations
    // =========================================================================

    async fn upsert_preference(&self, preference: UserPreference) -> TaskStoreResult<UserPreference> {
        sqlx::query(
            "INSERT INTO user_preferences (email, theme, updated_at) VALUES (?, ?, ?) \
             ON CONFLICT(email) DO UPDATE SET theme = excluded.theme, \
             updated_at = excluded.updated_at",
        )
        .bind(&preference.email)
        .bind(preference.theme.as_str())
        .bind(preference.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(preference)
    }

    async fn get_preference(&self, email: &str) -> TaskStoreResult<Option<UserPreference>> {
        sqlx::query_as::<_, PreferenceRow>("SELECT * FROM user_preferences WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(UserPreference::try_from)
            .transpose()
    }
}
