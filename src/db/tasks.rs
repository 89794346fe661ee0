//! Task repository operations.

use sqlx::Row;
use uuid::Uuid;

use super::{from_json, now_rfc3339, to_json, Repository};
use crate::errors::AppError;
use crate::models::{
    Attachment, CreateTaskRequest, Task, TaskPriority, TaskStatus, UpdateTaskRequest,
};

const TASK_COLUMNS: &str = "id, title, description, status, priority, tags, start_date, \
     due_date, points, project_id, author_id, assignee_ids, attachments, created_at, updated_at";

impl Repository {
    /// List tasks, optionally scoped to a project, with optional pagination.
    pub async fn list_tasks(
        &self,
        project_id: Option<&str>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Task>, AppError> {
        let rows = match project_id {
            Some(pid) => {
                sqlx::query(&format!(
                    "SELECT {TASK_COLUMNS} FROM tasks WHERE project_id = ? ORDER BY created_at LIMIT ? OFFSET ?"
                ))
                .bind(pid)
                .bind(limit.unwrap_or(-1))
                .bind(offset.unwrap_or(0))
                .fetch_all(self.pool())
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {TASK_COLUMNS} FROM tasks ORDER BY created_at LIMIT ? OFFSET ?"
                ))
                .bind(limit.unwrap_or(-1))
                .bind(offset.unwrap_or(0))
                .fetch_all(self.pool())
                .await?
            }
        };

        Ok(rows.iter().map(task_from_row).collect())
    }

    /// Get a task by ID.
    pub async fn get_task(&self, id: &str) -> Result<Option<Task>, AppError> {
        let row = sqlx::query(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        Ok(row.as_ref().map(task_from_row))
    }

    /// Create a new task.
    pub async fn create_task(&self, request: &CreateTaskRequest) -> Result<Task, AppError> {
        let id = Uuid::new_v4().to_string();
        let now = now_rfc3339();
        let status = request.status.unwrap_or(TaskStatus::Todo);
        let priority = request.priority.unwrap_or(TaskPriority::Medium);

        sqlx::query(
            r#"INSERT INTO tasks (
                id, title, description, status, priority, tags, start_date,
                due_date, points, project_id, author_id, assignee_ids,
                attachments, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, '[]', ?, ?)"#,
        )
        .bind(&id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(status.as_str())
        .bind(priority.as_str())
        .bind(to_json(&request.tags))
        .bind(&request.start_date)
        .bind(&request.due_date)
        .bind(request.points)
        .bind(&request.project_id)
        .bind(&request.author_id)
        .bind(to_json(&request.assignee_ids))
        .bind(&now)
        .bind(&now)
        .execute(self.pool())
        .await?;

        Ok(Task {
            id,
            title: request.title.clone(),
            description: request.description.clone(),
            status,
            priority,
            tags: request.tags.clone(),
            start_date: request.start_date.clone(),
            due_date: request.due_date.clone(),
            points: request.points,
            project_id: request.project_id.clone(),
            author_id: request.author_id.clone(),
            assignee_ids: request.assignee_ids.clone(),
            attachments: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Update a task.
    pub async fn update_task(&self, id: &str, request: &UpdateTaskRequest) -> Result<Task, AppError> {
        let existing = self
            .get_task(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Task {} not found", id)))?;

        let now = now_rfc3339();
        let title = request.title.as_ref().unwrap_or(&existing.title);
        let description = request.description.clone().or(existing.description.clone());
        let status = request.status.unwrap_or(existing.status);
        let priority = request.priority.unwrap_or(existing.priority);
        let tags = request.tags.clone().unwrap_or_else(|| existing.tags.clone());
        let start_date = request.start_date.clone().or(existing.start_date.clone());
        let due_date = request.due_date.clone().or(existing.due_date.clone());
        let points = request.points.or(existing.points);
        let assignee_ids = request
            .assignee_ids
            .clone()
            .unwrap_or_else(|| existing.assignee_ids.clone());

        sqlx::query(
            r#"UPDATE tasks SET
                title = ?, description = ?, status = ?, priority = ?, tags = ?,
                start_date = ?, due_date = ?, points = ?, assignee_ids = ?,
                updated_at = ?
            WHERE id = ?"#,
        )
        .bind(title)
        .bind(&description)
        .bind(status.as_str())
        .bind(priority.as_str())
        .bind(to_json(&tags))
        .bind(&start_date)
        .bind(&due_date)
        .bind(points)
        .bind(to_json(&assignee_ids))
        .bind(&now)
        .bind(id)
        .execute(self.pool())
        .await?;

        Ok(Task {
            id: id.to_string(),
            title: title.clone(),
            description,
            status,
            priority,
            tags,
            start_date,
            due_date,
            points,
            project_id: existing.project_id,
            author_id: existing.author_id,
            assignee_ids,
            attachments: existing.attachments,
            created_at: existing.created_at,
            updated_at: now,
        })
    }

    /// Move a task to another board column.
    pub async fn update_task_status(&self, id: &str, status: TaskStatus) -> Result<Task, AppError> {
        let now = now_rfc3339();
        let result = sqlx::query("UPDATE tasks SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(&now)
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Task {} not found", id)));
        }

        self.get_task(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Task {} not found", id)))
    }

    /// Delete a task and its comments.
    pub async fn delete_task(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Task {} not found", id)));
        }

        sqlx::query("DELETE FROM comments WHERE task_id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(())
    }

    /// Record a file attachment on a task.
    pub async fn add_task_attachment(
        &self,
        id: &str,
        attachment: Attachment,
    ) -> Result<Task, AppError> {
        let mut existing = self
            .get_task(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Task {} not found", id)))?;

        existing.attachments.push(attachment);
        self.write_task_attachments(id, &existing).await?;

        Ok(existing)
    }

    /// Remove a file attachment from a task, keyed by URL.
    pub async fn remove_task_attachment(&self, id: &str, file_url: &str) -> Result<Task, AppError> {
        let mut existing = self
            .get_task(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Task {} not found", id)))?;

        existing.attachments.retain(|a| a.file_url != file_url);
        self.write_task_attachments(id, &existing).await?;

        Ok(existing)
    }

    async fn write_task_attachments(&self, id: &str, task: &Task) -> Result<(), AppError> {
        let now = now_rfc3339();
        sqlx::query("UPDATE tasks SET attachments = ?, updated_at = ? WHERE id = ?")
            .bind(to_json(&task.attachments))
            .bind(&now)
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(())
    }
}

fn task_from_row(row: &sqlx::sqlite::SqliteRow) -> Task {
    let status: String = row.get("status");
    let priority: String = row.get("priority");
    let tags: Option<String> = row.get("tags");
    let assignee_ids: Option<String> = row.get("assignee_ids");
    let attachments: Option<String> = row.get("attachments");

    Task {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        status: TaskStatus::from_str(&status).unwrap_or(TaskStatus::Todo),
        priority: TaskPriority::from_str(&priority).unwrap_or(TaskPriority::Medium),
        tags: from_json(tags),
        start_date: row.get("start_date"),
        due_date: row.get("due_date"),
        points: row.get("points"),
        project_id: row.get("project_id"),
        author_id: row.get("author_id"),
        assignee_ids: from_json(assignee_ids),
        attachments: from_json(attachments),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
