//! Comment repository operations.

use sqlx::Row;
use uuid::Uuid;

use super::{now_rfc3339, Repository};
use crate::errors::AppError;
use crate::models::{Comment, CreateCommentRequest};

impl Repository {
    /// List comments on a task, oldest first.
    pub async fn list_comments(&self, task_id: &str) -> Result<Vec<Comment>, AppError> {
        let rows = sqlx::query(
            "SELECT id, task_id, author_id, text, created_at FROM comments WHERE task_id = ? ORDER BY created_at"
        )
        .bind(task_id)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.iter().map(comment_from_row).collect())
    }

    /// Post a comment on a task. The task must exist.
    pub async fn create_comment(
        &self,
        task_id: &str,
        request: &CreateCommentRequest,
    ) -> Result<Comment, AppError> {
        if self.get_task(task_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Task {} not found", task_id)));
        }

        let id = Uuid::new_v4().to_string();
        let now = now_rfc3339();

        sqlx::query(
            "INSERT INTO comments (id, task_id, author_id, text, created_at) VALUES (?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(task_id)
        .bind(&request.author_id)
        .bind(&request.text)
        .bind(&now)
        .execute(self.pool())
        .await?;

        Ok(Comment {
            id,
            task_id: task_id.to_string(),
            author_id: request.author_id.clone(),
            text: request.text.clone(),
            created_at: now,
        })
    }

    /// Delete a comment.
    pub async fn delete_comment(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Comment {} not found", id)));
        }

        Ok(())
    }
}

fn comment_from_row(row: &sqlx::sqlite::SqliteRow) -> Comment {
    Comment {
        id: row.get("id"),
        task_id: row.get("task_id"),
        author_id: row.get("author_id"),
        text: row.get("text"),
        created_at: row.get("created_at"),
    }
}
