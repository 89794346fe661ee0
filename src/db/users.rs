//! User repository operations.

use sqlx::Row;
use uuid::Uuid;

use super::{from_json, now_rfc3339, to_json, Repository};
use crate::errors::AppError;
use crate::models::{CreateUserRequest, UpdateUserRequest, User};

const USER_COLUMNS: &str =
    "id, clerk_id, display_name, team_id, employee_id, permissions, created_at, updated_at";

impl Repository {
    /// List all users.
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY display_name"
        ))
        .fetch_all(self.pool())
        .await?;

        Ok(rows.iter().map(user_from_row).collect())
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// Get a user by external-auth identifier.
    pub async fn get_user_by_clerk_id(&self, clerk_id: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE clerk_id = ?"
        ))
        .bind(clerk_id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// Create a new user. Fails with a conflict if the clerk_id is taken,
    /// which makes webhook redelivery harmless.
    pub async fn create_user(&self, request: &CreateUserRequest) -> Result<User, AppError> {
        if self.get_user_by_clerk_id(&request.clerk_id).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "User with clerk id {} already exists",
                request.clerk_id
            )));
        }

        let id = Uuid::new_v4().to_string();
        let now = now_rfc3339();

        sqlx::query(
            "INSERT INTO users (id, clerk_id, display_name, team_id, employee_id, permissions, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(&request.clerk_id)
        .bind(&request.display_name)
        .bind(&request.team_id)
        .bind(&request.employee_id)
        .bind(to_json(&request.permissions))
        .bind(&now)
        .bind(&now)
        .execute(self.pool())
        .await?;

        Ok(User {
            id,
            clerk_id: request.clerk_id.clone(),
            display_name: request.display_name.clone(),
            team_id: request.team_id.clone(),
            employee_id: request.employee_id.clone(),
            permissions: request.permissions.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Update a user profile.
    pub async fn update_user(&self, id: &str, request: &UpdateUserRequest) -> Result<User, AppError> {
        let existing = self
            .get_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;

        let now = now_rfc3339();
        let display_name = request
            .display_name
            .as_ref()
            .unwrap_or(&existing.display_name);
        let team_id = request.team_id.clone().or(existing.team_id.clone());
        let employee_id = request.employee_id.clone().or(existing.employee_id.clone());
        let permissions = request
            .permissions
            .clone()
            .unwrap_or_else(|| existing.permissions.clone());

        sqlx::query(
            "UPDATE users SET display_name = ?, team_id = ?, employee_id = ?, permissions = ?, updated_at = ? WHERE id = ?"
        )
        .bind(display_name)
        .bind(&team_id)
        .bind(&employee_id)
        .bind(to_json(&permissions))
        .bind(&now)
        .bind(id)
        .execute(self.pool())
        .await?;

        Ok(User {
            id: id.to_string(),
            clerk_id: existing.clerk_id,
            display_name: display_name.clone(),
            team_id,
            employee_id,
            permissions,
            created_at: existing.created_at,
            updated_at: now,
        })
    }

    /// Delete a user.
    pub async fn delete_user(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", id)));
        }

        Ok(())
    }
}

fn user_from_row(row: &sqlx::sqlite::SqliteRow) -> User {
    let permissions: Option<String> = row.get("permissions");
    User {
        id: row.get("id"),
        clerk_id: row.get("clerk_id"),
        display_name: row.get("display_name"),
        team_id: row.get("team_id"),
        employee_id: row.get("employee_id"),
        permissions: from_json(permissions),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
