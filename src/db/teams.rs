//! Team repository operations.

use sqlx::Row;
use uuid::Uuid;

use super::{now_rfc3339, Repository};
use crate::errors::AppError;
use crate::models::{CreateTeamRequest, Team, UpdateTeamRequest};

impl Repository {
    /// List all teams.
    pub async fn list_teams(&self) -> Result<Vec<Team>, AppError> {
        let rows = sqlx::query(
            "SELECT id, name, product_owner_id, project_manager_id, created_at, updated_at FROM teams ORDER BY name"
        )
        .fetch_all(self.pool())
        .await?;

        Ok(rows.iter().map(team_from_row).collect())
    }

    /// Get a team by ID.
    pub async fn get_team(&self, id: &str) -> Result<Option<Team>, AppError> {
        let row = sqlx::query(
            "SELECT id, name, product_owner_id, project_manager_id, created_at, updated_at FROM teams WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.as_ref().map(team_from_row))
    }

    /// Create a new team.
    pub async fn create_team(&self, request: &CreateTeamRequest) -> Result<Team, AppError> {
        let id = Uuid::new_v4().to_string();
        let now = now_rfc3339();

        sqlx::query(
            "INSERT INTO teams (id, name, product_owner_id, project_manager_id, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(&request.name)
        .bind(&request.product_owner_id)
        .bind(&request.project_manager_id)
        .bind(&now)
        .bind(&now)
        .execute(self.pool())
        .await?;

        Ok(Team {
            id,
            name: request.name.clone(),
            product_owner_id: request.product_owner_id.clone(),
            project_manager_id: request.project_manager_id.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Update a team.
    pub async fn update_team(&self, id: &str, request: &UpdateTeamRequest) -> Result<Team, AppError> {
        let existing = self
            .get_team(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Team {} not found", id)))?;

        let now = now_rfc3339();
        let name = request.name.as_ref().unwrap_or(&existing.name);
        let product_owner_id = request
            .product_owner_id
            .clone()
            .or(existing.product_owner_id.clone());
        let project_manager_id = request
            .project_manager_id
            .clone()
            .or(existing.project_manager_id.clone());

        sqlx::query(
            "UPDATE teams SET name = ?, product_owner_id = ?, project_manager_id = ?, updated_at = ? WHERE id = ?"
        )
        .bind(name)
        .bind(&product_owner_id)
        .bind(&project_manager_id)
        .bind(&now)
        .bind(id)
        .execute(self.pool())
        .await?;

        Ok(Team {
            id: id.to_string(),
            name: name.clone(),
            product_owner_id,
            project_manager_id,
            created_at: existing.created_at,
            updated_at: now,
        })
    }

    /// Delete a team.
    pub async fn delete_team(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM teams WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Team {} not found", id)));
        }

        Ok(())
    }
}

fn team_from_row(row: &sqlx::sqlite::SqliteRow) -> Team {
    Team {
        id: row.get("id"),
        name: row.get("name"),
        product_owner_id: row.get("product_owner_id"),
        project_manager_id: row.get("project_manager_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
