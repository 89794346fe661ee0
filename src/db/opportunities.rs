//! Opportunity (bid solicitation) repository operations.

use sqlx::Row;
use uuid::Uuid;

use super::{now_rfc3339, Repository};
use crate::errors::AppError;
use crate::models::{
    CreateOpportunityRequest, Opportunity, OpportunityStatus, UpdateOpportunityRequest,
};

pub(crate) const OPPORTUNITY_COLUMNS: &str =
    "id, title, content, project_id, deadline, status, contractor_id, created_at, updated_at";

impl Repository {
    /// List opportunities, optionally scoped to a project.
    pub async fn list_opportunities(
        &self,
        project_id: Option<&str>,
    ) -> Result<Vec<Opportunity>, AppError> {
        let rows = match project_id {
            Some(pid) => {
                sqlx::query(&format!(
                    "SELECT {OPPORTUNITY_COLUMNS} FROM opportunities WHERE project_id = ? ORDER BY created_at"
                ))
                .bind(pid)
                .fetch_all(self.pool())
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {OPPORTUNITY_COLUMNS} FROM opportunities ORDER BY created_at"
                ))
                .fetch_all(self.pool())
                .await?
            }
        };

        Ok(rows.iter().map(opportunity_from_row).collect())
    }

    /// Get an opportunity by ID.
    pub async fn get_opportunity(&self, id: &str) -> Result<Option<Opportunity>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {OPPORTUNITY_COLUMNS} FROM opportunities WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.as_ref().map(opportunity_from_row))
    }

    /// Create a new opportunity. New opportunities always start OPEN.
    pub async fn create_opportunity(
        &self,
        request: &CreateOpportunityRequest,
    ) -> Result<Opportunity, AppError> {
        let id = Uuid::new_v4().to_string();
        let now = now_rfc3339();

        sqlx::query(
            r#"INSERT INTO opportunities (
                id, title, content, project_id, deadline, status, contractor_id,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, 'OPEN', NULL, ?, ?)"#,
        )
        .bind(&id)
        .bind(&request.title)
        .bind(&request.content)
        .bind(&request.project_id)
        .bind(&request.deadline)
        .bind(&now)
        .bind(&now)
        .execute(self.pool())
        .await?;

        Ok(Opportunity {
            id,
            title: request.title.clone(),
            content: request.content.clone(),
            project_id: request.project_id.clone(),
            deadline: request.deadline.clone(),
            status: OpportunityStatus::Open,
            contractor_id: None,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Update an opportunity (document editor save).
    pub async fn update_opportunity(
        &self,
        id: &str,
        request: &UpdateOpportunityRequest,
    ) -> Result<Opportunity, AppError> {
        let existing = self
            .get_opportunity(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Opportunity {} not found", id)))?;

        let now = now_rfc3339();
        let title = request.title.as_ref().unwrap_or(&existing.title);
        let content = request.content.as_ref().unwrap_or(&existing.content);
        let deadline = request.deadline.clone().or(existing.deadline.clone());
        let status = request.status.unwrap_or(existing.status);

        sqlx::query(
            "UPDATE opportunities SET title = ?, content = ?, deadline = ?, status = ?, updated_at = ? WHERE id = ?"
        )
        .bind(title)
        .bind(content)
        .bind(&deadline)
        .bind(status.as_str())
        .bind(&now)
        .bind(id)
        .execute(self.pool())
        .await?;

        Ok(Opportunity {
            id: id.to_string(),
            title: title.clone(),
            content: content.clone(),
            project_id: existing.project_id,
            deadline,
            status,
            contractor_id: existing.contractor_id,
            created_at: existing.created_at,
            updated_at: now,
        })
    }

    /// Delete an opportunity.
    pub async fn delete_opportunity(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM opportunities WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Opportunity {} not found", id)));
        }

        Ok(())
    }
}

pub(crate) fn opportunity_from_row(row: &sqlx::sqlite::SqliteRow) -> Opportunity {
    let status: String = row.get("status");
    Opportunity {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        project_id: row.get("project_id"),
        deadline: row.get("deadline"),
        status: OpportunityStatus::from_str(&status).unwrap_or(OpportunityStatus::Open),
        contractor_id: row.get("contractor_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
