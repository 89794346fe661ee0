//! Project repository operations, including the team-member and
//! attachment subdocument mutations.

use sqlx::Row;
use uuid::Uuid;

use super::{from_json, now_rfc3339, to_json, Repository};
use crate::errors::AppError;
use crate::models::{
    Attachment, CreateProjectRequest, Project, ProjectStatus, UpdateProjectRequest,
};

const PROJECT_COLUMNS: &str = "id, name, description, start_date, end_date, extended_date, \
     location, status, manager_id, member_ids, attachments, material_requests, \
     created_at, updated_at";

impl Repository {
    /// List projects with optional pagination.
    pub async fn list_projects(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Project>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY name LIMIT ? OFFSET ?"
        ))
        .bind(limit.unwrap_or(-1))
        .bind(offset.unwrap_or(0))
        .fetch_all(self.pool())
        .await?;

        Ok(rows.iter().map(project_from_row).collect())
    }

    /// Get a project by ID.
    pub async fn get_project(&self, id: &str) -> Result<Option<Project>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.as_ref().map(project_from_row))
    }

    /// Create a new project.
    pub async fn create_project(&self, request: &CreateProjectRequest) -> Result<Project, AppError> {
        let id = Uuid::new_v4().to_string();
        let now = now_rfc3339();
        let status = request.status.unwrap_or(ProjectStatus::Planning);

        sqlx::query(
            r#"INSERT INTO projects (
                id, name, description, start_date, end_date, extended_date,
                location, status, manager_id, member_ids, attachments,
                material_requests, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, NULL, ?, ?, ?, ?, '[]', '[]', ?, ?)"#,
        )
        .bind(&id)
        .bind(&request.name)
        .bind(&request.description)
        .bind(&request.start_date)
        .bind(&request.end_date)
        .bind(&request.location)
        .bind(status.as_str())
        .bind(&request.manager_id)
        .bind(to_json(&request.member_ids))
        .bind(&now)
        .bind(&now)
        .execute(self.pool())
        .await?;

        Ok(Project {
            id,
            name: request.name.clone(),
            description: request.description.clone(),
            start_date: request.start_date.clone(),
            end_date: request.end_date.clone(),
            extended_date: None,
            location: request.location.clone(),
            status,
            manager_id: request.manager_id.clone(),
            member_ids: request.member_ids.clone(),
            attachments: Vec::new(),
            material_requests: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Update a project.
    pub async fn update_project(
        &self,
        id: &str,
        request: &UpdateProjectRequest,
    ) -> Result<Project, AppError> {
        let existing = self
            .get_project(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Project {} not found", id)))?;

        let now = now_rfc3339();
        let name = request.name.as_ref().unwrap_or(&existing.name);
        let description = request.description.clone().or(existing.description.clone());
        let start_date = request.start_date.clone().or(existing.start_date.clone());
        let end_date = request.end_date.clone().or(existing.end_date.clone());
        let extended_date = request
            .extended_date
            .clone()
            .or(existing.extended_date.clone());
        let location = request.location.clone().or(existing.location.clone());
        let status = request.status.unwrap_or(existing.status);
        let manager_id = request.manager_id.clone().or(existing.manager_id.clone());
        let material_requests = request
            .material_requests
            .clone()
            .unwrap_or_else(|| existing.material_requests.clone());

        sqlx::query(
            r#"UPDATE projects SET
                name = ?, description = ?, start_date = ?, end_date = ?,
                extended_date = ?, location = ?, status = ?, manager_id = ?,
                material_requests = ?, updated_at = ?
            WHERE id = ?"#,
        )
        .bind(name)
        .bind(&description)
        .bind(&start_date)
        .bind(&end_date)
        .bind(&extended_date)
        .bind(&location)
        .bind(status.as_str())
        .bind(&manager_id)
        .bind(to_json(&material_requests))
        .bind(&now)
        .bind(id)
        .execute(self.pool())
        .await?;

        Ok(Project {
            id: id.to_string(),
            name: name.clone(),
            description,
            start_date,
            end_date,
            extended_date,
            location,
            status,
            manager_id,
            member_ids: existing.member_ids,
            attachments: existing.attachments,
            material_requests,
            created_at: existing.created_at,
            updated_at: now,
        })
    }

    /// Delete a project.
    pub async fn delete_project(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Project {} not found", id)));
        }

        Ok(())
    }

    /// Add a user to the project team. Adding twice is a no-op.
    pub async fn add_project_member(&self, id: &str, user_id: &str) -> Result<Project, AppError> {
        let mut existing = self
            .get_project(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Project {} not found", id)))?;

        if !existing.member_ids.iter().any(|m| m == user_id) {
            existing.member_ids.push(user_id.to_string());
            self.write_project_members(id, &existing).await?;
        }

        Ok(existing)
    }

    /// Remove a user from the project team.
    pub async fn remove_project_member(&self, id: &str, user_id: &str) -> Result<Project, AppError> {
        let mut existing = self
            .get_project(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Project {} not found", id)))?;

        existing.member_ids.retain(|m| m != user_id);
        self.write_project_members(id, &existing).await?;

        Ok(existing)
    }

    /// Record a file attachment on a project.
    pub async fn add_project_attachment(
        &self,
        id: &str,
        attachment: Attachment,
    ) -> Result<Project, AppError> {
        let mut existing = self
            .get_project(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Project {} not found", id)))?;

        existing.attachments.push(attachment);
        self.write_project_attachments(id, &existing).await?;

        Ok(existing)
    }

    /// Remove a file attachment from a project, keyed by URL.
    pub async fn remove_project_attachment(
        &self,
        id: &str,
        file_url: &str,
    ) -> Result<Project, AppError> {
        let mut existing = self
            .get_project(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Project {} not found", id)))?;

        existing.attachments.retain(|a| a.file_url != file_url);
        self.write_project_attachments(id, &existing).await?;

        Ok(existing)
    }

    async fn write_project_members(&self, id: &str, project: &Project) -> Result<(), AppError> {
        let now = now_rfc3339();
        sqlx::query("UPDATE projects SET member_ids = ?, updated_at = ? WHERE id = ?")
            .bind(to_json(&project.member_ids))
            .bind(&now)
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    async fn write_project_attachments(&self, id: &str, project: &Project) -> Result<(), AppError> {
        let now = now_rfc3339();
        sqlx::query("UPDATE projects SET attachments = ?, updated_at = ? WHERE id = ?")
            .bind(to_json(&project.attachments))
            .bind(&now)
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(())
    }
}

fn project_from_row(row: &sqlx::sqlite::SqliteRow) -> Project {
    let status: String = row.get("status");
    let member_ids: Option<String> = row.get("member_ids");
    let attachments: Option<String> = row.get("attachments");
    let material_requests: Option<String> = row.get("material_requests");

    Project {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        extended_date: row.get("extended_date"),
        location: row.get("location"),
        status: ProjectStatus::from_str(&status).unwrap_or(ProjectStatus::Planning),
        manager_id: row.get("manager_id"),
        member_ids: from_json(member_ids),
        attachments: from_json(attachments),
        material_requests: from_json(material_requests),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
