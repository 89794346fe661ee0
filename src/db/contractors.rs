//! Contractor repository operations.

use sqlx::Row;
use uuid::Uuid;

use super::{from_json, now_rfc3339, to_json, Repository};
use crate::errors::AppError;
use crate::models::{
    ComplianceDocument, Contractor, CreateContractorRequest, UpdateContractorRequest,
};

const CONTRACTOR_COLUMNS: &str = "id, name, email, phone, address, specialties, \
     compliance_documents, project_history, created_at, updated_at";

impl Repository {
    /// List contractors with optional pagination.
    pub async fn list_contractors(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Contractor>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {CONTRACTOR_COLUMNS} FROM contractors ORDER BY name LIMIT ? OFFSET ?"
        ))
        .bind(limit.unwrap_or(-1))
        .bind(offset.unwrap_or(0))
        .fetch_all(self.pool())
        .await?;

        Ok(rows.iter().map(contractor_from_row).collect())
    }

    /// Get a contractor by ID.
    pub async fn get_contractor(&self, id: &str) -> Result<Option<Contractor>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {CONTRACTOR_COLUMNS} FROM contractors WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.as_ref().map(contractor_from_row))
    }

    /// Register a new contractor.
    pub async fn create_contractor(
        &self,
        request: &CreateContractorRequest,
    ) -> Result<Contractor, AppError> {
        let id = Uuid::new_v4().to_string();
        let now = now_rfc3339();

        sqlx::query(
            r#"INSERT INTO contractors (
                id, name, email, phone, address, specialties,
                compliance_documents, project_history, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, '[]', '[]', ?, ?)"#,
        )
        .bind(&id)
        .bind(&request.name)
        .bind(&request.email)
        .bind(&request.phone)
        .bind(&request.address)
        .bind(to_json(&request.specialties))
        .bind(&now)
        .bind(&now)
        .execute(self.pool())
        .await?;

        Ok(Contractor {
            id,
            name: request.name.clone(),
            email: request.email.clone(),
            phone: request.phone.clone(),
            address: request.address.clone(),
            specialties: request.specialties.clone(),
            compliance_documents: Vec::new(),
            project_history: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Update a contractor.
    pub async fn update_contractor(
        &self,
        id: &str,
        request: &UpdateContractorRequest,
    ) -> Result<Contractor, AppError> {
        let existing = self
            .get_contractor(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Contractor {} not found", id)))?;

        let now = now_rfc3339();
        let name = request.name.as_ref().unwrap_or(&existing.name);
        let email = request.email.clone().or(existing.email.clone());
        let phone = request.phone.clone().or(existing.phone.clone());
        let address = request.address.clone().or(existing.address.clone());
        let specialties = request
            .specialties
            .clone()
            .unwrap_or_else(|| existing.specialties.clone());
        let project_history = request
            .project_history
            .clone()
            .unwrap_or_else(|| existing.project_history.clone());

        sqlx::query(
            r#"UPDATE contractors SET
                name = ?, email = ?, phone = ?, address = ?, specialties = ?,
                project_history = ?, updated_at = ?
            WHERE id = ?"#,
        )
        .bind(name)
        .bind(&email)
        .bind(&phone)
        .bind(&address)
        .bind(to_json(&specialties))
        .bind(to_json(&project_history))
        .bind(&now)
        .bind(id)
        .execute(self.pool())
        .await?;

        Ok(Contractor {
            id: id.to_string(),
            name: name.clone(),
            email,
            phone,
            address,
            specialties,
            compliance_documents: existing.compliance_documents,
            project_history,
            created_at: existing.created_at,
            updated_at: now,
        })
    }

    /// Delete a contractor.
    pub async fn delete_contractor(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM contractors WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Contractor {} not found", id)));
        }

        Ok(())
    }

    /// Record a compliance document upload for a contractor.
    pub async fn add_contractor_compliance_document(
        &self,
        id: &str,
        name: &str,
        file_url: &str,
    ) -> Result<Contractor, AppError> {
        let mut existing = self
            .get_contractor(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Contractor {} not found", id)))?;

        existing.compliance_documents.push(ComplianceDocument {
            name: name.to_string(),
            file_url: file_url.to_string(),
            uploaded_at: now_rfc3339(),
        });
        self.write_contractor_compliance(id, &existing).await?;

        Ok(existing)
    }

    /// Remove a contractor's compliance document, keyed by URL.
    pub async fn remove_contractor_compliance_document(
        &self,
        id: &str,
        file_url: &str,
    ) -> Result<Contractor, AppError> {
        let mut existing = self
            .get_contractor(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Contractor {} not found", id)))?;

        existing
            .compliance_documents
            .retain(|d| d.file_url != file_url);
        self.write_contractor_compliance(id, &existing).await?;

        Ok(existing)
    }

    async fn write_contractor_compliance(
        &self,
        id: &str,
        contractor: &Contractor,
    ) -> Result<(), AppError> {
        let now = now_rfc3339();
        sqlx::query("UPDATE contractors SET compliance_documents = ?, updated_at = ? WHERE id = ?")
            .bind(to_json(&contractor.compliance_documents))
            .bind(&now)
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(())
    }
}

fn contractor_from_row(row: &sqlx::sqlite::SqliteRow) -> Contractor {
    let specialties: Option<String> = row.get("specialties");
    let compliance_documents: Option<String> = row.get("compliance_documents");
    let project_history: Option<String> = row.get("project_history");

    Contractor {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        address: row.get("address"),
        specialties: from_json(specialties),
        compliance_documents: from_json(compliance_documents),
        project_history: from_json(project_history),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
