//! Supplier repository operations.

use sqlx::Row;
use uuid::Uuid;

use super::{from_json, now_rfc3339, to_json, Repository};
use crate::errors::AppError;
use crate::models::{ComplianceDocument, CreateSupplierRequest, Supplier, UpdateSupplierRequest};

const SUPPLIER_COLUMNS: &str = "id, name, email, phone, address, materials, \
     compliance_documents, order_history, created_at, updated_at";

impl Repository {
    /// List suppliers with optional pagination.
    pub async fn list_suppliers(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Supplier>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM suppliers ORDER BY name LIMIT ? OFFSET ?"
        ))
        .bind(limit.unwrap_or(-1))
        .bind(offset.unwrap_or(0))
        .fetch_all(self.pool())
        .await?;

        Ok(rows.iter().map(supplier_from_row).collect())
    }

    /// Get a supplier by ID.
    pub async fn get_supplier(&self, id: &str) -> Result<Option<Supplier>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.as_ref().map(supplier_from_row))
    }

    /// Register a new supplier.
    pub async fn create_supplier(
        &self,
        request: &CreateSupplierRequest,
    ) -> Result<Supplier, AppError> {
        let id = Uuid::new_v4().to_string();
        let now = now_rfc3339();

        sqlx::query(
            r#"INSERT INTO suppliers (
                id, name, email, phone, address, materials,
                compliance_documents, order_history, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, '[]', '[]', ?, ?)"#,
        )
        .bind(&id)
        .bind(&request.name)
        .bind(&request.email)
        .bind(&request.phone)
        .bind(&request.address)
        .bind(to_json(&request.materials))
        .bind(&now)
        .bind(&now)
        .execute(self.pool())
        .await?;

        Ok(Supplier {
            id,
            name: request.name.clone(),
            email: request.email.clone(),
            phone: request.phone.clone(),
            address: request.address.clone(),
            materials: request.materials.clone(),
            compliance_documents: Vec::new(),
            order_history: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Update a supplier.
    pub async fn update_supplier(
        &self,
        id: &str,
        request: &UpdateSupplierRequest,
    ) -> Result<Supplier, AppError> {
        let existing = self
            .get_supplier(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Supplier {} not found", id)))?;

        let now = now_rfc3339();
        let name = request.name.as_ref().unwrap_or(&existing.name);
        let email = request.email.clone().or(existing.email.clone());
        let phone = request.phone.clone().or(existing.phone.clone());
        let address = request.address.clone().or(existing.address.clone());
        let materials = request
            .materials
            .clone()
            .unwrap_or_else(|| existing.materials.clone());
        let order_history = request
            .order_history
            .clone()
            .unwrap_or_else(|| existing.order_history.clone());

        sqlx::query(
            r#"UPDATE suppliers SET
                name = ?, email = ?, phone = ?, address = ?, materials = ?,
                order_history = ?, updated_at = ?
            WHERE id = ?"#,
        )
        .bind(name)
        .bind(&email)
        .bind(&phone)
        .bind(&address)
        .bind(to_json(&materials))
        .bind(to_json(&order_history))
        .bind(&now)
        .bind(id)
        .execute(self.pool())
        .await?;

        Ok(Supplier {
            id: id.to_string(),
            name: name.clone(),
            email,
            phone,
            address,
            materials,
            compliance_documents: existing.compliance_documents,
            order_history,
            created_at: existing.created_at,
            updated_at: now,
        })
    }

    /// Delete a supplier.
    pub async fn delete_supplier(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Supplier {} not found", id)));
        }

        Ok(())
    }

    /// Record a compliance document upload for a supplier.
    pub async fn add_supplier_compliance_document(
        &self,
        id: &str,
        name: &str,
        file_url: &str,
    ) -> Result<Supplier, AppError> {
        let mut existing = self
            .get_supplier(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Supplier {} not found", id)))?;

        existing.compliance_documents.push(ComplianceDocument {
            name: name.to_string(),
            file_url: file_url.to_string(),
            uploaded_at: now_rfc3339(),
        });
        self.write_supplier_compliance(id, &existing).await?;

        Ok(existing)
    }

    /// Remove a supplier's compliance document, keyed by URL.
    pub async fn remove_supplier_compliance_document(
        &self,
        id: &str,
        file_url: &str,
    ) -> Result<Supplier, AppError> {
        let mut existing = self
            .get_supplier(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Supplier {} not found", id)))?;

        existing
            .compliance_documents
            .retain(|d| d.file_url != file_url);
        self.write_supplier_compliance(id, &existing).await?;

        Ok(existing)
    }

    async fn write_supplier_compliance(&self, id: &str, supplier: &Supplier) -> Result<(), AppError> {
        let now = now_rfc3339();
        sqlx::query("UPDATE suppliers SET compliance_documents = ?, updated_at = ? WHERE id = ?")
            .bind(to_json(&supplier.compliance_documents))
            .bind(&now)
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(())
    }
}

fn supplier_from_row(row: &sqlx::sqlite::SqliteRow) -> Supplier {
    let materials: Option<String> = row.get("materials");
    let compliance_documents: Option<String> = row.get("compliance_documents");
    let order_history: Option<String> = row.get("order_history");

    Supplier {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        address: row.get("address"),
        materials: from_json(materials),
        compliance_documents: from_json(compliance_documents),
        order_history: from_json(order_history),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
