//! Employee repository operations.

use sqlx::Row;
use uuid::Uuid;

use super::{from_json, now_rfc3339, to_json, Repository};
use crate::errors::AppError;
use crate::models::{CreateEmployeeRequest, Employee, UpdateEmployeeRequest};

const EMPLOYEE_COLUMNS: &str = "id, name, role, permissions, email, phone, availability, \
     work_history, created_at, updated_at";

impl Repository {
    /// List employees with optional pagination.
    pub async fn list_employees(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Employee>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY name LIMIT ? OFFSET ?"
        ))
        .bind(limit.unwrap_or(-1))
        .bind(offset.unwrap_or(0))
        .fetch_all(self.pool())
        .await?;

        Ok(rows.iter().map(employee_from_row).collect())
    }

    /// Get an employee by ID.
    pub async fn get_employee(&self, id: &str) -> Result<Option<Employee>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.as_ref().map(employee_from_row))
    }

    /// Create a new employee.
    pub async fn create_employee(
        &self,
        request: &CreateEmployeeRequest,
    ) -> Result<Employee, AppError> {
        let id = Uuid::new_v4().to_string();
        let now = now_rfc3339();

        sqlx::query(
            r#"INSERT INTO employees (
                id, name, role, permissions, email, phone, availability,
                work_history, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, '[]', ?, ?)"#,
        )
        .bind(&id)
        .bind(&request.name)
        .bind(&request.role)
        .bind(to_json(&request.permissions))
        .bind(&request.email)
        .bind(&request.phone)
        .bind(&request.availability)
        .bind(&now)
        .bind(&now)
        .execute(self.pool())
        .await?;

        Ok(Employee {
            id,
            name: request.name.clone(),
            role: request.role.clone(),
            permissions: request.permissions.clone(),
            email: request.email.clone(),
            phone: request.phone.clone(),
            availability: request.availability.clone(),
            work_history: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Update an employee.
    pub async fn update_employee(
        &self,
        id: &str,
        request: &UpdateEmployeeRequest,
    ) -> Result<Employee, AppError> {
        let existing = self
            .get_employee(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", id)))?;

        let now = now_rfc3339();
        let name = request.name.as_ref().unwrap_or(&existing.name);
        let role = request.role.as_ref().unwrap_or(&existing.role);
        let permissions = request
            .permissions
            .clone()
            .unwrap_or_else(|| existing.permissions.clone());
        let email = request.email.clone().or(existing.email.clone());
        let phone = request.phone.clone().or(existing.phone.clone());
        let availability = request
            .availability
            .clone()
            .or(existing.availability.clone());
        let work_history = request
            .work_history
            .clone()
            .unwrap_or_else(|| existing.work_history.clone());

        sqlx::query(
            r#"UPDATE employees SET
                name = ?, role = ?, permissions = ?, email = ?, phone = ?,
                availability = ?, work_history = ?, updated_at = ?
            WHERE id = ?"#,
        )
        .bind(name)
        .bind(role)
        .bind(to_json(&permissions))
        .bind(&email)
        .bind(&phone)
        .bind(&availability)
        .bind(to_json(&work_history))
        .bind(&now)
        .bind(id)
        .execute(self.pool())
        .await?;

        Ok(Employee {
            id: id.to_string(),
            name: name.clone(),
            role: role.clone(),
            permissions,
            email,
            phone,
            availability,
            work_history,
            created_at: existing.created_at,
            updated_at: now,
        })
    }

    /// Delete an employee.
    pub async fn delete_employee(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Employee {} not found", id)));
        }

        Ok(())
    }
}

fn employee_from_row(row: &sqlx::sqlite::SqliteRow) -> Employee {
    let permissions: Option<String> = row.get("permissions");
    let work_history: Option<String> = row.get("work_history");

    Employee {
        id: row.get("id"),
        name: row.get("name"),
        role: row.get("role"),
        permissions: from_json(permissions),
        email: row.get("email"),
        phone: row.get("phone"),
        availability: row.get("availability"),
        work_history: from_json(work_history),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
