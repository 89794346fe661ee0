//! Leave request repository operations.

use sqlx::Row;
use uuid::Uuid;

use super::{now_rfc3339, Repository};
use crate::errors::AppError;
use crate::models::{CreateLeaveRequest, Leave, LeaveStatus};

const LEAVE_COLUMNS: &str =
    "id, employee_id, leave_type, start_date, end_date, status, reason, created_at, updated_at";

impl Repository {
    /// List leave requests, optionally scoped to an employee.
    pub async fn list_leaves(&self, employee_id: Option<&str>) -> Result<Vec<Leave>, AppError> {
        let rows = match employee_id {
            Some(eid) => {
                sqlx::query(&format!(
                    "SELECT {LEAVE_COLUMNS} FROM leaves WHERE employee_id = ? ORDER BY created_at"
                ))
                .bind(eid)
                .fetch_all(self.pool())
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {LEAVE_COLUMNS} FROM leaves ORDER BY created_at"
                ))
                .fetch_all(self.pool())
                .await?
            }
        };

        Ok(rows.iter().map(leave_from_row).collect())
    }

    /// Get a leave request by ID.
    pub async fn get_leave(&self, id: &str) -> Result<Option<Leave>, AppError> {
        let row = sqlx::query(&format!("SELECT {LEAVE_COLUMNS} FROM leaves WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        Ok(row.as_ref().map(leave_from_row))
    }

    /// File a leave request. The employee must exist. New requests start PENDING.
    pub async fn create_leave(&self, request: &CreateLeaveRequest) -> Result<Leave, AppError> {
        if self.get_employee(&request.employee_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Employee {} not found",
                request.employee_id
            )));
        }

        let id = Uuid::new_v4().to_string();
        let now = now_rfc3339();

        sqlx::query(
            r#"INSERT INTO leaves (
                id, employee_id, leave_type, start_date, end_date, status,
                reason, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, 'PENDING', ?, ?, ?)"#,
        )
        .bind(&id)
        .bind(&request.employee_id)
        .bind(&request.leave_type)
        .bind(&request.start_date)
        .bind(&request.end_date)
        .bind(&request.reason)
        .bind(&now)
        .bind(&now)
        .execute(self.pool())
        .await?;

        Ok(Leave {
            id,
            employee_id: request.employee_id.clone(),
            leave_type: request.leave_type.clone(),
            start_date: request.start_date.clone(),
            end_date: request.end_date.clone(),
            status: LeaveStatus::Pending,
            reason: request.reason.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Approve or reject a leave request.
    pub async fn set_leave_status(&self, id: &str, status: LeaveStatus) -> Result<Leave, AppError> {
        let now = now_rfc3339();
        let result = sqlx::query("UPDATE leaves SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(&now)
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Leave {} not found", id)));
        }

        self.get_leave(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Leave {} not found", id)))
    }

    /// Delete a leave request.
    pub async fn delete_leave(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM leaves WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Leave {} not found", id)));
        }

        Ok(())
    }
}

fn leave_from_row(row: &sqlx::sqlite::SqliteRow) -> Leave {
    let status: String = row.get("status");
    Leave {
        id: row.get("id"),
        employee_id: row.get("employee_id"),
        leave_type: row.get("leave_type"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        status: LeaveStatus::from_str(&status).unwrap_or(LeaveStatus::Pending),
        reason: row.get("reason"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
