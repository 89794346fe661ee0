//! Employee API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::{created, ok, ApiResult, ListParams};
use crate::errors::AppError;
use crate::models::{CreateEmployeeRequest, Employee, UpdateEmployeeRequest};
use crate::AppState;

/// GET /api/employees - List employees.
pub async fn list_employees(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Vec<Employee>> {
    let employees = state.repo.list_employees(params.limit, params.offset).await?;
    ok(employees)
}

/// GET /api/employees/:id - Get a single employee.
pub async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Employee> {
    match state.repo.get_employee(&id).await? {
        Some(employee) => ok(employee),
        None => Err(AppError::NotFound(format!("Employee {} not found", id))),
    }
}

/// POST /api/employees - Create an employee.
pub async fn create_employee(
    State(state): State<AppState>,
    Json(request): Json<CreateEmployeeRequest>,
) -> ApiResult<Employee> {
    if request.name.trim().is_empty() {
        return Err(AppError::Validation(
            "Employee name is required".to_string(),
        ));
    }
    if request.role.trim().is_empty() {
        return Err(AppError::Validation(
            "Employee role is required".to_string(),
        ));
    }

    let employee = state.repo.create_employee(&request).await?;
    created(employee)
}

/// PUT /api/employees/:id - Update an employee.
pub async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateEmployeeRequest>,
) -> ApiResult<Employee> {
    let employee = state.repo.update_employee(&id, &request).await?;
    ok(employee)
}

/// DELETE /api/employees/:id - Delete an employee.
pub async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.repo.delete_employee(&id).await?;
    ok(())
}
