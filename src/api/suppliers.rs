//! Supplier API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::{created, ok, ApiResult, ListParams};
use crate::errors::AppError;
use crate::models::{
    AddComplianceDocumentRequest, CreateSupplierRequest, RemoveComplianceDocumentRequest, Supplier,
    UpdateSupplierRequest,
};
use crate::AppState;

/// GET /api/suppliers - List suppliers.
pub async fn list_suppliers(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Vec<Supplier>> {
    let suppliers = state.repo.list_suppliers(params.limit, params.offset).await?;
    ok(suppliers)
}

/// GET /api/suppliers/:id - Get a single supplier.
pub async fn get_supplier(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Supplier> {
    match state.repo.get_supplier(&id).await? {
        Some(supplier) => ok(supplier),
        None => Err(AppError::NotFound(format!("Supplier {} not found", id))),
    }
}

/// POST /api/suppliers - Register a supplier.
pub async fn create_supplier(
    State(state): State<AppState>,
    Json(request): Json<CreateSupplierRequest>,
) -> ApiResult<Supplier> {
    if request.name.trim().is_empty() {
        return Err(AppError::Validation(
            "Supplier name is required".to_string(),
        ));
    }

    let supplier = state.repo.create_supplier(&request).await?;
    created(supplier)
}

/// PUT /api/suppliers/:id - Update a supplier.
pub async fn update_supplier(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateSupplierRequest>,
) -> ApiResult<Supplier> {
    let supplier = state.repo.update_supplier(&id, &request).await?;
    ok(supplier)
}

/// DELETE /api/suppliers/:id - Delete a supplier.
pub async fn delete_supplier(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.repo.delete_supplier(&id).await?;
    ok(())
}

/// POST /api/suppliers/:id/compliance-documents - Record a compliance upload.
pub async fn add_supplier_compliance_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AddComplianceDocumentRequest>,
) -> ApiResult<Supplier> {
    if request.name.trim().is_empty() || request.file_url.trim().is_empty() {
        return Err(AppError::Validation(
            "Document name and file url are required".to_string(),
        ));
    }

    let supplier = state
        .repo
        .add_supplier_compliance_document(&id, &request.name, &request.file_url)
        .await?;
    ok(supplier)
}

/// DELETE /api/suppliers/:id/compliance-documents - Remove a compliance document.
pub async fn remove_supplier_compliance_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<RemoveComplianceDocumentRequest>,
) -> ApiResult<Supplier> {
    let supplier = state
        .repo
        .remove_supplier_compliance_document(&id, &request.file_url)
        .await?;
    ok(supplier)
}
