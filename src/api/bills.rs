//! Uploaded bill endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;

use super::{require_field, success, ApiResult};
use crate::models::{CreateBillRequest, UploadedBill};
use crate::AppState;

/// GET /api/bills - All uploaded bills, newest first.
pub async fn list_bills(State(state): State<AppState>) -> ApiResult<Vec<UploadedBill>> {
    success(state.stores.bills.list().await)
}

/// POST /api/admin/bills - Record an uploaded bill.
pub async fn create_bill(
    State(state): State<AppState>,
    Json(request): Json<CreateBillRequest>,
) -> ApiResult<UploadedBill> {
    require_field(&request.name, "Please select a file to upload.")?;

    let bill = UploadedBill {
        id: uuid::Uuid::new_v4().to_string(),
        name: request.name,
        content_type: request.content_type,
        size: request.size,
        uploaded_at: Utc::now().to_rfc3339(),
    };

    success(state.stores.bills.append(bill).await?)
}

/// DELETE /api/admin/bills/{id} - Delete a bill.
pub async fn delete_bill(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.stores.bills.delete(&id).await?;
    success(())
}
