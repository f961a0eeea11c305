//! Notification endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;

use super::{require_field, success, ApiResult};
use crate::models::{CreateNotificationRequest, NotificationItem};
use crate::AppState;

/// GET /api/notifications - All notifications, newest first.
pub async fn list_notifications(State(state): State<AppState>) -> ApiResult<Vec<NotificationItem>> {
    success(state.stores.notifications.list().await)
}

/// POST /api/admin/notifications - Send a notification.
pub async fn create_notification(
    State(state): State<AppState>,
    Json(request): Json<CreateNotificationRequest>,
) -> ApiResult<NotificationItem> {
    require_field(
        &request.title,
        "Please provide a title and message for the notification.",
    )?;
    require_field(
        &request.message,
        "Please provide a title and message for the notification.",
    )?;

    let notification = NotificationItem {
        id: uuid::Uuid::new_v4().to_string(),
        title: request.title,
        message: request.message,
        kind: request.kind,
        sent_at: Utc::now().to_rfc3339(),
    };

    success(state.stores.notifications.append(notification).await?)
}

/// DELETE /api/admin/notifications/{id} - Delete a notification.
pub async fn delete_notification(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.stores.notifications.delete(&id).await?;
    success(())
}
