//! Feedback endpoints. Feedback cannot be deleted.

use axum::{extract::State, Extension, Json};
use chrono::Utc;

use super::{require_field, success, ApiResult};
use crate::auth::CurrentUser;
use crate::models::{CreateFeedbackRequest, FeedbackItem};
use crate::AppState;

/// POST /api/feedback - Submit feedback as the caller.
pub async fn submit_feedback(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<CreateFeedbackRequest>,
) -> ApiResult<FeedbackItem> {
    require_field(
        &request.feedback_text,
        "Please write your feedback before submitting.",
    )?;

    let item = FeedbackItem {
        id: uuid::Uuid::new_v4().to_string(),
        student_id: current.user.id.clone(),
        student_name: current.user.name.clone(),
        feedback_text: request.feedback_text.trim().to_string(),
        submitted_at: Utc::now().to_rfc3339(),
    };

    success(state.stores.feedback.append(item).await?)
}

/// GET /api/feedback/mine - The caller's own feedback, newest first.
pub async fn my_feedback(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Vec<FeedbackItem>> {
    let user_id = current.user.id;
    success(
        state
            .stores
            .feedback
            .filter(|item| item.student_id == user_id)
            .await,
    )
}

/// GET /api/admin/feedback - All feedback, newest first.
pub async fn list_feedback(State(state): State<AppState>) -> ApiResult<Vec<FeedbackItem>> {
    success(state.stores.feedback.list().await)
}
