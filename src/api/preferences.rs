//! Theme preference endpoints.

use axum::{extract::State, Extension, Json};

use super::{success, ApiResult};
use crate::auth::CurrentUser;
use crate::models::ThemePreference;
use crate::AppState;

/// GET /api/preferences/theme
pub async fn get_theme(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<ThemePreference> {
    let theme = state.stores.preferences.theme(&current.user.id).await;
    success(ThemePreference { theme })
}

/// PUT /api/preferences/theme
pub async fn set_theme(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<ThemePreference>,
) -> ApiResult<ThemePreference> {
    let theme = state
        .stores
        .preferences
        .set_theme(&current.user.id, request.theme)
        .await?;
    success(ThemePreference { theme })
}

/// POST /api/preferences/theme/toggle
pub async fn toggle_theme(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<ThemePreference> {
    let theme = state
        .stores
        .preferences
        .toggle_theme(&current.user.id)
        .await?;
    success(ThemePreference { theme })
}
