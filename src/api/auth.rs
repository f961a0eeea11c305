//! Registration, login and session endpoints.

use axum::{extract::State, Extension, Json};

use super::{require_field, success, ApiResult};
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::{LoginRequest, LoginResponse, RegisterRequest, User};
use crate::AppState;

/// POST /api/auth/register - Register a new student.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<User> {
    require_field(&request.name, "Name is required")?;
    require_field(&request.email, "Email is required")?;
    require_field(&request.password, "Password is required")?;

    let user = state.stores.users.register(&request).await?;
    success(user)
}

/// POST /api/auth/login - Check credentials and open a session.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let Some(user) = state
        .stores
        .users
        .authenticate(
            &request.email,
            &request.password,
            &state.config.fallback_password,
        )
        .await
    else {
        tracing::info!("Failed login for {}", request.email);
        return Err(AppError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    };

    let token = state.stores.sessions.create(&user).await?;
    tracing::info!("User {} logged in", user.id);
    success(LoginResponse { token, user })
}

/// POST /api/auth/logout - Close the caller's session.
pub async fn logout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<()> {
    state.stores.sessions.remove(&current.session_token).await?;
    tracing::info!("User {} logged out", current.user.id);
    success(())
}

/// GET /api/auth/me - The logged-in user, as currently stored in the directory.
pub async fn me(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<User> {
    let user = state
        .stores
        .users
        .get(&current.user.id)
        .await
        .unwrap_or(current.user);
    success(user)
}
