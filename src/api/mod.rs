//! REST API module.
//!
//! Contains all API routes and handlers following the frontend contract.

mod auth;
mod bills;
mod feedback;
mod meals;
mod menu;
mod notifications;
mod preferences;

pub use auth::*;
pub use bills::*;
pub use feedback::*;
pub use meals::*;
pub use menu::*;
pub use notifications::*;
pub use preferences::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}

/// Reject a blank required field.
fn require_field(value: &str, message: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(message.to_string()));
    }
    Ok(())
}
