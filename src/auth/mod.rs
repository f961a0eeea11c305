//! Session-based authentication module.
//!
//! Requests carry the session token issued at login; the middleware resolves
//! it to the logged-in user. Password checks use constant-time comparison.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
    Extension,
};
use subtle::ConstantTimeEq;

use crate::errors::AppError;
use crate::models::User;
use crate::AppState;

/// Header name for the session token.
pub const SESSION_HEADER: &str = "x-session-token";

/// The authenticated caller, inserted into request extensions.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub user: User,
    pub session_token: String,
}

/// Read the session token from `x-session-token` or a bearer `Authorization` header.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let direct = headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    direct.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    })
}

/// Reject requests without a valid session.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = session_token(request.headers()) else {
        return AppError::Unauthorized("Missing session token".to_string()).into_response();
    };

    match state.stores.sessions.get(&token).await {
        Some(user) => {
            tracing::debug!("Session resolved for {}", user.id);
            request.extensions_mut().insert(CurrentUser {
                user,
                session_token: token,
            });
            next.run(request).await
        }
        None => AppError::Unauthorized("Invalid or expired session".to_string()).into_response(),
    }
}

/// Reject non-admin callers. Must run after [`require_session`].
pub async fn require_admin(
    Extension(current): Extension<CurrentUser>,
    request: Request,
    next: Next,
) -> Response {
    if current.user.is_admin() {
        next.run(request).await
    } else {
        tracing::warn!("Admin access denied for {}", current.user.id);
        AppError::Forbidden("Admin access required".to_string()).into_response()
    }
}

/// Perform constant-time string comparison.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    a_bytes.ct_eq(b_bytes).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_constant_time_compare_equal() {
        assert!(constant_time_compare("password", "password"));
    }

    #[test]
    fn test_constant_time_compare_not_equal() {
        assert!(!constant_time_compare("password", "Password"));
    }

    #[test]
    fn test_constant_time_compare_different_lengths() {
        assert!(!constant_time_compare("short", "much-longer-password"));
    }

    #[test]
    fn test_constant_time_compare_empty() {
        assert!(constant_time_compare("", ""));
        assert!(!constant_time_compare("", "not-empty"));
    }

    #[test]
    fn test_session_token_sources() {
        let mut headers = HeaderMap::new();
        assert!(session_token(&headers).is_none());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(session_token(&headers).as_deref(), Some("abc"));

        headers.insert(SESSION_HEADER, HeaderValue::from_static("xyz"));
        assert_eq!(session_token(&headers).as_deref(), Some("xyz"));

        let mut basic = HeaderMap::new();
        basic.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(session_token(&basic).is_none());
    }
}
