//! HTTP Error Handling
//!
//! 守卫失败与 handler 错误统一在这里翻译成 HTTP 响应

use std::time::Duration;

use axum::{
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::application::{AuthError, ScopeError};
use crate::domain::ValidationIssue;

/// 许可证守卫的固定错误信息
pub const LICENSE_MISSING_MESSAGE: &str = "Plan lacks license for this feature";

/// 权限范围守卫的固定错误信息
pub const MISSING_SCOPE_MESSAGE: &str = "User is missing a scope required to perform this action";

/// 限流守卫的固定错误信息
pub const TOO_MANY_REQUESTS_MESSAGE: &str = "Too many requests";

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: message.into(),
        }
    }
}

/// 限流响应体
#[derive(Debug, Serialize)]
struct RateLimitResponse {
    message: &'static str,
}

/// API 错误
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthenticated,

    #[error("{0}")]
    Forbidden(String),

    #[error("Too many requests")]
    TooManyRequests { retry_after: Duration },

    /// body/query 校验失败，响应体为第一条校验错误
    #[error("validation failed: {0}")]
    Validation(ValidationIssue),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            ApiError::TooManyRequests { retry_after } => {
                tracing::warn!(retry_after_secs = retry_after.as_secs(), "Rate limit exceeded");
                let mut response = (
                    status,
                    Json(RateLimitResponse {
                        message: TOO_MANY_REQUESTS_MESSAGE,
                    }),
                )
                    .into_response();
                let secs = retry_after.as_secs().max(1);
                if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                    response.headers_mut().insert(RETRY_AFTER, value);
                }
                response
            }
            ApiError::Validation(issue) => {
                tracing::warn!(error = %issue, "Request validation failed");
                (status, Json(issue)).into_response()
            }
            ApiError::ServiceUnavailable(ref msg) | ApiError::Internal(ref msg) => {
                tracing::error!(status = status.as_u16(), error = %msg, "Request failed");
                (status, Json(ErrorResponse::new(msg.clone()))).into_response()
            }
            other => {
                tracing::debug!(status = status.as_u16(), error = %other, "Request rejected");
                (status, Json(ErrorResponse::new(other.to_string()))).into_response()
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::MissingCredentials | AuthError::InvalidCredentials => {
                ApiError::Unauthenticated
            }
            AuthError::Unavailable(msg) => ApiError::ServiceUnavailable(msg),
        }
    }
}

impl From<ScopeError> for ApiError {
    fn from(e: ScopeError) -> Self {
        match e {
            ScopeError::Unavailable(msg) => ApiError::ServiceUnavailable(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::{json, Value};

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_forbidden_body() {
        let response = ApiError::forbidden(LICENSE_MISSING_MESSAGE).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            body_json(response).await,
            json!({ "status": "error", "message": "Plan lacks license for this feature" })
        );
    }

    #[tokio::test]
    async fn test_too_many_requests_sets_retry_after() {
        let response = ApiError::TooManyRequests {
            retry_after: Duration::from_secs(30),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get(RETRY_AFTER).unwrap(), "30");
        assert_eq!(body_json(response).await, json!({ "message": "Too many requests" }));
    }

    #[tokio::test]
    async fn test_validation_body_is_issue() {
        let issue = ValidationIssue::new("invalid_type", "expected string", vec!["id".to_string()]);
        let response = ApiError::Validation(issue).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "code": "invalid_type", "message": "expected string", "path": ["id"] })
        );
    }

    #[test]
    fn test_auth_error_mapping() {
        assert!(matches!(
            ApiError::from(AuthError::MissingCredentials),
            ApiError::Unauthenticated
        ));
        assert!(matches!(
            ApiError::from(AuthError::Unavailable("down".into())),
            ApiError::ServiceUnavailable(_)
        ));
    }
}
