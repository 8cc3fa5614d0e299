//! Error responses at the HTTP boundary.
//!
//! Only a stable tag and a status leave the process; the detailed message is
//! logged.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// JSON body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub errors: Vec<String>,
}

#[derive(Debug)]
pub enum ApiError {
    Core(CoreError),
    /// The request body could not be parsed.
    InvalidJson(String),
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self::Core(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidJson(rejection.body_text())
    }
}

impl ApiError {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Core(err) => err.tag(),
            Self::InvalidJson(_) => "err.json_invalid",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Core(err) => err.status(),
            Self::InvalidJson(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Core(err) if err.is_server_fault() => tracing::error!("request failed: {}", err),
            Self::Core(err) => tracing::info!(tag = err.tag(), "request rejected: {}", err),
            Self::InvalidJson(msg) => tracing::info!("invalid request body: {}", msg),
        }

        let body = ErrorBody {
            errors: vec![self.tag().to_string()],
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::DenyReason;

    #[test]
    fn test_core_error_tags_pass_through() {
        let err = ApiError::from(CoreError::Unauthorized(DenyReason::InvalidPrivilege));
        assert_eq!(err.tag(), "err.invalid_privilege");
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_response_carries_tag_only() {
        let response =
            ApiError::from(CoreError::StoreUnavailable("db at 10.1.1.1 down".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = std::str::from_utf8(&bytes).unwrap();
        assert_eq!(text, r#"{"errors":["err.unknown"]}"#);
        assert!(!text.contains("10.1.1.1"));

        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.errors, vec!["err.unknown".to_string()]);
    }

    #[test]
    fn test_invalid_json_tag() {
        let err = ApiError::InvalidJson("expected value".into());
        assert_eq!(err.tag(), "err.json_invalid");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
