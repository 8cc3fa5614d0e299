//! Error taxonomy for the authentication and user-management core.
//!
//! Every variant maps to a stable string tag that is the only thing crossing
//! the external boundary. The `Display` output carries the internal context
//! and is meant for logs.

use http::StatusCode;
use std::fmt;

use crate::auth::DenyReason;
use crate::auth::password::PasswordError;
use crate::db::StoreError;

/// Errors produced by the core services.
#[derive(Debug, Clone)]
pub enum CoreError {
    /// No active credential record for the supplied login.
    InvalidLogin,
    /// The supplied password does not match the stored hash.
    InvalidPassword,
    /// Missing, invalid or expired bearer token.
    Unauthenticated,
    /// The guard denied the operation.
    Unauthorized(DenyReason),
    /// The target record does not exist (or is soft-deleted).
    NotFound,
    /// The login is already taken.
    UniqueViolation(String),
    /// Unparseable input such as a non-numeric path id.
    Malformed(String),
    /// The credential store failed.
    StoreUnavailable(String),
    /// Display fields were updated but the password write failed.
    PasswordNotUpdated(String),
    /// Anything else (hashing failure, corrupt stored hash, join errors).
    Internal(String),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLogin => write!(f, "Invalid login"),
            Self::InvalidPassword => write!(f, "Invalid password"),
            Self::Unauthenticated => write!(f, "Authentication required"),
            Self::Unauthorized(reason) => write!(f, "Operation denied: {}", reason),
            Self::NotFound => write!(f, "User not found"),
            Self::UniqueViolation(login) => write!(f, "Login already exists: {}", login),
            Self::Malformed(msg) => write!(f, "Malformed input: {}", msg),
            Self::StoreUnavailable(msg) => write!(f, "Credential store error: {}", msg),
            Self::PasswordNotUpdated(msg) => {
                write!(f, "Profile updated but password change failed: {}", msg)
            }
            Self::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for CoreError {}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(login) => Self::UniqueViolation(login),
            StoreError::Unavailable(msg) => Self::StoreUnavailable(msg),
        }
    }
}

impl From<PasswordError> for CoreError {
    fn from(err: PasswordError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl CoreError {
    /// Stable tag exposed to clients.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::InvalidLogin => "err.login_mismatch",
            Self::InvalidPassword => "err.password_mismatch",
            Self::Unauthenticated => "err.unauthenticated",
            Self::Unauthorized(DenyReason::BadRequest) | Self::Malformed(_) => "err.bad_request",
            Self::Unauthorized(DenyReason::InvalidPrivilege) => "err.invalid_privilege",
            Self::NotFound => "err.not_found",
            Self::UniqueViolation(_) => "err.login_exists",
            Self::PasswordNotUpdated(_) => "err.password_not_updated",
            Self::StoreUnavailable(_) | Self::Internal(_) => "err.unknown",
        }
    }

    /// HTTP status paired with the tag.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidLogin
            | Self::InvalidPassword
            | Self::Malformed(_)
            | Self::Unauthorized(DenyReason::BadRequest) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Unauthorized(DenyReason::InvalidPrivilege) => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::UniqueViolation(_) => StatusCode::CONFLICT,
            Self::PasswordNotUpdated(_) | Self::StoreUnavailable(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Whether the failure originates on the server side (logged at error level).
    pub fn is_server_fault(&self) -> bool {
        self.status().is_server_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authentication_failures_have_distinct_tags() {
        assert_eq!(CoreError::InvalidLogin.tag(), "err.login_mismatch");
        assert_eq!(CoreError::InvalidPassword.tag(), "err.password_mismatch");
        assert_eq!(CoreError::InvalidLogin.status(), StatusCode::BAD_REQUEST);
        assert_eq!(CoreError::InvalidPassword.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_denials_distinguish_bad_request_and_privilege() {
        let bad = CoreError::Unauthorized(DenyReason::BadRequest);
        let privilege = CoreError::Unauthorized(DenyReason::InvalidPrivilege);
        assert_eq!(bad.tag(), "err.bad_request");
        assert_eq!(privilege.tag(), "err.invalid_privilege");
        assert_eq!(privilege.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_store_errors_do_not_leak_details() {
        let err: CoreError = StoreError::Unavailable("connection refused to 10.0.0.3".into()).into();
        assert_eq!(err.tag(), "err.unknown");
        assert!(err.is_server_fault());
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_unique_violation_conversion() {
        let err: CoreError = StoreError::UniqueViolation("alice".into()).into();
        assert!(matches!(err, CoreError::UniqueViolation(ref l) if l == "alice"));
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_partial_update_is_reported_distinctly() {
        let err = CoreError::PasswordNotUpdated("disk full".into());
        assert_eq!(err.tag(), "err.password_not_updated");
        assert_ne!(err.tag(), CoreError::StoreUnavailable("x".into()).tag());
    }
}
