//! NewType wrappers for strong typing throughout the directory.
//!
//! These types prevent accidental mixing of semantically different values
//! (e.g., passing a plaintext password where a stored hash is expected).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Macro to generate a NewType wrapper with standard trait implementations.
macro_rules! newtype_string {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new instance.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Get the inner value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner String.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

newtype_string!(
    /// Unique login name of a directory user.
    ///
    /// Immutable after creation; used as the lookup key at login.
    Login
);

newtype_string!(
    /// Argon2 hash of a password in PHC string format.
    ///
    /// Never returned to API callers; replaced wholesale on password change.
    HashedPassword
);

/// Stable numeric identity of a credential record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a path segment is not a valid user id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidUserId(pub String);

impl fmt::Display for InvalidUserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid user id: {:?}", self.0)
    }
}

impl std::error::Error for InvalidUserId {}

impl FromStr for UserId {
    type Err = InvalidUserId;

    /// Ids are positive integers; anything else is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<i64>() {
            Ok(v) if v > 0 => Ok(Self(v)),
            _ => Err(InvalidUserId(s.to_string())),
        }
    }
}

/// Shared HMAC secret used to sign and verify bearer tokens.
///
/// Debug output is redacted so the secret never ends up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    pub fn new(value: impl Into<Vec<u8>>) -> Self {
        Self(value.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_parses_positive_integers() {
        assert_eq!("42".parse::<UserId>(), Ok(UserId::new(42)));
        assert_eq!(" 7 ".parse::<UserId>(), Ok(UserId::new(7)));
    }

    #[test]
    fn test_user_id_rejects_garbage() {
        assert!("abc".parse::<UserId>().is_err());
        assert!("".parse::<UserId>().is_err());
        assert!("0".parse::<UserId>().is_err());
        assert!("-3".parse::<UserId>().is_err());
        assert!("1.5".parse::<UserId>().is_err());
    }

    #[test]
    fn test_login_newtype() {
        let login = Login::new("alice");
        assert_eq!(login.as_str(), "alice");
        assert_eq!(login.to_string(), "alice");
        assert_eq!(Login::from("alice"), login);
    }

    #[test]
    fn test_signing_secret_debug_is_redacted() {
        let secret = SigningSecret::new("hunter2");
        let rendered = format!("{:?}", secret);
        assert!(!rendered.contains("hunter2"));
        assert_eq!(secret.as_bytes(), b"hunter2");
    }
}
