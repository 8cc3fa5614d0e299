//! Signed bearer tokens.
//!
//! Tokens are compact JWTs signed with HMAC-SHA256 over the shared secret.
//! The claims are exactly the [`TokenPayload`] fields; nothing else is trusted.

use std::fmt;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::Role;
use crate::types::{Login, SigningSecret, UserId};

/// Identity, role and expiry embedded in every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    pub id: UserId,
    pub login: Login,
    pub role: Role,
    /// Absolute expiry as a unix timestamp (seconds).
    pub exp: i64,
}

/// Reasons a token string is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The structure is not a valid token (parts, encoding, claims).
    Malformed(String),
    /// The integrity tag does not match the secret.
    InvalidSignature,
    /// The signature is valid but the expiry has passed.
    Expired,
    /// Encoding failed.
    Encoding(String),
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(msg) => write!(f, "Malformed token: {}", msg),
            Self::InvalidSignature => write!(f, "Token signature is invalid"),
            Self::Expired => write!(f, "Token has expired"),
            Self::Encoding(msg) => write!(f, "Token encoding failed: {}", msg),
        }
    }
}

impl std::error::Error for TokenError {}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::Malformed(err.to_string()),
        }
    }
}

/// Encodes and verifies tokens with a secret injected at construction.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(secret: &SigningSecret) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below against an explicit instant.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn encode(&self, payload: &TokenPayload) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), payload, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Verify a token at the current time.
    pub fn decode(&self, token: &str) -> Result<TokenPayload, TokenError> {
        self.decode_at(token, chrono::Utc::now().timestamp())
    }

    /// Verify a token as of the unix timestamp `now`.
    ///
    /// The signature is always checked before the expiry, so a forged token
    /// never reports `Expired`.
    pub fn decode_at(&self, token: &str, now: i64) -> Result<TokenPayload, TokenError> {
        let data = decode::<TokenPayload>(token, &self.decoding_key, &self.validation)?;
        let payload = data.claims;

        if payload.exp <= now {
            debug!(id = %payload.id, exp = payload.exp, now, "token expired");
            return Err(TokenError::Expired);
        }

        Ok(payload)
    }
}
