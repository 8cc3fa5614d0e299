//! Bearer-token authentication for incoming requests.

use tracing::{debug, warn};

use crate::auth::context::Identity;
use crate::auth::token::{TokenCodec, TokenError};
use crate::error::CoreError;

/// Turns an `Authorization` header into an [`Identity`].
///
/// Never touches persistent state: the token alone decides.
#[derive(Clone)]
pub struct RequestAuthenticator {
    codec: TokenCodec,
}

impl RequestAuthenticator {
    pub fn new(codec: TokenCodec) -> Self {
        Self { codec }
    }

    /// Authenticate from the raw `Authorization` header value.
    ///
    /// Every failure collapses into [`CoreError::Unauthenticated`]; the
    /// underlying reason is only logged.
    pub fn authenticate(&self, authorization: Option<&str>) -> Result<Identity, CoreError> {
        let Some(header) = authorization else {
            debug!("request without authorization header");
            return Err(CoreError::Unauthenticated);
        };

        let Some(token) = bearer_token(header) else {
            warn!("authorization header is not a bearer token");
            return Err(CoreError::Unauthenticated);
        };

        match self.codec.decode(token) {
            Ok(payload) => {
                debug!(id = %payload.id, role = %payload.role, "bearer token verified");
                Ok(Identity::from(payload))
            }
            Err(TokenError::Expired) => {
                debug!("rejected expired token");
                Err(CoreError::Unauthenticated)
            }
            Err(e) => {
                warn!("rejected bearer token: {}", e);
                Err(CoreError::Unauthenticated)
            }
        }
    }
}

/// Extract the token from `Bearer <token>`. The scheme is case-insensitive.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::TokenPayload;
    use crate::model::Role;
    use crate::types::{Login, SigningSecret, UserId};

    fn codec() -> TokenCodec {
        TokenCodec::new(&SigningSecret::new("extractor-secret"))
    }

    fn token_expiring_in(seconds: i64) -> String {
        codec()
            .encode(&TokenPayload {
                id: UserId::new(4),
                login: Login::new("dave"),
                role: Role::User,
                exp: chrono::Utc::now().timestamp() + seconds,
            })
            .unwrap()
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer abc"), Some("abc"));
        assert_eq!(bearer_token("  Bearer   abc  "), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("abc"), None);
    }

    #[test]
    fn test_valid_token_yields_identity() {
        let authenticator = RequestAuthenticator::new(codec());
        let header = format!("Bearer {}", token_expiring_in(600));

        let identity = authenticator.authenticate(Some(&header)).unwrap();
        assert_eq!(identity.id, UserId::new(4));
        assert_eq!(identity.login.as_str(), "dave");
        assert_eq!(identity.role, Role::User);
    }

    #[test]
    fn test_missing_header_is_unauthenticated() {
        let authenticator = RequestAuthenticator::new(codec());
        assert!(matches!(
            authenticator.authenticate(None),
            Err(CoreError::Unauthenticated)
        ));
    }

    #[test]
    fn test_every_decode_failure_is_unauthenticated() {
        let authenticator = RequestAuthenticator::new(codec());
        let foreign = TokenCodec::new(&SigningSecret::new("other"))
            .encode(&TokenPayload {
                id: UserId::new(1),
                login: Login::new("moderator"),
                role: Role::Moderator,
                exp: chrono::Utc::now().timestamp() + 600,
            })
            .unwrap();

        let headers = [
            format!("Bearer {}", token_expiring_in(-600)),
            format!("Bearer {}", foreign),
            "Bearer garbage".to_string(),
            format!("Token {}", token_expiring_in(600)),
        ];

        for header in &headers {
            assert!(
                matches!(
                    authenticator.authenticate(Some(header)),
                    Err(CoreError::Unauthenticated)
                ),
                "header {:?}",
                header
            );
        }
    }
}
