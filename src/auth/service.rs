//! Login: credential verification and token issuance.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::auth::password::{PasswordError, PasswordHasher};
use crate::auth::token::{TokenCodec, TokenPayload};
use crate::db::CredentialStore;
use crate::error::{CoreError, CoreResult};

/// A freshly signed token together with the payload it carries.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    #[serde(skip)]
    pub payload: TokenPayload,
}

pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    codec: TokenCodec,
    token_ttl: chrono::Duration,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: PasswordHasher,
        codec: TokenCodec,
        token_ttl: chrono::Duration,
    ) -> Self {
        Self {
            store,
            hasher,
            codec,
            token_ttl,
        }
    }

    /// Verify `login`/`password` and issue a token valid for the configured ttl.
    ///
    /// Unknown and soft-deleted logins still pay for a password verification
    /// so the two failure kinds take comparable time.
    pub async fn login(&self, login: &str, password: &str) -> CoreResult<IssuedToken> {
        let login = login.trim();
        let record = match self.store.find_by_login(login).await? {
            Some(record) if !record.removed => record,
            found => {
                self.hasher.verify_dummy(password).await;
                if found.is_some() {
                    warn!(login, "login attempt for removed user");
                } else {
                    warn!(login, "login attempt for unknown user");
                }
                return Err(CoreError::InvalidLogin);
            }
        };

        match self.hasher.verify(&record.password_hash, password).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(login, "password mismatch");
                return Err(CoreError::InvalidPassword);
            }
            Err(PasswordError::MalformedHash(msg)) => {
                return Err(CoreError::Internal(format!(
                    "stored hash for user {} is corrupt: {}",
                    record.id, msg
                )));
            }
            Err(e) => return Err(e.into()),
        }

        let expires_at = chrono::Utc::now()
            .checked_add_signed(self.token_ttl)
            .ok_or_else(|| {
                CoreError::Internal(format!("token ttl {} out of range", self.token_ttl))
            })?;

        let payload = TokenPayload {
            id: record.id,
            login: record.login.clone(),
            role: record.effective_role(),
            exp: expires_at.timestamp(),
        };

        let token = self
            .codec
            .encode(&payload)
            .map_err(|e| CoreError::Internal(e.to_string()))?;

        info!(id = %payload.id, role = %payload.role, "token issued");

        Ok(IssuedToken { token, payload })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HashingCost;
    use crate::db::{DatabaseConfig, SurrealCredentialStore, create_connection, ensure_schema};
    use crate::model::{NewCredential, Role};
    use crate::types::{HashedPassword, Login, SigningSecret, UserId};

    struct Fixture {
        store: Arc<SurrealCredentialStore>,
        hasher: PasswordHasher,
        codec: TokenCodec,
        service: AuthService,
    }

    async fn setup() -> Fixture {
        setup_with_ttl(chrono::Duration::hours(10)).await
    }

    async fn setup_with_ttl(token_ttl: chrono::Duration) -> Fixture {
        let config = DatabaseConfig {
            url: "memory".to_string(),
            ..Default::default()
        };
        let db = create_connection(config).await.unwrap();
        ensure_schema(&db).await.unwrap();

        let store = Arc::new(SurrealCredentialStore::new(db));
        let hasher = PasswordHasher::new(HashingCost::minimal()).unwrap();
        let codec = TokenCodec::new(&SigningSecret::new("auth-service-secret"));
        let service = AuthService::new(
            store.clone(),
            hasher.clone(),
            codec.clone(),
            token_ttl,
        );

        Fixture {
            store,
            hasher,
            codec,
            service,
        }
    }

    async fn add_user(fx: &Fixture, login: &str, password: &str, role: Role) -> UserId {
        let password_hash = fx.hasher.hash(password).await.unwrap();
        fx.store
            .insert(NewCredential {
                login: Login::new(login),
                password_hash,
                name: "N".to_string(),
                surname: "S".to_string(),
                avatar: String::new(),
                role,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_login_issues_decodable_token() {
        let fx = setup().await;
        let id = add_user(&fx, "alice", "p@ss", Role::Admin).await;

        let before = chrono::Utc::now().timestamp();
        let issued = fx.service.login("alice", "p@ss").await.unwrap();
        let after = chrono::Utc::now().timestamp();

        let decoded = fx.codec.decode(&issued.token).unwrap();
        assert_eq!(decoded, issued.payload);
        assert_eq!(decoded.id, id);
        assert_eq!(decoded.login.as_str(), "alice");
        assert_eq!(decoded.role, Role::Admin);

        let ten_hours = 10 * 60 * 60;
        assert!(decoded.exp >= before + ten_hours);
        assert!(decoded.exp <= after + ten_hours);
    }

    #[tokio::test]
    async fn test_wrong_password_is_invalid_password() {
        let fx = setup().await;
        add_user(&fx, "alice", "p@ss", Role::User).await;

        let err = fx.service.login("alice", "wrong").await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidPassword));
    }

    #[tokio::test]
    async fn test_unknown_login_is_invalid_login() {
        let fx = setup().await;
        add_user(&fx, "alice", "p@ss", Role::User).await;

        let err = fx.service.login("bob", "anything").await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidLogin));
    }

    #[tokio::test]
    async fn test_removed_user_cannot_log_in() {
        let fx = setup().await;
        let id = add_user(&fx, "alice", "p@ss", Role::User).await;
        fx.store.soft_delete(id).await.unwrap();

        let err = fx.service.login("alice", "p@ss").await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidLogin));
    }

    #[tokio::test]
    async fn test_corrupt_stored_hash_is_internal_error() {
        let fx = setup().await;
        fx.store
            .insert(NewCredential {
                login: Login::new("legacy"),
                password_hash: HashedPassword::new("plaintext"),
                name: "L".to_string(),
                surname: "L".to_string(),
                avatar: String::new(),
                role: Role::User,
            })
            .await
            .unwrap();

        let err = fx.service.login("legacy", "plaintext").await.unwrap_err();
        assert!(matches!(err, CoreError::Internal(_)));
    }

    #[tokio::test]
    async fn test_unrecognised_role_is_issued_as_user() {
        let fx = setup().await;
        let id = add_user(&fx, "alice", "p@ss", Role::User).await;
        fx.store
            .db()
            .query("UPDATE user SET role = 'ROOT' WHERE uid = $uid")
            .bind(("uid", id.get()))
            .await
            .unwrap()
            .check()
            .unwrap();

        let issued = fx.service.login("alice", "p@ss").await.unwrap();
        assert_eq!(issued.payload.role, Role::User);
    }

    #[tokio::test]
    async fn test_out_of_range_ttl_is_internal_error() {
        let fx = setup_with_ttl(chrono::Duration::days(100_000_000)).await;
        add_user(&fx, "alice", "p@ss", Role::User).await;

        let err = fx.service.login("alice", "p@ss").await.unwrap_err();
        assert!(matches!(err, CoreError::Internal(_)));
    }

    #[tokio::test]
    async fn test_login_ignores_surrounding_whitespace() {
        let fx = setup().await;
        let id = add_user(&fx, "alice", "p@ss", Role::User).await;

        let issued = fx.service.login("  alice ", "p@ss").await.unwrap();
        assert_eq!(issued.payload.id, id);
    }

    #[tokio::test]
    async fn test_relogin_after_role_change_carries_new_role() {
        let fx = setup().await;
        let id = add_user(&fx, "alice", "p@ss", Role::User).await;
        let old = fx.service.login("alice", "p@ss").await.unwrap();

        fx.store.update_role(id, Role::Admin).await.unwrap();
        let new = fx.service.login("alice", "p@ss").await.unwrap();

        assert_eq!(fx.codec.decode(&new.token).unwrap().role, Role::Admin);
        // No revocation: the earlier token keeps its issued role.
        assert_eq!(fx.codec.decode(&old.token).unwrap().role, Role::User);
    }
}
