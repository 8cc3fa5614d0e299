//! Startup seeding of the moderator account.

use tracing::info;

use crate::auth::PasswordHasher;
use crate::config::MODERATOR_LOGIN;
use crate::db::{CredentialStore, StoreError};
use crate::error::{CoreError, CoreResult};
use crate::model::{NewCredential, Role};
use crate::types::{Login, UserId};

const MODERATOR_AVATAR: &str = "https://i.pravatar.cc/50";

/// Create the moderator record unless it already exists.
///
/// Returns the moderator's id either way. The bootstrap password is hashed
/// before it reaches the store; an existing record is left untouched.
pub async fn seed_moderator(
    store: &dyn CredentialStore,
    hasher: &PasswordHasher,
    password: &str,
) -> CoreResult<UserId> {
    if let Some(existing) = store.find_by_login(MODERATOR_LOGIN).await? {
        info!(id = %existing.id, "moderator already present");
        return Ok(existing.id);
    }

    let password_hash = hasher.hash(password).await?;
    let record = NewCredential {
        login: Login::new(MODERATOR_LOGIN),
        password_hash,
        name: "Moderator".to_string(),
        surname: "Moderator".to_string(),
        avatar: MODERATOR_AVATAR.to_string(),
        role: Role::Moderator,
    };

    match store.insert(record).await {
        Ok(id) => {
            info!(%id, "moderator seeded");
            Ok(id)
        }
        // Lost a race with another instance seeding at the same time.
        Err(StoreError::UniqueViolation(_)) => store
            .find_by_login(MODERATOR_LOGIN)
            .await?
            .map(|r| r.id)
            .ok_or(CoreError::NotFound),
        Err(e) => Err(e.into()),
    }
}
