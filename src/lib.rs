// Core modules
mod config;
mod db;
mod error;
mod model;
mod types;

pub mod api;
pub mod auth;
pub mod users;

// Re-export key types and functions
pub use config::{DEFAULT_TOKEN_TTL_HOURS, HashingCost, MODERATOR_LOGIN, ServiceConfig};
pub use db::{
    CredentialStore, DatabaseConfig, StoreError, SurrealCredentialStore, create_connection,
    ensure_schema,
};
pub use error::{CoreError, CoreResult};
pub use model::{CredentialRecord, NewUser, Profile, ProfileEdit, Role, UserSummary};
pub use types::{HashedPassword, Login, SigningSecret, UserId};

pub use api::{AppState, create_router};

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use auth::PasswordHasher;

/// Convenience function to wire a fully configured service.
///
/// Connects to the store, ensures the schema, seeds the moderator and builds
/// the handler state. The returned state is ready for [`create_router`].
pub async fn build_state(config: &ServiceConfig) -> Result<AppState> {
    config.validate()?;

    let db = create_connection(config.database.clone()).await?;
    ensure_schema(&db).await?;
    let store: Arc<dyn CredentialStore> = Arc::new(SurrealCredentialStore::new(db));

    let hasher = PasswordHasher::new(config.hashing)?;
    let moderator =
        users::seed_moderator(store.as_ref(), &hasher, &config.moderator_password).await?;
    info!(%moderator, "credential store ready");

    Ok(AppState::new(
        store,
        hasher,
        &config.secret,
        config.token_ttl(),
    ))
}
