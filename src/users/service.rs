//! Registration, profile and privileged user-management operations.
//!
//! Every operation that acts on behalf of a caller takes the
//! [`RequestContext`] and consults the guard before touching the store.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use crate::auth::{DenyReason, Operation, PasswordHasher, RequestContext, authorize};
use crate::db::CredentialStore;
use crate::error::{CoreError, CoreResult};
use crate::model::{
    CredentialRecord, NewCredential, NewUser, Profile, ProfileEdit, Role, UserSummary,
};
use crate::types::{Login, UserId};

/// Result of a successful profile edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EditOutcome {
    pub password_changed: bool,
}

pub struct UserService {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
}

impl UserService {
    pub fn new(store: Arc<dyn CredentialStore>, hasher: PasswordHasher) -> Self {
        Self { store, hasher }
    }

    /// Create a `USER` account. Needs no authentication.
    pub async fn register(&self, request: NewUser) -> CoreResult<UserId> {
        let login = request.login.trim();
        if login.is_empty() {
            return Err(CoreError::Malformed("login must not be empty".to_string()));
        }
        if request.password.is_empty() {
            return Err(CoreError::Malformed("password must not be empty".to_string()));
        }

        let password_hash = self.hasher.hash(&request.password).await?;
        let id = self
            .store
            .insert(NewCredential {
                login: Login::new(login),
                password_hash,
                name: request.name,
                surname: request.surname,
                avatar: request.avatar,
                role: Role::User,
            })
            .await?;

        info!(%id, login, "user registered");
        Ok(id)
    }

    pub async fn get_profile(&self, ctx: &RequestContext) -> CoreResult<Profile> {
        authorize(ctx, Operation::ReadProfile)?;
        let record = self.load_target(ctx).await?;
        Ok(record.to_profile())
    }

    /// Update name and surname, then the password if one is supplied.
    ///
    /// The two writes are independent. If the password write fails after the
    /// display fields were stored, the error says so.
    pub async fn edit_profile(
        &self,
        ctx: &RequestContext,
        edit: ProfileEdit,
    ) -> CoreResult<EditOutcome> {
        authorize(ctx, Operation::EditProfile)?;
        let record = self.load_target(ctx).await?;

        self.store
            .update_profile(record.id, &edit.name, &edit.surname)
            .await?;

        let Some(password) = edit.password.filter(|p| !p.is_empty()) else {
            info!(id = %record.id, "profile updated");
            return Ok(EditOutcome {
                password_changed: false,
            });
        };

        let result = match self.hasher.hash(&password).await {
            Ok(hash) => self
                .store
                .update_password(record.id, &hash)
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        if let Err(msg) = result {
            error!(id = %record.id, "profile updated but password change failed: {}", msg);
            return Err(CoreError::PasswordNotUpdated(msg));
        }

        info!(id = %record.id, "profile and password updated");
        Ok(EditOutcome {
            password_changed: true,
        })
    }

    /// All active users except the moderator, in store order.
    pub async fn list_active(&self, ctx: &RequestContext) -> CoreResult<Vec<UserSummary>> {
        authorize(ctx, Operation::ListUsers)?;
        let records = self.store.list_active().await?;
        Ok(records
            .iter()
            .filter(|r| !r.removed && !r.is_moderator())
            .map(CredentialRecord::to_summary)
            .collect())
    }

    /// Mark the target as removed. Tokens already issued to it stay valid
    /// until they expire.
    pub async fn soft_delete(&self, ctx: &RequestContext) -> CoreResult<()> {
        authorize(ctx, Operation::DeleteUser)?;
        let record = self.load_privileged_target(ctx).await?;

        self.store.soft_delete(record.id).await?;
        info!(
            actor = %ctx.identity().id,
            target = %record.id,
            user_agent = ctx.user_agent().unwrap_or("-"),
            "user removed"
        );
        Ok(())
    }

    /// Flip the target between `USER` and `ADMIN` and return the new role.
    pub async fn toggle_role(&self, ctx: &RequestContext) -> CoreResult<Role> {
        authorize(ctx, Operation::ToggleRole)?;
        let record = self.load_privileged_target(ctx).await?;

        let role = Role::toggle_from(record.role);
        self.store.update_role(record.id, role).await?;
        info!(
            actor = %ctx.identity().id,
            target = %record.id,
            %role,
            user_agent = ctx.user_agent().unwrap_or("-"),
            "user role changed"
        );
        Ok(role)
    }

    async fn load_target(&self, ctx: &RequestContext) -> CoreResult<CredentialRecord> {
        let target = ctx
            .target()
            .ok_or_else(|| CoreError::Malformed("missing user id".to_string()))?;

        match self.store.find_by_id(target).await? {
            Some(record) if !record.removed => Ok(record),
            _ => Err(CoreError::NotFound),
        }
    }

    /// Like `load_target`, but the moderator record is never a valid target.
    async fn load_privileged_target(&self, ctx: &RequestContext) -> CoreResult<CredentialRecord> {
        let record = self.load_target(ctx).await?;
        if record.is_moderator() {
            return Err(CoreError::Unauthorized(DenyReason::InvalidPrivilege));
        }
        Ok(record)
    }
}
