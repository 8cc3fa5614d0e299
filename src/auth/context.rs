//! Request-scoped identity.

use serde::{Deserialize, Serialize};

use crate::auth::token::TokenPayload;
use crate::model::Role;
use crate::types::{Login, UserId};

/// Authenticated identity taken from a verified token.
///
/// Reflects the record at issuance time; a role change only shows up after
/// the holder logs in again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub login: Login,
    pub role: Role,
}

impl From<TokenPayload> for Identity {
    fn from(payload: TokenPayload) -> Self {
        Self {
            id: payload.id,
            login: payload.login,
            role: payload.role,
        }
    }
}

/// Per-request execution record passed from the authenticator through the
/// guard into the services.
///
/// It is immutable once created.
#[derive(Debug, Clone)]
pub struct RequestContext {
    identity: Identity,
    /// Path-addressed user id, if the route has one.
    target: Option<UserId>,
    /// Client user agent (for logging)
    user_agent: Option<String>,
}

impl RequestContext {
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            target: None,
            user_agent: None,
        }
    }

    pub fn with_target(mut self, target: UserId) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_user_agent(mut self, user_agent: Option<String>) -> Self {
        self.user_agent = user_agent;
        self
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn target(&self) -> Option<UserId> {
        self.target
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    /// Whether the caller is addressing their own record.
    pub fn is_self_target(&self) -> bool {
        self.target == Some(self.identity.id)
    }
}
