//! Authorization decisions.
//!
//! Pure functions of the authenticated identity, the operation and the
//! path-addressed target. No store access happens here.

use std::fmt;

use crate::auth::context::{Identity, RequestContext};
use crate::error::CoreError;
use crate::model::Role;
use crate::types::UserId;

/// Operations subject to authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ReadProfile,
    EditProfile,
    ListUsers,
    DeleteUser,
    ToggleRole,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReadProfile => "read_profile",
            Self::EditProfile => "edit_profile",
            Self::ListUsers => "list_users",
            Self::DeleteUser => "delete_user",
            Self::ToggleRole => "toggle_role",
        }
    }
}

/// Shape of a denial as exposed at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The request addresses the wrong resource for this operation.
    BadRequest,
    /// The caller lacks the required role.
    InvalidPrivilege,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadRequest => write!(f, "bad request"),
            Self::InvalidPrivilege => write!(f, "invalid privilege"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

/// Decide whether `identity` may perform `operation` on `target`.
///
/// A missing target on an operation that needs one is a bad request.
pub fn decide(identity: &Identity, operation: Operation, target: Option<UserId>) -> Decision {
    match operation {
        Operation::ListUsers => Decision::Allow,
        Operation::ReadProfile | Operation::EditProfile => match target {
            Some(target) if target == identity.id => Decision::Allow,
            _ => Decision::Deny(DenyReason::BadRequest),
        },
        Operation::DeleteUser | Operation::ToggleRole => {
            let Some(target) = target else {
                return Decision::Deny(DenyReason::BadRequest);
            };
            if identity.role != Role::Moderator {
                Decision::Deny(DenyReason::InvalidPrivilege)
            } else if target == identity.id {
                Decision::Deny(DenyReason::BadRequest)
            } else {
                Decision::Allow
            }
        }
    }
}

/// Apply [`decide`] to a request context, turning a denial into an error.
pub fn authorize(ctx: &RequestContext, operation: Operation) -> Result<(), CoreError> {
    match decide(ctx.identity(), operation, ctx.target()) {
        Decision::Allow => Ok(()),
        Decision::Deny(reason) => {
            tracing::warn!(
                actor = %ctx.identity().id,
                target = ?ctx.target(),
                operation = operation.as_str(),
                user_agent = ctx.user_agent().unwrap_or("-"),
                %reason,
                "authorization denied"
            );
            Err(CoreError::Unauthorized(reason))
        }
    }
}
