use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{HashedPassword, Login, UserId};

/// Role attached to a credential record and embedded in every token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Admin,
    /// The single seeded, privileged account.
    Moderator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
            Self::Moderator => "MODERATOR",
        }
    }

    /// Parse a role as persisted by the store. Returns `None` for values this
    /// build does not recognise.
    pub fn from_stored(raw: &str) -> Option<Role> {
        match raw {
            "USER" => Some(Self::User),
            "ADMIN" => Some(Self::Admin),
            "MODERATOR" => Some(Self::Moderator),
            _ => None,
        }
    }

    /// Two-state toggle between `USER` and `ADMIN`.
    ///
    /// Anything that is not `USER` or `ADMIN` (including unrecognised stored
    /// values) normalises to `USER`.
    pub fn toggle_from(current: Option<Role>) -> Role {
        match current {
            Some(Self::User) => Self::Admin,
            Some(Self::Admin) => Self::User,
            Some(Self::Moderator) | None => Self::User,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Credential record as seen through the store adapter.
#[derive(Debug, Clone)]
pub struct CredentialRecord {
    pub id: UserId,
    pub login: Login,
    pub password_hash: HashedPassword,
    pub name: String,
    pub surname: String,
    pub avatar: String,
    /// `None` when the stored role string is not recognised.
    pub role: Option<Role>,
    pub removed: bool,
}

impl CredentialRecord {
    /// Role used for authorization decisions. Unrecognised values get the
    /// least privilege.
    pub fn effective_role(&self) -> Role {
        self.role.unwrap_or(Role::User)
    }

    pub fn is_moderator(&self) -> bool {
        self.role == Some(Role::Moderator)
    }

    pub fn to_profile(&self) -> Profile {
        Profile {
            id: self.id,
            name: self.name.clone(),
            surname: self.surname.clone(),
            login: self.login.clone(),
            avatar: self.avatar.clone(),
        }
    }

    pub fn to_summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            surname: self.surname.clone(),
            login: self.login.clone(),
            role: self.effective_role(),
            avatar: self.avatar.clone(),
        }
    }
}

// Payload for inserting a record; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewCredential {
    pub login: Login,
    pub password_hash: HashedPassword,
    pub name: String,
    pub surname: String,
    pub avatar: String,
    pub role: Role,
}

/// Read-only profile projection. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    pub name: String,
    pub surname: String,
    pub login: Login,
    pub avatar: String,
}

/// Entry of the active-user listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub surname: String,
    pub login: Login,
    pub role: Role,
    pub avatar: String,
}

/// Registration request.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub surname: String,
    pub login: String,
    pub password: String,
    #[serde(default)]
    pub avatar: String,
}

/// Profile edit request. The password is only replaced when present.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileEdit {
    pub name: String,
    pub surname: String,
    #[serde(default)]
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_is_an_involution_on_user_and_admin() {
        for role in [Role::User, Role::Admin] {
            let once = Role::toggle_from(Some(role));
            assert_ne!(once, role);
            assert_eq!(Role::toggle_from(Some(once)), role);
        }
    }

    #[test]
    fn test_toggle_normalises_unexpected_roles() {
        assert_eq!(Role::toggle_from(None), Role::User);
        assert_eq!(Role::toggle_from(Role::from_stored("SUPERUSER")), Role::User);
        assert_eq!(Role::toggle_from(Some(Role::Moderator)), Role::User);
    }

    #[test]
    fn test_role_serde_uses_upper_case_names() {
        assert_eq!(serde_json::to_string(&Role::Moderator).unwrap(), "\"MODERATOR\"");
        let role: Role = serde_json::from_str("\"ADMIN\"").unwrap();
        assert_eq!(role, Role::Admin);
        assert!(serde_json::from_str::<Role>("\"admin\"").is_err());
    }

    #[test]
    fn test_from_stored_round_trips_as_str() {
        for role in [Role::User, Role::Admin, Role::Moderator] {
            assert_eq!(Role::from_stored(role.as_str()), Some(role));
        }
        assert_eq!(Role::from_stored("user"), None);
    }

    #[test]
    fn test_profile_projection_excludes_password() {
        let record = CredentialRecord {
            id: UserId::new(3),
            login: Login::new("alice"),
            password_hash: HashedPassword::new("$argon2id$secret"),
            name: "Alice".to_string(),
            surname: "Liddell".to_string(),
            avatar: "a.png".to_string(),
            role: Role::from_stored("GUEST"),
            removed: false,
        };

        let json = serde_json::to_string(&record.to_profile()).unwrap();
        assert!(!json.contains("argon2"));
        assert_eq!(record.effective_role(), Role::User);
        assert_eq!(record.to_summary().role, Role::User);
        assert!(!record.is_moderator());
    }
}
