use serde::{Deserialize, Serialize};

use crate::model::{CredentialRecord, NewCredential, Role};
use crate::types::{HashedPassword, Login, UserId};

/// Persisted representation of a credential record in SurrealDB (table: `user`).
///
/// The SurrealDB record id is not used by the application; `uid` is the
/// stable numeric identity handed out to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRow {
    pub uid: i64,
    pub login: String,
    pub password_hash: String,
    pub name: String,
    pub surname: String,
    pub avatar: String,
    pub role: String,
    pub removed: bool,
}

impl From<UserRow> for CredentialRecord {
    fn from(row: UserRow) -> Self {
        let role = Role::from_stored(&row.role);
        if role.is_none() {
            tracing::warn!(uid = row.uid, role = %row.role, "unrecognised stored role");
        }
        Self {
            id: UserId::new(row.uid),
            login: Login::new(row.login),
            password_hash: HashedPassword::new(row.password_hash),
            name: row.name,
            surname: row.surname,
            avatar: row.avatar,
            role,
            removed: row.removed,
        }
    }
}

/// Payload for creating a new user row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub uid: i64,
    pub login: String,
    pub password_hash: String,
    pub name: String,
    pub surname: String,
    pub avatar: String,
    pub role: String,
    pub removed: bool,
}

impl UserCreate {
    pub fn from_new(uid: i64, record: NewCredential) -> Self {
        Self {
            uid,
            login: record.login.into_inner(),
            password_hash: record.password_hash.into_inner(),
            name: record.name,
            surname: record.surname,
            avatar: record.avatar,
            role: record.role.as_str().to_string(),
            removed: false,
        }
    }
}

/// State of the id allocation counter (record `id_counter:user`).
#[derive(Debug, Clone, Deserialize)]
pub struct CounterRow {
    pub last_id: i64,
}
