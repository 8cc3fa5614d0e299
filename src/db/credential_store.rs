//! Credential store contract and its SurrealDB adapter.

use async_trait::async_trait;
use std::fmt;

use crate::db::Db;
use crate::db::schema::{CounterRow, UserCreate, UserRow};
use crate::model::{CredentialRecord, NewCredential, Role};
use crate::types::{HashedPassword, UserId};

/// Errors raised by a credential store.
#[derive(Debug, Clone)]
pub enum StoreError {
    /// The login is already present.
    UniqueViolation(String),
    /// The backing store failed or could not be reached.
    Unavailable(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UniqueViolation(login) => write!(f, "login already exists: {}", login),
            Self::Unavailable(msg) => write!(f, "store unavailable: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<surrealdb::Error> for StoreError {
    fn from(err: surrealdb::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Narrow query contract the core depends on.
///
/// Dropping a returned future cancels the operation.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_login(&self, login: &str) -> StoreResult<Option<CredentialRecord>>;

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<CredentialRecord>>;

    /// Insert a record and return its newly assigned id.
    async fn insert(&self, record: NewCredential) -> StoreResult<UserId>;

    async fn update_profile(&self, id: UserId, name: &str, surname: &str) -> StoreResult<()>;

    async fn update_password(&self, id: UserId, hash: &HashedPassword) -> StoreResult<()>;

    async fn soft_delete(&self, id: UserId) -> StoreResult<()>;

    async fn update_role(&self, id: UserId, role: Role) -> StoreResult<()>;

    /// Records that are neither soft-deleted nor the moderator, in id order.
    async fn list_active(&self) -> StoreResult<Vec<CredentialRecord>>;
}

const USER_FIELDS: &str = "uid, login, password_hash, name, surname, avatar, role, removed";

/// SurrealDB-backed credential store.
#[derive(Clone)]
pub struct SurrealCredentialStore {
    db: Db,
}

impl SurrealCredentialStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Get reference to the database.
    pub fn db(&self) -> &Db {
        &self.db
    }

    /// Allocate the next numeric id.
    async fn next_id(&self) -> StoreResult<i64> {
        let mut res = self
            .db
            .query("UPSERT id_counter:user SET last_id = (last_id OR 0) + 1")
            .await?;

        let counter: Option<CounterRow> = res.take(0)?;
        counter
            .map(|c| c.last_id)
            .ok_or_else(|| StoreError::Unavailable("id counter returned no row".to_string()))
    }

    async fn find_one(
        &self,
        query: String,
        key: &'static str,
        value: impl serde::Serialize + Send + 'static,
    ) -> StoreResult<Option<CredentialRecord>> {
        let mut res = self.db.query(query).bind((key, value)).await?;
        let rows: Vec<UserRow> = res.take(0)?;
        Ok(rows.into_iter().next().map(CredentialRecord::from))
    }
}

fn is_unique_violation(err: &surrealdb::Error) -> bool {
    let msg = err.to_string();
    msg.contains("already contains") && msg.contains("user_login")
}

#[async_trait]
impl CredentialStore for SurrealCredentialStore {
    async fn find_by_login(&self, login: &str) -> StoreResult<Option<CredentialRecord>> {
        let query = format!("SELECT {} FROM user WHERE login = $login LIMIT 1", USER_FIELDS);
        self.find_one(query, "login", login.to_string()).await
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<CredentialRecord>> {
        let query = format!("SELECT {} FROM user WHERE uid = $uid LIMIT 1", USER_FIELDS);
        self.find_one(query, "uid", id.get()).await
    }

    async fn insert(&self, record: NewCredential) -> StoreResult<UserId> {
        // Fast path; the unique index still guards concurrent inserts.
        if self.find_by_login(record.login.as_str()).await?.is_some() {
            return Err(StoreError::UniqueViolation(record.login.into_inner()));
        }

        let login = record.login.to_string();
        let uid = self.next_id().await?;
        let content = UserCreate::from_new(uid, record);

        let mut res = self
            .db
            .query("CREATE user CONTENT $content")
            .bind(("content", content))
            .await?;

        match res.take::<Vec<UserRow>>(0) {
            Ok(rows) if !rows.is_empty() => Ok(UserId::new(uid)),
            Ok(_) => Err(StoreError::Unavailable("failed to create user".to_string())),
            Err(e) if is_unique_violation(&e) => Err(StoreError::UniqueViolation(login)),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_profile(&self, id: UserId, name: &str, surname: &str) -> StoreResult<()> {
        let query = r#"
            UPDATE user SET
                name = $name,
                surname = $surname
            WHERE uid = $uid
        "#;

        self.db
            .query(query)
            .bind(("name", name.to_string()))
            .bind(("surname", surname.to_string()))
            .bind(("uid", id.get()))
            .await?
            .check()?;

        Ok(())
    }

    async fn update_password(&self, id: UserId, hash: &HashedPassword) -> StoreResult<()> {
        self.db
            .query("UPDATE user SET password_hash = $hash WHERE uid = $uid")
            .bind(("hash", hash.to_string()))
            .bind(("uid", id.get()))
            .await?
            .check()?;

        Ok(())
    }

    async fn soft_delete(&self, id: UserId) -> StoreResult<()> {
        self.db
            .query("UPDATE user SET removed = true WHERE uid = $uid")
            .bind(("uid", id.get()))
            .await?
            .check()?;

        Ok(())
    }

    async fn update_role(&self, id: UserId, role: Role) -> StoreResult<()> {
        self.db
            .query("UPDATE user SET role = $role WHERE uid = $uid")
            .bind(("role", role.as_str().to_string()))
            .bind(("uid", id.get()))
            .await?
            .check()?;

        Ok(())
    }

    async fn list_active(&self) -> StoreResult<Vec<CredentialRecord>> {
        let query = format!(
            "SELECT {} FROM user WHERE role != 'MODERATOR' AND removed = false ORDER BY uid ASC",
            USER_FIELDS
        );

        let mut res = self.db.query(query).await?;
        let rows: Vec<UserRow> = res.take(0)?;
        Ok(rows.into_iter().map(CredentialRecord::from).collect())
    }
}
