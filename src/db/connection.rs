use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use surrealdb::opt::auth::Root;

pub type Db = Surreal<Any>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: env::var("SURREALDB_URL").unwrap_or_else(|_| "memory".to_string()),
            namespace: env::var("SURREALDB_NAMESPACE")
                .unwrap_or_else(|_| "directory".to_string()),
            database: env::var("SURREALDB_DATABASE").unwrap_or_else(|_| "auth".to_string()),
            username: env::var("SURREALDB_USERNAME").ok(),
            password: env::var("SURREALDB_PASSWORD").ok(),
        }
    }
}

pub async fn create_connection(config: DatabaseConfig) -> Result<Db> {
    let db = surrealdb::engine::any::connect(config.url).await?;

    // Sign in if credentials are provided
    if let (Some(username), Some(password)) = (config.username, config.password) {
        db.signin(Root {
            username: &username,
            password: &password,
        })
        .await?;
    }

    db.use_ns(config.namespace).use_db(config.database).await?;

    Ok(db)
}

/// Ensure the credential tables and indexes exist. Safe to run repeatedly.
pub async fn ensure_schema(db: &Db) -> Result<()> {
    let schema_queries = vec![
        // Credential records
        "DEFINE TABLE IF NOT EXISTS user SCHEMAFULL;
         DEFINE FIELD IF NOT EXISTS uid ON TABLE user TYPE int;
         DEFINE FIELD IF NOT EXISTS name ON TABLE user TYPE string;
         DEFINE FIELD IF NOT EXISTS surname ON TABLE user TYPE string;
         DEFINE FIELD IF NOT EXISTS login ON TABLE user TYPE string;
         DEFINE FIELD IF NOT EXISTS password_hash ON TABLE user TYPE string;
         DEFINE FIELD IF NOT EXISTS avatar ON TABLE user TYPE string;
         DEFINE FIELD IF NOT EXISTS role ON TABLE user TYPE string DEFAULT 'USER';
         DEFINE FIELD IF NOT EXISTS removed ON TABLE user TYPE bool DEFAULT false;",
        // Id allocation
        "DEFINE TABLE IF NOT EXISTS id_counter SCHEMALESS;",
        // Indexes
        "DEFINE INDEX IF NOT EXISTS user_login ON TABLE user COLUMNS login UNIQUE;
         DEFINE INDEX IF NOT EXISTS user_uid ON TABLE user COLUMNS uid UNIQUE;",
    ];

    for query in schema_queries {
        db.query(query).await?.check()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_config() -> DatabaseConfig {
        DatabaseConfig {
            url: "memory".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_ensure_schema_is_idempotent() {
        let db = create_connection(memory_config()).await.unwrap();
        ensure_schema(&db).await.unwrap();
        ensure_schema(&db).await.unwrap();
    }
}
