pub mod connection;
pub mod credential_store;
pub mod schema;

pub use connection::*;
pub use credential_store::{CredentialStore, StoreError, StoreResult, SurrealCredentialStore};
