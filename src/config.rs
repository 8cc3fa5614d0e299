use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::db::DatabaseConfig;
use crate::types::SigningSecret;

/// Default token lifetime in hours.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 10;

/// Upper bound on the token lifetime (one year).
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

/// Login of the seeded moderator account.
pub const MODERATOR_LOGIN: &str = "moderator";

/// Argon2 cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashingCost {
    /// Memory size in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for HashingCost {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

impl HashingCost {
    /// Cheapest parameters argon2 accepts. Only for tests and local tooling.
    pub fn minimal() -> Self {
        Self {
            memory_kib: argon2::Params::MIN_M_COST,
            iterations: argon2::Params::MIN_T_COST,
            parallelism: argon2::Params::MIN_P_COST,
        }
    }

    pub fn to_params(self) -> Result<argon2::Params> {
        argon2::Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| anyhow!("invalid argon2 parameters: {}", e))
    }
}

/// Fully resolved service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address the HTTP server binds to, e.g. `0.0.0.0:9999`.
    pub bind: String,
    pub database: DatabaseConfig,
    pub secret: SigningSecret,
    /// Bootstrap password for the moderator account.
    pub moderator_password: String,
    pub token_ttl_hours: i64,
    pub hashing: HashingCost,
}

impl ServiceConfig {
    pub fn new(
        host: &str,
        port: u16,
        database: DatabaseConfig,
        secret: SigningSecret,
        moderator_password: String,
    ) -> Self {
        Self {
            bind: format!("{}:{}", host, port),
            database,
            secret,
            moderator_password,
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
            hashing: HashingCost::default(),
        }
    }

    pub fn with_token_ttl_hours(mut self, hours: i64) -> Self {
        self.token_ttl_hours = hours;
        self
    }

    pub fn with_hashing(mut self, hashing: HashingCost) -> Self {
        self.hashing = hashing;
        self
    }

    /// Token lifetime, capped at [`MAX_TOKEN_TTL_HOURS`].
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.token_ttl_hours.min(MAX_TOKEN_TTL_HOURS))
    }

    /// Reject configurations the service cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.secret.is_empty() {
            return Err(anyhow!("signing secret must not be empty"));
        }
        if self.moderator_password.is_empty() {
            return Err(anyhow!("moderator password must not be empty"));
        }
        if self.token_ttl_hours <= 0 || self.token_ttl_hours > MAX_TOKEN_TTL_HOURS {
            return Err(anyhow!(
                "token ttl must be between 1 and {} hours, got {}",
                MAX_TOKEN_TTL_HOURS,
                self.token_ttl_hours
            ));
        }
        self.hashing.to_params()?;
        Ok(())
    }
}
