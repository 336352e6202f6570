//! Startup configuration for passvault.
//!
//! The operator encryption secret and salt are the only configuration the
//! core consumes. Both are required; a missing or empty value is a fatal
//! error at startup, never a per-request condition.

use std::env;

use crate::services::crypto_service::MasterKey;
use crate::types::errors::ConfigError;

/// Environment variable holding the operator encryption secret.
pub const ENCRYPTION_KEY_VAR: &str = "ENCRYPTION_KEY";

/// Environment variable holding the operator encryption salt.
pub const ENCRYPTION_SALT_VAR: &str = "ENCRYPTION_SALT";

/// Operator-supplied encryption configuration.
///
/// Does not implement `Debug` or serde traits: the secret must never end up
/// in logs or serialized output.
pub struct VaultConfig {
    encryption_secret: String,
    encryption_salt: String,
}

impl VaultConfig {
    /// Builds a config from explicit values, rejecting empty input.
    pub fn new(encryption_secret: &str, encryption_salt: &str) -> Result<Self, ConfigError> {
        if encryption_secret.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        if encryption_salt.is_empty() {
            return Err(ConfigError::MissingSalt);
        }
        Ok(Self {
            encryption_secret: encryption_secret.to_string(),
            encryption_salt: encryption_salt.to_string(),
        })
    }

    /// Reads `ENCRYPTION_KEY` and `ENCRYPTION_SALT` from the environment.
    ///
    /// # Errors
    /// Returns `ConfigError::MissingSecret` / `ConfigError::MissingSalt`
    /// when a variable is unset or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret = env::var(ENCRYPTION_KEY_VAR).unwrap_or_default();
        let salt = env::var(ENCRYPTION_SALT_VAR).unwrap_or_default();
        Self::new(&secret, &salt)
    }

    /// Derives the process-wide master key. Called once at startup; the
    /// resulting key is injected into the cipher adapter and lives for the
    /// process's duration.
    pub fn derive_master_key(&self) -> Result<MasterKey, ConfigError> {
        MasterKey::derive(&self.encryption_secret, &self.encryption_salt)
    }
}
