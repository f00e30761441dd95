//! Application settings loaded via OrthoConfig.
//!
//! Values come from `WAKEUP_*` environment variables, the matching CLI flags
//! or a configuration file, in OrthoConfig's usual precedence.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::credentials::{HashingCost, PasswordPolicy, PasswordRule};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_PASSWORD_MIN_LENGTH: usize = 8;
const DEFAULT_PASSWORD_MAX_LENGTH: usize = 128;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The bind address is not a `host:port` socket address.
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

/// Server, storage and credential settings.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "WAKEUP")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Without one the server keeps data in memory.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub pool_max_size: Option<u32>,
    /// Minimum password length.
    pub password_min_length: Option<usize>,
    /// Require at least one uppercase letter.
    #[ortho_config(default = false)]
    pub password_require_uppercase: bool,
    /// Require at least one lowercase letter.
    #[ortho_config(default = false)]
    pub password_require_lowercase: bool,
    /// Require at least one ASCII digit.
    #[ortho_config(default = false)]
    pub password_require_digit: bool,
    /// Require at least one non-alphanumeric character.
    #[ortho_config(default = false)]
    pub password_require_symbol: bool,
    /// Argon2 memory cost in KiB.
    pub argon2_memory_kib: Option<u32>,
    /// Argon2 pass count.
    pub argon2_iterations: Option<u32>,
    /// Argon2 lane count.
    pub argon2_parallelism: Option<u32>,
}

impl AppSettings {
    /// Configured bind address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Configured pool size, falling back to 10.
    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    /// Password policy assembled from the length and character-class toggles.
    pub fn password_policy(&self) -> PasswordPolicy {
        let mut rules = vec![
            PasswordRule::MinLength(
                self.password_min_length
                    .unwrap_or(DEFAULT_PASSWORD_MIN_LENGTH),
            ),
            PasswordRule::MaxLength(DEFAULT_PASSWORD_MAX_LENGTH),
        ];
        let toggles = [
            (self.password_require_uppercase, PasswordRule::RequireUppercase),
            (self.password_require_lowercase, PasswordRule::RequireLowercase),
            (self.password_require_digit, PasswordRule::RequireDigit),
            (self.password_require_symbol, PasswordRule::RequireSymbol),
        ];
        rules.extend(
            toggles
                .into_iter()
                .filter_map(|(enabled, rule)| enabled.then_some(rule)),
        );
        PasswordPolicy::new(rules)
    }

    /// Argon2 cost with unset parameters taken from [`HashingCost::default`].
    pub fn hashing_cost(&self) -> HashingCost {
        let defaults = HashingCost::default();
        HashingCost {
            memory_kib: self.argon2_memory_kib.unwrap_or(defaults.memory_kib),
            iterations: self.argon2_iterations.unwrap_or(defaults.iterations),
            parallelism: self.argon2_parallelism.unwrap_or(defaults.parallelism),
        }
    }
}
