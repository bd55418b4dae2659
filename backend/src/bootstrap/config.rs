//! Process configuration loaded via OrthoConfig.
//!
//! Values come from `REGISTRAR_*` environment variables, command-line flags
//! or a configuration file, in OrthoConfig's usual precedence.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{SignupDetails, UserValidationError};

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
const DEFAULT_ADMIN_EMAIL: &str = "admin@university.edu";
const DEFAULT_POOL_MAX_SIZE: u32 = 10;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid bind address {value:?}: {source}")]
    BindAddress {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("invalid default administrator: {0}")]
    Admin(#[from] UserValidationError),
    #[error("pool_max_size must be at least 1")]
    PoolSize,
}

/// Configuration values for the registrar server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "REGISTRAR")]
pub struct AppSettings {
    /// Socket address for the HTTP listener.
    pub bind_address: Option<String>,
    /// PostgreSQL connection URL. Without one the in-memory store is used.
    pub database_url: Option<String>,
    /// Create the default administrator at startup when missing. Defaults to
    /// `true`.
    pub seed_admin: Option<bool>,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    pub admin_email: Option<String>,
    /// Upper bound on pooled database connections.
    pub pool_max_size: Option<u32>,
}

impl AppSettings {
    /// Parsed listener address, falling back to `0.0.0.0:3000`.
    pub fn bind_address(&self) -> Result<SocketAddr, SettingsError> {
        let value = self
            .bind_address
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDRESS);
        value.parse().map_err(|source| SettingsError::BindAddress {
            value: value.to_owned(),
            source,
        })
    }

    /// Configured database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn pool_max_size(&self) -> Result<u32, SettingsError> {
        match self.pool_max_size {
            Some(0) => Err(SettingsError::PoolSize),
            Some(size) => Ok(size),
            None => Ok(DEFAULT_POOL_MAX_SIZE),
        }
    }

    /// Validated administrator account to seed, or `None` when seeding is
    /// disabled.
    pub fn admin_details(&self) -> Result<Option<SignupDetails>, SettingsError> {
        if !self.seed_admin.unwrap_or(true) {
            return Ok(None);
        }
        let details = SignupDetails::try_from_parts(
            self.admin_username.as_deref().unwrap_or(DEFAULT_ADMIN_USERNAME),
            self.admin_password.as_deref().unwrap_or(DEFAULT_ADMIN_PASSWORD),
            self.admin_email.as_deref().unwrap_or(DEFAULT_ADMIN_EMAIL),
        )?;
        Ok(Some(details))
    }
}
