//! Repository configuration file support.
//!
//! `repository.toml` selects the storage backend, carries the Postgres pool
//! settings and optionally the display formats used when rendering shift
//! times:
//!
//! ```toml
//! [repository]
//! type = "postgres"
//!
//! [postgres]
//! database_url = "postgres://planner@localhost/shifts"
//! max_connections = 20
//!
//! [display]
//! time = "%H:%M"
//! datetime = "%d.%m.%Y %H:%M"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::factory::RepositoryType;
use super::repository::{ErrorContext, RepositoryError};
use crate::db::PostgresConfig;
use crate::models::DisplayFormat;

/// Repository configuration from file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub repository: RepositorySettings,
    #[serde(default)]
    pub postgres: PostgresSettings,
    #[serde(default)]
    pub display: DisplayFormat,
}

/// Repository type settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type")]
    pub repo_type: String,
}

/// Postgres connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresSettings {
    #[serde(default)]
    pub database_url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for PostgresSettings {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout: default_connect_timeout(),
            idle_timeout: default_idle_timeout(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_idle_timeout() -> u64 {
    600
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    100
}

fn config_error(message: impl Into<String>) -> RepositoryError {
    RepositoryError::ConfigurationError {
        message: message.into(),
        context: ErrorContext::new("load_repository_config"),
    }
}

impl RepositoryConfig {
    /// Configuration for the in-memory backend with default display formats.
    pub fn local() -> Self {
        Self {
            repository: RepositorySettings {
                repo_type: "local".to_string(),
            },
            postgres: PostgresSettings::default(),
            display: DisplayFormat::default(),
        }
    }

    /// Load repository configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            config_error(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, RepositoryError> {
        toml::from_str(content)
            .map_err(|e| config_error(format!("Failed to parse config file: {}", e)))
    }

    /// Load repository configuration from the default location.
    ///
    /// Searches for `repository.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, RepositoryError> {
        let search_paths = [
            PathBuf::from("repository.toml"),
            PathBuf::from("backend/repository.toml"),
            PathBuf::from("../repository.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                log::debug!("Using repository config at {}", path.display());
                return Self::from_file(&path);
            }
        }

        Err(config_error("No repository.toml found in standard locations"))
    }

    /// Get the repository type from configuration.
    pub fn repository_type(&self) -> Result<RepositoryType, RepositoryError> {
        RepositoryType::from_str(&self.repository.repo_type)
            .map_err(|e| config_error(format!("Invalid repository type: {}", e)))
    }

    /// Convert to PostgresConfig if this is a Postgres configuration.
    ///
    /// # Returns
    /// * `Ok(None)` - The configured backend is not Postgres
    /// * `Err(RepositoryError::ConfigurationError)` - Postgres without a database URL
    #[cfg(feature = "postgres-repo")]
    pub fn to_postgres_config(&self) -> Result<Option<PostgresConfig>, RepositoryError> {
        if self.repository_type()? != RepositoryType::Postgres {
            return Ok(None);
        }

        if self.postgres.database_url.trim().is_empty() {
            return Err(config_error(
                "Postgres repository requires 'postgres.database_url' setting",
            ));
        }

        Ok(Some(PostgresConfig {
            database_url: self.postgres.database_url.clone(),
            max_pool_size: self.postgres.max_connections,
            min_pool_size: self.postgres.min_connections,
            connection_timeout_sec: self.postgres.connect_timeout,
            idle_timeout_sec: self.postgres.idle_timeout,
            max_retries: self.postgres.max_retries,
            retry_delay_ms: self.postgres.retry_delay_ms,
        }))
    }

    /// Convert to PostgresConfig when the feature is disabled.
    #[cfg(not(feature = "postgres-repo"))]
    pub fn to_postgres_config(&self) -> Result<Option<PostgresConfig>, RepositoryError> {
        if self.repository_type()? == RepositoryType::Postgres {
            return Err(config_error("Postgres repository feature not enabled"));
        }

        Ok(None)
    }
}
