//! Process configuration, loaded once at startup.
//!
//! Values come from a key lookup (the process environment in production) so
//! the parsing rules can be exercised without mutating global state.

use thiserror::Error;

pub const DEFAULT_PORT: u16 = 9000;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("API_PORT must be a port number, got {0:?}")]
    InvalidPort(String),

    #[error("SECRET_KEY must be set to a non-empty value")]
    MissingSecret,

    #[error("DB_MAX_CONNECTIONS must be a positive integer, got {0:?}")]
    InvalidMaxConnections(String),

    #[error("STORAGE_BACKEND must be `postgres` or `memory`, got {0:?}")]
    UnknownBackend(String),

    #[error("{0} must be set when DATABASE_URL is not")]
    MissingDatabaseSetting(&'static str),
}

/// Postgres connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl core::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

/// Where records live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    Postgres(DatabaseConfig),
    /// Process-local maps; for local development and tests only.
    InMemory,
}

/// Everything the service reads from its environment.
#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub secret_key: String,
    pub storage: StorageConfig,
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("secret_key", &"<redacted>")
            .field("storage", &self.storage)
            .finish()
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match get("API_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let secret_key = get("SECRET_KEY").ok_or(ConfigError::MissingSecret)?;

        let storage = match get("STORAGE_BACKEND").as_deref() {
            None | Some("postgres") => StorageConfig::Postgres(database_config(&get)?),
            Some("memory") => StorageConfig::InMemory,
            Some(other) => return Err(ConfigError::UnknownBackend(other.to_string())),
        };

        Ok(Self {
            port,
            secret_key,
            storage,
        })
    }
}

fn database_config<G>(get: &G) -> Result<DatabaseConfig, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let max_connections = match get("DB_MAX_CONNECTIONS") {
        Some(raw) => match raw.parse::<u32>() {
            Ok(n) if n > 0 => n,
            _ => return Err(ConfigError::InvalidMaxConnections(raw)),
        },
        None => DEFAULT_MAX_CONNECTIONS,
    };

    let url = match get("DATABASE_URL") {
        Some(url) => url,
        None => {
            let user = get("DB_USER").ok_or(ConfigError::MissingDatabaseSetting("DB_USER"))?;
            let name = get("DB_NAME").ok_or(ConfigError::MissingDatabaseSetting("DB_NAME"))?;
            let pass = get("DB_PASS").unwrap_or_default();
            let host = get("DB_HOST").unwrap_or_else(|| "localhost".to_string());
            let port = get("DB_PORT").unwrap_or_else(|| "5432".to_string());
            format!("postgres://{user}:{pass}@{host}:{port}/{name}")
        }
    };

    Ok(DatabaseConfig {
        url,
        max_connections,
    })
}
