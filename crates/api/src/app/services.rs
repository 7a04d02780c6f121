//! Shared handler state: repositories and the token service.

use std::sync::Arc;

use socialnet_auth::{DEFAULT_TOKEN_TTL, JwtService};
use socialnet_infra::{AppConfig, Repositories, RepositoryResult};

/// Everything a handler needs, cloned cheaply per request.
#[derive(Clone)]
pub struct AppServices {
    pub repos: Repositories,
    pub jwt: Arc<JwtService>,
}

impl AppServices {
    pub fn new(repos: Repositories, jwt: JwtService) -> Self {
        Self {
            repos,
            jwt: Arc::new(jwt),
        }
    }

    /// Wire the configured storage backend and a token service keyed with the
    /// configured secret.
    pub async fn from_config(config: &AppConfig) -> RepositoryResult<Self> {
        let repos = Repositories::from_config(&config.storage).await?;
        let jwt = JwtService::new(config.secret_key.as_bytes(), DEFAULT_TOKEN_TTL);
        Ok(Self::new(repos, jwt))
    }

    /// In-memory storage; used by tests and `STORAGE_BACKEND=memory`.
    pub fn in_memory(secret: &str) -> Self {
        Self::new(
            Repositories::in_memory(),
            JwtService::new(secret.as_bytes(), DEFAULT_TOKEN_TTL),
        )
    }
}
