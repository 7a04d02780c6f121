//! Infrastructure layer: configuration, connection pool, repositories.

pub mod config;
pub mod db;
pub mod repositories;

pub use config::{AppConfig, ConfigError, DatabaseConfig, StorageConfig};
pub use repositories::{
    FollowerRepository, InMemoryStore, NewUserRecord, PostRepository, Repositories,
    RepositoryError, RepositoryResult, UserRepository,
};
