//! Persistence boundary: one trait per table family, with a Postgres
//! implementation for production and an in-memory one for dev/tests.
//!
//! Repositories hold no business rules. Lookups return `Option`; deciding how
//! absence is presented is the caller's job.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use socialnet_core::{Follow, Post, PostDraft, PostId, User, UserChanges, UserId};

use crate::config::StorageConfig;

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryStore;
pub use postgres::{PostgresFollowerRepository, PostgresPostRepository, PostgresUserRepository};

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Storage failure. The message is the database's own.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{0}")]
    Database(String),
}

/// A user row about to be inserted (password already hashed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserRecord {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert and return the stored user (without its hash).
    async fn create(&self, user: NewUserRecord) -> RepositoryResult<User>;

    /// Case-insensitive substring match on name or username.
    async fn search(&self, name_or_username: &str) -> RepositoryResult<Vec<User>>;

    async fn find_by_id(&self, id: UserId) -> RepositoryResult<Option<User>>;

    /// Includes the password hash; used for login only.
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;

    async fn update(&self, id: UserId, changes: &UserChanges) -> RepositoryResult<()>;

    /// Also removes the user's posts and follow edges.
    async fn delete(&self, id: UserId) -> RepositoryResult<()>;

    async fn password_hash(&self, id: UserId) -> RepositoryResult<Option<String>>;

    async fn update_password(&self, id: UserId, password_hash: &str) -> RepositoryResult<()>;
}

#[async_trait]
pub trait FollowerRepository: Send + Sync {
    /// Idempotent: following twice leaves a single edge.
    async fn follow(&self, edge: Follow) -> RepositoryResult<()>;

    async fn unfollow(&self, edge: Follow) -> RepositoryResult<()>;

    /// Users following `user_id`.
    async fn followers(&self, user_id: UserId) -> RepositoryResult<Vec<User>>;

    /// Users that `follower_id` follows.
    async fn following(&self, follower_id: UserId) -> RepositoryResult<Vec<User>>;
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, author_id: UserId, draft: &PostDraft) -> RepositoryResult<PostId>;

    /// The user's own posts plus posts by users they follow, newest first.
    async fn feed(&self, user_id: UserId) -> RepositoryResult<Vec<Post>>;

    async fn find_by_id(&self, id: PostId) -> RepositoryResult<Option<Post>>;

    async fn update(&self, id: PostId, draft: &PostDraft) -> RepositoryResult<()>;

    async fn delete(&self, id: PostId) -> RepositoryResult<()>;

    /// Posts written by `author_id`, newest first.
    async fn by_author(&self, author_id: UserId) -> RepositoryResult<Vec<Post>>;

    async fn like(&self, id: PostId) -> RepositoryResult<()>;

    /// Decrement the like counter, never below zero.
    async fn unlike(&self, id: PostId) -> RepositoryResult<()>;
}

/// The repository set handed to the HTTP layer.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub followers: Arc<dyn FollowerRepository>,
    pub posts: Arc<dyn PostRepository>,
}

impl Repositories {
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            followers: Arc::new(PostgresFollowerRepository::new(pool.clone())),
            posts: Arc::new(PostgresPostRepository::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            users: store.clone(),
            followers: store.clone(),
            posts: store,
        }
    }

    /// Build the configured backend, connecting to Postgres when selected.
    pub async fn from_config(storage: &StorageConfig) -> RepositoryResult<Self> {
        match storage {
            StorageConfig::Postgres(db) => Ok(Self::postgres(crate::db::connect(db).await?)),
            StorageConfig::InMemory => {
                tracing::warn!("STORAGE_BACKEND=memory: records are lost on restart");
                Ok(Self::in_memory())
            }
        }
    }
}

/// Map a sqlx error to a repository error, keeping the database message.
pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RepositoryError {
    let message = match &err {
        sqlx::Error::Database(db_err) => db_err.message().to_string(),
        sqlx::Error::PoolClosed => "connection pool closed".to_string(),
        _ => err.to_string(),
    };
    tracing::error!(operation, error = %message, "database operation failed");
    RepositoryError::Database(message)
}
