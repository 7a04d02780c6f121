use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use socialnet_core::{User, UserChanges, UserId};

use super::{UserRow, like_pattern};
use crate::repositories::{NewUserRecord, RepositoryResult, UserRepository, map_sqlx_error};

/// `users` table access.
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self, user), fields(username = %user.username))]
    async fn create(&self, user: NewUserRecord) -> RepositoryResult<User> {
        let row: UserRow = sqlx::query_as(
            r#"
            INSERT INTO users (id, name, username, email, pass)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, username, email, created_at
            "#,
        )
        .bind(UserId::new().as_uuid())
        .bind(&user.name)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("users.create", e))?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn search(&self, name_or_username: &str) -> RepositoryResult<Vec<User>> {
        let rows: Vec<UserRow> = sqlx::query_as(
            r#"
            SELECT id, name, username, email, created_at
            FROM users
            WHERE name ILIKE $1 OR username ILIKE $1
            ORDER BY name, username
            "#,
        )
        .bind(like_pattern(name_or_username))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("users.search", e))?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    #[instrument(skip(self), fields(user_id = %id))]
    async fn find_by_id(&self, id: UserId) -> RepositoryResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, name, username, email, created_at FROM users WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("users.find_by_id", e))?;

        Ok(row.map(User::from))
    }

    #[instrument(skip(self, email))]
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, name, username, email, pass, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("users.find_by_email", e))?;

        Ok(row.map(User::from))
    }

    #[instrument(skip(self, changes), fields(user_id = %id))]
    async fn update(&self, id: UserId, changes: &UserChanges) -> RepositoryResult<()> {
        sqlx::query("UPDATE users SET name = $1, username = $2, email = $3 WHERE id = $4")
            .bind(&changes.name)
            .bind(&changes.username)
            .bind(&changes.email)
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("users.update", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %id))]
    async fn delete(&self, id: UserId) -> RepositoryResult<()> {
        // posts and followers rows go with it (ON DELETE CASCADE)
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("users.delete", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %id))]
    async fn password_hash(&self, id: UserId) -> RepositoryResult<Option<String>> {
        sqlx::query_scalar("SELECT pass FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("users.password_hash", e))
    }

    #[instrument(skip(self, password_hash), fields(user_id = %id))]
    async fn update_password(&self, id: UserId, password_hash: &str) -> RepositoryResult<()> {
        sqlx::query("UPDATE users SET pass = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("users.update_password", e))?;
        Ok(())
    }
}
