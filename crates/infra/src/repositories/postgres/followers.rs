use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use socialnet_core::{Follow, User, UserId};

use super::UserRow;
use crate::repositories::{FollowerRepository, RepositoryResult, map_sqlx_error};

/// `followers` table access.
#[derive(Debug, Clone)]
pub struct PostgresFollowerRepository {
    pool: PgPool,
}

impl PostgresFollowerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FollowerRepository for PostgresFollowerRepository {
    #[instrument(
        skip(self),
        fields(user_id = %edge.user_id(), follower_id = %edge.follower_id())
    )]
    async fn follow(&self, edge: Follow) -> RepositoryResult<()> {
        sqlx::query(
            "INSERT INTO followers (user_id, follower_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(edge.user_id().as_uuid())
        .bind(edge.follower_id().as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("followers.follow", e))?;
        Ok(())
    }

    #[instrument(
        skip(self),
        fields(user_id = %edge.user_id(), follower_id = %edge.follower_id())
    )]
    async fn unfollow(&self, edge: Follow) -> RepositoryResult<()> {
        sqlx::query("DELETE FROM followers WHERE user_id = $1 AND follower_id = $2")
            .bind(edge.user_id().as_uuid())
            .bind(edge.follower_id().as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("followers.unfollow", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn followers(&self, user_id: UserId) -> RepositoryResult<Vec<User>> {
        let rows: Vec<UserRow> = sqlx::query_as(
            r#"
            SELECT u.id, u.name, u.username, u.email, u.created_at
            FROM users u
            INNER JOIN followers f ON u.id = f.follower_id
            WHERE f.user_id = $1
            ORDER BY u.name, u.username
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("followers.followers", e))?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    #[instrument(skip(self), fields(follower_id = %follower_id))]
    async fn following(&self, follower_id: UserId) -> RepositoryResult<Vec<User>> {
        let rows: Vec<UserRow> = sqlx::query_as(
            r#"
            SELECT u.id, u.name, u.username, u.email, u.created_at
            FROM users u
            INNER JOIN followers f ON u.id = f.user_id
            WHERE f.follower_id = $1
            ORDER BY u.name, u.username
            "#,
        )
        .bind(follower_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("followers.following", e))?;

        Ok(rows.into_iter().map(User::from).collect())
    }
}
