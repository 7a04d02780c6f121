use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use socialnet_core::{Post, PostDraft, PostId, UserId};

use super::PostRow;
use crate::repositories::{PostRepository, RepositoryResult, map_sqlx_error};

const POST_COLUMNS: &str = "p.id, p.title, p.content, p.author_id, u.username AS author_username, p.likes, p.created_at";

/// `posts` table access. Reads join `users` for the author's username.
#[derive(Debug, Clone)]
pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    #[instrument(skip(self, draft), fields(author_id = %author_id))]
    async fn create(&self, author_id: UserId, draft: &PostDraft) -> RepositoryResult<PostId> {
        let id = PostId::new();
        sqlx::query("INSERT INTO posts (id, title, content, author_id) VALUES ($1, $2, $3, $4)")
            .bind(id.as_uuid())
            .bind(&draft.title)
            .bind(&draft.content)
            .bind(author_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("posts.create", e))?;
        Ok(id)
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn feed(&self, user_id: UserId) -> RepositoryResult<Vec<Post>> {
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts p
            INNER JOIN users u ON u.id = p.author_id
            LEFT JOIN followers f ON f.user_id = p.author_id AND f.follower_id = $1
            WHERE p.author_id = $1 OR f.follower_id = $1
            ORDER BY p.created_at DESC, p.id DESC
            "#
        );
        let rows: Vec<PostRow> = sqlx::query_as(&sql)
            .bind(user_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("posts.feed", e))?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    #[instrument(skip(self), fields(post_id = %id))]
    async fn find_by_id(&self, id: PostId) -> RepositoryResult<Option<Post>> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts p INNER JOIN users u ON u.id = p.author_id WHERE p.id = $1"
        );
        let row: Option<PostRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("posts.find_by_id", e))?;

        Ok(row.map(Post::from))
    }

    #[instrument(skip(self, draft), fields(post_id = %id))]
    async fn update(&self, id: PostId, draft: &PostDraft) -> RepositoryResult<()> {
        sqlx::query("UPDATE posts SET title = $1, content = $2 WHERE id = $3")
            .bind(&draft.title)
            .bind(&draft.content)
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("posts.update", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(post_id = %id))]
    async fn delete(&self, id: PostId) -> RepositoryResult<()> {
        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("posts.delete", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(author_id = %author_id))]
    async fn by_author(&self, author_id: UserId) -> RepositoryResult<Vec<Post>> {
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts p
            INNER JOIN users u ON u.id = p.author_id
            WHERE p.author_id = $1
            ORDER BY p.created_at DESC, p.id DESC
            "#
        );
        let rows: Vec<PostRow> = sqlx::query_as(&sql)
            .bind(author_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("posts.by_author", e))?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    #[instrument(skip(self), fields(post_id = %id))]
    async fn like(&self, id: PostId) -> RepositoryResult<()> {
        sqlx::query("UPDATE posts SET likes = likes + 1 WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("posts.like", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(post_id = %id))]
    async fn unlike(&self, id: PostId) -> RepositoryResult<()> {
        sqlx::query("UPDATE posts SET likes = GREATEST(likes - 1, 0) WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("posts.unlike", e))?;
        Ok(())
    }
}
