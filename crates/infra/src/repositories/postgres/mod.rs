//! Postgres repositories (sqlx, parameterized statements only).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use socialnet_core::{Post, PostId, User, UserId};

mod followers;
mod posts;
mod users;

pub use followers::PostgresFollowerRepository;
pub use posts::PostgresPostRepository;
pub use users::PostgresUserRepository;

/// Columns shared by every user query. `pass` is only selected for
/// credential lookups; other queries leave it empty.
#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    username: String,
    email: String,
    #[sqlx(default)]
    pass: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::from_uuid(row.id),
            name: row.name,
            username: row.username,
            email: row.email,
            password_hash: row.pass,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct PostRow {
    id: Uuid,
    title: String,
    content: String,
    author_id: Uuid,
    author_username: String,
    likes: i64,
    created_at: DateTime<Utc>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Self {
            id: PostId::from_uuid(row.id),
            title: row.title,
            content: row.content,
            author_id: UserId::from_uuid(row.author_id),
            author_username: row.author_username,
            likes: row.likes,
            created_at: row.created_at,
        }
    }
}

/// Escape LIKE metacharacters so user input matches literally.
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
