//! Posts and post input.

use chrono::{DateTime, Utc};

use crate::{DomainError, DomainResult, PostId, UserId};

/// A post as read back from storage.
///
/// `author_username` is denormalized on read (joined from the author).
/// `Post::default()` is the zero value served for unknown ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub author_id: UserId,
    pub author_username: String,
    pub likes: i64,
    pub created_at: DateTime<Utc>,
}

/// Title and content submitted on create or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
}

impl PostDraft {
    pub fn prepare(self) -> DomainResult<Self> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(DomainError::validation("title is required"));
        }
        let content = self.content.trim();
        if content.is_empty() {
            return Err(DomainError::validation("content is required"));
        }
        Ok(Self {
            title: title.to_string(),
            content: content.to_string(),
        })
    }
}
