use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use socialnet_core::{NewUser, PasswordChange, Post, PostDraft, PostId, User, UserChanges, UserId};

use crate::app::errors::ApiError;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub pass: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub pass: String,
}

impl From<CreateUserRequest> for NewUser {
    fn from(body: CreateUserRequest) -> Self {
        Self {
            name: body.name,
            username: body.username,
            email: body.email,
            pass: body.pass,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
}

impl From<UpdateUserRequest> for UserChanges {
    fn from(body: UpdateUserRequest) -> Self {
        Self {
            name: body.name,
            username: body.username,
            email: body.email,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PostRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl From<PostRequest> for PostDraft {
    fn from(body: PostRequest) -> Self {
        Self {
            title: body.title,
            content: body.content,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PasswordChangeRequest {
    #[serde(default)]
    pub current: String,
    #[serde(default)]
    pub new: String,
}

impl From<PasswordChangeRequest> for PasswordChange {
    fn from(body: PasswordChangeRequest) -> Self {
        Self {
            current: body.current,
            new: body.new,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UserSearchParams {
    #[serde(default)]
    pub user: String,
}

// -------------------------
// Response views
// -------------------------

/// A user as returned to clients; the type has no password field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: UserId,
    pub name: String,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub author_id: UserId,
    pub author_username: String,
    pub likes: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Post> for PostView {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            author_id: post.author_id,
            author_username: post.author_username,
            likes: post.likes,
            created_at: post.created_at,
        }
    }
}

pub fn user_views(users: Vec<User>) -> Vec<UserView> {
    users.into_iter().map(UserView::from).collect()
}

pub fn post_views(posts: Vec<Post>) -> Vec<PostView> {
    posts.into_iter().map(PostView::from).collect()
}

// -------------------------
// Body extraction
// -------------------------

/// JSON body extractor with this API's error mapping: an unreadable body is
/// 422, a body that does not decode is 400. Content type is not checked.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::UnreadableBody(e.body_text()))?;

        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|e| ApiError::InvalidJson(e.to_string()))
    }
}
