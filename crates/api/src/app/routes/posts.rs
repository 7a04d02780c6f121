use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};

use socialnet_auth::ensure_owner;
use socialnet_core::{PostDraft, PostId, UserId};

use super::Route;
use crate::app::dto::{self, JsonBody, PostRequest, PostView};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn routes() -> Vec<Route> {
    vec![
        Route::authenticated("/posts", post(create_post)),
        Route::authenticated("/posts", get(feed)),
        Route::authenticated("/posts/:post_id", get(get_post)),
        Route::authenticated("/posts/:post_id", put(update_post)),
        Route::authenticated("/posts/:post_id", delete(delete_post)),
        Route::authenticated("/posts/:post_id/like", post(like_post)),
        Route::authenticated("/posts/:post_id/unlike", post(unlike_post)),
        Route::authenticated("/users/:user_id/posts", get(posts_by_user)),
    ]
}

pub async fn create_post(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    JsonBody(body): JsonBody<PostRequest>,
) -> Result<Response, ApiError> {
    let draft = PostDraft::from(body).prepare()?;

    let post_id = services.repos.posts.create(principal.user_id(), &draft).await?;
    let post = services.repos.posts.find_by_id(post_id).await?.unwrap_or_default();
    tracing::info!(%post_id, author_id = %principal.user_id(), "post created");

    Ok((StatusCode::CREATED, Json(PostView::from(post))).into_response())
}

/// The caller's own posts and those of everyone they follow, newest first.
pub async fn feed(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<Response, ApiError> {
    let posts = services.repos.posts.feed(principal.user_id()).await?;
    Ok(Json(dto::post_views(posts)).into_response())
}

/// Absent posts come back as a zero-valued view with status 200.
pub async fn get_post(
    Extension(services): Extension<Arc<AppServices>>,
    Path(post_id): Path<String>,
) -> Result<Response, ApiError> {
    let post_id: PostId = post_id.parse()?;

    let post = services.repos.posts.find_by_id(post_id).await?.unwrap_or_default();
    Ok(Json(PostView::from(post)).into_response())
}

pub async fn update_post(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(post_id): Path<String>,
    JsonBody(body): JsonBody<PostRequest>,
) -> Result<Response, ApiError> {
    let post_id: PostId = post_id.parse()?;

    // An absent post has the nil author, so this fails for it too.
    let stored = services.repos.posts.find_by_id(post_id).await?.unwrap_or_default();
    ensure_owner(principal.user_id(), stored.author_id, "You cannot update another user's post")?;

    let draft = PostDraft::from(body).prepare()?;
    services.repos.posts.update(post_id, &draft).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn delete_post(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(post_id): Path<String>,
) -> Result<Response, ApiError> {
    let post_id: PostId = post_id.parse()?;

    let stored = services.repos.posts.find_by_id(post_id).await?.unwrap_or_default();
    ensure_owner(principal.user_id(), stored.author_id, "You cannot delete another user's post")?;

    services.repos.posts.delete(post_id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn posts_by_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(user_id): Path<String>,
) -> Result<Response, ApiError> {
    let user_id: UserId = user_id.parse()?;

    let posts = services.repos.posts.by_author(user_id).await?;
    Ok(Json(dto::post_views(posts)).into_response())
}

pub async fn like_post(
    Extension(services): Extension<Arc<AppServices>>,
    Path(post_id): Path<String>,
) -> Result<Response, ApiError> {
    let post_id: PostId = post_id.parse()?;
    services.repos.posts.like(post_id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn unlike_post(
    Extension(services): Extension<Arc<AppServices>>,
    Path(post_id): Path<String>,
) -> Result<Response, ApiError> {
    let post_id: PostId = post_id.parse()?;
    services.repos.posts.unlike(post_id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
