use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, Query, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};

use socialnet_auth::{ensure_not_self, ensure_owner, hash_password, verify_credentials};
use socialnet_core::{Follow, NewUser, PasswordChange, UserChanges, UserId};
use socialnet_infra::NewUserRecord;

use super::Route;
use crate::app::dto::{
    self, CreateUserRequest, JsonBody, PasswordChangeRequest, UpdateUserRequest, UserSearchParams,
    UserView,
};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn routes() -> Vec<Route> {
    vec![
        Route::public("/users", post(create_user)),
        Route::authenticated("/users", get(search_users)),
        Route::authenticated("/users/:user_id", get(get_user)),
        Route::authenticated("/users/:user_id", put(update_user)),
        Route::authenticated("/users/:user_id", delete(delete_user)),
        Route::authenticated("/users/:user_id/follow", post(follow_user)),
        Route::authenticated("/users/:user_id/unfollow", delete(unfollow_user)),
        Route::authenticated("/users/:user_id/followers", get(list_followers)),
        Route::authenticated("/users/:user_id/following", get(list_following)),
        Route::authenticated("/users/:user_id/update-password", post(update_password)),
    ]
}

pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    JsonBody(body): JsonBody<CreateUserRequest>,
) -> Result<Response, ApiError> {
    let user = NewUser::from(body).prepare()?;
    let password_hash = hash_password(&user.pass)?;

    let created = services
        .repos
        .users
        .create(NewUserRecord {
            name: user.name,
            username: user.username,
            email: user.email,
            password_hash,
        })
        .await?;
    tracing::info!(user_id = %created.id, "user registered");

    Ok((StatusCode::CREATED, Json(UserView::from(created))).into_response())
}

pub async fn search_users(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<UserSearchParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let users = services.repos.users.search(params.user.trim()).await?;
    Ok(Json(dto::user_views(users)).into_response())
}

/// Absent users come back as a zero-valued view with status 200.
pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(user_id): Path<String>,
) -> Result<Response, ApiError> {
    let user_id: UserId = user_id.parse()?;

    let user = services.repos.users.find_by_id(user_id).await?.unwrap_or_default();
    Ok(Json(UserView::from(user)).into_response())
}

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(user_id): Path<String>,
    JsonBody(body): JsonBody<UpdateUserRequest>,
) -> Result<Response, ApiError> {
    let user_id: UserId = user_id.parse()?;
    ensure_owner(principal.user_id(), user_id, "You cannot update another user's account")?;

    let changes = UserChanges::from(body).prepare()?;
    services.repos.users.update(user_id, &changes).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(user_id): Path<String>,
) -> Result<Response, ApiError> {
    let user_id: UserId = user_id.parse()?;
    ensure_owner(principal.user_id(), user_id, "You cannot delete another user's account")?;

    services.repos.users.delete(user_id).await?;
    tracing::info!(%user_id, "user deleted");

    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn follow_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(user_id): Path<String>,
) -> Result<Response, ApiError> {
    let user_id: UserId = user_id.parse()?;
    ensure_not_self(principal.user_id(), user_id, "You cannot follow yourself")?;

    let edge = Follow::new(user_id, principal.user_id())?;
    services.repos.followers.follow(edge).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn unfollow_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(user_id): Path<String>,
) -> Result<Response, ApiError> {
    let user_id: UserId = user_id.parse()?;
    ensure_not_self(principal.user_id(), user_id, "You cannot unfollow yourself")?;

    let edge = Follow::new(user_id, principal.user_id())?;
    services.repos.followers.unfollow(edge).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn list_followers(
    Extension(services): Extension<Arc<AppServices>>,
    Path(user_id): Path<String>,
) -> Result<Response, ApiError> {
    let user_id: UserId = user_id.parse()?;

    let users = services.repos.followers.followers(user_id).await?;
    Ok(Json(dto::user_views(users)).into_response())
}

pub async fn list_following(
    Extension(services): Extension<Arc<AppServices>>,
    Path(user_id): Path<String>,
) -> Result<Response, ApiError> {
    let user_id: UserId = user_id.parse()?;

    let users = services.repos.followers.following(user_id).await?;
    Ok(Json(dto::user_views(users)).into_response())
}

/// Replace the caller's password after checking the current one (401 on
/// mismatch).
pub async fn update_password(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(user_id): Path<String>,
    JsonBody(body): JsonBody<PasswordChangeRequest>,
) -> Result<Response, ApiError> {
    let user_id: UserId = user_id.parse()?;
    ensure_owner(principal.user_id(), user_id, "You cannot change another user's password")?;

    let change = PasswordChange::from(body).prepare()?;
    let stored = services.repos.users.password_hash(user_id).await?;
    verify_credentials(&change.current, stored.as_deref())?;

    let password_hash = hash_password(&change.new)?;
    services.repos.users.update_password(user_id, &password_hash).await?;
    tracing::info!(%user_id, "password changed");

    Ok(StatusCode::NO_CONTENT.into_response())
}
