use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};

use socialnet_auth::verify_credentials;

use super::Route;
use crate::app::dto::{JsonBody, LoginRequest};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub fn routes() -> Vec<Route> {
    vec![Route::public("/login", post(login))]
}

/// Exchange email and password for a bearer token (returned as the raw body).
///
/// An unknown email and a wrong password both run a full hash check and fail
/// the same way, so the caller cannot tell them apart.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<Response, ApiError> {
    let stored = services.repos.users.find_by_email(body.email.trim()).await?;

    verify_credentials(&body.pass, stored.as_ref().map(|u| u.password_hash.as_str()))?;
    let user_id = stored.map(|u| u.id).unwrap_or_default();

    let token = services.jwt.issue(user_id)?;
    tracing::info!(%user_id, "login succeeded");

    Ok((StatusCode::OK, token).into_response())
}
