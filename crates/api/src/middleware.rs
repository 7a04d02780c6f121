use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use socialnet_auth::{JwtValidator, extract_bearer};

use crate::app::errors::ApiError;
use crate::context::PrincipalContext;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
}

/// Log every request, then forward it unchanged.
pub async fn log_request(req: Request, next: Next) -> Response {
    let host = req
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default();
    tracing::info!(method = %req.method(), uri = %req.uri(), host, "request");

    next.run(req).await
}

/// Reject the request with 401 unless it carries a valid bearer token.
///
/// On success the token subject is available to handlers as a
/// [`PrincipalContext`] extension.
pub async fn authenticate(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default();
    let token = extract_bearer(authorization);

    let user_id = state.jwt.extract_subject(token, Utc::now()).map_err(|e| {
        tracing::debug!(error = %e, "rejected bearer token");
        ApiError::from(e)
    })?;

    req.extensions_mut().insert(PrincipalContext::new(user_id));

    Ok(next.run(req).await)
}
