use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use socialnet_auth::{AuthzError, PasswordError, TokenError};
use socialnet_core::DomainError;
use socialnet_infra::RepositoryError;

/// Every way a request can fail, with its HTTP status.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body could not be read.
    #[error("{0}")]
    UnreadableBody(String),

    /// The body is not JSON of the expected shape.
    #[error("{0}")]
    InvalidJson(String),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UnreadableBody(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidJson(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Domain(DomainError::SelfFollow) => StatusCode::FORBIDDEN,
            Self::Domain(_) => StatusCode::BAD_REQUEST,
            Self::Token(TokenError::Signing(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Token(_) => StatusCode::UNAUTHORIZED,
            Self::Password(PasswordError::Mismatch) => StatusCode::UNAUTHORIZED,
            Self::Password(PasswordError::Hashing(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Server errors get one `error` event; storage failures already had
    /// theirs where the sqlx error was mapped.
    fn needs_logging(&self) -> bool {
        self.status().is_server_error() && !matches!(self, Self::Repository(_))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.needs_logging() {
            tracing::error!(error = %self, "request failed");
        }
        json_error(status, self.to_string())
    }
}

/// `{"error": message}` with the given status.
pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_error_taxonomy() {
        assert_eq!(ApiError::UnreadableBody("x".into()).status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(ApiError::InvalidJson("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(DomainError::validation("name is required")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::from(DomainError::SelfFollow).status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::from(TokenError::Expired).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::from(PasswordError::Mismatch).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::from(AuthzError::Forbidden("no".into())).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(RepositoryError::Database("boom".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn storage_failures_are_not_logged_again() {
        assert!(!ApiError::from(RepositoryError::Database("boom".into())).needs_logging());
        assert!(ApiError::from(PasswordError::Hashing("rng".into())).needs_logging());
        assert!(ApiError::from(TokenError::Signing("key".into())).needs_logging());
        assert!(!ApiError::from(TokenError::Expired).needs_logging());
    }

    #[test]
    fn repository_message_is_passed_through() {
        let err = ApiError::from(RepositoryError::Database(
            "duplicate key value violates unique constraint \"users_email_key\"".into(),
        ));
        assert_eq!(
            err.to_string(),
            "duplicate key value violates unique constraint \"users_email_key\""
        );
    }
}
