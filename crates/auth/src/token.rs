//! Bearer token issuing and validation (HMAC-signed JWT).

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use thiserror::Error;

use socialnet_core::UserId;

use crate::Claims;

/// Lifetime of an issued token.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(6 * 60 * 60);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("missing bearer token")]
    Missing,

    #[error("unexpected signing method")]
    UnexpectedAlgorithm,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("missing required claim: {0}")]
    MissingClaim(String),

    #[error("invalid token subject")]
    InvalidSubject,

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Token validation seam used by the HTTP layer.
///
/// `now` is passed in so expiry is checked against the caller's clock.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError>;

    /// Validate, then return the subject as a user id.
    fn extract_subject(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, TokenError> {
        let claims = self.validate(token, now)?;
        claims.sub.parse().map_err(|_| TokenError::InvalidSubject)
    }
}

/// Issues HS256 tokens and accepts HMAC-signed tokens only.
#[derive(Clone)]
pub struct JwtService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl core::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("JwtService")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl JwtService {
    pub fn new(secret: impl AsRef<[u8]>, ttl: Duration) -> Self {
        let secret = secret.as_ref();

        let mut validation = Validation::new(Algorithm::HS256);
        // Any other family (RSA, EC, EdDSA, "none") is rejected before the signature check.
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        // Expiry is checked in `validate` against the supplied clock, with no leeway.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Issue a token for `user_id`, valid for the configured ttl from now.
    pub fn issue(&self, user_id: UserId) -> Result<String, TokenError> {
        self.issue_at(user_id, Utc::now())
    }

    pub fn issue_at(&self, user_id: UserId, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims::new(user_id, now, self.ttl);
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }
}

impl JwtValidator for JwtService {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        if token.is_empty() {
            return Err(TokenError::Missing);
        }

        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(map_jwt_error)?;

        if data.claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
            TokenError::UnexpectedAlgorithm
        }
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::MissingRequiredClaim(claim) => TokenError::MissingClaim(claim.clone()),
        _ => TokenError::Malformed(err.to_string()),
    }
}

/// Pull the token out of an `Authorization` header value.
///
/// Accepts exactly `Bearer <token>` (scheme case-insensitive). Anything else
/// yields an empty string, which then fails validation.
pub fn extract_bearer(header: &str) -> &str {
    let mut parts = header.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => token,
        _ => "",
    }
}
