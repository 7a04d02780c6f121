//! Ownership checks for mutations.
//!
//! - No IO
//! - No panics

use thiserror::Error;

use socialnet_core::UserId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("{0}")]
    Forbidden(String),
}

/// Allow only when the token subject owns the resource.
pub fn ensure_owner(subject: UserId, owner: UserId, denial: &str) -> Result<(), AuthzError> {
    if subject == owner {
        Ok(())
    } else {
        tracing::debug!(%subject, %owner, "ownership check failed");
        Err(AuthzError::Forbidden(denial.to_string()))
    }
}

/// Allow only when the subject targets somebody else.
pub fn ensure_not_self(subject: UserId, target: UserId, denial: &str) -> Result<(), AuthzError> {
    if subject == target {
        Err(AuthzError::Forbidden(denial.to_string()))
    } else {
        Ok(())
    }
}
