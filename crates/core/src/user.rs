//! Users: the stored record and the inputs that create or change one.

use chrono::{DateTime, Utc};
use email_address::EmailAddress;

use crate::{DomainError, DomainResult, UserId};

/// A registered user as stored.
///
/// `password_hash` is only read for credential checks; response views never
/// carry it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub pass: String,
}

impl NewUser {
    /// Trim and validate the registration fields.
    ///
    /// The password is kept verbatim; it only has to be non-empty.
    pub fn prepare(self) -> DomainResult<Self> {
        let (name, username, email) = prepare_profile(self.name, self.username, self.email)?;
        if self.pass.is_empty() {
            return Err(DomainError::validation("pass is required"));
        }
        Ok(Self {
            name,
            username,
            email,
            pass: self.pass,
        })
    }
}

/// Profile update input (no password).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserChanges {
    pub name: String,
    pub username: String,
    pub email: String,
}

impl UserChanges {
    pub fn prepare(self) -> DomainResult<Self> {
        let (name, username, email) = prepare_profile(self.name, self.username, self.email)?;
        Ok(Self {
            name,
            username,
            email,
        })
    }
}

fn prepare_profile(
    name: String,
    username: String,
    email: String,
) -> DomainResult<(String, String, String)> {
    let name = required("name", &name)?;
    let username = required("username", &username)?;
    let email = required("email", &email)?;
    if !is_well_formed_email(&email) {
        return Err(DomainError::validation("email is invalid"));
    }
    Ok((name, username, email))
}

fn required(field: &str, value: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// RFC 5322 address (no display name) whose domain has at least two labels.
pub fn is_well_formed_email(email: &str) -> bool {
    EmailAddress::is_valid(email)
        && !email.ends_with('>')
        && email
            .rsplit_once('@')
            .is_some_and(|(_, domain)| domain.contains('.'))
}
