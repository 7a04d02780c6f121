use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use socialnet_core::UserId;

/// Claims carried by an access token.
///
/// `sub` holds the user id as a string, `iat`/`exp` are Unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
    #[serde(default)]
    pub authorized: bool,
}

impl Claims {
    pub fn new(subject: UserId, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let iat = issued_at.timestamp();
        Self {
            sub: subject.to_string(),
            exp: iat.saturating_add(ttl_secs),
            iat,
            authorized: true,
        }
    }

    /// A token is usable strictly before its expiry instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}
