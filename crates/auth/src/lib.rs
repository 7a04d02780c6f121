//! `socialnet-auth`: credentials, bearer tokens and ownership checks.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod authorize;
pub mod claims;
pub mod password;
pub mod token;

pub use authorize::{AuthzError, ensure_not_self, ensure_owner};
pub use claims::Claims;
pub use password::{PasswordError, hash_password, verify_credentials, verify_password};
pub use token::{DEFAULT_TOKEN_TTL, JwtService, JwtValidator, TokenError, extract_bearer};
