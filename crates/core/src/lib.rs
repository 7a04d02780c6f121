//! `socialnet-core`: domain foundation for the social network service.
//!
//! This crate contains **pure domain** types and input normalization (no IO).

pub mod error;
pub mod follow;
pub mod id;
pub mod password;
pub mod post;
pub mod user;

pub use error::{DomainError, DomainResult};
pub use follow::Follow;
pub use id::{PostId, UserId};
pub use password::PasswordChange;
pub use post::{Post, PostDraft};
pub use user::{NewUser, User, UserChanges};
