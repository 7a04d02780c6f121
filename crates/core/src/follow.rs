use crate::{DomainError, DomainResult, UserId};

/// Directed edge: `follower_id` follows `user_id`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Follow {
    user_id: UserId,
    follower_id: UserId,
}

impl Follow {
    /// Build an edge; self-follow is rejected.
    pub fn new(user_id: UserId, follower_id: UserId) -> DomainResult<Self> {
        if user_id == follower_id {
            return Err(DomainError::SelfFollow);
        }
        Ok(Self {
            user_id,
            follower_id,
        })
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn follower_id(&self) -> UserId {
        self.follower_id
    }
}
