use socialnet_core::UserId;

/// Authenticated identity for a request (the token subject).
///
/// Inserted by the authentication middleware; handlers on public routes never
/// see it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    user_id: UserId,
}

impl PrincipalContext {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}
