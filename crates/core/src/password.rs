use crate::{DomainError, DomainResult};

/// Password change request. Transient: never stored as an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordChange {
    pub current: String,
    pub new: String,
}

impl PasswordChange {
    pub fn prepare(self) -> DomainResult<Self> {
        if self.current.is_empty() {
            return Err(DomainError::validation("current password is required"));
        }
        if self.new.is_empty() {
            return Err(DomainError::validation("new password is required"));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_passwords_required() {
        let change = PasswordChange {
            current: "old".to_string(),
            new: String::new(),
        };
        assert_eq!(
            change.prepare().unwrap_err(),
            DomainError::validation("new password is required")
        );

        let change = PasswordChange {
            current: String::new(),
            new: "new".to_string(),
        };
        assert!(change.prepare().is_err());
    }
}
