//! Edit rights for a resource

use crate::error::EditorError;

/// Result of an edit permission check.
///
/// The reason is kept even when access is granted so the UI can always show
/// why an affordance is enabled or disabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditPermission {
    pub allowed: bool,
    pub reason: String,
}

impl EditPermission {
    pub fn granted() -> Self {
        Self {
            allowed: true,
            reason: "You have full access to certificate editor features.".to_string(),
        }
    }

    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
        }
    }

    /// Fail with `PermissionDenied` carrying the reason unless allowed
    pub fn require(&self) -> Result<(), EditorError> {
        if self.allowed {
            Ok(())
        } else {
            Err(EditorError::permission_denied(self.reason.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_threads_reason() {
        let denied = EditPermission::denied("committee members only");
        assert_eq!(
            denied.require(),
            Err(EditorError::permission_denied("committee members only"))
        );
        assert!(EditPermission::granted().require().is_ok());
    }
}
