//! Error taxonomy for the adjudication engine.
//!
//! These are precondition failures: they prevent a request (or renewal)
//! from ever being created. Rule denials are not errors — see
//! [`crate::rules::Adjudication`].

use thiserror::Error;
use uuid::Uuid;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, AccessError>;

/// Errors raised by the adjudication engine and its orchestration.
#[derive(Debug, Error)]
pub enum AccessError {
    /// User not found.
    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    /// Module not found.
    #[error("Module not found: {0}")]
    ModuleNotFound(Uuid),

    /// Access request not found.
    #[error("Access request not found: {0}")]
    RequestNotFound(Uuid),

    /// Module exists but is not active.
    #[error("Module is not active: {0}")]
    ModuleInactive(String),

    /// The user already holds an active grant for the module.
    #[error("You already have active access to module: {0}")]
    DuplicateGrant(String),

    /// Justification failed the spam filter.
    #[error("Insufficient or generic justification")]
    GenericJustification,

    /// The request belongs to another user.
    #[error("You do not have permission to access this request")]
    NotRequestOwner,

    /// The request is not in `active` status.
    #[error("Only active requests can be renewed or canceled")]
    RequestNotActive,

    /// The request has no expiration date to renew against.
    #[error("Request has no expiration date")]
    MissingExpirationDate,

    /// The expiration is still too far away for a renewal.
    #[error(
        "Renewal is only allowed within 30 days of expiration. {days_remaining} days remaining"
    )]
    RenewalWindowNotOpen { days_remaining: i64 },

    /// Generic validation failure.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AccessError {
    /// Check if this error maps to a 404.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_) | Self::ModuleNotFound(_) | Self::RequestNotFound(_)
        )
    }

    /// Check if this error maps to a 403.
    #[must_use]
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::NotRequestOwner)
    }

    /// Check if this error maps to a 409.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::DuplicateGrant(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_is_disjoint() {
        let not_found = AccessError::RequestNotFound(Uuid::new_v4());
        assert!(not_found.is_not_found());
        assert!(!not_found.is_forbidden());
        assert!(!not_found.is_conflict());

        let forbidden = AccessError::NotRequestOwner;
        assert!(forbidden.is_forbidden());
        assert!(!forbidden.is_not_found());

        let conflict = AccessError::DuplicateGrant("Audit".into());
        assert!(conflict.is_conflict());
        assert!(!conflict.is_not_found());
    }

    #[test]
    fn renewal_window_message_reports_days() {
        let err = AccessError::RenewalWindowNotOpen { days_remaining: 42 };
        assert!(err.to_string().contains("42 days remaining"));
    }
}
