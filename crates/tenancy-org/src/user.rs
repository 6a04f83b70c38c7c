//! User domain model
//!
//! Users are the identity principals of the hierarchy. They own
//! organizations and participate in memberships. Credentials are handled
//! outside this crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An identity principal.
///
/// # Examples
///
/// ```
/// use tenancy_org::User;
///
/// let user = User::new("Owner@Example.com", "Test Owner");
/// assert_eq!(user.email, "owner@example.com");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,

    /// Email address (unique, stored lowercase)
    pub email: String,

    /// Display name
    pub display_name: String,

    /// When the user was created
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user. The email is normalized to lowercase so that
    /// uniqueness checks are case-insensitive.
    pub fn new(email: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            email: normalize_email(&email.into()),
            display_name: display_name.into(),
            created_at: Utc::now(),
        }
    }
}

/// Normalize an email address for storage and comparison.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// A minimal check that an email has a local part and a dotted domain.
///
/// # Examples
///
/// ```
/// use tenancy_org::user::is_plausible_email;
///
/// assert!(is_plausible_email("a@example.com"));
/// assert!(!is_plausible_email("example.com"));
/// ```
pub fn is_plausible_email(email: &str) -> bool {
    match email.trim().split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_creation_normalizes_email() {
        let user = User::new("  Alice@Example.COM ", "Alice");
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.display_name, "Alice");
    }

    #[test]
    fn test_plausible_email() {
        assert!(is_plausible_email("alice@example.com"));
        assert!(!is_plausible_email("alice@"));
        assert!(!is_plausible_email("@example.com"));
        assert!(!is_plausible_email("alice@example"));
        assert!(!is_plausible_email("alice@@example.com"));
    }
}
