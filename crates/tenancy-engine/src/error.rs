//! Error types for tenancy operations
//!
//! [`TenancyError`] is the taxonomy surfaced to the transport layer.
//! [`StoreError`] is what a [`crate::store::TenantStore`] reports; it is
//! classified into a `TenancyError` by the `From` conversion.

use tenancy_org::IntegrationType;
use thiserror::Error;

/// Uniqueness constraints enforced by the graph store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constraint {
    /// `user.email`, case-insensitive
    UserEmail,
    /// `organization.slug`, global and case-insensitive
    OrganizationSlug,
    /// `(business.organization, business.slug)`
    BusinessSlug,
    /// `(membership.user, membership.organization)`
    MembershipUserOrganization,
    /// one detail record per integration
    IntegrationDetail,
}

impl Constraint {
    /// Human-readable description of the violated constraint.
    pub fn description(&self) -> &'static str {
        match self {
            Constraint::UserEmail => "a user with this email already exists",
            Constraint::OrganizationSlug => "an organization with this slug already exists",
            Constraint::BusinessSlug => {
                "a business with this slug already exists in the organization"
            }
            Constraint::MembershipUserOrganization => {
                "the user is already a member of this organization"
            }
            Constraint::IntegrationDetail => "the integration already has a detail record",
        }
    }
}

/// Errors reported by the persistence layer.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write
    #[error("Unique constraint violated: {0:?}")]
    UniqueViolation(Constraint),

    /// A row could not be removed because another row references it
    #[error("Protected reference: {0}")]
    ProtectedReference(String),

    /// A referenced parent row does not exist
    #[error("Missing reference: {0}")]
    MissingReference(String),

    /// The row to update or delete does not exist
    #[error("Row not found: {0}")]
    RowNotFound(String),

    /// The write would break the owner-membership invariant
    #[error("Owner membership invariant: {0}")]
    OwnerInvariant(String),

    /// A detail variant disagrees with its integration's type
    #[error("Detail type mismatch: integration is {expected}, detail is {actual}")]
    DetailTypeMismatch {
        expected: IntegrationType,
        actual: IntegrationType,
    },

    /// The backing store could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Tenancy error types.
///
/// `NotFound` deliberately covers "absent", "inactive" and "outside the
/// resolved hierarchy path" alike, so callers cannot probe for the
/// existence of other tenants' entities.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TenancyError {
    /// Entity absent, inactive, or not under the requested parent
    #[error("{0} not found")]
    NotFound(String),

    /// Entity in scope but the principal lacks the required role
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Uniqueness or single-detail violation
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Detail variant does not match the integration type
    #[error("Type mismatch: integration is {expected}, detail is {actual}")]
    TypeMismatch {
        /// The integration's declared type
        expected: IntegrationType,
        /// The variant that was supplied
        actual: IntegrationType,
    },

    /// Operation not allowed regardless of role
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Store-level reference violation
    #[error("Referential integrity error: {0}")]
    ReferentialIntegrity(String),

    /// Malformed input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Backing store failure
    #[error("Store error: {0}")]
    Store(String),
}

/// Result type for tenancy operations.
pub type TenancyResult<T> = Result<T, TenancyError>;

impl TenancyError {
    /// `NotFound` for an entity kind.
    pub fn not_found(entity: &str) -> Self {
        let mut name = entity.to_string();
        if let Some(first) = name.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        TenancyError::NotFound(name)
    }

    /// Check if this error should be logged at error level.
    pub fn is_server_error(&self) -> bool {
        matches!(self, TenancyError::Store(_))
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            TenancyError::NotFound(_) => 404,
            TenancyError::Forbidden(_) => 403,
            TenancyError::Conflict(_) | TenancyError::ReferentialIntegrity(_) => 409,
            TenancyError::TypeMismatch { .. }
            | TenancyError::InvalidOperation(_)
            | TenancyError::Validation(_) => 400,
            TenancyError::Store(_) => 500,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            TenancyError::NotFound(_) => "NOT_FOUND",
            TenancyError::Forbidden(_) => "FORBIDDEN",
            TenancyError::Conflict(_) => "CONFLICT",
            TenancyError::TypeMismatch { .. } => "TYPE_MISMATCH",
            TenancyError::InvalidOperation(_) => "INVALID_OPERATION",
            TenancyError::ReferentialIntegrity(_) => "REFERENTIAL_INTEGRITY",
            TenancyError::Validation(_) => "VALIDATION_ERROR",
            TenancyError::Store(_) => "STORE_ERROR",
        }
    }
}

impl From<StoreError> for TenancyError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(constraint) => {
                TenancyError::Conflict(constraint.description().to_string())
            }
            StoreError::ProtectedReference(msg) | StoreError::MissingReference(msg) => {
                TenancyError::ReferentialIntegrity(msg)
            }
            StoreError::RowNotFound(entity) => TenancyError::not_found(&entity),
            StoreError::OwnerInvariant(msg) => TenancyError::InvalidOperation(msg),
            StoreError::DetailTypeMismatch { expected, actual } => {
                TenancyError::TypeMismatch { expected, actual }
            }
            StoreError::Unavailable(msg) => TenancyError::Store(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(TenancyError::not_found("business").status_code(), 404);
        assert_eq!(TenancyError::Forbidden("x".into()).status_code(), 403);
        assert_eq!(TenancyError::Conflict("x".into()).status_code(), 409);
        assert_eq!(
            TenancyError::TypeMismatch {
                expected: IntegrationType::WhatsApp,
                actual: IntegrationType::FacebookPage,
            }
            .status_code(),
            400
        );
        assert_eq!(TenancyError::InvalidOperation("x".into()).status_code(), 400);
        assert_eq!(TenancyError::Store("down".into()).status_code(), 500);
    }

    #[test]
    fn test_not_found_message() {
        let err = TenancyError::not_found("organization");
        assert_eq!(err.to_string(), "Organization not found");
        assert_eq!(err.error_code(), "NOT_FOUND");
    }

    #[test]
    fn test_store_error_classification() {
        let err: TenancyError = StoreError::UniqueViolation(Constraint::OrganizationSlug).into();
        assert!(matches!(err, TenancyError::Conflict(_)));

        let err: TenancyError = StoreError::ProtectedReference("owner".into()).into();
        assert!(matches!(err, TenancyError::ReferentialIntegrity(_)));

        let err: TenancyError = StoreError::OwnerInvariant("owner".into()).into();
        assert!(matches!(err, TenancyError::InvalidOperation(_)));

        let err: TenancyError = StoreError::DetailTypeMismatch {
            expected: IntegrationType::WhatsApp,
            actual: IntegrationType::Slack,
        }
        .into();
        assert_eq!(
            err,
            TenancyError::TypeMismatch {
                expected: IntegrationType::WhatsApp,
                actual: IntegrationType::Slack,
            }
        );

        let err: TenancyError = StoreError::Unavailable("down".into()).into();
        assert!(err.is_server_error());
    }
}
