//! Business domain models
//!
//! A business is a tenant-scoped unit under an organization. Its slug is
//! unique within its organization, not globally.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A business within an organization.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use tenancy_org::Business;
///
/// let org_id = Uuid::now_v7();
/// let business = Business::new(org_id, "Store", "store");
/// assert_eq!(business.organization_id, org_id);
/// assert!(business.is_active);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Business {
    /// Unique identifier for the business
    pub id: Uuid,

    /// Organization this business belongs to
    pub organization_id: Uuid,

    /// Human-readable name
    pub name: String,

    /// URL-friendly slug (unique within organization)
    pub slug: String,

    /// Optional description
    pub description: Option<String>,

    /// Whether the business is active (false = soft deleted)
    pub is_active: bool,

    /// When the business was created
    pub created_at: DateTime<Utc>,

    /// When the business was last updated
    pub updated_at: DateTime<Utc>,
}

impl Business {
    /// Creates a new active business.
    pub fn new(organization_id: Uuid, name: impl Into<String>, slug: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            organization_id,
            name: name.into(),
            slug: slug.into(),
            description: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Soft delete. Integrations are left untouched.
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.touch();
    }

    /// Undo a soft delete.
    pub fn restore(&mut self) {
        self.is_active = true;
        self.touch();
    }

    /// Bump `updated_at`.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// A business with its active integration count, for list displays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessSummary {
    /// The business itself
    #[serde(flatten)]
    pub business: Business,

    /// Number of active integrations
    pub integration_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_creation() {
        let org_id = Uuid::now_v7();
        let business = Business::new(org_id, "E-commerce Store", "ecommerce-store")
            .with_description("Our main online store");

        assert_eq!(business.name, "E-commerce Store");
        assert_eq!(business.slug, "ecommerce-store");
        assert_eq!(business.description.as_deref(), Some("Our main online store"));
        assert!(business.is_active);
    }

    #[test]
    fn test_summary_flattens_business() {
        let business = Business::new(Uuid::now_v7(), "Store", "store");
        let summary = BusinessSummary {
            business,
            integration_count: 2,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["slug"], "store");
        assert_eq!(json["integration_count"], 2);
    }
}
