//! Organization domain models
//!
//! This module provides the core Organization entity. Organizations are the
//! top-level tenants that own memberships and businesses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::membership::Membership;
use crate::roles::Role;

/// An organization represents a tenant in the multi-tenant system.
///
/// Users can belong to multiple organizations with different roles.
/// The organization's owner always holds the single `OWNER` membership.
///
/// # Architecture
///
/// ```text
/// Organization
///   ├─ Members (via Membership)
///   └─ Businesses
///         └─ Integrations
///               └─ Detail variant
/// ```
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use tenancy_org::Organization;
///
/// let owner_id = Uuid::now_v7();
/// let org = Organization::new("Acme Corp", "acme-corp", owner_id);
/// assert_eq!(org.name, "Acme Corp");
/// assert!(org.is_active);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Organization {
    /// Unique identifier for the organization
    pub id: Uuid,

    /// Human-readable name
    pub name: String,

    /// URL-friendly slug (unique across platform, case-insensitive)
    pub slug: String,

    /// Owner user ID (the user who created the org)
    pub owner_id: Uuid,

    /// Whether the organization is active (false = soft deleted)
    pub is_active: bool,

    /// When the organization was created
    pub created_at: DateTime<Utc>,

    /// When the organization was last updated
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    /// Creates a new active organization.
    ///
    /// # Arguments
    ///
    /// * `name` - The organization name
    /// * `slug` - URL-friendly slug (must be globally unique)
    /// * `owner_id` - The user ID who owns this organization
    pub fn new(name: impl Into<String>, slug: impl Into<String>, owner_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            slug: slug.into(),
            owner_id,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// The key used for the global slug uniqueness constraint.
    ///
    /// # Examples
    ///
    /// ```
    /// use uuid::Uuid;
    /// use tenancy_org::Organization;
    ///
    /// let org = Organization::new("Acme", "Acme", Uuid::now_v7());
    /// assert_eq!(org.slug_key(), "acme");
    /// ```
    pub fn slug_key(&self) -> String {
        self.slug.to_lowercase()
    }

    /// Soft delete. Descendants are left untouched.
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

/// Summary of an organization for list displays.
///
/// This is a lightweight representation that includes aggregated counts and
/// the calling user's role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationSummary {
    /// Organization ID
    pub id: Uuid,

    /// Organization name
    pub name: String,

    /// Slug
    pub slug: String,

    /// Owner user ID
    pub owner_id: Uuid,

    /// Active flag
    pub is_active: bool,

    /// User's role in this organization
    pub user_role: Role,

    /// Number of members
    pub member_count: u32,

    /// Number of active businesses
    pub business_count: u32,

    /// When the organization was created
    pub created_at: DateTime<Utc>,

    /// When the organization was last updated
    pub updated_at: DateTime<Utc>,
}

impl OrganizationSummary {
    /// Build a summary from an organization and its aggregates.
    pub fn new(
        organization: &Organization,
        user_role: Role,
        member_count: u32,
        business_count: u32,
    ) -> Self {
        Self {
            id: organization.id,
            name: organization.name.clone(),
            slug: organization.slug.clone(),
            owner_id: organization.owner_id,
            is_active: organization.is_active,
            user_role,
            member_count,
            business_count,
            created_at: organization.created_at,
            updated_at: organization.updated_at,
        }
    }
}

/// Full view of an organization including its memberships.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationDetail {
    /// The organization itself
    #[serde(flatten)]
    pub organization: Organization,

    /// Memberships ordered by join time
    pub memberships: Vec<Membership>,

    /// Number of members
    pub member_count: u32,

    /// Number of active businesses
    pub business_count: u32,
}
