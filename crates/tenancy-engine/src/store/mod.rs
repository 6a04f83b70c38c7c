//! Tenant graph store
//!
//! The [`TenantStore`] trait is the persistence seam of the engine. Every
//! method is one atomic unit: a relational implementation runs each call in
//! a single transaction, the in-memory implementation under a single write
//! lock. Implementations must enforce the uniqueness constraints listed in
//! [`crate::error::Constraint`] and report violations as
//! [`StoreError::UniqueViolation`], which is what slug disambiguation relies
//! on to break creation races.
//!
//! Read methods take a [`Visibility`]. `Visibility::Active` filters on the
//! row's own `is_active` flag only; folding in ancestor activity is the job
//! of [`crate::visibility`].
//!
//! Writes to existing rows never take a whole row from the caller. They take
//! the changed fields (`*Changes`) or the new active flag and apply them to
//! the current row inside the atomic unit, so a copy read earlier in the
//! request cannot overwrite a concurrent delete, restore or rename.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tenancy_org::{
    Business, DetailRecord, Integration, IntegrationConfig, IntegrationDetail, IntegrationType,
    Membership, Organization, User,
};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};

pub use memory::{InMemoryTenantStore, StoreStats};

/// Which rows a read may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// Only rows whose own active flag is set
    #[default]
    Active,
    /// Active and soft-deleted rows
    All,
}

impl Visibility {
    /// Whether a row with the given active flag is visible.
    pub fn admits(&self, is_active: bool) -> bool {
        match self {
            Visibility::Active => is_active,
            Visibility::All => true,
        }
    }
}

/// Field changes to an organization. `None` leaves the field as stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrganizationChanges {
    pub name: Option<String>,
    pub slug: Option<String>,
}

/// Field changes to a business.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BusinessChanges {
    pub name: Option<String>,
    pub slug: Option<String>,
    /// `Some(None)` clears the description
    pub description: Option<Option<String>>,
}

/// Field changes to an integration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntegrationChanges {
    pub name: Option<String>,
    pub integration_type: Option<IntegrationType>,
    pub config: Option<IntegrationConfig>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

/// Persistence contract for the tenant hierarchy.
#[async_trait]
pub trait TenantStore: Send + Sync {
    // ---- users ----

    /// Insert a user. Fails with `UniqueViolation(UserEmail)` on a
    /// case-insensitive email collision.
    async fn insert_user(&self, user: User) -> StoreResult<User>;

    /// Get a user by id.
    async fn get_user(&self, user_id: Uuid) -> StoreResult<Option<User>>;

    /// Physically delete a user and their memberships.
    ///
    /// Fails with `ProtectedReference` while the user owns any organization;
    /// ownership is never reassigned silently.
    async fn delete_user(&self, user_id: Uuid) -> StoreResult<()>;

    // ---- organizations ----

    /// Insert an organization together with its owner membership.
    ///
    /// The membership is produced by
    /// [`crate::hooks::on_organization_created`] inside the same atomic
    /// unit, so no creation path can skip it. Fails with
    /// `UniqueViolation(OrganizationSlug)` on a case-insensitive slug
    /// collision and `MissingReference` when the owner does not exist.
    async fn insert_organization(
        &self,
        organization: Organization,
    ) -> StoreResult<(Organization, Membership)>;

    /// Get an organization by id.
    async fn get_organization(
        &self,
        organization_id: Uuid,
        visibility: Visibility,
    ) -> StoreResult<Option<Organization>>;

    /// Apply field changes to an organization. Re-checks slug uniqueness.
    /// `owner_id` is not changeable.
    async fn update_organization(
        &self,
        organization_id: Uuid,
        changes: OrganizationChanges,
    ) -> StoreResult<Organization>;

    /// Set the organization's own active flag.
    async fn set_organization_active(
        &self,
        organization_id: Uuid,
        active: bool,
    ) -> StoreResult<Organization>;

    /// Whether an organization (active or not) already uses `slug`.
    async fn organization_slug_taken(&self, slug: &str) -> StoreResult<bool>;

    /// Organizations in which `user_id` holds a membership.
    async fn list_organizations_for_user(
        &self,
        user_id: Uuid,
        visibility: Visibility,
    ) -> StoreResult<Vec<Organization>>;

    // ---- memberships ----

    /// Insert a non-owner membership. Fails with
    /// `UniqueViolation(MembershipUserOrganization)` when the pair exists and
    /// `OwnerInvariant` for the `OWNER` role.
    async fn insert_membership(&self, membership: Membership) -> StoreResult<Membership>;

    /// Get the membership of `user_id` in `organization_id`.
    async fn get_membership(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<Membership>>;

    /// Replace a membership's role. Moving a membership to or from `OWNER`
    /// fails with `OwnerInvariant`.
    async fn update_membership(&self, membership: Membership) -> StoreResult<Membership>;

    /// Delete a membership. Returns `false` when none existed. The owner
    /// membership cannot be deleted (`OwnerInvariant`).
    async fn delete_membership(&self, organization_id: Uuid, user_id: Uuid) -> StoreResult<bool>;

    /// Memberships of an organization ordered by join time.
    async fn list_memberships(&self, organization_id: Uuid) -> StoreResult<Vec<Membership>>;

    // ---- businesses ----

    /// Insert a business. Fails with `UniqueViolation(BusinessSlug)` when
    /// the slug is used by any business of the same organization.
    async fn insert_business(&self, business: Business) -> StoreResult<Business>;

    /// Get a business by id.
    async fn get_business(
        &self,
        business_id: Uuid,
        visibility: Visibility,
    ) -> StoreResult<Option<Business>>;

    /// Apply field changes to a business. Re-checks slug uniqueness within
    /// its organization.
    async fn update_business(
        &self,
        business_id: Uuid,
        changes: BusinessChanges,
    ) -> StoreResult<Business>;

    /// Set the business's own active flag.
    async fn set_business_active(&self, business_id: Uuid, active: bool) -> StoreResult<Business>;

    /// Whether a business of `organization_id` already uses `slug`.
    async fn business_slug_taken(&self, organization_id: Uuid, slug: &str) -> StoreResult<bool>;

    /// Businesses of an organization ordered by creation time.
    async fn list_businesses(
        &self,
        organization_id: Uuid,
        visibility: Visibility,
    ) -> StoreResult<Vec<Business>>;

    // ---- integrations ----

    /// Insert an integration under an existing business.
    async fn insert_integration(&self, integration: Integration) -> StoreResult<Integration>;

    /// Get an integration by id.
    async fn get_integration(
        &self,
        integration_id: Uuid,
        visibility: Visibility,
    ) -> StoreResult<Option<Integration>>;

    /// Apply field changes to an integration.
    ///
    /// A type change while a detail of another variant is attached fails
    /// with `DetailTypeMismatch`.
    async fn update_integration(
        &self,
        integration_id: Uuid,
        changes: IntegrationChanges,
    ) -> StoreResult<Integration>;

    /// Set the integration's own active flag.
    async fn set_integration_active(
        &self,
        integration_id: Uuid,
        active: bool,
    ) -> StoreResult<Integration>;

    /// Integrations of a business ordered by creation time.
    async fn list_integrations(
        &self,
        business_id: Uuid,
        visibility: Visibility,
    ) -> StoreResult<Vec<Integration>>;

    // ---- integration details ----

    /// Insert the detail record of an integration.
    ///
    /// Fails with `DetailTypeMismatch` when the variant differs from the
    /// integration's current type and with
    /// `UniqueViolation(IntegrationDetail)` when one exists.
    async fn insert_detail(&self, record: DetailRecord) -> StoreResult<DetailRecord>;

    /// Get the detail record of an integration.
    async fn get_detail(&self, integration_id: Uuid) -> StoreResult<Option<DetailRecord>>;

    /// Replace the payload of an existing detail record. The variant is
    /// checked against the integration's current type.
    async fn update_detail(
        &self,
        integration_id: Uuid,
        detail: IntegrationDetail,
    ) -> StoreResult<DetailRecord>;
}

pub(crate) fn row_not_found(entity: &str) -> StoreError {
    StoreError::RowNotFound(entity.to_string())
}
