//! In-memory tenant store.
//!
//! Keeps the whole graph in a single `RwLock`ed state so that every trait
//! method is atomic. Suitable for tests and single-process deployments.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tenancy_org::{
    Business, DetailRecord, Integration, IntegrationDetail, Membership, Organization, Role, User,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    row_not_found, BusinessChanges, IntegrationChanges, OrganizationChanges, TenantStore,
    Visibility,
};
use crate::error::{Constraint, StoreError, StoreResult};
use crate::hooks;

/// Access counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Read calls of any kind
    pub reads: u64,
    /// Membership lookups (`get_membership`, `list_memberships`,
    /// `list_organizations_for_user`)
    pub membership_reads: u64,
    /// Write calls, including rejected ones
    pub writes: u64,
}

#[derive(Debug, Default)]
struct State {
    users: HashMap<Uuid, User>,
    organizations: HashMap<Uuid, Organization>,
    memberships: HashMap<(Uuid, Uuid), Membership>,
    businesses: HashMap<Uuid, Business>,
    integrations: HashMap<Uuid, Integration>,
    details: HashMap<Uuid, DetailRecord>,
}

impl State {
    fn org_slug_taken(&self, slug: &str, except: Option<Uuid>) -> bool {
        let key = slug.to_lowercase();
        self.organizations
            .values()
            .any(|o| Some(o.id) != except && o.slug_key() == key)
    }

    fn business_slug_taken(&self, organization_id: Uuid, slug: &str, except: Option<Uuid>) -> bool {
        let key = slug.to_lowercase();
        self.businesses.values().any(|b| {
            Some(b.id) != except
                && b.organization_id == organization_id
                && b.slug.to_lowercase() == key
        })
    }

    fn check_detail_type(
        &self,
        integration_id: Uuid,
        detail: &IntegrationDetail,
    ) -> StoreResult<()> {
        let expected = self
            .integrations
            .get(&integration_id)
            .map(|i| i.integration_type)
            .ok_or_else(|| StoreError::MissingReference("integration does not exist".to_string()))?;
        if detail.matches(expected) {
            Ok(())
        } else {
            Err(StoreError::DetailTypeMismatch {
                expected,
                actual: detail.integration_type(),
            })
        }
    }
}

/// In-memory [`TenantStore`].
#[derive(Clone, Default)]
pub struct InMemoryTenantStore {
    state: Arc<RwLock<State>>,
    stats: Arc<RwLock<StoreStats>>,
}

impl InMemoryTenantStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the access counters.
    pub async fn stats(&self) -> StoreStats {
        self.stats.read().await.clone()
    }

    async fn record_read(&self) {
        self.stats.write().await.reads += 1;
    }

    async fn record_membership_read(&self) {
        let mut stats = self.stats.write().await;
        stats.reads += 1;
        stats.membership_reads += 1;
    }

    async fn record_write(&self) {
        self.stats.write().await.writes += 1;
    }
}

#[async_trait]
impl TenantStore for InMemoryTenantStore {
    async fn insert_user(&self, user: User) -> StoreResult<User> {
        self.record_write().await;
        let mut state = self.state.write().await;

        let email = user.email.to_lowercase();
        if state.users.values().any(|u| u.email.to_lowercase() == email) {
            return Err(StoreError::UniqueViolation(Constraint::UserEmail));
        }

        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, user_id: Uuid) -> StoreResult<Option<User>> {
        self.record_read().await;
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }

    async fn delete_user(&self, user_id: Uuid) -> StoreResult<()> {
        self.record_write().await;
        let mut state = self.state.write().await;

        if !state.users.contains_key(&user_id) {
            return Err(row_not_found("user"));
        }
        if state.organizations.values().any(|o| o.owner_id == user_id) {
            return Err(StoreError::ProtectedReference(
                "user owns one or more organizations".to_string(),
            ));
        }

        state.memberships.retain(|_, m| m.user_id != user_id);
        for membership in state.memberships.values_mut() {
            if membership.invited_by == Some(user_id) {
                membership.invited_by = None;
            }
        }
        state.users.remove(&user_id);
        Ok(())
    }

    async fn insert_organization(
        &self,
        organization: Organization,
    ) -> StoreResult<(Organization, Membership)> {
        self.record_write().await;
        let mut state = self.state.write().await;

        if !state.users.contains_key(&organization.owner_id) {
            return Err(StoreError::MissingReference(
                "owner user does not exist".to_string(),
            ));
        }
        if state.org_slug_taken(&organization.slug, None) {
            return Err(StoreError::UniqueViolation(Constraint::OrganizationSlug));
        }

        let membership = hooks::on_organization_created(&organization);
        state
            .memberships
            .insert((membership.organization_id, membership.user_id), membership.clone());
        state.organizations.insert(organization.id, organization.clone());
        Ok((organization, membership))
    }

    async fn get_organization(
        &self,
        organization_id: Uuid,
        visibility: Visibility,
    ) -> StoreResult<Option<Organization>> {
        self.record_read().await;
        let state = self.state.read().await;
        Ok(state
            .organizations
            .get(&organization_id)
            .filter(|o| visibility.admits(o.is_active))
            .cloned())
    }

    async fn update_organization(
        &self,
        organization_id: Uuid,
        changes: OrganizationChanges,
    ) -> StoreResult<Organization> {
        self.record_write().await;
        let mut state = self.state.write().await;

        if let Some(slug) = &changes.slug {
            if state.org_slug_taken(slug, Some(organization_id)) {
                return Err(StoreError::UniqueViolation(Constraint::OrganizationSlug));
            }
        }
        let organization = state
            .organizations
            .get_mut(&organization_id)
            .ok_or_else(|| row_not_found("organization"))?;
        if let Some(name) = changes.name {
            organization.name = name;
        }
        if let Some(slug) = changes.slug {
            organization.slug = slug;
        }
        organization.touch();
        Ok(organization.clone())
    }

    async fn set_organization_active(
        &self,
        organization_id: Uuid,
        active: bool,
    ) -> StoreResult<Organization> {
        self.record_write().await;
        let mut state = self.state.write().await;

        let organization = state
            .organizations
            .get_mut(&organization_id)
            .ok_or_else(|| row_not_found("organization"))?;
        if active {
            organization.restore();
        } else {
            organization.deactivate();
        }
        Ok(organization.clone())
    }

    async fn organization_slug_taken(&self, slug: &str) -> StoreResult<bool> {
        self.record_read().await;
        Ok(self.state.read().await.org_slug_taken(slug, None))
    }

    async fn list_organizations_for_user(
        &self,
        user_id: Uuid,
        visibility: Visibility,
    ) -> StoreResult<Vec<Organization>> {
        self.record_membership_read().await;
        let state = self.state.read().await;

        let mut organizations: Vec<Organization> = state
            .memberships
            .values()
            .filter(|m| m.user_id == user_id)
            .filter_map(|m| state.organizations.get(&m.organization_id))
            .filter(|o| visibility.admits(o.is_active))
            .cloned()
            .collect();
        organizations.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(organizations)
    }

    async fn insert_membership(&self, membership: Membership) -> StoreResult<Membership> {
        self.record_write().await;
        let mut state = self.state.write().await;

        if membership.role == Role::Owner {
            return Err(StoreError::OwnerInvariant(
                "the owner membership is created with the organization".to_string(),
            ));
        }
        if !state.organizations.contains_key(&membership.organization_id) {
            return Err(StoreError::MissingReference(
                "organization does not exist".to_string(),
            ));
        }
        if !state.users.contains_key(&membership.user_id) {
            return Err(StoreError::MissingReference("user does not exist".to_string()));
        }

        let key = (membership.organization_id, membership.user_id);
        if state.memberships.contains_key(&key) {
            return Err(StoreError::UniqueViolation(
                Constraint::MembershipUserOrganization,
            ));
        }

        state.memberships.insert(key, membership.clone());
        Ok(membership)
    }

    async fn get_membership(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<Membership>> {
        self.record_membership_read().await;
        let state = self.state.read().await;
        Ok(state.memberships.get(&(organization_id, user_id)).cloned())
    }

    async fn update_membership(&self, membership: Membership) -> StoreResult<Membership> {
        self.record_write().await;
        let mut state = self.state.write().await;

        let key = (membership.organization_id, membership.user_id);
        let existing = state
            .memberships
            .get_mut(&key)
            .ok_or_else(|| row_not_found("membership"))?;
        if (existing.role == Role::Owner) != (membership.role == Role::Owner) {
            return Err(StoreError::OwnerInvariant(
                "roles cannot be changed to or from OWNER".to_string(),
            ));
        }

        // identity and provenance are immutable
        existing.role = membership.role;
        Ok(existing.clone())
    }

    async fn delete_membership(&self, organization_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        self.record_write().await;
        let mut state = self.state.write().await;

        let key = (organization_id, user_id);
        match state.memberships.get(&key) {
            None => Ok(false),
            Some(m) if m.role == Role::Owner => Err(StoreError::OwnerInvariant(
                "the organization owner cannot be removed".to_string(),
            )),
            Some(_) => {
                state.memberships.remove(&key);
                Ok(true)
            }
        }
    }

    async fn list_memberships(&self, organization_id: Uuid) -> StoreResult<Vec<Membership>> {
        self.record_membership_read().await;
        let state = self.state.read().await;

        let mut memberships: Vec<Membership> = state
            .memberships
            .values()
            .filter(|m| m.organization_id == organization_id)
            .cloned()
            .collect();
        memberships.sort_by(|a, b| a.joined_at.cmp(&b.joined_at).then(a.id.cmp(&b.id)));
        Ok(memberships)
    }

    async fn insert_business(&self, business: Business) -> StoreResult<Business> {
        self.record_write().await;
        let mut state = self.state.write().await;

        if !state.organizations.contains_key(&business.organization_id) {
            return Err(StoreError::MissingReference(
                "organization does not exist".to_string(),
            ));
        }
        if state.business_slug_taken(business.organization_id, &business.slug, None) {
            return Err(StoreError::UniqueViolation(Constraint::BusinessSlug));
        }

        state.businesses.insert(business.id, business.clone());
        Ok(business)
    }

    async fn get_business(
        &self,
        business_id: Uuid,
        visibility: Visibility,
    ) -> StoreResult<Option<Business>> {
        self.record_read().await;
        let state = self.state.read().await;
        Ok(state
            .businesses
            .get(&business_id)
            .filter(|b| visibility.admits(b.is_active))
            .cloned())
    }

    async fn update_business(
        &self,
        business_id: Uuid,
        changes: BusinessChanges,
    ) -> StoreResult<Business> {
        self.record_write().await;
        let mut state = self.state.write().await;

        let organization_id = state
            .businesses
            .get(&business_id)
            .map(|b| b.organization_id)
            .ok_or_else(|| row_not_found("business"))?;
        if let Some(slug) = &changes.slug {
            if state.business_slug_taken(organization_id, slug, Some(business_id)) {
                return Err(StoreError::UniqueViolation(Constraint::BusinessSlug));
            }
        }
        let business = state
            .businesses
            .get_mut(&business_id)
            .ok_or_else(|| row_not_found("business"))?;
        if let Some(name) = changes.name {
            business.name = name;
        }
        if let Some(slug) = changes.slug {
            business.slug = slug;
        }
        if let Some(description) = changes.description {
            business.description = description;
        }
        business.touch();
        Ok(business.clone())
    }

    async fn set_business_active(&self, business_id: Uuid, active: bool) -> StoreResult<Business> {
        self.record_write().await;
        let mut state = self.state.write().await;

        let business = state
            .businesses
            .get_mut(&business_id)
            .ok_or_else(|| row_not_found("business"))?;
        if active {
            business.restore();
        } else {
            business.deactivate();
        }
        Ok(business.clone())
    }

    async fn business_slug_taken(&self, organization_id: Uuid, slug: &str) -> StoreResult<bool> {
        self.record_read().await;
        Ok(self
            .state
            .read()
            .await
            .business_slug_taken(organization_id, slug, None))
    }

    async fn list_businesses(
        &self,
        organization_id: Uuid,
        visibility: Visibility,
    ) -> StoreResult<Vec<Business>> {
        self.record_read().await;
        let state = self.state.read().await;

        let mut businesses: Vec<Business> = state
            .businesses
            .values()
            .filter(|b| b.organization_id == organization_id && visibility.admits(b.is_active))
            .cloned()
            .collect();
        businesses.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(businesses)
    }

    async fn insert_integration(&self, integration: Integration) -> StoreResult<Integration> {
        self.record_write().await;
        let mut state = self.state.write().await;

        if !state.businesses.contains_key(&integration.business_id) {
            return Err(StoreError::MissingReference("business does not exist".to_string()));
        }

        state.integrations.insert(integration.id, integration.clone());
        Ok(integration)
    }

    async fn get_integration(
        &self,
        integration_id: Uuid,
        visibility: Visibility,
    ) -> StoreResult<Option<Integration>> {
        self.record_read().await;
        let state = self.state.read().await;
        Ok(state
            .integrations
            .get(&integration_id)
            .filter(|i| visibility.admits(i.is_active))
            .cloned())
    }

    async fn update_integration(
        &self,
        integration_id: Uuid,
        changes: IntegrationChanges,
    ) -> StoreResult<Integration> {
        self.record_write().await;
        let mut state = self.state.write().await;
        let State {
            integrations,
            details,
            ..
        } = &mut *state;

        let integration = integrations
            .get_mut(&integration_id)
            .ok_or_else(|| row_not_found("integration"))?;
        if let Some(ty) = changes.integration_type {
            // an attached detail pins the type
            if let Some(record) = details.get(&integration_id) {
                if !record.detail.matches(ty) {
                    return Err(StoreError::DetailTypeMismatch {
                        expected: ty,
                        actual: record.detail.integration_type(),
                    });
                }
            }
            integration.integration_type = ty;
        }
        if let Some(name) = changes.name {
            integration.name = name;
        }
        if let Some(config) = changes.config {
            integration.config = config;
        }
        match changes.last_synced_at {
            Some(at) => integration.mark_synced(at),
            None => integration.touch(),
        }
        Ok(integration.clone())
    }

    async fn set_integration_active(
        &self,
        integration_id: Uuid,
        active: bool,
    ) -> StoreResult<Integration> {
        self.record_write().await;
        let mut state = self.state.write().await;

        let integration = state
            .integrations
            .get_mut(&integration_id)
            .ok_or_else(|| row_not_found("integration"))?;
        if active {
            integration.restore();
        } else {
            integration.deactivate();
        }
        Ok(integration.clone())
    }

    async fn list_integrations(
        &self,
        business_id: Uuid,
        visibility: Visibility,
    ) -> StoreResult<Vec<Integration>> {
        self.record_read().await;
        let state = self.state.read().await;

        let mut integrations: Vec<Integration> = state
            .integrations
            .values()
            .filter(|i| i.business_id == business_id && visibility.admits(i.is_active))
            .cloned()
            .collect();
        integrations.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(integrations)
    }

    async fn insert_detail(&self, record: DetailRecord) -> StoreResult<DetailRecord> {
        self.record_write().await;
        let mut state = self.state.write().await;

        state.check_detail_type(record.integration_id, &record.detail)?;
        if state.details.contains_key(&record.integration_id) {
            return Err(StoreError::UniqueViolation(Constraint::IntegrationDetail));
        }

        state.details.insert(record.integration_id, record.clone());
        Ok(record)
    }

    async fn get_detail(&self, integration_id: Uuid) -> StoreResult<Option<DetailRecord>> {
        self.record_read().await;
        Ok(self.state.read().await.details.get(&integration_id).cloned())
    }

    async fn update_detail(
        &self,
        integration_id: Uuid,
        detail: IntegrationDetail,
    ) -> StoreResult<DetailRecord> {
        self.record_write().await;
        let mut state = self.state.write().await;

        state.check_detail_type(integration_id, &detail)?;
        let record = state
            .details
            .get_mut(&integration_id)
            .ok_or_else(|| row_not_found("integration detail"))?;
        record.detail = detail;
        record.updated_at = Utc::now();
        Ok(record.clone())
    }
}
