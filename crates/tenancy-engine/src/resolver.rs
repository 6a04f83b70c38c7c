//! Membership & role resolver
//!
//! Computes a principal's role inside an organization. A resolver lives for
//! one request: each `(user, organization)` pair is looked up in the store at
//! most once and the answer is reused by every later predicate. Nothing is
//! shared across requests, so authorization is always recomputed from
//! durable state.

use std::collections::HashMap;
use std::sync::Arc;

use tenancy_org::{Membership, Organization, Role};
use tenancy_rbac::{permissions_for, PermissionSet};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::error::TenancyResult;
use crate::store::{TenantStore, Visibility};
use crate::visibility::organization_reachable;

#[derive(Debug, Clone, Copy)]
struct CachedRole {
    /// Role from the membership row, if any
    role: Option<Role>,
    /// Whether the organization exists and is active
    reachable: bool,
}

/// Per-request role resolver.
pub struct RoleResolver {
    store: Arc<dyn TenantStore>,
    cache: Mutex<HashMap<(Uuid, Uuid), CachedRole>>,
}

impl RoleResolver {
    /// Create a resolver with an empty cache.
    pub fn new(store: Arc<dyn TenantStore>) -> Self {
        Self {
            store,
            cache: Mutex::new(HashMap::new()),
        }
    }

    async fn lookup(&self, user_id: Uuid, organization_id: Uuid) -> TenancyResult<CachedRole> {
        // Held across the store calls so concurrent predicates for the same
        // pair wait for the first lookup instead of repeating it.
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.get(&(user_id, organization_id)) {
            return Ok(*cached);
        }

        let reachable = self
            .store
            .get_organization(organization_id, Visibility::All)
            .await?
            .map(|o| organization_reachable(&o));
        let role = match reachable {
            Some(_) => self
                .store
                .get_membership(organization_id, user_id)
                .await?
                .map(|m| m.role),
            None => None,
        };

        let entry = CachedRole {
            role,
            reachable: reachable.unwrap_or(false),
        };
        debug!(
            user_id = %user_id,
            organization_id = %organization_id,
            role = ?entry.role,
            reachable = entry.reachable,
            "Resolved membership"
        );
        cache.insert((user_id, organization_id), entry);
        Ok(entry)
    }

    /// The role of `user_id` in `organization_id`.
    ///
    /// `None` when there is no membership or the organization is missing or
    /// inactive. Not being a member is an answer, not an error.
    pub async fn role_of(&self, user_id: Uuid, organization_id: Uuid) -> TenancyResult<Option<Role>> {
        let entry = self.lookup(user_id, organization_id).await?;
        Ok(entry.role.filter(|_| entry.reachable))
    }

    /// The role recorded on the membership row, ignoring whether the
    /// organization is active. Only restoring an organization needs this.
    pub async fn stored_role(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> TenancyResult<Option<Role>> {
        Ok(self.lookup(user_id, organization_id).await?.role)
    }

    pub async fn is_member(&self, user_id: Uuid, organization_id: Uuid) -> TenancyResult<bool> {
        Ok(self.role_of(user_id, organization_id).await?.is_some())
    }

    pub async fn is_admin_or_owner(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> TenancyResult<bool> {
        Ok(self
            .role_of(user_id, organization_id)
            .await?
            .is_some_and(|r| r.is_admin_or_owner()))
    }

    pub async fn is_owner(&self, user_id: Uuid, organization_id: Uuid) -> TenancyResult<bool> {
        Ok(self
            .role_of(user_id, organization_id)
            .await?
            .is_some_and(|r| r.is_owner()))
    }

    /// Permissions of `user_id` in `organization_id`; empty for non-members.
    pub async fn permissions(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> TenancyResult<PermissionSet> {
        Ok(self
            .role_of(user_id, organization_id)
            .await?
            .map(permissions_for)
            .unwrap_or_default())
    }

    /// Memberships of an organization, oldest first.
    pub async fn memberships_of(&self, organization_id: Uuid) -> TenancyResult<Vec<Membership>> {
        Ok(self.store.list_memberships(organization_id).await?)
    }

    /// Active organizations `user_id` belongs to, ordered by name.
    pub async fn organizations_of(&self, user_id: Uuid) -> TenancyResult<Vec<Organization>> {
        let mut organizations = self
            .store
            .list_organizations_for_user(user_id, Visibility::Active)
            .await?;
        organizations.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(organizations)
    }

    /// Forget the cached role of one pair after a membership write in the
    /// same request.
    pub async fn invalidate(&self, user_id: Uuid, organization_id: Uuid) {
        self.cache.lock().await.remove(&(user_id, organization_id));
    }
}
