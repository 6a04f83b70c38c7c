//! Hierarchy-scoped query gateway
//!
//! Resolves a [`HierarchyPath`] for a principal segment by segment and fails
//! fast:
//!
//! 1. The organization must exist and be active (`NotFound`).
//! 2. The principal must be a member (`Forbidden`).
//! 3. The business, if any, must be active and belong to the organization
//!    (`NotFound`, never `Forbidden`).
//! 4. The integration, if any, must be active and belong to the business
//!    (`NotFound`).
//!
//! The requested action is checked last against the role policy of
//! `tenancy-rbac`, so a member who asks to mutate something they may only
//! read gets `Forbidden` only after every segment is known to be in scope.

use std::sync::Arc;

use tenancy_org::{Business, Integration, Organization, Role};
use tenancy_rbac::{is_permitted, minimum_role, Action, ResourceType};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{TenancyError, TenancyResult};
use crate::principal::Principal;
use crate::resolver::RoleResolver;
use crate::store::{TenantStore, Visibility};
use crate::visibility::{business_reachable, integration_reachable, organization_reachable};

/// A path down the hierarchy.
///
/// Only the constructors can build one, so a business id without an
/// organization id, or an integration id without a business id, cannot be
/// expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HierarchyPath {
    organization_id: Uuid,
    business_id: Option<Uuid>,
    integration_id: Option<Uuid>,
}

impl HierarchyPath {
    pub fn organization(organization_id: Uuid) -> Self {
        Self {
            organization_id,
            business_id: None,
            integration_id: None,
        }
    }

    pub fn business(organization_id: Uuid, business_id: Uuid) -> Self {
        Self {
            organization_id,
            business_id: Some(business_id),
            integration_id: None,
        }
    }

    pub fn integration(organization_id: Uuid, business_id: Uuid, integration_id: Uuid) -> Self {
        Self {
            organization_id,
            business_id: Some(business_id),
            integration_id: Some(integration_id),
        }
    }

    pub fn organization_id(&self) -> Uuid {
        self.organization_id
    }

    pub fn business_id(&self) -> Option<Uuid> {
        self.business_id
    }

    pub fn integration_id(&self) -> Option<Uuid> {
        self.integration_id
    }
}

/// Entities a path resolved to, plus the principal's role.
#[derive(Debug, Clone)]
pub struct ResolvedPath {
    pub organization: Organization,
    pub role: Role,
    pub business: Option<Business>,
    pub integration: Option<Integration>,
}

impl ResolvedPath {
    /// The resolved business of a business or integration path.
    pub fn business(&self) -> TenancyResult<&Business> {
        self.business
            .as_ref()
            .ok_or_else(|| TenancyError::not_found("business"))
    }

    /// The resolved integration of an integration path.
    pub fn integration(&self) -> TenancyResult<&Integration> {
        self.integration
            .as_ref()
            .ok_or_else(|| TenancyError::not_found("integration"))
    }
}

/// Per-request gateway bound to one principal.
pub struct HierarchyGateway {
    store: Arc<dyn TenantStore>,
    resolver: RoleResolver,
    principal: Principal,
}

impl HierarchyGateway {
    /// Create a gateway with a fresh role resolver.
    pub fn new(store: Arc<dyn TenantStore>, principal: Principal) -> Self {
        Self {
            resolver: RoleResolver::new(store.clone()),
            store,
            principal,
        }
    }

    pub fn principal(&self) -> Principal {
        self.principal
    }

    pub fn resolver(&self) -> &RoleResolver {
        &self.resolver
    }

    /// Resolve a path for reading.
    pub async fn resolve(&self, path: &HierarchyPath) -> TenancyResult<ResolvedPath> {
        self.walk(path, Visibility::Active).await
    }

    /// Resolve a path and require `action` on `resource`.
    pub async fn authorize(
        &self,
        path: &HierarchyPath,
        resource: ResourceType,
        action: Action,
    ) -> TenancyResult<ResolvedPath> {
        let resolved = self.walk(path, Visibility::Active).await?;
        self.require(&resolved, resource, action)?;
        Ok(resolved)
    }

    /// Resolve a path whose last segment may be soft deleted, and require
    /// `Restore` on `resource`.
    ///
    /// Ancestors of the last segment must still be reachable; restoring a
    /// business under an inactive organization is `NotFound`.
    pub async fn authorize_restore(
        &self,
        path: &HierarchyPath,
        resource: ResourceType,
    ) -> TenancyResult<ResolvedPath> {
        let resolved = self.walk(path, Visibility::All).await?;
        self.require(&resolved, resource, Action::Restore)?;
        Ok(resolved)
    }

    /// Require `action` on `resource` for an already resolved path.
    pub fn require(
        &self,
        resolved: &ResolvedPath,
        resource: ResourceType,
        action: Action,
    ) -> TenancyResult<()> {
        if is_permitted(resolved.role, resource, action) {
            return Ok(());
        }
        let required = minimum_role(resource, action);
        warn!(
            user_id = %self.principal.user_id,
            organization_id = %resolved.organization.id,
            role = %resolved.role,
            required = %required,
            resource = %resource,
            action = %action,
            "Authorization denied"
        );
        Err(TenancyError::Forbidden(format!(
            "{} role may not {} {}; {} required",
            resolved.role, action, resource, required
        )))
    }

    async fn walk(
        &self,
        path: &HierarchyPath,
        last: Visibility,
    ) -> TenancyResult<ResolvedPath> {
        let user_id = self.principal.user_id;
        debug!(
            user_id = %user_id,
            organization_id = %path.organization_id,
            business_id = ?path.business_id,
            integration_id = ?path.integration_id,
            "Resolving hierarchy path"
        );

        let org_last = path.business_id.is_none();
        let organization = self
            .store
            .get_organization(path.organization_id, Visibility::All)
            .await?
            .filter(|o| organization_reachable(o) || (org_last && last == Visibility::All))
            .ok_or_else(|| TenancyError::not_found("organization"))?;

        let role = if organization_reachable(&organization) {
            self.resolver.role_of(user_id, organization.id).await?
        } else {
            self.resolver.stored_role(user_id, organization.id).await?
        };
        let role = match role {
            Some(role) => role,
            None if !organization_reachable(&organization) => {
                // inactive organizations are not disclosed to non-members
                return Err(TenancyError::not_found("organization"));
            }
            None => {
                warn!(
                    user_id = %user_id,
                    organization_id = %organization.id,
                    "Not a member of organization"
                );
                return Err(TenancyError::Forbidden(
                    "not a member of this organization".to_string(),
                ));
            }
        };

        let mut resolved = ResolvedPath {
            organization,
            role,
            business: None,
            integration: None,
        };

        let Some(business_id) = path.business_id else {
            return Ok(resolved);
        };
        let business_last = path.integration_id.is_none();
        let business = self
            .store
            .get_business(business_id, Visibility::All)
            .await?
            .filter(|b| {
                if business_last && last == Visibility::All {
                    b.organization_id == resolved.organization.id
                } else {
                    business_reachable(b, &resolved.organization)
                }
            })
            .ok_or_else(|| TenancyError::not_found("business"))?;

        let Some(integration_id) = path.integration_id else {
            resolved.business = Some(business);
            return Ok(resolved);
        };
        let integration = self
            .store
            .get_integration(integration_id, Visibility::All)
            .await?
            .filter(|i| {
                if last == Visibility::All {
                    i.business_id == business.id
                } else {
                    integration_reachable(i, &business, &resolved.organization)
                }
            })
            .ok_or_else(|| TenancyError::not_found("integration"))?;

        resolved.business = Some(business);
        resolved.integration = Some(integration);
        Ok(resolved)
    }
}
