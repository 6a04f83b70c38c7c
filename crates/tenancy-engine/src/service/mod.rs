//! Tenancy service
//!
//! The operation surface consumed by the transport collaborator. One
//! [`TenancyService`] is shared by the process; each request opens a
//! [`RequestScope`] bound to its principal, which owns the per-request role
//! cache and routes every tenant-scoped operation through the gateway.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tenancy_engine::{InMemoryTenantStore, NewOrganization, Principal, TenancyConfig, TenancyService};
//!
//! # async fn demo() -> tenancy_engine::TenancyResult<()> {
//! let service = TenancyService::new(Arc::new(InMemoryTenantStore::new()), TenancyConfig::default())
//!     .expect("default limits are valid");
//! let owner = service.register_user("owner@example.com", "Owner").await?;
//!
//! let scope = service.scope(Principal::new(owner.id));
//! let org = scope.create_organization(NewOrganization::named("Acme")).await?;
//! assert_eq!(org.slug, "acme");
//! # Ok(())
//! # }
//! ```

mod businesses;
mod integrations;
mod organizations;
mod users;

use std::sync::Arc;

pub use businesses::{BusinessUpdate, NewBusiness};
pub use integrations::{IntegrationUpdate, NewIntegration};
pub use organizations::{NewMember, NewOrganization, OrganizationUpdate};

use crate::config::{ConfigError, TenancyConfig};
use crate::error::{TenancyError, TenancyResult};
use crate::gateway::HierarchyGateway;
use crate::principal::Principal;
use crate::registry::VariantRegistry;
use crate::store::{InMemoryTenantStore, TenantStore};

/// Process-wide entry point.
#[derive(Clone)]
pub struct TenancyService {
    store: Arc<dyn TenantStore>,
    config: TenancyConfig,
}

impl TenancyService {
    /// Fails when `config` does not pass [`TenancyConfig::validate`].
    pub fn new(store: Arc<dyn TenantStore>, config: TenancyConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { store, config })
    }

    /// A service over an empty in-memory store with default limits.
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(InMemoryTenantStore::new()),
            config: TenancyConfig::default(),
        }
    }

    pub fn config(&self) -> &TenancyConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn TenantStore> {
        &self.store
    }

    /// Open the scope of one request made by `principal`.
    pub fn scope(&self, principal: Principal) -> RequestScope {
        RequestScope {
            store: self.store.clone(),
            config: self.config.clone(),
            gateway: HierarchyGateway::new(self.store.clone(), principal),
            registry: VariantRegistry::new(self.store.clone()),
        }
    }
}

/// Operations performed on behalf of one principal within one request.
pub struct RequestScope {
    store: Arc<dyn TenantStore>,
    config: TenancyConfig,
    gateway: HierarchyGateway,
    registry: VariantRegistry,
}

impl RequestScope {
    pub fn principal(&self) -> Principal {
        self.gateway.principal()
    }

    pub fn gateway(&self) -> &HierarchyGateway {
        &self.gateway
    }

    pub fn registry(&self) -> &VariantRegistry {
        &self.registry
    }
}

/// A collection length as a display count, saturating at `u32::MAX`.
pub(crate) fn count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

/// Trim a name and check it against the configured bounds.
pub(crate) fn validate_name(name: &str, config: &TenancyConfig) -> TenancyResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TenancyError::Validation("name cannot be empty".to_string()));
    }
    if name.chars().count() > config.name_max_length {
        return Err(TenancyError::Validation(format!(
            "name cannot exceed {} characters",
            config.name_max_length
        )));
    }
    Ok(name.to_string())
}
