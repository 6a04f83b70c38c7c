//! # Tenancy Engine
//!
//! Integrity and authorization engine for the
//! User → Organization → Business → Integration hierarchy.
//!
//! ## Overview
//!
//! The tenancy-engine crate handles:
//! - **Store**: the [`TenantStore`] persistence seam and an in-memory
//!   implementation enforcing every uniqueness and ownership constraint
//! - **Resolver**: per-request, memoized role lookup ([`RoleResolver`])
//! - **Gateway**: fail-fast resolution and authorization of hierarchy paths
//!   ([`HierarchyGateway`])
//! - **Registry**: type-checked 1:1 attachment of integration details
//!   ([`VariantRegistry`])
//! - **Hooks**: owner membership on creation, slug allocation, soft delete
//! - **Service**: the operation surface used by transports
//!   ([`TenancyService`], [`RequestScope`])
//!
//! ## Request flow
//!
//! ```text
//! principal + path ─→ HierarchyGateway ─→ RoleResolver ─→ TenantStore
//!                            │
//!                            ├─ mutations ─→ hooks ─→ TenantStore
//!                            └─ details   ─→ VariantRegistry ─→ TenantStore
//! ```
//!
//! ## Error mapping
//!
//! | Error                  | Status |
//! |------------------------|--------|
//! | `NotFound`             | 404    |
//! | `Forbidden`            | 403    |
//! | `Conflict`             | 409    |
//! | `ReferentialIntegrity` | 409    |
//! | `TypeMismatch`         | 400    |
//! | `InvalidOperation`     | 400    |
//! | `Validation`           | 400    |
//! | `Store`                | 500    |
//!
//! The library emits `tracing` events and installs no subscriber.

pub mod config;
pub mod error;
pub mod gateway;
pub mod hooks;
pub mod principal;
pub mod registry;
pub mod resolver;
pub mod service;
pub mod store;
pub mod visibility;

pub use config::{ConfigError, TenancyConfig};
pub use error::{Constraint, StoreError, StoreResult, TenancyError, TenancyResult};
pub use gateway::{HierarchyGateway, HierarchyPath, ResolvedPath};
pub use principal::Principal;
pub use registry::VariantRegistry;
pub use resolver::RoleResolver;
pub use service::{
    BusinessUpdate, IntegrationUpdate, NewBusiness, NewIntegration, NewMember, NewOrganization,
    OrganizationUpdate, RequestScope, TenancyService,
};
pub use store::{
    BusinessChanges, InMemoryTenantStore, IntegrationChanges, OrganizationChanges, StoreStats,
    TenantStore, Visibility,
};
