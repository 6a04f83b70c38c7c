//! # Tenancy Organization Model
//!
//! This crate provides the domain model of the four-level tenant hierarchy.
//!
//! ## Overview
//!
//! The tenancy-org crate handles:
//! - **Users**: Identity principals that own organizations
//! - **Organizations**: Top-level tenants with a globally unique slug
//! - **Memberships**: User-organization bindings with a role
//! - **Roles**: Member < Admin < Owner
//! - **Businesses**: Units under an organization, slug unique per organization
//! - **Integrations**: External-system connectors attached to a business
//! - **Details**: Type-specific payloads attached 1:1 to an integration
//!
//! ## Architecture
//!
//! ```text
//! User
//!   ├─ owns ─→ Organization
//!   └─ Membership(role) ─→ Organization
//!                             └─ Business
//!                                   └─ Integration(type)
//!                                         └─ IntegrationDetail (variant == type)
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tenancy_org::{Business, Integration, IntegrationType, Membership, Organization, User};
//!
//! let owner = User::new("owner@example.com", "Owner");
//! let org = Organization::new("Acme", "acme", owner.id);
//! let owner_membership = Membership::owner(org.id, owner.id);
//!
//! let business = Business::new(org.id, "Store", "store");
//! let integration = Integration::new(business.id, IntegrationType::FacebookPage, "Main page");
//! ```
//!
//! This crate performs no I/O. Persistence, authorization and lifecycle
//! rules live in `tenancy-engine`.

pub mod business;
pub mod detail;
pub mod integration;
pub mod membership;
pub mod organization;
pub mod roles;
pub mod slug;
pub mod user;

// Re-export main types for convenience
pub use business::{Business, BusinessSummary};
pub use detail::{DetailRecord, FacebookPageDetail, IntegrationDetail, SlackDetail, WhatsAppDetail};
pub use integration::{Integration, IntegrationConfig, IntegrationType, IntegrationView};
pub use membership::Membership;
pub use organization::{Organization, OrganizationDetail, OrganizationSummary};
pub use roles::Role;
pub use user::User;
