//! # Tenancy RBAC (Role-Based Access Control)
//!
//! This crate maps membership roles to permissions over the resources of the
//! tenant hierarchy.
//!
//! ## Overview
//!
//! - **Resources**: Organization, Membership, Business, Integration, IntegrationDetail
//! - **Actions**: Read, List, Create, Update, Delete, Restore, Manage
//! - **Permissions**: Resource + Action combinations
//! - **Policy**: The permission set each [`tenancy_org::Role`] holds
//!
//! ## Architecture
//!
//! ```text
//! Permission = Resource + Action
//!
//! Examples:
//!   "business:create"      - Create a business in the organization
//!   "integration:manage"   - Full control of integrations
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tenancy_org::Role;
//! use tenancy_rbac::{is_permitted, Action, ResourceType};
//!
//! assert!(is_permitted(Role::Member, ResourceType::Integration, Action::Create));
//! assert!(!is_permitted(Role::Member, ResourceType::Business, Action::Update));
//! ```
//!
//! ## Action Implications
//!
//! - `Manage` implies all actions
//! - `Create`, `Update`, `Delete`, `Restore` imply `Read`

pub mod actions;
pub mod permissions;
pub mod policy;
pub mod resources;

// Re-export main types for convenience
pub use actions::Action;
pub use permissions::{Permission, PermissionSet};
pub use policy::{is_permitted, minimum_role, permissions_for};
pub use resources::ResourceType;
