//! # Permissions
//!
//! Core permission types and sets for the RBAC system.
//! A permission combines a resource type with an action.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::actions::Action;
use crate::resources::ResourceType;

/// A permission is a combination of resource type and action.
///
/// Permissions are granted per organization through a role, so they carry no
/// resource id: holding `business:update` in an organization applies to every
/// business of that organization.
///
/// # Example
///
/// ```
/// use tenancy_rbac::permissions::Permission;
/// use tenancy_rbac::resources::ResourceType;
/// use tenancy_rbac::actions::Action;
///
/// let perm = Permission::new(ResourceType::Business, Action::Update);
/// assert_eq!(perm.to_string(), "business:update");
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Permission {
    /// The resource type this permission applies to.
    pub resource: ResourceType,
    /// The action allowed on the resource.
    pub action: Action,
}

impl Permission {
    /// Create a new permission.
    pub fn new(resource: ResourceType, action: Action) -> Self {
        Self { resource, action }
    }

    /// Check if holding this permission grants `other`.
    ///
    /// Resource types must match and the action must be equal to, or imply,
    /// the requested one.
    pub fn grants(&self, other: &Permission) -> bool {
        self.resource == other.resource
            && (self.action == other.action || self.action.implies(other.action))
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.resource.as_str(), self.action.as_str())
    }
}

/// A set of permissions, typically the grant of one role.
///
/// # Example
///
/// ```
/// use tenancy_rbac::permissions::{Permission, PermissionSet};
/// use tenancy_rbac::resources::ResourceType;
/// use tenancy_rbac::actions::Action;
///
/// let mut set = PermissionSet::new();
/// set.add(Permission::new(ResourceType::Integration, Action::Manage));
///
/// // Manage implies every action
/// assert!(set.has(&Permission::new(ResourceType::Integration, Action::Delete)));
/// assert!(!set.has(&Permission::new(ResourceType::Business, Action::Delete)));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PermissionSet {
    permissions: HashSet<Permission>,
}

impl PermissionSet {
    /// Create a new empty permission set.
    pub fn new() -> Self {
        Self {
            permissions: HashSet::new(),
        }
    }

    /// Add a permission to the set.
    pub fn add(&mut self, permission: Permission) {
        self.permissions.insert(permission);
    }

    /// Add multiple permissions to the set.
    pub fn add_all<I>(&mut self, permissions: I)
    where
        I: IntoIterator<Item = Permission>,
    {
        self.permissions.extend(permissions);
    }

    /// Check if the set grants a permission, directly or by implication.
    pub fn has(&self, permission: &Permission) -> bool {
        self.permissions.contains(permission)
            || self.permissions.iter().any(|held| held.grants(permission))
    }

    /// Shorthand for `has(&Permission::new(resource, action))`.
    pub fn allows(&self, resource: ResourceType, action: Action) -> bool {
        self.has(&Permission::new(resource, action))
    }

    /// Merge another permission set into this one.
    pub fn merge(&mut self, other: &PermissionSet) {
        self.permissions.extend(other.permissions.iter().copied());
    }

    /// Check if this set grants every permission of another set.
    pub fn contains_all(&self, other: &PermissionSet) -> bool {
        other.permissions.iter().all(|perm| self.has(perm))
    }

    /// Get all permissions in the set, sorted by their string form.
    pub fn all(&self) -> Vec<Permission> {
        let mut perms: Vec<Permission> = self.permissions.iter().copied().collect();
        perms.sort_by_key(|p| p.to_string());
        perms
    }

    /// Get the count of permissions.
    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = Permission>>(iter: T) -> Self {
        let mut set = PermissionSet::new();
        set.add_all(iter);
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_display() {
        let perm = Permission::new(ResourceType::IntegrationDetail, Action::Create);
        assert_eq!(perm.to_string(), "integration_detail:create");
    }

    #[test]
    fn test_permission_grants() {
        let manage = Permission::new(ResourceType::Business, Action::Manage);
        assert!(manage.grants(&Permission::new(ResourceType::Business, Action::Restore)));
        assert!(!manage.grants(&Permission::new(ResourceType::Organization, Action::Read)));

        let update = Permission::new(ResourceType::Business, Action::Update);
        assert!(update.grants(&Permission::new(ResourceType::Business, Action::Read)));
        assert!(!update.grants(&Permission::new(ResourceType::Business, Action::Delete)));
    }

    #[test]
    fn test_permission_set() {
        let set: PermissionSet = [
            Permission::new(ResourceType::Business, Action::Read),
            Permission::new(ResourceType::Business, Action::Create),
        ]
        .into_iter()
        .collect();

        assert!(set.allows(ResourceType::Business, Action::Read));
        assert!(set.allows(ResourceType::Business, Action::Create));
        assert!(!set.allows(ResourceType::Business, Action::Delete));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_permission_set_merge_and_contains_all() {
        let mut member = PermissionSet::new();
        member.add(Permission::new(ResourceType::Organization, Action::Read));

        let mut admin = member.clone();
        admin.add(Permission::new(ResourceType::Organization, Action::Update));

        assert!(admin.contains_all(&member));
        assert!(!member.contains_all(&admin));

        member.merge(&admin);
        assert_eq!(member, admin);
    }
}
