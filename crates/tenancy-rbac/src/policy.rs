//! # Role Policy
//!
//! Maps each membership role to the permissions it holds inside its
//! organization.
//!
//! | Resource            | Member                  | Admin / Owner |
//! |---------------------|-------------------------|---------------|
//! | organization        | read, list              | manage        |
//! | membership          | read, list              | manage        |
//! | business            | read, list, create      | manage        |
//! | integration         | manage                  | manage        |
//! | integration_detail  | manage                  | manage        |
//!
//! Integrations are deliberately manageable by any member, while business
//! and organization mutation needs an admin. Structural rules that no role
//! can override (the owner membership can never be removed) are enforced by
//! the engine, not here.

use tenancy_org::Role;

use crate::actions::Action;
use crate::permissions::{Permission, PermissionSet};
use crate::resources::ResourceType;

/// Permissions held by every member.
fn member_permissions() -> PermissionSet {
    [
        Permission::new(ResourceType::Organization, Action::Read),
        Permission::new(ResourceType::Organization, Action::List),
        Permission::new(ResourceType::Membership, Action::Read),
        Permission::new(ResourceType::Membership, Action::List),
        Permission::new(ResourceType::Business, Action::Read),
        Permission::new(ResourceType::Business, Action::List),
        Permission::new(ResourceType::Business, Action::Create),
        Permission::new(ResourceType::Integration, Action::Manage),
        Permission::new(ResourceType::IntegrationDetail, Action::Manage),
    ]
    .into_iter()
    .collect()
}

/// Permissions added on top of member for admins.
fn admin_permissions() -> PermissionSet {
    [
        Permission::new(ResourceType::Organization, Action::Manage),
        Permission::new(ResourceType::Membership, Action::Manage),
        Permission::new(ResourceType::Business, Action::Manage),
    ]
    .into_iter()
    .collect()
}

/// Get the full permission set of a role.
///
/// Higher roles include every permission of lower ones.
///
/// # Example
///
/// ```
/// use tenancy_org::Role;
/// use tenancy_rbac::{permissions_for, Action, ResourceType};
///
/// let member = permissions_for(Role::Member);
/// assert!(member.allows(ResourceType::Integration, Action::Delete));
/// assert!(!member.allows(ResourceType::Business, Action::Delete));
/// ```
pub fn permissions_for(role: Role) -> PermissionSet {
    let mut set = member_permissions();
    if role.is_admin_or_owner() {
        set.merge(&admin_permissions());
    }
    set
}

/// Check whether `role` may perform `action` on `resource`.
pub fn is_permitted(role: Role, resource: ResourceType, action: Action) -> bool {
    permissions_for(role).allows(resource, action)
}

/// The lowest role that may perform `action` on `resource`.
///
/// # Example
///
/// ```
/// use tenancy_org::Role;
/// use tenancy_rbac::{minimum_role, Action, ResourceType};
///
/// assert_eq!(minimum_role(ResourceType::Business, Action::Create), Role::Member);
/// assert_eq!(minimum_role(ResourceType::Business, Action::Update), Role::Admin);
/// ```
pub fn minimum_role(resource: ResourceType, action: Action) -> Role {
    [Role::Member, Role::Admin, Role::Owner]
        .into_iter()
        .find(|role| is_permitted(*role, resource, action))
        .unwrap_or(Role::Owner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_can_read_everything() {
        for resource in ResourceType::all() {
            assert!(is_permitted(Role::Member, *resource, Action::Read));
        }
    }

    #[test]
    fn test_member_manages_integrations_but_not_businesses() {
        for action in [Action::Create, Action::Update, Action::Delete, Action::Restore] {
            assert!(is_permitted(Role::Member, ResourceType::Integration, action));
            assert!(is_permitted(Role::Member, ResourceType::IntegrationDetail, action));
        }
        assert!(is_permitted(Role::Member, ResourceType::Business, Action::Create));
        assert!(!is_permitted(Role::Member, ResourceType::Business, Action::Update));
        assert!(!is_permitted(Role::Member, ResourceType::Business, Action::Delete));
        assert!(!is_permitted(Role::Member, ResourceType::Organization, Action::Update));
        assert!(!is_permitted(Role::Member, ResourceType::Membership, Action::Create));
    }

    #[test]
    fn test_higher_roles_subsume_lower() {
        let member = permissions_for(Role::Member);
        let admin = permissions_for(Role::Admin);
        let owner = permissions_for(Role::Owner);

        assert!(admin.contains_all(&member));
        assert!(owner.contains_all(&admin));
    }

    #[test]
    fn test_minimum_role() {
        assert_eq!(minimum_role(ResourceType::Organization, Action::Read), Role::Member);
        assert_eq!(minimum_role(ResourceType::Organization, Action::Delete), Role::Admin);
        assert_eq!(minimum_role(ResourceType::Membership, Action::Delete), Role::Admin);
        assert_eq!(minimum_role(ResourceType::Integration, Action::Delete), Role::Member);
    }
}
