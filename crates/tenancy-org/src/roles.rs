//! Membership roles
//!
//! This module defines the role hierarchy a user can hold inside an
//! organization. Higher roles subsume the permissions of lower ones.

use serde::{Deserialize, Serialize};

/// User role within an organization.
///
/// Roles are hierarchical, with each role inheriting the permissions of lower roles.
/// The hierarchy is: Member < Admin < Owner
///
/// # Permission Model
///
/// - **Member**: Read everything under the organization, create businesses,
///   manage integrations
/// - **Admin**: Manage the organization, its businesses and its members
/// - **Owner**: Same authority as Admin; held by exactly one membership per
///   organization, the one referencing the organization's owner
///
/// # Examples
///
/// ```
/// use tenancy_org::Role;
///
/// let role = Role::Member;
/// assert!(!role.is_admin_or_owner());
///
/// let admin = Role::Admin;
/// assert!(admin.is_admin_or_owner());
/// assert!(!admin.is_owner());
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Regular member
    Member = 1,

    /// Can manage the organization, its businesses and members
    Admin = 2,

    /// The organization's owner
    Owner = 3,
}

impl Role {
    /// Check if this role has admin privileges.
    ///
    /// # Returns
    ///
    /// `true` for Admin and Owner roles
    pub fn is_admin_or_owner(&self) -> bool {
        *self >= Role::Admin
    }

    /// Check if this is the owner role.
    pub fn is_owner(&self) -> bool {
        *self == Role::Owner
    }

    /// Get the wire representation of the role.
    ///
    /// # Examples
    ///
    /// ```
    /// use tenancy_org::Role;
    ///
    /// assert_eq!(Role::Admin.as_str(), "ADMIN");
    /// ```
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "MEMBER",
            Self::Admin => "ADMIN",
            Self::Owner => "OWNER",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::Member
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_hierarchy() {
        assert!(Role::Owner > Role::Admin);
        assert!(Role::Admin > Role::Member);
    }

    #[test]
    fn test_role_predicates() {
        assert!(!Role::Member.is_admin_or_owner());
        assert!(Role::Admin.is_admin_or_owner());
        assert!(Role::Owner.is_admin_or_owner());
        assert!(Role::Owner.is_owner());
        assert!(!Role::Admin.is_owner());
    }

    #[test]
    fn test_role_wire_format() {
        let json = serde_json::to_string(&Role::Owner).unwrap();
        assert_eq!(json, "\"OWNER\"");
        let role: Role = serde_json::from_str("\"ADMIN\"").unwrap();
        assert_eq!(role, Role::Admin);
    }
}
