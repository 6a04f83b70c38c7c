//! Membership domain model
//!
//! A membership binds a user to an organization with a role. The
//! `(user, organization)` pair is unique.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::roles::Role;

/// Organization membership linking a user to an organization.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use tenancy_org::{Membership, Role};
///
/// let org_id = Uuid::now_v7();
/// let user_id = Uuid::now_v7();
/// let inviter = Uuid::now_v7();
/// let membership = Membership::new(org_id, user_id, Role::Member).with_inviter(inviter);
/// assert_eq!(membership.invited_by, Some(inviter));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Membership {
    /// Unique membership ID
    pub id: Uuid,

    /// Organization ID
    pub organization_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Role within the organization
    pub role: Role,

    /// When the user joined
    pub joined_at: DateTime<Utc>,

    /// Who invited this user (None for the owner)
    pub invited_by: Option<Uuid>,
}

impl Membership {
    /// Creates a new membership joined now, with no inviter.
    pub fn new(organization_id: Uuid, user_id: Uuid, role: Role) -> Self {
        Self {
            id: Uuid::now_v7(),
            organization_id,
            user_id,
            role,
            joined_at: Utc::now(),
            invited_by: None,
        }
    }

    /// The owner membership of a freshly created organization.
    pub fn owner(organization_id: Uuid, owner_id: Uuid) -> Self {
        Self::new(organization_id, owner_id, Role::Owner)
    }

    /// Set who invited this user.
    ///
    /// # Arguments
    ///
    /// * `inviter_id` - The user ID of who invited this user
    pub fn with_inviter(mut self, inviter_id: Uuid) -> Self {
        self.invited_by = Some(inviter_id);
        self
    }

    /// Whether this is the organization's owner membership.
    pub fn is_owner(&self) -> bool {
        self.role.is_owner()
    }
}
