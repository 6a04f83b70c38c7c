//! # Actions
//!
//! Defines the operations that can be performed on tenant resources.

use serde::{Deserialize, Serialize};

/// Actions that can be performed on resources.
///
/// - **Read**: View a single resource
/// - **List**: Browse the resources under a parent
/// - **Create**: Create new resource instances
/// - **Update**: Modify existing resource data
/// - **Delete**: Soft delete (or, for memberships, remove) a resource
/// - **Restore**: Undo a soft delete
/// - **Manage**: Full control; implies every other action
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Read/view resource.
    Read,

    /// List/query resources.
    List,

    /// Create new resource.
    Create,

    /// Update existing resource.
    Update,

    /// Delete resource.
    Delete,

    /// Restore a soft-deleted resource.
    Restore,

    /// Manage resource; implies all actions.
    Manage,
}

impl Action {
    /// Get the string representation of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::List => "list",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Restore => "restore",
            Action::Manage => "manage",
        }
    }

    /// Get all actions.
    pub fn all() -> &'static [Action] {
        &[
            Action::Read,
            Action::List,
            Action::Create,
            Action::Update,
            Action::Delete,
            Action::Restore,
            Action::Manage,
        ]
    }

    /// Check if this action implies another action.
    ///
    /// - `Manage` implies all other actions
    /// - `Create`, `Update`, `Delete` and `Restore` imply `Read`
    ///
    /// # Example
    ///
    /// ```
    /// use tenancy_rbac::actions::Action;
    ///
    /// assert!(Action::Manage.implies(Action::Restore));
    /// assert!(Action::Update.implies(Action::Read));
    /// assert!(!Action::Read.implies(Action::Update));
    /// ```
    pub fn implies(&self, other: Action) -> bool {
        match self {
            Action::Manage => true,
            Action::Create | Action::Update | Action::Delete | Action::Restore => {
                other == Action::Read
            }
            _ => false,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_names() {
        assert_eq!(Action::Restore.to_string(), "restore");
        let json = serde_json::to_string(&Action::Manage).unwrap();
        assert_eq!(json, "\"manage\"");
    }

    #[test]
    fn test_action_implies() {
        for action in Action::all() {
            assert!(Action::Manage.implies(*action));
        }
        assert!(Action::Restore.implies(Action::Read));
        assert!(!Action::Delete.implies(Action::Update));
        assert!(!Action::List.implies(Action::Read));
    }
}
