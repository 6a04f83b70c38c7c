//! # Resource Types
//!
//! Defines the resource kinds of the tenant hierarchy that permissions are
//! granted on.

use serde::{Deserialize, Serialize};

/// Resource types that can have permissions assigned.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// The organization itself.
    Organization,
    /// Memberships of an organization.
    Membership,
    /// Businesses under an organization.
    Business,
    /// Integrations under a business.
    Integration,
    /// Detail records attached to integrations.
    IntegrationDetail,
}

impl ResourceType {
    /// Get the string representation of the resource type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Organization => "organization",
            ResourceType::Membership => "membership",
            ResourceType::Business => "business",
            ResourceType::Integration => "integration",
            ResourceType::IntegrationDetail => "integration_detail",
        }
    }

    /// Get all resource types.
    pub fn all() -> &'static [ResourceType] {
        &[
            ResourceType::Organization,
            ResourceType::Membership,
            ResourceType::Business,
            ResourceType::Integration,
            ResourceType::IntegrationDetail,
        ]
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_names() {
        assert_eq!(ResourceType::Membership.to_string(), "membership");
        assert_eq!(ResourceType::IntegrationDetail.as_str(), "integration_detail");
    }

    #[test]
    fn test_resource_serde() {
        let json = serde_json::to_string(&ResourceType::IntegrationDetail).unwrap();
        assert_eq!(json, "\"integration_detail\"");
    }
}
