//! Reachability predicates
//!
//! One predicate per entity kind. An entity is reachable when its own
//! active flag is set and every ancestor on its path is reachable too. All
//! scoped reads (list, detail, nested) go through these functions rather
//! than checking `is_active` ad hoc.

use tenancy_org::{Business, Integration, Organization};

/// Whether an organization is reachable.
pub fn organization_reachable(organization: &Organization) -> bool {
    organization.is_active
}

/// Whether a business is reachable under `organization`.
///
/// A business whose own flag is set is still effectively inactive when its
/// organization is inactive, and a business of another organization is
/// never reachable.
pub fn business_reachable(business: &Business, organization: &Organization) -> bool {
    business.organization_id == organization.id
        && business.is_active
        && organization_reachable(organization)
}

/// Whether an integration is reachable under `business` and `organization`.
pub fn integration_reachable(
    integration: &Integration,
    business: &Business,
    organization: &Organization,
) -> bool {
    integration.business_id == business.id
        && integration.is_active
        && business_reachable(business, organization)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tenancy_org::IntegrationType;
    use uuid::Uuid;

    fn chain() -> (Organization, Business, Integration) {
        let org = Organization::new("Acme", "acme", Uuid::now_v7());
        let business = Business::new(org.id, "Store", "store");
        let integration = Integration::new(business.id, IntegrationType::Slack, "Alerts");
        (org, business, integration)
    }

    #[test]
    fn test_active_chain_is_reachable() {
        let (org, business, integration) = chain();
        assert!(organization_reachable(&org));
        assert!(business_reachable(&business, &org));
        assert!(integration_reachable(&integration, &business, &org));
    }

    #[test]
    fn test_inactive_organization_hides_descendants() {
        let (mut org, business, integration) = chain();
        org.deactivate();

        assert!(business.is_active);
        assert!(!business_reachable(&business, &org));
        assert!(!integration_reachable(&integration, &business, &org));

        org.restore();
        assert!(integration_reachable(&integration, &business, &org));
    }

    #[test]
    fn test_inactive_business_hides_integrations() {
        let (org, mut business, integration) = chain();
        business.deactivate();
        assert!(!integration_reachable(&integration, &business, &org));
    }

    #[test]
    fn test_foreign_parent_is_unreachable() {
        let (org, business, integration) = chain();
        let other_org = Organization::new("Other", "other", Uuid::now_v7());
        let other_business = Business::new(org.id, "Other", "other");

        assert!(!business_reachable(&business, &other_org));
        assert!(!integration_reachable(&integration, &other_business, &org));
    }
}
