//! Business operations.

use serde::{Deserialize, Serialize};
use tenancy_org::{Business, BusinessSummary};
use tenancy_rbac::{Action, ResourceType};
use tracing::{debug, info};
use uuid::Uuid;

use super::{count, validate_name, RequestScope};
use crate::error::TenancyResult;
use crate::gateway::HierarchyPath;
use crate::hooks::{self, allocate_slug, slug_request, validate_slug, SlugRequest, SlugScope};
use crate::store::{BusinessChanges, Visibility};

/// Input for creating a business.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewBusiness {
    pub name: String,
    /// Derived from the name when omitted, unique within the organization
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewBusiness {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial update of a business.
///
/// An empty `description` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BusinessUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl RequestScope {
    /// Create a business under an organization. Any member may.
    pub async fn create_business(
        &self,
        organization_id: Uuid,
        input: NewBusiness,
    ) -> TenancyResult<Business> {
        debug!(organization_id = %organization_id, name = %input.name, "Creating business");

        self.gateway
            .authorize(
                &HierarchyPath::organization(organization_id),
                ResourceType::Business,
                Action::Create,
            )
            .await?;

        let name = validate_name(&input.name, &self.config)?;
        let description = input.description.filter(|d| !d.trim().is_empty());
        let scope = SlugScope::Business(organization_id);
        let build = move |name: String, slug: String| {
            let business = Business::new(organization_id, name, slug);
            match &description {
                Some(d) => business.with_description(d.clone()),
                None => business,
            }
        };

        let request = slug_request(&name, input.slug.as_deref(), scope, &self.config)?;
        let business = match request {
            SlugRequest::Explicit(slug) => self.store.insert_business(build(name, slug)).await?,
            SlugRequest::Derived(base) => {
                let probe = self.store.clone();
                let target = self.store.clone();
                allocate_slug(
                    &base,
                    scope,
                    &self.config,
                    move |slug| {
                        let store = probe.clone();
                        async move { store.business_slug_taken(organization_id, &slug).await }
                    },
                    move |slug| {
                        let store = target.clone();
                        let business = build(name.clone(), slug);
                        async move { store.insert_business(business).await }
                    },
                )
                .await?
            }
        };

        info!(
            organization_id = %organization_id,
            business_id = %business.id,
            slug = %business.slug,
            "Business created"
        );
        Ok(business)
    }

    /// Active businesses of an organization with their integration counts.
    pub async fn list_businesses(&self, organization_id: Uuid) -> TenancyResult<Vec<BusinessSummary>> {
        debug!(organization_id = %organization_id, "Listing businesses");

        let resolved = self
            .gateway
            .authorize(
                &HierarchyPath::organization(organization_id),
                ResourceType::Business,
                Action::List,
            )
            .await?;

        let mut summaries = Vec::new();
        for business in self
            .store
            .list_businesses(resolved.organization.id, Visibility::Active)
            .await?
        {
            summaries.push(self.summarize(business).await?);
        }
        Ok(summaries)
    }

    pub async fn get_business(
        &self,
        organization_id: Uuid,
        business_id: Uuid,
    ) -> TenancyResult<BusinessSummary> {
        debug!(organization_id = %organization_id, business_id = %business_id, "Getting business");

        let resolved = self
            .gateway
            .authorize(
                &HierarchyPath::business(organization_id, business_id),
                ResourceType::Business,
                Action::Read,
            )
            .await?;
        self.summarize(resolved.business()?.clone()).await
    }

    /// Update a business. Admin or owner only.
    pub async fn update_business(
        &self,
        organization_id: Uuid,
        business_id: Uuid,
        update: BusinessUpdate,
    ) -> TenancyResult<Business> {
        debug!(organization_id = %organization_id, business_id = %business_id, "Updating business");

        let resolved = self
            .gateway
            .authorize(
                &HierarchyPath::business(organization_id, business_id),
                ResourceType::Business,
                Action::Update,
            )
            .await?;

        let mut changes = BusinessChanges::default();
        if let Some(name) = update.name {
            changes.name = Some(validate_name(&name, &self.config)?);
        }
        if let Some(slug) = update.slug {
            let slug = slug.trim();
            validate_slug(slug, &self.config)?;
            changes.slug = Some(slug.to_string());
        }
        if let Some(description) = update.description {
            let description = description.trim();
            changes.description = Some((!description.is_empty()).then(|| description.to_string()));
        }

        let business = self
            .store
            .update_business(resolved.business()?.id, changes)
            .await?;
        info!(business_id = %business.id, "Business updated");
        Ok(business)
    }

    /// Soft delete a business. Admin or owner only.
    pub async fn delete_business(&self, organization_id: Uuid, business_id: Uuid) -> TenancyResult<()> {
        debug!(organization_id = %organization_id, business_id = %business_id, "Deleting business");

        let resolved = self
            .gateway
            .authorize(
                &HierarchyPath::business(organization_id, business_id),
                ResourceType::Business,
                Action::Delete,
            )
            .await?;

        hooks::soft_delete_business(self.store.as_ref(), resolved.business()?.id).await?;
        info!(business_id = %business_id, "Business soft deleted");
        Ok(())
    }

    /// Restore a soft-deleted business. Admin or owner only.
    pub async fn restore_business(
        &self,
        organization_id: Uuid,
        business_id: Uuid,
    ) -> TenancyResult<Business> {
        debug!(organization_id = %organization_id, business_id = %business_id, "Restoring business");

        let resolved = self
            .gateway
            .authorize_restore(
                &HierarchyPath::business(organization_id, business_id),
                ResourceType::Business,
            )
            .await?;

        let business = hooks::restore_business(self.store.as_ref(), resolved.business()?.id).await?;
        info!(business_id = %business_id, "Business restored");
        Ok(business)
    }

    async fn summarize(&self, business: Business) -> TenancyResult<BusinessSummary> {
        let integrations = self
            .store
            .list_integrations(business.id, Visibility::Active)
            .await?
            .len();
        let integration_count = count(integrations);
        Ok(BusinessSummary {
            business,
            integration_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TenancyError;
    use crate::principal::Principal;
    use crate::service::{NewMember, NewOrganization, TenancyService};
    use tenancy_org::{Organization, Role, User};

    async fn setup() -> (TenancyService, User, User, Organization) {
        let service = TenancyService::in_memory();
        let owner = service.register_user("owner@example.com", "Owner").await.unwrap();
        let member = service.register_user("member@example.com", "Member").await.unwrap();
        let scope = service.scope(Principal::new(owner.id));
        let org = scope
            .create_organization(NewOrganization::named("Acme"))
            .await
            .unwrap();
        scope
            .add_member(org.id, NewMember::new(member.id, Role::Member))
            .await
            .unwrap();
        (service, owner, member, org)
    }

    #[tokio::test]
    async fn test_member_creates_business() {
        let (service, _, member, org) = setup().await;
        let scope = service.scope(Principal::new(member.id));

        let business = scope
            .create_business(org.id, NewBusiness::named("Store").with_description("Main store"))
            .await
            .unwrap();
        assert_eq!(business.slug, "store");
        assert_eq!(business.organization_id, org.id);
        assert_eq!(business.description.as_deref(), Some("Main store"));
    }

    #[tokio::test]
    async fn test_business_slug_rules() {
        let (service, owner, _, org) = setup().await;
        let scope = service.scope(Principal::new(owner.id));

        scope.create_business(org.id, NewBusiness::named("Store")).await.unwrap();
        let second = scope.create_business(org.id, NewBusiness::named("Store")).await.unwrap();
        assert_eq!(second.slug, "store-2");

        let result = scope
            .create_business(org.id, NewBusiness::named("Other").with_slug("store"))
            .await;
        assert!(matches!(result, Err(TenancyError::Conflict(_))));

        // slugs are per organization
        let other_org = scope
            .create_organization(NewOrganization::named("Other"))
            .await
            .unwrap();
        let elsewhere = scope
            .create_business(other_org.id, NewBusiness::named("Store"))
            .await
            .unwrap();
        assert_eq!(elsewhere.slug, "store");
    }

    #[tokio::test]
    async fn test_business_admin_operations() {
        let (service, owner, member, org) = setup().await;
        let business = service
            .scope(Principal::new(member.id))
            .create_business(org.id, NewBusiness::named("Store"))
            .await
            .unwrap();

        let member_scope = service.scope(Principal::new(member.id));
        let result = member_scope.delete_business(org.id, business.id).await;
        assert!(matches!(result, Err(TenancyError::Forbidden(_))));
        let result = member_scope
            .update_business(org.id, business.id, BusinessUpdate::default())
            .await;
        assert!(matches!(result, Err(TenancyError::Forbidden(_))));

        let owner_scope = service.scope(Principal::new(owner.id));
        let updated = owner_scope
            .update_business(
                org.id,
                business.id,
                BusinessUpdate {
                    name: Some("Flagship".to_string()),
                    description: Some("Downtown".to_string()),
                    ..BusinessUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Flagship");
        assert_eq!(updated.slug, "store");

        owner_scope.delete_business(org.id, business.id).await.unwrap();
        assert!(owner_scope.list_businesses(org.id).await.unwrap().is_empty());
        assert!(matches!(
            owner_scope.get_business(org.id, business.id).await,
            Err(TenancyError::NotFound(_))
        ));

        owner_scope.restore_business(org.id, business.id).await.unwrap();
        let summary = owner_scope.get_business(org.id, business.id).await.unwrap();
        assert_eq!(summary.integration_count, 0);
    }

    #[tokio::test]
    async fn test_cross_organization_business_is_not_found() {
        let (service, owner, _, org) = setup().await;
        let scope = service.scope(Principal::new(owner.id));
        let other_org = scope
            .create_organization(NewOrganization::named("Other"))
            .await
            .unwrap();
        let business = scope
            .create_business(other_org.id, NewBusiness::named("Shop"))
            .await
            .unwrap();

        let result = scope.get_business(org.id, business.id).await;
        assert!(matches!(result, Err(TenancyError::NotFound(_))));
    }
}
