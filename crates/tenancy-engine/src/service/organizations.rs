//! Organization and membership operations.

use serde::{Deserialize, Serialize};
use tenancy_org::{Membership, Organization, OrganizationDetail, OrganizationSummary, Role};
use tenancy_rbac::{Action, ResourceType};
use tracing::{debug, info};
use uuid::Uuid;

use super::{count, validate_name, RequestScope};
use crate::error::{TenancyError, TenancyResult};
use crate::gateway::HierarchyPath;
use crate::hooks::{self, allocate_slug, slug_request, validate_slug, SlugRequest, SlugScope};
use crate::store::{OrganizationChanges, Visibility};

/// Input for creating an organization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewOrganization {
    pub name: String,
    /// Derived from the name when omitted
    #[serde(default)]
    pub slug: Option<String>,
}

impl NewOrganization {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: None,
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }
}

/// Partial update of an organization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizationUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
}

/// Input for adding a member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMember {
    pub user_id: Uuid,
    #[serde(default)]
    pub role: Role,
}

impl NewMember {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }
}

impl RequestScope {
    /// Create an organization owned by the principal.
    ///
    /// The owner membership is written in the same atomic unit as the
    /// organization. Without an explicit slug one is derived from the name
    /// and disambiguated globally.
    pub async fn create_organization(&self, input: NewOrganization) -> TenancyResult<Organization> {
        let owner_id = self.principal().user_id;
        debug!(owner_id = %owner_id, name = %input.name, "Creating organization");

        let name = validate_name(&input.name, &self.config)?;
        let request = slug_request(
            &name,
            input.slug.as_deref(),
            SlugScope::Organization,
            &self.config,
        )?;

        let (organization, _) = match request {
            SlugRequest::Explicit(slug) => {
                self.store
                    .insert_organization(Organization::new(name, slug, owner_id))
                    .await?
            }
            SlugRequest::Derived(base) => {
                let probe = self.store.clone();
                let target = self.store.clone();
                allocate_slug(
                    &base,
                    SlugScope::Organization,
                    &self.config,
                    move |slug| {
                        let store = probe.clone();
                        async move { store.organization_slug_taken(&slug).await }
                    },
                    move |slug| {
                        let store = target.clone();
                        let organization = Organization::new(name.clone(), slug, owner_id);
                        async move { store.insert_organization(organization).await }
                    },
                )
                .await?
            }
        };

        info!(
            organization_id = %organization.id,
            slug = %organization.slug,
            owner_id = %owner_id,
            "Organization created"
        );
        Ok(organization)
    }

    /// Organizations the principal belongs to, with their role and counts.
    pub async fn list_organizations(&self) -> TenancyResult<Vec<OrganizationSummary>> {
        let user_id = self.principal().user_id;
        debug!(user_id = %user_id, "Listing organizations");

        let resolver = self.gateway.resolver();
        let mut summaries = Vec::new();
        for organization in resolver.organizations_of(user_id).await? {
            let Some(role) = resolver.role_of(user_id, organization.id).await? else {
                continue;
            };
            let (members, businesses) = self.counts(organization.id).await?;
            summaries.push(OrganizationSummary::new(
                &organization,
                role,
                members,
                businesses,
            ));
        }

        debug!(count = summaries.len(), "Listed organizations");
        Ok(summaries)
    }

    /// An organization with its memberships.
    pub async fn get_organization(&self, organization_id: Uuid) -> TenancyResult<OrganizationDetail> {
        debug!(organization_id = %organization_id, "Getting organization");

        let resolved = self
            .gateway
            .authorize(
                &HierarchyPath::organization(organization_id),
                ResourceType::Organization,
                Action::Read,
            )
            .await?;

        let memberships = self.gateway.resolver().memberships_of(organization_id).await?;
        let (member_count, business_count) = self.counts(organization_id).await?;
        Ok(OrganizationDetail {
            organization: resolved.organization,
            memberships,
            member_count,
            business_count,
        })
    }

    /// Rename an organization or change its slug. Admin or owner only.
    pub async fn update_organization(
        &self,
        organization_id: Uuid,
        update: OrganizationUpdate,
    ) -> TenancyResult<Organization> {
        debug!(organization_id = %organization_id, "Updating organization");

        let resolved = self
            .gateway
            .authorize(
                &HierarchyPath::organization(organization_id),
                ResourceType::Organization,
                Action::Update,
            )
            .await?;

        let mut changes = OrganizationChanges::default();
        if let Some(name) = update.name {
            changes.name = Some(validate_name(&name, &self.config)?);
        }
        if let Some(slug) = update.slug {
            let slug = slug.trim();
            validate_slug(slug, &self.config)?;
            changes.slug = Some(slug.to_string());
        }

        let organization = self
            .store
            .update_organization(resolved.organization.id, changes)
            .await?;
        info!(organization_id = %organization.id, "Organization updated");
        Ok(organization)
    }

    /// Soft delete an organization. Admin or owner only.
    ///
    /// Businesses and integrations keep their own flags and become
    /// unreachable until the organization is restored.
    pub async fn delete_organization(&self, organization_id: Uuid) -> TenancyResult<()> {
        debug!(organization_id = %organization_id, "Deleting organization");

        let resolved = self
            .gateway
            .authorize(
                &HierarchyPath::organization(organization_id),
                ResourceType::Organization,
                Action::Delete,
            )
            .await?;

        hooks::soft_delete_organization(self.store.as_ref(), resolved.organization.id).await?;
        info!(organization_id = %organization_id, "Organization soft deleted");
        Ok(())
    }

    /// Restore a soft-deleted organization. Admin or owner only.
    pub async fn restore_organization(&self, organization_id: Uuid) -> TenancyResult<Organization> {
        debug!(organization_id = %organization_id, "Restoring organization");

        let resolved = self
            .gateway
            .authorize_restore(
                &HierarchyPath::organization(organization_id),
                ResourceType::Organization,
            )
            .await?;

        let organization =
            hooks::restore_organization(self.store.as_ref(), resolved.organization.id).await?;
        self.gateway
            .resolver()
            .invalidate(self.principal().user_id, organization_id)
            .await;

        info!(organization_id = %organization_id, "Organization restored");
        Ok(organization)
    }

    /// Add a user to an organization. Admin or owner only.
    pub async fn add_member(
        &self,
        organization_id: Uuid,
        member: NewMember,
    ) -> TenancyResult<Membership> {
        debug!(
            organization_id = %organization_id,
            user_id = %member.user_id,
            role = %member.role,
            "Adding member"
        );

        self.gateway
            .authorize(
                &HierarchyPath::organization(organization_id),
                ResourceType::Membership,
                Action::Create,
            )
            .await?;

        if member.role.is_owner() {
            return Err(TenancyError::InvalidOperation(
                "the OWNER role cannot be granted".to_string(),
            ));
        }
        if self.store.get_user(member.user_id).await?.is_none() {
            return Err(TenancyError::not_found("user"));
        }

        let membership = Membership::new(organization_id, member.user_id, member.role)
            .with_inviter(self.principal().user_id);
        let membership = self.store.insert_membership(membership).await?;
        self.gateway
            .resolver()
            .invalidate(member.user_id, organization_id)
            .await;

        info!(
            organization_id = %organization_id,
            user_id = %membership.user_id,
            role = %membership.role,
            "Member added"
        );
        Ok(membership)
    }

    /// Remove a member from an organization.
    ///
    /// The owner membership can never be removed; that check comes before
    /// the role check, so every member asking for it gets `InvalidOperation`.
    /// Other removals need admin or owner.
    pub async fn remove_member(&self, organization_id: Uuid, user_id: Uuid) -> TenancyResult<()> {
        debug!(organization_id = %organization_id, user_id = %user_id, "Removing member");

        let resolved = self
            .gateway
            .resolve(&HierarchyPath::organization(organization_id))
            .await?;

        let target = self
            .store
            .get_membership(organization_id, user_id)
            .await?
            .ok_or_else(|| TenancyError::not_found("membership"))?;
        if target.is_owner() || resolved.organization.owner_id == user_id {
            return Err(TenancyError::InvalidOperation(
                "the organization owner cannot be removed".to_string(),
            ));
        }
        self.gateway
            .require(&resolved, ResourceType::Membership, Action::Delete)?;

        if !self.store.delete_membership(organization_id, user_id).await? {
            return Err(TenancyError::not_found("membership"));
        }
        self.gateway.resolver().invalidate(user_id, organization_id).await;

        info!(organization_id = %organization_id, user_id = %user_id, "Member removed");
        Ok(())
    }

    /// Change a member's role. Admin or owner only; `OWNER` can be neither
    /// granted nor revoked this way.
    pub async fn change_member_role(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        role: Role,
    ) -> TenancyResult<Membership> {
        debug!(
            organization_id = %organization_id,
            user_id = %user_id,
            role = %role,
            "Changing member role"
        );

        self.gateway
            .authorize(
                &HierarchyPath::organization(organization_id),
                ResourceType::Membership,
                Action::Update,
            )
            .await?;

        let mut membership = self
            .store
            .get_membership(organization_id, user_id)
            .await?
            .ok_or_else(|| TenancyError::not_found("membership"))?;
        if role.is_owner() || membership.is_owner() {
            return Err(TenancyError::InvalidOperation(
                "roles cannot be changed to or from OWNER".to_string(),
            ));
        }

        membership.role = role;
        let membership = self.store.update_membership(membership).await?;
        self.gateway.resolver().invalidate(user_id, organization_id).await;

        info!(
            organization_id = %organization_id,
            user_id = %user_id,
            role = %membership.role,
            "Member role changed"
        );
        Ok(membership)
    }

    /// Memberships of an organization ordered by join time.
    pub async fn memberships_of(&self, organization_id: Uuid) -> TenancyResult<Vec<Membership>> {
        self.gateway
            .authorize(
                &HierarchyPath::organization(organization_id),
                ResourceType::Membership,
                Action::List,
            )
            .await?;
        self.gateway.resolver().memberships_of(organization_id).await
    }

    /// Active organizations of the principal ordered by name.
    pub async fn organizations_of(&self) -> TenancyResult<Vec<Organization>> {
        self.gateway
            .resolver()
            .organizations_of(self.principal().user_id)
            .await
    }

    /// Member count and active business count of an organization.
    async fn counts(&self, organization_id: Uuid) -> TenancyResult<(u32, u32)> {
        let members = self.store.list_memberships(organization_id).await?.len();
        let businesses = self
            .store
            .list_businesses(organization_id, Visibility::Active)
            .await?
            .len();
        Ok((count(members), count(businesses)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::principal::Principal;
    use crate::service::TenancyService;
    use tenancy_org::User;

    async fn setup() -> (TenancyService, User, User) {
        let service = TenancyService::in_memory();
        let owner = service.register_user("owner@example.com", "Owner").await.unwrap();
        let other = service.register_user("other@example.com", "Other").await.unwrap();
        (service, owner, other)
    }

    #[tokio::test]
    async fn test_create_organization_with_owner_membership() {
        let (service, owner, _) = setup().await;
        let scope = service.scope(Principal::new(owner.id));

        let org = scope
            .create_organization(NewOrganization::named("Acme"))
            .await
            .unwrap();
        assert_eq!(org.slug, "acme");
        assert_eq!(org.owner_id, owner.id);

        let detail = scope.get_organization(org.id).await.unwrap();
        assert_eq!(detail.member_count, 1);
        assert_eq!(detail.memberships[0].role, Role::Owner);
        assert!(detail.memberships[0].invited_by.is_none());
    }

    #[tokio::test]
    async fn test_slug_disambiguation_and_explicit_conflict() {
        let (service, owner, other) = setup().await;

        let first = service
            .scope(Principal::new(owner.id))
            .create_organization(NewOrganization::named("Acme"))
            .await
            .unwrap();
        let second = service
            .scope(Principal::new(other.id))
            .create_organization(NewOrganization::named("ACME"))
            .await
            .unwrap();
        assert_eq!(first.slug, "acme");
        assert_eq!(second.slug, "acme-2");

        let result = service
            .scope(Principal::new(other.id))
            .create_organization(NewOrganization::named("Whatever").with_slug("Acme"))
            .await;
        assert!(matches!(result, Err(TenancyError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_list_organizations_summaries() {
        let (service, owner, other) = setup().await;
        let scope = service.scope(Principal::new(owner.id));
        let org = scope
            .create_organization(NewOrganization::named("Acme"))
            .await
            .unwrap();
        scope
            .add_member(org.id, NewMember::new(other.id, Role::Admin))
            .await
            .unwrap();

        let summaries = service
            .scope(Principal::new(other.id))
            .list_organizations()
            .await
            .unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].user_role, Role::Admin);
        assert_eq!(summaries[0].member_count, 2);
        assert_eq!(summaries[0].business_count, 0);
    }

    #[tokio::test]
    async fn test_member_management_rules() {
        let (service, owner, other) = setup().await;
        let scope = service.scope(Principal::new(owner.id));
        let org = scope
            .create_organization(NewOrganization::named("Acme"))
            .await
            .unwrap();

        let result = scope
            .add_member(org.id, NewMember::new(other.id, Role::Owner))
            .await;
        assert!(matches!(result, Err(TenancyError::InvalidOperation(_))));

        let result = scope
            .add_member(org.id, NewMember::new(Uuid::now_v7(), Role::Member))
            .await;
        assert!(matches!(result, Err(TenancyError::NotFound(_))));

        let membership = scope
            .add_member(org.id, NewMember::new(other.id, Role::Member))
            .await
            .unwrap();
        assert_eq!(membership.invited_by, Some(owner.id));

        let result = scope
            .add_member(org.id, NewMember::new(other.id, Role::Admin))
            .await;
        assert!(matches!(result, Err(TenancyError::Conflict(_))));

        let changed = scope
            .change_member_role(org.id, other.id, Role::Admin)
            .await
            .unwrap();
        assert_eq!(changed.role, Role::Admin);

        let result = scope.change_member_role(org.id, owner.id, Role::Admin).await;
        assert!(matches!(result, Err(TenancyError::InvalidOperation(_))));
        let result = scope.change_member_role(org.id, other.id, Role::Owner).await;
        assert!(matches!(result, Err(TenancyError::InvalidOperation(_))));

        scope.remove_member(org.id, other.id).await.unwrap();
        let result = scope.remove_member(org.id, other.id).await;
        assert!(matches!(result, Err(TenancyError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_member_cannot_administer() {
        let (service, owner, other) = setup().await;
        let org = service
            .scope(Principal::new(owner.id))
            .create_organization(NewOrganization::named("Acme"))
            .await
            .unwrap();
        service
            .scope(Principal::new(owner.id))
            .add_member(org.id, NewMember::new(other.id, Role::Member))
            .await
            .unwrap();

        let member = service.scope(Principal::new(other.id));
        let result = member
            .update_organization(
                org.id,
                OrganizationUpdate {
                    name: Some("Renamed".to_string()),
                    slug: None,
                },
            )
            .await;
        assert!(matches!(result, Err(TenancyError::Forbidden(_))));

        let result = member.delete_organization(org.id).await;
        assert!(matches!(result, Err(TenancyError::Forbidden(_))));

        // the owner check wins over the role check
        let result = member.remove_member(org.id, owner.id).await;
        assert!(matches!(result, Err(TenancyError::InvalidOperation(_))));
    }

    #[tokio::test]
    async fn test_update_organization() {
        let (service, owner, other) = setup().await;
        let taken = service
            .scope(Principal::new(other.id))
            .create_organization(NewOrganization::named("Taken"))
            .await
            .unwrap();
        let scope = service.scope(Principal::new(owner.id));
        let org = scope
            .create_organization(NewOrganization::named("Acme"))
            .await
            .unwrap();

        let updated = scope
            .update_organization(
                org.id,
                OrganizationUpdate {
                    name: Some("Acme Corp".to_string()),
                    slug: Some("acme-corp".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Acme Corp");
        assert_eq!(updated.slug, "acme-corp");

        let result = scope
            .update_organization(
                org.id,
                OrganizationUpdate {
                    name: None,
                    slug: Some(taken.slug.to_uppercase()),
                },
            )
            .await;
        assert!(matches!(result, Err(TenancyError::Conflict(_))));

        let result = scope
            .update_organization(
                org.id,
                OrganizationUpdate {
                    name: Some("  ".to_string()),
                    slug: None,
                },
            )
            .await;
        assert!(matches!(result, Err(TenancyError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_and_restore_organization() {
        let (service, owner, _) = setup().await;
        let scope = service.scope(Principal::new(owner.id));
        let org = scope
            .create_organization(NewOrganization::named("Acme"))
            .await
            .unwrap();

        scope.delete_organization(org.id).await.unwrap();

        let fresh = service.scope(Principal::new(owner.id));
        assert!(matches!(
            fresh.get_organization(org.id).await,
            Err(TenancyError::NotFound(_))
        ));
        assert!(fresh.list_organizations().await.unwrap().is_empty());

        let restored = fresh.restore_organization(org.id).await.unwrap();
        assert!(restored.is_active);
        fresh.get_organization(org.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_owner_cannot_be_deleted() {
        let (service, owner, _) = setup().await;
        service
            .scope(Principal::new(owner.id))
            .create_organization(NewOrganization::named("Acme"))
            .await
            .unwrap();

        let result = service.delete_user(owner.id).await;
        assert!(matches!(result, Err(TenancyError::ReferentialIntegrity(_))));
    }
}
