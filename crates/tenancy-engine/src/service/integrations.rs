//! Integration and integration detail operations.
//!
//! Any member of the owning organization may manage integrations and their
//! details; business and organization mutation stays with admins.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tenancy_org::{
    DetailRecord, Integration, IntegrationConfig, IntegrationDetail, IntegrationType,
    IntegrationView,
};
use tenancy_rbac::{Action, ResourceType};
use tracing::{debug, info};
use uuid::Uuid;

use super::{validate_name, RequestScope};
use crate::error::TenancyResult;
use crate::gateway::HierarchyPath;
use crate::hooks;
use crate::store::{IntegrationChanges, Visibility};

/// Input for creating an integration.
///
/// The detail record is attached in a second step once the integration
/// exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewIntegration {
    pub integration_type: IntegrationType,
    pub name: String,
    #[serde(default)]
    pub config: IntegrationConfig,
}

impl NewIntegration {
    pub fn new(integration_type: IntegrationType, name: impl Into<String>) -> Self {
        Self {
            integration_type,
            name: name.into(),
            config: IntegrationConfig::new(),
        }
    }

    pub fn with_config(mut self, config: IntegrationConfig) -> Self {
        self.config = config;
        self
    }
}

/// Partial update of an integration.
///
/// The type may only change while no detail of another variant is
/// attached; the store checks this in the same write.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntegrationUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub integration_type: Option<IntegrationType>,
    #[serde(default)]
    pub config: Option<IntegrationConfig>,
}

impl RequestScope {
    /// Create an integration under a business. Any member may.
    pub async fn create_integration(
        &self,
        organization_id: Uuid,
        business_id: Uuid,
        input: NewIntegration,
    ) -> TenancyResult<Integration> {
        debug!(
            organization_id = %organization_id,
            business_id = %business_id,
            integration_type = %input.integration_type,
            "Creating integration"
        );

        let resolved = self
            .gateway
            .authorize(
                &HierarchyPath::business(organization_id, business_id),
                ResourceType::Integration,
                Action::Create,
            )
            .await?;

        let name = validate_name(&input.name, &self.config)?;
        let integration = Integration::new(resolved.business()?.id, input.integration_type, name)
            .with_config(input.config);
        let integration = self.store.insert_integration(integration).await?;

        info!(
            business_id = %business_id,
            integration_id = %integration.id,
            integration_type = %integration.integration_type,
            "Integration created"
        );
        Ok(integration)
    }

    /// Active integrations of a business.
    pub async fn list_integrations(
        &self,
        organization_id: Uuid,
        business_id: Uuid,
    ) -> TenancyResult<Vec<Integration>> {
        debug!(organization_id = %organization_id, business_id = %business_id, "Listing integrations");

        let resolved = self
            .gateway
            .authorize(
                &HierarchyPath::business(organization_id, business_id),
                ResourceType::Integration,
                Action::List,
            )
            .await?;

        Ok(self
            .store
            .list_integrations(resolved.business()?.id, Visibility::Active)
            .await?)
    }

    /// An integration together with its detail, if any.
    pub async fn get_integration(
        &self,
        organization_id: Uuid,
        business_id: Uuid,
        integration_id: Uuid,
    ) -> TenancyResult<IntegrationView> {
        debug!(integration_id = %integration_id, "Getting integration");

        let resolved = self
            .gateway
            .authorize(
                &HierarchyPath::integration(organization_id, business_id, integration_id),
                ResourceType::Integration,
                Action::Read,
            )
            .await?;

        let integration = resolved.integration()?.clone();
        let detail = self.registry.detail_of(&integration).await?;
        Ok(IntegrationView {
            integration,
            detail,
        })
    }

    pub async fn update_integration(
        &self,
        organization_id: Uuid,
        business_id: Uuid,
        integration_id: Uuid,
        update: IntegrationUpdate,
    ) -> TenancyResult<Integration> {
        debug!(integration_id = %integration_id, "Updating integration");

        let resolved = self
            .gateway
            .authorize(
                &HierarchyPath::integration(organization_id, business_id, integration_id),
                ResourceType::Integration,
                Action::Update,
            )
            .await?;

        let changes = IntegrationChanges {
            name: update
                .name
                .map(|name| validate_name(&name, &self.config))
                .transpose()?,
            integration_type: update.integration_type,
            config: update.config,
            last_synced_at: None,
        };

        let integration = self
            .store
            .update_integration(resolved.integration()?.id, changes)
            .await?;
        info!(integration_id = %integration.id, "Integration updated");
        Ok(integration)
    }

    /// Soft delete an integration. Its detail is kept for a later restore.
    pub async fn delete_integration(
        &self,
        organization_id: Uuid,
        business_id: Uuid,
        integration_id: Uuid,
    ) -> TenancyResult<()> {
        debug!(integration_id = %integration_id, "Deleting integration");

        let resolved = self
            .gateway
            .authorize(
                &HierarchyPath::integration(organization_id, business_id, integration_id),
                ResourceType::Integration,
                Action::Delete,
            )
            .await?;

        hooks::soft_delete_integration(self.store.as_ref(), resolved.integration()?.id).await?;
        info!(integration_id = %integration_id, "Integration soft deleted");
        Ok(())
    }

    pub async fn restore_integration(
        &self,
        organization_id: Uuid,
        business_id: Uuid,
        integration_id: Uuid,
    ) -> TenancyResult<Integration> {
        debug!(integration_id = %integration_id, "Restoring integration");

        let resolved = self
            .gateway
            .authorize_restore(
                &HierarchyPath::integration(organization_id, business_id, integration_id),
                ResourceType::Integration,
            )
            .await?;

        let integration =
            hooks::restore_integration(self.store.as_ref(), resolved.integration()?.id).await?;
        info!(integration_id = %integration_id, "Integration restored");
        Ok(integration)
    }

    /// Record that an integration was synchronized now. Bookkeeping only.
    pub async fn mark_integration_synced(
        &self,
        organization_id: Uuid,
        business_id: Uuid,
        integration_id: Uuid,
    ) -> TenancyResult<Integration> {
        let resolved = self
            .gateway
            .authorize(
                &HierarchyPath::integration(organization_id, business_id, integration_id),
                ResourceType::Integration,
                Action::Update,
            )
            .await?;

        let changes = IntegrationChanges {
            last_synced_at: Some(Utc::now()),
            ..IntegrationChanges::default()
        };
        let integration = self
            .store
            .update_integration(resolved.integration()?.id, changes)
            .await?;

        debug!(integration_id = %integration_id, "Integration marked synced");
        Ok(integration)
    }

    /// Attach the detail record of an integration.
    pub async fn attach_detail(
        &self,
        organization_id: Uuid,
        business_id: Uuid,
        integration_id: Uuid,
        detail: IntegrationDetail,
    ) -> TenancyResult<DetailRecord> {
        debug!(
            integration_id = %integration_id,
            variant = %detail.integration_type(),
            "Attaching integration detail"
        );

        let resolved = self
            .gateway
            .authorize(
                &HierarchyPath::integration(organization_id, business_id, integration_id),
                ResourceType::IntegrationDetail,
                Action::Create,
            )
            .await?;

        self.registry
            .attach_detail(resolved.integration()?, detail)
            .await
    }

    /// Replace the detail record of an integration.
    pub async fn update_detail(
        &self,
        organization_id: Uuid,
        business_id: Uuid,
        integration_id: Uuid,
        detail: IntegrationDetail,
    ) -> TenancyResult<DetailRecord> {
        debug!(integration_id = %integration_id, "Updating integration detail");

        let resolved = self
            .gateway
            .authorize(
                &HierarchyPath::integration(organization_id, business_id, integration_id),
                ResourceType::IntegrationDetail,
                Action::Update,
            )
            .await?;

        self.registry
            .update_detail(resolved.integration()?, detail)
            .await
    }

    pub async fn detail_of(
        &self,
        organization_id: Uuid,
        business_id: Uuid,
        integration_id: Uuid,
    ) -> TenancyResult<Option<IntegrationDetail>> {
        let resolved = self
            .gateway
            .authorize(
                &HierarchyPath::integration(organization_id, business_id, integration_id),
                ResourceType::IntegrationDetail,
                Action::Read,
            )
            .await?;

        self.registry.detail_of(resolved.integration()?).await
    }
}
