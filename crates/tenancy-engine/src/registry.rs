//! Integration variant registry
//!
//! Maps an integration's declared type to its single detail record. The
//! detail is a tagged union ([`IntegrationDetail`]) and only the variant
//! matching `integration_type` may ever be stored for an integration. The
//! store compares the variant with the integration's current type inside
//! the write, so a concurrent type change cannot slip between check and
//! insert.

use std::sync::Arc;

use tenancy_org::{DetailRecord, Integration, IntegrationDetail};
use tracing::{debug, info};

use crate::error::{TenancyError, TenancyResult};
use crate::store::TenantStore;

/// Attaches, replaces and looks up integration details.
#[derive(Clone)]
pub struct VariantRegistry {
    store: Arc<dyn TenantStore>,
}

impl VariantRegistry {
    pub fn new(store: Arc<dyn TenantStore>) -> Self {
        Self { store }
    }

    /// Attach the first detail record of an integration.
    ///
    /// Fails with `TypeMismatch` when the variant differs from the
    /// integration's type and with `Conflict` when a detail already exists.
    pub async fn attach_detail(
        &self,
        integration: &Integration,
        detail: IntegrationDetail,
    ) -> TenancyResult<DetailRecord> {
        let record = self
            .store
            .insert_detail(DetailRecord::new(integration.id, detail))
            .await?;

        info!(
            integration_id = %integration.id,
            integration_type = %integration.integration_type,
            external_id = record.detail.external_id(),
            "Integration detail attached"
        );
        Ok(record)
    }

    /// Replace the existing detail record of an integration.
    pub async fn update_detail(
        &self,
        integration: &Integration,
        detail: IntegrationDetail,
    ) -> TenancyResult<DetailRecord> {
        let record = self.store.update_detail(integration.id, detail).await?;
        info!(integration_id = %integration.id, "Integration detail updated");
        Ok(record)
    }

    /// The detail of an integration, if one was attached.
    ///
    /// A stored variant that disagrees with the integration's type is
    /// reported as a referential integrity error rather than returned.
    pub async fn detail_of(
        &self,
        integration: &Integration,
    ) -> TenancyResult<Option<IntegrationDetail>> {
        debug!(integration_id = %integration.id, "Looking up integration detail");

        match self.store.get_detail(integration.id).await? {
            Some(record) if !record.detail.matches(integration.integration_type) => {
                Err(TenancyError::ReferentialIntegrity(format!(
                    "stored {} detail does not match {} integration",
                    record.detail.integration_type(),
                    integration.integration_type
                )))
            }
            Some(record) => Ok(Some(record.detail)),
            None => Ok(None),
        }
    }

    /// Whether an integration has a detail record.
    pub async fn has_detail(&self, integration: &Integration) -> TenancyResult<bool> {
        Ok(self.store.get_detail(integration.id).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryTenantStore, IntegrationChanges, TenantStore};
    use tenancy_org::{
        Business, FacebookPageDetail, IntegrationType, Organization, User, WhatsAppDetail,
    };

    async fn integration(ty: IntegrationType) -> (VariantRegistry, Integration) {
        let (registry, _, integration) = integration_with_store(ty).await;
        (registry, integration)
    }

    async fn integration_with_store(
        ty: IntegrationType,
    ) -> (VariantRegistry, Arc<InMemoryTenantStore>, Integration) {
        let store = Arc::new(InMemoryTenantStore::new());
        let owner = store.insert_user(User::new("o@example.com", "O")).await.unwrap();
        let (org, _) = store
            .insert_organization(Organization::new("Acme", "acme", owner.id))
            .await
            .unwrap();
        let business = store
            .insert_business(Business::new(org.id, "Store", "store"))
            .await
            .unwrap();
        let integration = store
            .insert_integration(Integration::new(business.id, ty, "Main"))
            .await
            .unwrap();
        (VariantRegistry::new(store.clone()), store, integration)
    }

    fn page(id: &str) -> IntegrationDetail {
        IntegrationDetail::FacebookPage(FacebookPageDetail::new(id))
    }

    #[tokio::test]
    async fn test_attach_and_lookup() {
        let (registry, integration) = integration(IntegrationType::FacebookPage).await;
        assert_eq!(registry.detail_of(&integration).await.unwrap(), None);

        registry.attach_detail(&integration, page("123")).await.unwrap();

        let detail = registry.detail_of(&integration).await.unwrap().unwrap();
        assert_eq!(detail.external_id(), "123");
        assert!(registry.has_detail(&integration).await.unwrap());
    }

    #[tokio::test]
    async fn test_attach_type_mismatch() {
        let (registry, integration) = integration(IntegrationType::WhatsApp).await;

        let result = registry.attach_detail(&integration, page("123")).await;
        assert_eq!(
            result.unwrap_err(),
            TenancyError::TypeMismatch {
                expected: IntegrationType::WhatsApp,
                actual: IntegrationType::FacebookPage,
            }
        );
        assert!(!registry.has_detail(&integration).await.unwrap());
    }

    #[tokio::test]
    async fn test_second_attach_conflicts() {
        let (registry, integration) = integration(IntegrationType::FacebookPage).await;
        registry.attach_detail(&integration, page("123")).await.unwrap();

        let result = registry.attach_detail(&integration, page("456")).await;
        assert!(matches!(result, Err(TenancyError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_update_detail() {
        let (registry, integration) = integration(IntegrationType::FacebookPage).await;

        let result = registry.update_detail(&integration, page("123")).await;
        assert!(matches!(result, Err(TenancyError::NotFound(_))));

        registry.attach_detail(&integration, page("123")).await.unwrap();
        registry.update_detail(&integration, page("456")).await.unwrap();
        let detail = registry.detail_of(&integration).await.unwrap().unwrap();
        assert_eq!(detail.external_id(), "456");

        let whatsapp = IntegrationDetail::WhatsApp(WhatsAppDetail {
            phone_number_id: "1".to_string(),
            business_account_id: "2".to_string(),
            display_phone_number: None,
            access_token: None,
        });
        let result = registry.update_detail(&integration, whatsapp).await;
        assert!(matches!(result, Err(TenancyError::TypeMismatch { .. })));
    }

    #[tokio::test]
    async fn test_attach_checks_current_type_not_snapshot() {
        let (registry, store, snapshot) = integration_with_store(IntegrationType::WhatsApp).await;

        // another request retypes the integration after this one resolved it
        store
            .update_integration(
                snapshot.id,
                IntegrationChanges {
                    integration_type: Some(IntegrationType::FacebookPage),
                    ..IntegrationChanges::default()
                },
            )
            .await
            .unwrap();

        let whatsapp = IntegrationDetail::WhatsApp(WhatsAppDetail {
            phone_number_id: "1".to_string(),
            ..WhatsAppDetail::default()
        });
        let result = registry.attach_detail(&snapshot, whatsapp).await;
        assert_eq!(
            result.unwrap_err(),
            TenancyError::TypeMismatch {
                expected: IntegrationType::FacebookPage,
                actual: IntegrationType::WhatsApp,
            }
        );
        assert!(!registry.has_detail(&snapshot).await.unwrap());
    }
}
