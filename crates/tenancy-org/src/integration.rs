//! Integration domain models
//!
//! An integration is a named connector to an external system, attached to a
//! business. Type-specific fields live in a separate detail record, see
//! [`crate::detail`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::detail::IntegrationDetail;

/// Opaque per-integration configuration.
pub type IntegrationConfig = serde_json::Map<String, serde_json::Value>;

/// The external system an integration connects to.
///
/// # Examples
///
/// ```
/// use tenancy_org::IntegrationType;
///
/// assert_eq!(IntegrationType::WhatsApp.as_str(), "WHATSAPP");
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum IntegrationType {
    /// A Facebook page
    #[serde(rename = "FACEBOOK_PAGE")]
    FacebookPage,

    /// A WhatsApp business number
    #[serde(rename = "WHATSAPP")]
    WhatsApp,

    /// A Slack workspace
    #[serde(rename = "SLACK")]
    Slack,
}

impl IntegrationType {
    /// All known integration types.
    pub fn all() -> &'static [IntegrationType] {
        &[Self::FacebookPage, Self::WhatsApp, Self::Slack]
    }

    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FacebookPage => "FACEBOOK_PAGE",
            Self::WhatsApp => "WHATSAPP",
            Self::Slack => "SLACK",
        }
    }
}

impl std::fmt::Display for IntegrationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A connector attached to a business.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use tenancy_org::{Integration, IntegrationType};
///
/// let business_id = Uuid::now_v7();
/// let integration = Integration::new(business_id, IntegrationType::Slack, "Team chat");
/// assert!(integration.is_active);
/// assert!(integration.last_synced_at.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Integration {
    /// Unique identifier for the integration
    pub id: Uuid,

    /// Business this integration belongs to
    pub business_id: Uuid,

    /// Declared type; decides which detail variant may attach
    pub integration_type: IntegrationType,

    /// Human-readable name
    pub name: String,

    /// Whether the integration is active (false = soft deleted)
    pub is_active: bool,

    /// Opaque configuration
    #[serde(default)]
    pub config: IntegrationConfig,

    /// Last successful sync with the external system
    pub last_synced_at: Option<DateTime<Utc>>,

    /// When the integration was created
    pub created_at: DateTime<Utc>,

    /// When the integration was last updated
    pub updated_at: DateTime<Utc>,
}

impl Integration {
    /// Creates a new active integration with empty configuration.
    pub fn new(business_id: Uuid, integration_type: IntegrationType, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            business_id,
            integration_type,
            name: name.into(),
            is_active: true,
            config: IntegrationConfig::new(),
            last_synced_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the configuration map.
    pub fn with_config(mut self, config: IntegrationConfig) -> Self {
        self.config = config;
        self
    }

    /// Soft delete.
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.touch();
    }

    /// Undo a soft delete.
    pub fn restore(&mut self) {
        self.is_active = true;
        self.touch();
    }

    /// Record a sync at `at`.
    pub fn mark_synced(&mut self, at: DateTime<Utc>) {
        self.last_synced_at = Some(at);
        self.updated_at = at;
    }

    /// Bump `updated_at`.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// An integration together with its detail record, if one is attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationView {
    /// The integration itself
    #[serde(flatten)]
    pub integration: Integration,

    /// Attached detail variant
    pub detail: Option<IntegrationDetail>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integration_type_wire_format() {
        for ty in IntegrationType::all() {
            let json = serde_json::to_string(ty).unwrap();
            assert_eq!(json, format!("\"{}\"", ty.as_str()));
            let back: IntegrationType = serde_json::from_str(&json).unwrap();
            assert_eq!(back, *ty);
        }
        assert!(serde_json::from_str::<IntegrationType>("\"TELEGRAM\"").is_err());
    }

    #[test]
    fn test_integration_with_config() {
        let mut config = IntegrationConfig::new();
        config.insert("auto_reply".to_string(), json!(true));

        let integration =
            Integration::new(Uuid::now_v7(), IntegrationType::FacebookPage, "Main page")
                .with_config(config);

        assert_eq!(integration.config["auto_reply"], json!(true));
    }

    #[test]
    fn test_mark_synced() {
        let mut integration = Integration::new(Uuid::now_v7(), IntegrationType::Slack, "Chat");
        let at = Utc::now();
        integration.mark_synced(at);
        assert_eq!(integration.last_synced_at, Some(at));
    }
}
