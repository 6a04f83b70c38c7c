//! Integration detail variants
//!
//! Each integration may carry at most one type-specific detail record. The
//! variants form a tagged union keyed by [`IntegrationType`]; only the
//! variant matching the parent integration's type may be attached.
//!
//! Credential fields are accepted on input but never serialized back out.
//! They are stored as plain strings; encryption at rest is not handled here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::integration::IntegrationType;

/// Facebook page specific fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FacebookPageDetail {
    /// External page id
    pub page_id: String,

    /// Page display name
    #[serde(default)]
    pub page_name: Option<String>,

    /// Page access token
    #[serde(default, skip_serializing)]
    pub page_access_token: Option<String>,

    /// Page category as reported by Facebook
    #[serde(default)]
    pub page_category: Option<String>,

    /// Public page URL
    #[serde(default)]
    pub page_url: Option<String>,
}

impl FacebookPageDetail {
    /// Detail for the page with the given external id.
    pub fn new(page_id: impl Into<String>) -> Self {
        Self {
            page_id: page_id.into(),
            ..Self::default()
        }
    }

    /// Set the page name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.page_name = Some(name.into());
        self
    }

    /// Set the page access token.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.page_access_token = Some(token.into());
        self
    }
}

/// WhatsApp Business specific fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WhatsAppDetail {
    /// Phone number id in the WhatsApp Business API
    pub phone_number_id: String,

    /// WhatsApp Business account id
    pub business_account_id: String,

    /// Human-readable phone number
    #[serde(default)]
    pub display_phone_number: Option<String>,

    /// API access token
    #[serde(default, skip_serializing)]
    pub access_token: Option<String>,
}

/// Slack workspace specific fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SlackDetail {
    /// Workspace (team) id
    pub team_id: String,

    /// Workspace name
    #[serde(default)]
    pub team_name: Option<String>,

    /// Default channel id
    #[serde(default)]
    pub channel_id: Option<String>,

    /// Bot token
    #[serde(default, skip_serializing)]
    pub bot_token: Option<String>,
}

/// Type-specific payload attached 1:1 to an integration.
///
/// # Examples
///
/// ```
/// use tenancy_org::{FacebookPageDetail, IntegrationDetail, IntegrationType};
///
/// let detail = IntegrationDetail::FacebookPage(FacebookPageDetail::new("123"));
/// assert_eq!(detail.integration_type(), IntegrationType::FacebookPage);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum IntegrationDetail {
    /// Facebook page detail
    #[serde(rename = "FACEBOOK_PAGE")]
    FacebookPage(FacebookPageDetail),

    /// WhatsApp detail
    #[serde(rename = "WHATSAPP")]
    WhatsApp(WhatsAppDetail),

    /// Slack detail
    #[serde(rename = "SLACK")]
    Slack(SlackDetail),
}

impl IntegrationDetail {
    /// The integration type this variant belongs to.
    pub fn integration_type(&self) -> IntegrationType {
        match self {
            Self::FacebookPage(_) => IntegrationType::FacebookPage,
            Self::WhatsApp(_) => IntegrationType::WhatsApp,
            Self::Slack(_) => IntegrationType::Slack,
        }
    }

    /// The external identifier of the connected entity.
    pub fn external_id(&self) -> &str {
        match self {
            Self::FacebookPage(d) => &d.page_id,
            Self::WhatsApp(d) => &d.phone_number_id,
            Self::Slack(d) => &d.team_id,
        }
    }

    /// Whether this variant may attach to an integration of type `ty`.
    pub fn matches(&self, ty: IntegrationType) -> bool {
        self.integration_type() == ty
    }
}

/// A stored detail record, keyed by its parent integration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetailRecord {
    /// Parent integration (unique)
    pub integration_id: Uuid,

    /// The payload
    pub detail: IntegrationDetail,

    /// When the detail was attached
    pub created_at: DateTime<Utc>,

    /// When the detail was last replaced
    pub updated_at: DateTime<Utc>,
}

impl DetailRecord {
    /// A fresh record for `integration_id`.
    pub fn new(integration_id: Uuid, detail: IntegrationDetail) -> Self {
        let now = Utc::now();
        Self {
            integration_id,
            detail,
            created_at: now,
            updated_at: now,
        }
    }
}
