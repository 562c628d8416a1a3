//! In-app surfaces managed from the panel: ads, push notifications,
//! redirect banners, announcements and the switchboard tying them together.

use serde::{Deserialize, Serialize};

use crate::QueryPairs;
use crate::ids::ResourceId;

/// Paging plus the optional ad filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub kind: Option<String>,
    pub status: Option<String>,
}

impl ListQuery {
    pub fn to_pairs(&self) -> QueryPairs {
        let mut pairs = QueryPairs::new();
        if let Some(kind) = self.kind.as_deref().filter(|k| !k.is_empty()) {
            pairs.push(("type", kind.to_string()));
        }
        if let Some(status) = self.status.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("status", status.to_string()));
        }
        if let Some(page) = self.page.filter(|p| *p > 0) {
            pairs.push(("page", page.to_string()));
        }
        if let Some(per_page) = self.per_page.filter(|p| *p > 0) {
            pairs.push(("per_page", per_page.to_string()));
        }
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppAd {
    pub id: ResourceId,
    pub unit_name: String,
    #[serde(default)]
    pub unit_description: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default)]
    pub native_code: Option<String>,
    #[serde(default)]
    pub interstitial_code: Option<String>,
    #[serde(default)]
    pub banner_code: Option<String>,
    #[serde(default)]
    pub app_open_code: Option<String>,
    #[serde(default)]
    pub reward_code: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_description: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interstitial_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_open_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppNotification {
    pub id: ResourceId,
    pub unit_name: String,
    #[serde(default)]
    pub unit_description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// An image attached to a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Multipart body for notifications. Creating one requires an image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationPayload {
    pub unit_name: Option<String>,
    pub unit_description: Option<String>,
    pub url: Option<String>,
    pub image: Option<ImageUpload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppRedirect {
    pub id: ResourceId,
    pub unit_name: String,
    #[serde(default)]
    pub unit_description: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Multipart body for redirects; the image is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectPayload {
    pub unit_name: Option<String>,
    pub unit_description: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub image: Option<ImageUpload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppAnnounce {
    pub id: ResourceId,
    pub unit_name: String,
    #[serde(default)]
    pub unit_description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnouncePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalToggle {
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_live: bool,
}

impl Default for GlobalToggle {
    fn default() -> Self {
        Self {
            is_active: true,
            is_live: true,
        }
    }
}

/// Which unit (if any) of a surface is shown, and whether it is enabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureToggle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ResourceId>,
    #[serde(default)]
    pub is_enable: bool,
}

/// `GET/PUT /app/config`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub global: GlobalToggle,
    #[serde(default)]
    pub notification: FeatureToggle,
    #[serde(default)]
    pub ads: FeatureToggle,
    #[serde(default)]
    pub redirect: FeatureToggle,
    #[serde(default)]
    pub announce: FeatureToggle,
}
