//! Payment orders, plans, providers and the payment switchboard.

use serde::{Deserialize, Serialize};

use crate::QueryPairs;
use crate::ids::ResourceId;

pub const DEFAULT_CURRENCY: &str = "IDR";
pub const MANUAL_PROVIDER: &str = "manual";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderUser {
    #[serde(default)]
    pub id: Option<ResourceId>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentOrder {
    pub id: ResourceId,
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub user: Option<OrderUser>,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub payment_url: Option<String>,
    #[serde(default)]
    pub premium_until: Option<String>,
    #[serde(default)]
    pub paid_at: Option<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Raw provider callback/response, shape depends on the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_payload: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub q: Option<String>,
    pub status: Option<String>,
    pub provider: Option<String>,
    pub created_from: Option<String>,
    pub created_to: Option<String>,
}

impl OrderQuery {
    pub fn to_pairs(&self) -> QueryPairs {
        let mut pairs = QueryPairs::new();
        if let Some(page) = self.page.filter(|p| *p > 0) {
            pairs.push(("page", page.to_string()));
        }
        if let Some(per_page) = self.per_page.filter(|p| *p > 0) {
            pairs.push(("per_page", per_page.to_string()));
        }
        if let Some(q) = self.q.as_deref().filter(|q| !q.is_empty()) {
            pairs.push(("q", q.to_string()));
        }
        pairs.extend(self.export_pairs());
        pairs
    }

    /// The subset of filters honoured by the CSV export.
    pub fn export_pairs(&self) -> QueryPairs {
        let mut pairs = QueryPairs::new();
        let filters = [
            ("status", &self.status),
            ("provider", &self.provider),
            ("created_from", &self.created_from),
            ("created_to", &self.created_to),
        ];
        for (key, value) in filters {
            if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
                pairs.push((key, v.to_string()));
            }
        }
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: String,
    pub apply_premium: bool,
}

/// Manual order creation. Use [`CreateOrder::new`] to get the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrder {
    pub user_id: ResourceId,
    pub amount: f64,
    pub currency: String,
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub premium_days: Option<u32>,
}

impl CreateOrder {
    pub fn new(user_id: ResourceId, amount: f64) -> Self {
        Self {
            user_id,
            amount,
            currency: DEFAULT_CURRENCY.to_string(),
            provider: MANUAL_PROVIDER.to_string(),
            method: None,
            expires_at: None,
            note: None,
            premium_days: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundRequest {
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyPremiumRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
}

/// Audit entry of `GET /payments/orders/{id}/activity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderActivity {
    #[serde(default)]
    pub id: Option<ResourceId>,
    #[serde(default, alias = "type")]
    pub action: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, alias = "at")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentPlan {
    pub id: ResourceId,
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub duration_count: Option<u32>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub discount_percent: Option<f64>,
    #[serde(default)]
    pub discount_amount: Option<f64>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub sort_order: Option<i32>,
}

/// Create/update body for plans. On create an unset currency becomes `IDR`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
}

impl PlanPayload {
    pub fn for_create(mut self) -> Self {
        if self.currency.as_deref().is_none_or(str::is_empty) {
            self.currency = Some(DEFAULT_CURRENCY.to_string());
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderMethod {
    pub id: ResourceId,
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentProvider {
    pub id: ResourceId,
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub methods: Vec<ProviderMethod>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<MethodPayload>>,
}

/// `GET /payments/config` and `GET /payments/setup`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentsConfig {
    #[serde(default)]
    pub enabled_providers: Vec<String>,
    #[serde(default)]
    pub current_provider: Option<String>,
    #[serde(default)]
    pub payments_enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentsConfigUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled_providers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_provider: Option<String>,
    pub payments_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookLog {
    pub id: ResourceId,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebhookQuery {
    pub provider: Option<String>,
    pub status: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl WebhookQuery {
    pub fn to_pairs(&self) -> QueryPairs {
        [
            ("provider", &self.provider),
            ("status", &self.status),
            ("from", &self.from),
            ("to", &self.to),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| (key, v.to_string()))
        })
        .collect()
    }
}

/// Monthly revenue, from `GET /payments/revenue/trend`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenuePoint {
    pub month: String,
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Window for the `/payments/stats/*` aggregates. `range` is a preset such
/// as `7d` or `30d`; `from`/`to` are dates and win when both are set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsQuery {
    pub range: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub currency: Option<String>,
    pub status: Option<String>,
    pub days: Option<u32>,
    pub limit: Option<u32>,
}

impl StatsQuery {
    pub fn to_pairs(&self) -> QueryPairs {
        let mut pairs: QueryPairs = [
            ("range", &self.range),
            ("from", &self.from),
            ("to", &self.to),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| (key, v.to_string()))
        })
        .collect();
        if let Some(days) = self.days.filter(|d| *d > 0) {
            pairs.push(("days", days.to_string()));
        }
        for (key, value) in [("status", &self.status), ("currency", &self.currency)] {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                pairs.push((key, value.to_string()));
            }
        }
        if let Some(limit) = self.limit.filter(|l| *l > 0) {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}
