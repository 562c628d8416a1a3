//! `/payments/*`: orders, providers and their methods, plans, the payment
//! switchboard and webhook logs.

use dracin_model::{
    Ack, ApplyPremiumRequest, CreateOrder, MethodPayload, OrderActivity,
    OrderQuery, OrderStatusUpdate, Page, PaymentOrder, PaymentPlan,
    PaymentProvider, PaymentsConfig, PaymentsConfigUpdate, PlanPayload,
    ProviderMethod, ProviderPayload, QueryPairs, RefundRequest, ResourceId,
    RevenuePoint, StatsQuery, WebhookLog, WebhookQuery,
};
use serde_json::Value;

use super::{CREATED, NO_CONTENT, item_path};
use crate::client::{Accept, ApiClient, RequestSpec};
use crate::error::ApiError;

const ORDERS: &str = "/payments/orders";
const PROVIDERS: &str = "/payments/providers";
const PLANS: &str = "/payments/plans";

/// The aggregate views under `/payments/stats` and friends. Their payloads
/// are chart series the backend still reshapes, so they stay untyped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsView {
    /// `/payments/stats`
    Overview,
    /// `/payments/stats/range`
    Range,
    /// `/payments/stats/daily`
    Daily,
    /// `/payments/stats/providers`
    Providers,
    /// `/payments/stats/top-users`
    TopUsers,
    /// `/payments/orders/by-provider`
    OrdersByProvider,
    /// `/payments/orders/by-status-trend`
    OrdersByStatusTrend,
}

impl StatsView {
    fn path(self) -> &'static str {
        match self {
            StatsView::Overview => "/payments/stats",
            StatsView::Range => "/payments/stats/range",
            StatsView::Daily => "/payments/stats/daily",
            StatsView::Providers => "/payments/stats/providers",
            StatsView::TopUsers => "/payments/stats/top-users",
            StatsView::OrdersByProvider => "/payments/orders/by-provider",
            StatsView::OrdersByStatusTrend => {
                "/payments/orders/by-status-trend"
            }
        }
    }

    fn fallback(self) -> &'static str {
        match self {
            StatsView::Overview => "Gagal memuat statistik pembayaran",
            StatsView::Range => "Gagal memuat statistik rentang pembayaran",
            StatsView::Daily => "Gagal memuat statistik harian pembayaran",
            StatsView::Providers => {
                "Gagal memuat statistik provider pembayaran"
            }
            StatsView::TopUsers => {
                "Gagal memuat statistik top users pembayaran"
            }
            StatsView::OrdersByProvider => "Gagal memuat distribusi provider",
            StatsView::OrdersByStatusTrend => "Gagal memuat trend status order",
        }
    }
}

fn order_action(id: &ResourceId, action: &str) -> String {
    format!("{}/{action}", item_path(ORDERS, id))
}

fn optional_pairs(pairs: &[(&'static str, Option<&str>)]) -> QueryPairs {
    pairs
        .iter()
        .filter_map(|(key, value)| {
            value
                .filter(|v| !v.is_empty())
                .map(|v| (*key, v.to_string()))
        })
        .collect()
}

impl ApiClient {
    /// `GET /payments/orders`
    pub async fn list_orders(
        &self,
        query: &OrderQuery,
    ) -> Result<Page<PaymentOrder>, ApiError> {
        self.fetch_page(
            RequestSpec::get(ORDERS)
                .query(query.to_pairs())
                .fallback("Gagal memuat orders"),
        )
        .await
    }

    /// `GET /payments/orders/{id}`
    pub async fn get_order(
        &self,
        id: &ResourceId,
    ) -> Result<PaymentOrder, ApiError> {
        self.fetch(
            RequestSpec::get(item_path(ORDERS, id))
                .fallback("Gagal memuat detail order"),
        )
        .await
    }

    /// Manual order; see [`CreateOrder::new`] for the defaults.
    pub async fn create_order(
        &self,
        order: &CreateOrder,
    ) -> Result<Ack, ApiError> {
        self.acknowledge(
            RequestSpec::post(ORDERS)
                .json(order)?
                .fallback("Gagal membuat order"),
            "Order dibuat",
        )
        .await
    }

    /// `PUT /payments/orders/{id}/status`
    pub async fn update_order_status(
        &self,
        id: &ResourceId,
        update: &OrderStatusUpdate,
    ) -> Result<Ack, ApiError> {
        self.acknowledge(
            RequestSpec::put(order_action(id, "status"))
                .json(update)?
                .fallback("Gagal memperbarui status order"),
            "Status order diperbarui",
        )
        .await
    }

    /// Ask the provider for the latest status of an order. Accepts either
    /// the numeric id or the invoice number.
    pub async fn sync_order(&self, id: &ResourceId) -> Result<Ack, ApiError> {
        self.acknowledge(
            RequestSpec::post(order_action(id, "sync"))
                .fallback("Gagal sinkron status order"),
            "Status order disinkronkan",
        )
        .await
    }

    /// `POST /payments/orders/{id}/resend`
    pub async fn resend_order(&self, id: &ResourceId) -> Result<Ack, ApiError> {
        self.acknowledge(
            RequestSpec::post(order_action(id, "resend"))
                .fallback("Gagal kirim ulang instruksi"),
            "Instruksi dikirim ulang",
        )
        .await
    }

    /// `POST /payments/orders/{id}/cancel`
    pub async fn cancel_order(&self, id: &ResourceId) -> Result<Ack, ApiError> {
        self.acknowledge(
            RequestSpec::post(order_action(id, "cancel"))
                .fallback("Gagal membatalkan order"),
            "Order dibatalkan",
        )
        .await
    }

    /// `POST /payments/orders/{id}/refund`
    pub async fn refund_order(
        &self,
        id: &ResourceId,
        refund: &RefundRequest,
    ) -> Result<Ack, ApiError> {
        self.acknowledge(
            RequestSpec::post(order_action(id, "refund"))
                .json(refund)?
                .fallback("Gagal melakukan refund"),
            "Refund diproses",
        )
        .await
    }

    /// `POST /payments/orders/{id}/apply-premium`
    pub async fn apply_premium(
        &self,
        id: &ResourceId,
        request: &ApplyPremiumRequest,
    ) -> Result<Ack, ApiError> {
        self.acknowledge(
            RequestSpec::post(order_action(id, "apply-premium"))
                .json(request)?
                .fallback("Gagal menerapkan premium"),
            "Premium diterapkan",
        )
        .await
    }

    /// `GET /payments/orders/{id}/activity`
    pub async fn order_activity(
        &self,
        id: &ResourceId,
    ) -> Result<Vec<OrderActivity>, ApiError> {
        self.fetch_list(
            RequestSpec::get(order_action(id, "activity"))
                .fallback("Gagal memuat aktivitas order"),
        )
        .await
    }

    /// CSV export of the orders matching the filters (paging is ignored).
    pub async fn export_orders(
        &self,
        query: &OrderQuery,
    ) -> Result<Vec<u8>, ApiError> {
        self.download(
            RequestSpec::get(format!("{ORDERS}/export"))
                .query(query.export_pairs())
                .fallback("Gagal mengekspor CSV"),
        )
        .await
    }

    /// `GET /payments/revenue/trend`
    pub async fn revenue_trend(
        &self,
        currency: Option<&str>,
        period: Option<&str>,
    ) -> Result<Vec<RevenuePoint>, ApiError> {
        self.fetch_list(
            RequestSpec::get("/payments/revenue/trend")
                .query(optional_pairs(&[
                    ("currency", currency),
                    ("period", period),
                ]))
                .fallback("Gagal memuat trend revenue"),
        )
        .await
    }

    /// `GET /payments/providers`
    pub async fn list_providers(
        &self,
    ) -> Result<Vec<PaymentProvider>, ApiError> {
        self.fetch_list(
            RequestSpec::get(PROVIDERS).fallback("Gagal memuat providers"),
        )
        .await
    }

    /// `POST /payments/providers`
    pub async fn create_provider(
        &self,
        payload: &ProviderPayload,
    ) -> Result<Ack, ApiError> {
        self.acknowledge(
            RequestSpec::post(PROVIDERS)
                .json(payload)?
                .fallback("Gagal membuat provider"),
            "Provider dibuat",
        )
        .await
    }

    /// `PUT /payments/providers/{id}`
    pub async fn update_provider(
        &self,
        id: &ResourceId,
        payload: &ProviderPayload,
    ) -> Result<Ack, ApiError> {
        self.acknowledge(
            RequestSpec::put(item_path(PROVIDERS, id))
                .json(payload)?
                .fallback("Gagal memperbarui provider"),
            "Provider diperbarui",
        )
        .await
    }

    /// `DELETE /payments/providers/{id}`
    pub async fn delete_provider(
        &self,
        id: &ResourceId,
    ) -> Result<Ack, ApiError> {
        self.acknowledge(
            RequestSpec::delete(item_path(PROVIDERS, id))
                .fallback("Gagal menghapus provider"),
            "Provider dihapus",
        )
        .await
    }

    /// `GET /payments/providers/{id}/methods`
    pub async fn provider_methods(
        &self,
        provider_id: &ResourceId,
    ) -> Result<Vec<ProviderMethod>, ApiError> {
        self.fetch_list(
            RequestSpec::get(format!(
                "{}/methods",
                item_path(PROVIDERS, provider_id)
            ))
            .fallback("Gagal memuat methods provider"),
        )
        .await
    }

    /// `PUT /payments/providers/methods/{id}`
    pub async fn update_method(
        &self,
        method_id: &ResourceId,
        payload: &MethodPayload,
    ) -> Result<Ack, ApiError> {
        self.acknowledge(
            RequestSpec::put(item_path(&format!("{PROVIDERS}/methods"), method_id))
                .json(payload)?
                .fallback("Gagal memperbarui method"),
            "Method diperbarui",
        )
        .await
    }

    /// `DELETE /payments/providers/methods/{id}`
    pub async fn delete_method(
        &self,
        method_id: &ResourceId,
    ) -> Result<Ack, ApiError> {
        self.acknowledge(
            RequestSpec::delete(item_path(
                &format!("{PROVIDERS}/methods"),
                method_id,
            ))
            .fallback("Gagal menghapus method"),
            "Method dihapus",
        )
        .await
    }

    /// Methods offered to buyers, optionally for a single provider.
    pub async fn payment_methods(
        &self,
        provider: Option<&str>,
    ) -> Result<Vec<ProviderMethod>, ApiError> {
        self.fetch_list(
            RequestSpec::get("/payments/methods")
                .query(optional_pairs(&[("provider", provider)]))
                .fallback("Gagal memuat methods"),
        )
        .await
    }

    /// `GET /payments/plans`
    pub async fn list_plans(
        &self,
        active_only: bool,
    ) -> Result<Vec<PaymentPlan>, ApiError> {
        let mut query = QueryPairs::new();
        if active_only {
            query.push(("active_only", "true".to_string()));
        }
        self.fetch_list(
            RequestSpec::get(PLANS)
                .query(query)
                .fallback("Gagal memuat payment plans"),
        )
        .await
    }

    /// `POST /payments/plans`
    pub async fn create_plan(
        &self,
        payload: PlanPayload,
    ) -> Result<Ack, ApiError> {
        self.acknowledge(
            RequestSpec::post(PLANS)
                .json(&payload.for_create())?
                .accept(Accept::Codes(CREATED))
                .fallback("Gagal membuat payment plan"),
            "Payment plan dibuat",
        )
        .await
    }

    /// `PUT /payments/plans/{id}`
    pub async fn update_plan(
        &self,
        id: &ResourceId,
        payload: &PlanPayload,
    ) -> Result<Ack, ApiError> {
        self.acknowledge(
            RequestSpec::put(item_path(PLANS, id))
                .json(payload)?
                .accept(Accept::Codes(CREATED))
                .fallback("Gagal memperbarui payment plan"),
            "Payment plan diperbarui",
        )
        .await
    }

    /// `DELETE /payments/plans/{id}`
    pub async fn delete_plan(&self, id: &ResourceId) -> Result<Ack, ApiError> {
        self.acknowledge(
            RequestSpec::delete(item_path(PLANS, id))
                .accept(Accept::Codes(NO_CONTENT))
                .fallback("Gagal menghapus payment plan"),
            "Payment plan dihapus",
        )
        .await
    }

    /// `GET /payments/config`
    pub async fn payments_config(&self) -> Result<PaymentsConfig, ApiError> {
        self.fetch(
            RequestSpec::get("/payments/config")
                .fallback("Gagal memuat konfigurasi pembayaran"),
        )
        .await
    }

    /// `PUT /payments/config`
    pub async fn update_payments_config(
        &self,
        update: &PaymentsConfigUpdate,
    ) -> Result<Ack, ApiError> {
        self.acknowledge(
            RequestSpec::put("/payments/config")
                .json(update)?
                .fallback("Gagal memperbarui konfigurasi pembayaran"),
            "Konfigurasi pembayaran diperbarui",
        )
        .await
    }

    /// Free-form overview; the backend has not settled on a shape.
    pub async fn payments_config_summary(&self) -> Result<Value, ApiError> {
        self.fetch(
            RequestSpec::get("/payments/config/summary")
                .fallback("Gagal memuat ringkasan konfigurasi pembayaran"),
        )
        .await
    }

    /// `GET /payments/setup`
    pub async fn payments_setup(&self) -> Result<PaymentsConfig, ApiError> {
        self.fetch(
            RequestSpec::get("/payments/setup")
                .fallback("Gagal memuat setup pembayaran"),
        )
        .await
    }

    /// `PUT /payments/setup`
    pub async fn update_payments_setup(
        &self,
        update: &PaymentsConfigUpdate,
    ) -> Result<Ack, ApiError> {
        self.acknowledge(
            RequestSpec::put("/payments/setup")
                .json(update)?
                .fallback("Gagal memperbarui setup pembayaran"),
            "Setup pembayaran diperbarui",
        )
        .await
    }

    /// `GET /payments/webhooks/logs`
    pub async fn webhook_logs(
        &self,
        query: &WebhookQuery,
    ) -> Result<Page<WebhookLog>, ApiError> {
        self.fetch_page(
            RequestSpec::get("/payments/webhooks/logs")
                .query(query.to_pairs())
                .fallback("Gagal memuat log webhook"),
        )
        .await
    }

    /// Raw chart data for one of the [`StatsView`] aggregates.
    pub async fn payment_stats(
        &self,
        view: StatsView,
        query: &StatsQuery,
    ) -> Result<Value, ApiError> {
        self.fetch(
            RequestSpec::get(view.path())
                .query(query.to_pairs())
                .fallback(view.fallback()),
        )
        .await
    }
}
