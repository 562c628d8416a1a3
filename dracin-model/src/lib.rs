//! Typed wire model for the Dracin admin REST API.
//!
//! Every response from `/api/admin/...` is wrapped in an [`Envelope`]. The
//! payload types in this crate are decoded from that envelope at the API
//! boundary; a payload that does not fit its declared shape is a decode
//! error rather than an empty value.
#![allow(missing_docs)]

pub use ::chrono;

pub mod app;
pub mod auth;
pub mod content;
pub mod envelope;
pub mod error;
pub mod ids;
pub mod payments;
pub mod scan;
pub mod settings;
pub mod users;

pub use app::{
    AdPayload, AnnouncePayload, AppAd, AppAnnounce, AppConfig, AppNotification,
    AppRedirect, FeatureToggle, GlobalToggle, ImageUpload, ListQuery,
    NotificationPayload,
    RedirectPayload,
};
pub use auth::{AdminUser, LoginRequest, RefreshRequest, TokenGrant};
pub use content::{
    ContentQuery, ContentStats, Episode, EpisodePayload, Series,
    SeriesPayload, SizePoint, Tag, TagPayload, TagUsage,
};
pub use envelope::{Ack, Envelope, Page, PageMeta};
pub use error::{ModelError, Result as ModelResult};
pub use ids::ResourceId;
pub use payments::{
    ApplyPremiumRequest, CreateOrder, MethodPayload, OrderActivity,
    OrderQuery, OrderStatusUpdate, PaymentOrder, PaymentPlan, PaymentProvider,
    PaymentsConfig, PaymentsConfigUpdate, PlanPayload, ProviderMethod,
    ProviderPayload, RefundRequest, RevenuePoint, StatsQuery, WebhookLog,
    WebhookQuery,
};
pub use scan::{
    CurrentReport, FolderProgress, LogTimestamp, ScanLogFrame, ScanPosition,
    ScanRealtime, ScanStatusFrame, ScanStatusView, ScanTotals,
    StartScanRequest, SummaryReport,
};
pub use settings::{AdminSetting, SettingsMap, settings_entries};
pub use users::{MonthlyCount, User, UserQuery, UserUpdate};

/// Query-string pairs as produced by the `*Query` types.
pub type QueryPairs = Vec<(&'static str, String)>;
