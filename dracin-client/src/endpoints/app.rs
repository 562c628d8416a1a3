//! `/app/*`: ad units, push notifications, redirect banners, announcements
//! and the config switchboard.
//!
//! Writes here are judged on the HTTP status alone; the backend answers
//! them with whatever envelope code its upstream returned.

use dracin_model::{
    Ack, AdPayload, AnnouncePayload, AppAd, AppAnnounce, AppConfig,
    AppNotification, AppRedirect, ListQuery, NotificationPayload, Page,
    RedirectPayload, ResourceId,
};

use super::item_path;
use crate::client::{Accept, ApiClient, FormSpec, RequestSpec};
use crate::error::ApiError;

const ADS: &str = "/app/ads";
const NOTIFICATIONS: &str = "/app/notifications";
const REDIRECTS: &str = "/app/redirects";
const ANNOUNCES: &str = "/app/announces";

/// Local refusal when a notification is created without an image.
pub const IMAGE_REQUIRED: &str = "Gambar wajib diisi";

fn notification_form(payload: &NotificationPayload) -> FormSpec {
    FormSpec::default()
        .text("unit_name", payload.unit_name.as_deref())
        .text("unit_description", payload.unit_description.as_deref())
        .text("url", payload.url.as_deref())
        .file("image", payload.image.as_ref())
}

fn redirect_form(payload: &RedirectPayload) -> FormSpec {
    FormSpec::default()
        .text("unit_name", payload.unit_name.as_deref())
        .text("unit_description", payload.unit_description.as_deref())
        .text("title", payload.title.as_deref())
        .text("description", payload.description.as_deref())
        .text("url", payload.url.as_deref())
        .file("image", payload.image.as_ref())
}

fn write(spec: RequestSpec, fallback: &'static str) -> RequestSpec {
    spec.accept(Accept::Transport).fallback(fallback)
}

impl ApiClient {
    /// `GET /app/ads`
    pub async fn list_ads(
        &self,
        query: &ListQuery,
    ) -> Result<Page<AppAd>, ApiError> {
        self.fetch_page(
            RequestSpec::get(ADS)
                .query(query.to_pairs())
                .fallback("Gagal memuat ads"),
        )
        .await
    }

    /// `GET /app/ads/{id}`
    pub async fn get_ad(&self, id: &ResourceId) -> Result<AppAd, ApiError> {
        self.fetch(RequestSpec::get(item_path(ADS, id)).fallback("Gagal memuat ads"))
            .await
    }

    /// `POST /app/ads`
    pub async fn create_ad(&self, payload: &AdPayload) -> Result<Ack, ApiError> {
        self.acknowledge(
            write(RequestSpec::post(ADS).json(payload)?, "Gagal membuat ads"),
            "Ads dibuat",
        )
        .await
    }

    /// `PUT /app/ads/{id}`
    pub async fn update_ad(
        &self,
        id: &ResourceId,
        payload: &AdPayload,
    ) -> Result<Ack, ApiError> {
        self.acknowledge(
            write(
                RequestSpec::put(item_path(ADS, id)).json(payload)?,
                "Gagal mengubah ads",
            ),
            "Ads diperbarui",
        )
        .await
    }

    /// `DELETE /app/ads/{id}`
    pub async fn delete_ad(&self, id: &ResourceId) -> Result<Ack, ApiError> {
        self.acknowledge(
            write(RequestSpec::delete(item_path(ADS, id)), "Gagal menghapus ads"),
            "Ads dihapus",
        )
        .await
    }

    /// `GET /app/notifications`
    pub async fn list_notifications(
        &self,
        query: &ListQuery,
    ) -> Result<Page<AppNotification>, ApiError> {
        self.fetch_page(
            RequestSpec::get(NOTIFICATIONS)
                .query(query.to_pairs())
                .fallback("Gagal memuat notifications"),
        )
        .await
    }

    /// `GET /app/notifications/{id}`
    pub async fn get_notification(
        &self,
        id: &ResourceId,
    ) -> Result<AppNotification, ApiError> {
        self.fetch(
            RequestSpec::get(item_path(NOTIFICATIONS, id))
                .fallback("Gagal memuat notification"),
        )
        .await
    }

    /// Multipart create. Refused locally when no image is attached.
    pub async fn create_notification(
        &self,
        payload: &NotificationPayload,
    ) -> Result<Ack, ApiError> {
        if payload.image.is_none() {
            return Err(ApiError::Invalid(IMAGE_REQUIRED.to_string()));
        }
        self.acknowledge(
            write(
                RequestSpec::post(NOTIFICATIONS).form(notification_form(payload)),
                "Gagal membuat notification",
            ),
            "Notification dibuat",
        )
        .await
    }

    /// Multipart update; only the fields that are set are sent.
    pub async fn update_notification(
        &self,
        id: &ResourceId,
        payload: &NotificationPayload,
    ) -> Result<Ack, ApiError> {
        self.acknowledge(
            write(
                RequestSpec::put(item_path(NOTIFICATIONS, id))
                    .form(notification_form(payload)),
                "Gagal mengubah notification",
            ),
            "Notification diperbarui",
        )
        .await
    }

    /// `DELETE /app/notifications/{id}`
    pub async fn delete_notification(
        &self,
        id: &ResourceId,
    ) -> Result<Ack, ApiError> {
        self.acknowledge(
            write(
                RequestSpec::delete(item_path(NOTIFICATIONS, id)),
                "Gagal menghapus notification",
            ),
            "Notification dihapus",
        )
        .await
    }

    /// `GET /app/redirects`
    pub async fn list_redirects(
        &self,
        query: &ListQuery,
    ) -> Result<Page<AppRedirect>, ApiError> {
        self.fetch_page(
            RequestSpec::get(REDIRECTS)
                .query(query.to_pairs())
                .fallback("Gagal memuat redirects"),
        )
        .await
    }

    /// `GET /app/redirects/{id}`
    pub async fn get_redirect(
        &self,
        id: &ResourceId,
    ) -> Result<AppRedirect, ApiError> {
        self.fetch(
            RequestSpec::get(item_path(REDIRECTS, id))
                .fallback("Gagal memuat redirect"),
        )
        .await
    }

    /// `POST /app/redirects`
    pub async fn create_redirect(
        &self,
        payload: &RedirectPayload,
    ) -> Result<Ack, ApiError> {
        self.acknowledge(
            write(
                RequestSpec::post(REDIRECTS).form(redirect_form(payload)),
                "Gagal membuat redirect",
            ),
            "Redirect dibuat",
        )
        .await
    }

    /// `PUT /app/redirects/{id}`
    pub async fn update_redirect(
        &self,
        id: &ResourceId,
        payload: &RedirectPayload,
    ) -> Result<Ack, ApiError> {
        self.acknowledge(
            write(
                RequestSpec::put(item_path(REDIRECTS, id))
                    .form(redirect_form(payload)),
                "Gagal mengubah redirect",
            ),
            "Redirect diperbarui",
        )
        .await
    }

    /// `DELETE /app/redirects/{id}`
    pub async fn delete_redirect(
        &self,
        id: &ResourceId,
    ) -> Result<Ack, ApiError> {
        self.acknowledge(
            write(
                RequestSpec::delete(item_path(REDIRECTS, id)),
                "Gagal menghapus redirect",
            ),
            "Redirect dihapus",
        )
        .await
    }

    /// `GET /app/announces`
    pub async fn list_announces(
        &self,
        query: &ListQuery,
    ) -> Result<Page<AppAnnounce>, ApiError> {
        self.fetch_page(
            RequestSpec::get(ANNOUNCES)
                .query(query.to_pairs())
                .fallback("Gagal memuat announces"),
        )
        .await
    }

    /// `GET /app/announces/{id}`
    pub async fn get_announce(
        &self,
        id: &ResourceId,
    ) -> Result<AppAnnounce, ApiError> {
        self.fetch(
            RequestSpec::get(item_path(ANNOUNCES, id))
                .fallback("Gagal memuat announce"),
        )
        .await
    }

    /// `POST /app/announces`
    pub async fn create_announce(
        &self,
        payload: &AnnouncePayload,
    ) -> Result<Ack, ApiError> {
        self.acknowledge(
            write(
                RequestSpec::post(ANNOUNCES).json(payload)?,
                "Gagal membuat announce",
            ),
            "Announce dibuat",
        )
        .await
    }

    /// `PUT /app/announces/{id}`
    pub async fn update_announce(
        &self,
        id: &ResourceId,
        payload: &AnnouncePayload,
    ) -> Result<Ack, ApiError> {
        self.acknowledge(
            write(
                RequestSpec::put(item_path(ANNOUNCES, id)).json(payload)?,
                "Gagal mengubah announce",
            ),
            "Announce diperbarui",
        )
        .await
    }

    /// `DELETE /app/announces/{id}`
    pub async fn delete_announce(
        &self,
        id: &ResourceId,
    ) -> Result<Ack, ApiError> {
        self.acknowledge(
            write(
                RequestSpec::delete(item_path(ANNOUNCES, id)),
                "Gagal menghapus announce",
            ),
            "Announce dihapus",
        )
        .await
    }

    /// `GET /app/config`
    pub async fn app_config(&self) -> Result<AppConfig, ApiError> {
        self.fetch(
            RequestSpec::get("/app/config")
                .fallback("Gagal memuat konfigurasi UI"),
        )
        .await
    }

    /// `PUT /app/config`
    pub async fn update_app_config(
        &self,
        config: &AppConfig,
    ) -> Result<Ack, ApiError> {
        self.acknowledge(
            write(
                RequestSpec::put("/app/config").json(config)?,
                "Gagal memperbarui konfigurasi UI",
            ),
            "Konfigurasi UI diperbarui",
        )
        .await
    }
}
